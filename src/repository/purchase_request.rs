use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::purchase_request::{
    PurchaseRequest as DomainPurchaseRequest, PurchaseRequestListQuery, RequestStatus,
};
use crate::models::purchase_request::PurchaseRequest as DbPurchaseRequest;
use crate::models::quantity_to_db;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::submission::refresh_submission_status;
use crate::repository::{DieselRepository, PurchaseRequestReader, PurchaseRequestWriter};

impl PurchaseRequestReader for DieselRepository {
    fn get_request_by_id(
        &self,
        id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainPurchaseRequest>> {
        use crate::schema::{catalog_items, purchase_requests};

        let mut conn = self.conn()?;

        let hub_items = catalog_items::table
            .filter(catalog_items::hub_id.eq(hub_id))
            .select(catalog_items::id);

        let request = purchase_requests::table
            .filter(purchase_requests::id.eq(id))
            .filter(purchase_requests::item_id.eq_any(hub_items))
            .first::<DbPurchaseRequest>(&mut conn)
            .optional()?;

        request.map(DbPurchaseRequest::into_domain).transpose()
    }

    fn list_requests(
        &self,
        query: PurchaseRequestListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainPurchaseRequest>)> {
        use crate::schema::{catalog_items, list_entries, purchase_requests};

        let mut conn = self.conn()?;

        let status_filter = query.status.map(|status| status.as_str());

        let mut count_query = purchase_requests::table
            .filter(
                purchase_requests::item_id.eq_any(
                    catalog_items::table
                        .filter(catalog_items::hub_id.eq(query.hub_id))
                        .select(catalog_items::id),
                ),
            )
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(status) = status_filter {
            count_query = count_query.filter(purchase_requests::status.eq(status));
        }

        if let Some(list_id) = query.list_id {
            count_query = count_query.filter(
                purchase_requests::item_id.eq_any(
                    list_entries::table
                        .filter(list_entries::list_id.eq(list_id))
                        .select(list_entries::item_id),
                ),
            );
        }

        if let Some(submission_id) = query.submission_id {
            count_query =
                count_query.filter(purchase_requests::submission_id.eq(Some(submission_id)));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = purchase_requests::table
            .filter(
                purchase_requests::item_id.eq_any(
                    catalog_items::table
                        .filter(catalog_items::hub_id.eq(query.hub_id))
                        .select(catalog_items::id),
                ),
            )
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(status) = status_filter {
            items = items.filter(purchase_requests::status.eq(status));
        }

        if let Some(list_id) = query.list_id {
            items = items.filter(
                purchase_requests::item_id.eq_any(
                    list_entries::table
                        .filter(list_entries::list_id.eq(list_id))
                        .select(list_entries::item_id),
                ),
            );
        }

        if let Some(submission_id) = query.submission_id {
            items = items.filter(purchase_requests::submission_id.eq(Some(submission_id)));
        }

        items = items.order(purchase_requests::requested_at.desc());

        if let Some(pagination) = query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbPurchaseRequest>(&mut conn)?;
        let requests = rows
            .into_iter()
            .map(DbPurchaseRequest::into_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, requests))
    }
}

/// Load a hub-scoped request row, distinguishing a missing row from one in
/// the wrong hub.
fn load_scoped_request(
    conn: &mut SqliteConnection,
    request_id: i32,
    hub_id: i32,
) -> RepositoryResult<Option<DbPurchaseRequest>> {
    use crate::schema::{catalog_items, purchase_requests};

    let hub_items = catalog_items::table
        .filter(catalog_items::hub_id.eq(hub_id))
        .select(catalog_items::id);

    Ok(purchase_requests::table
        .filter(purchase_requests::id.eq(request_id))
        .filter(purchase_requests::item_id.eq_any(hub_items))
        .first::<DbPurchaseRequest>(conn)
        .optional()?)
}

impl PurchaseRequestWriter for DieselRepository {
    fn set_request_status(
        &self,
        request_id: i32,
        hub_id: i32,
        status: RequestStatus,
    ) -> RepositoryResult<DomainPurchaseRequest> {
        use crate::schema::purchase_requests;

        if status == RequestStatus::Pending {
            return Err(RepositoryError::InvalidArgument(
                "requests can only be reset to pending through a submission revert".to_string(),
            ));
        }

        let mut conn = self.conn()?;

        conn.transaction::<DomainPurchaseRequest, RepositoryError, _>(|conn| {
            let existing = load_scoped_request(conn, request_id, hub_id)?
                .ok_or(RepositoryError::NotFound)?;

            // Guarded update: only a pending row is transitioned, so the
            // loser of a concurrent decision sees zero rows and fails with
            // the post-transition state.
            let updated = diesel::update(
                purchase_requests::table
                    .filter(purchase_requests::id.eq(request_id))
                    .filter(purchase_requests::status.eq(RequestStatus::Pending.as_str())),
            )
            .set((
                purchase_requests::status.eq(status.as_str()),
                purchase_requests::updated_at.eq(chrono::Local::now().naive_utc()),
            ))
            .get_result::<DbPurchaseRequest>(conn)
            .optional()?
            .ok_or_else(|| {
                RepositoryError::InvalidState(format!(
                    "purchase request {request_id} is already {}",
                    existing.status
                ))
            })?;

            if let Some(submission_id) = updated.submission_id {
                refresh_submission_status(conn, submission_id)?;
            }

            updated.into_domain()
        })
    }

    fn update_request_quantity(
        &self,
        request_id: i32,
        hub_id: i32,
        quantity: Decimal,
    ) -> RepositoryResult<DomainPurchaseRequest> {
        use crate::schema::purchase_requests;

        if quantity <= Decimal::ZERO {
            return Err(RepositoryError::InvalidArgument(
                "requested quantity must be positive".to_string(),
            ));
        }

        let mut conn = self.conn()?;

        conn.transaction::<DomainPurchaseRequest, RepositoryError, _>(|conn| {
            let existing = load_scoped_request(conn, request_id, hub_id)?
                .ok_or(RepositoryError::NotFound)?;

            if existing.status()? != RequestStatus::Pending {
                return Err(RepositoryError::InvalidState(format!(
                    "purchase request {request_id} is already {}",
                    existing.status
                )));
            }

            let updated = diesel::update(
                purchase_requests::table
                    .filter(purchase_requests::id.eq(request_id))
                    .filter(purchase_requests::status.eq(RequestStatus::Pending.as_str())),
            )
            .set((
                purchase_requests::quantity.eq(quantity_to_db(quantity)),
                purchase_requests::updated_at.eq(chrono::Local::now().naive_utc()),
            ))
            .get_result::<DbPurchaseRequest>(conn)
            .optional()?
            .ok_or_else(|| {
                RepositoryError::InvalidState(format!(
                    "purchase request {request_id} was decided concurrently"
                ))
            })?;

            updated.into_domain()
        })
    }

    fn approve_all_for_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<usize> {
        use crate::schema::{list_entries, lists, purchase_requests};

        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let list_exists = lists::table
                .filter(lists::id.eq(list_id))
                .filter(lists::hub_id.eq(hub_id))
                .count()
                .get_result::<i64>(conn)?;

            if list_exists == 0 {
                return Err(RepositoryError::NotFound);
            }

            // Every pending request whose item is tracked on this list,
            // across submissions.
            let targets: Vec<DbPurchaseRequest> = purchase_requests::table
                .filter(purchase_requests::status.eq(RequestStatus::Pending.as_str()))
                .filter(
                    purchase_requests::item_id.eq_any(
                        list_entries::table
                            .filter(list_entries::list_id.eq(list_id))
                            .select(list_entries::item_id),
                    ),
                )
                .load(conn)?;

            if targets.is_empty() {
                return Ok(0);
            }

            let ids: Vec<i32> = targets.iter().map(|request| request.id).collect();

            diesel::update(purchase_requests::table.filter(purchase_requests::id.eq_any(&ids)))
                .set((
                    purchase_requests::status.eq(RequestStatus::Approved.as_str()),
                    purchase_requests::updated_at.eq(chrono::Local::now().naive_utc()),
                ))
                .execute(conn)?;

            let mut submission_ids: Vec<i32> = targets
                .iter()
                .filter_map(|request| request.submission_id)
                .collect();
            submission_ids.sort_unstable();
            submission_ids.dedup();

            for submission_id in submission_ids {
                refresh_submission_status(conn, submission_id)?;
            }

            Ok(ids.len())
        })
    }
}
