use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::list_entry::EntryEdit;
use crate::domain::purchase_request::RequestStatus;
use crate::domain::submission::{
    NewSubmission as DomainNewSubmission, Submission as DomainSubmission, SubmissionListQuery,
    SubmissionStatus, derive_status,
};
use crate::models::list::List as DbList;
use crate::models::list_entry::ListEntry as DbListEntry;
use crate::models::purchase_request::{
    NewPurchaseRequest as DbNewPurchaseRequest, PurchaseRequest as DbPurchaseRequest,
};
use crate::models::submission::{NewSubmission as DbNewSubmission, Submission as DbSubmission};
use crate::models::quantity_to_db;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, SubmissionReader, SubmissionWriter};

/// Recompute and persist the derived status of a submission from its child
/// requests. Must run inside the transaction that mutated the children.
pub(crate) fn refresh_submission_status(
    conn: &mut SqliteConnection,
    submission_id: i32,
) -> RepositoryResult<SubmissionStatus> {
    use crate::schema::{purchase_requests, submissions};

    let stored: Vec<String> = purchase_requests::table
        .filter(purchase_requests::submission_id.eq(submission_id))
        .select(purchase_requests::status)
        .load(conn)?;

    let statuses = stored
        .iter()
        .map(|value| {
            RequestStatus::parse(value).ok_or_else(|| {
                RepositoryError::Conversion(format!("unknown request status `{value}`"))
            })
        })
        .collect::<RepositoryResult<Vec<_>>>()?;

    let derived = derive_status(&statuses);

    diesel::update(submissions::table.filter(submissions::id.eq(submission_id)))
        .set((
            submissions::status.eq(derived.as_str()),
            submissions::updated_at.eq(chrono::Local::now().naive_utc()),
        ))
        .execute(conn)?;

    Ok(derived)
}

/// Re-materialize `request_count` after requests were added or removed.
pub(crate) fn refresh_submission_request_count(
    conn: &mut SqliteConnection,
    submission_id: i32,
) -> RepositoryResult<()> {
    use crate::schema::{purchase_requests, submissions};

    let count = purchase_requests::table
        .filter(purchase_requests::submission_id.eq(submission_id))
        .count()
        .get_result::<i64>(conn)?;

    diesel::update(submissions::table.filter(submissions::id.eq(submission_id)))
        .set(submissions::request_count.eq(count as i32))
        .execute(conn)?;

    Ok(())
}

fn load_scoped_submission(
    conn: &mut SqliteConnection,
    submission_id: i32,
    hub_id: i32,
) -> RepositoryResult<Option<DbSubmission>> {
    use crate::schema::{lists, submissions};

    let hub_lists = lists::table
        .filter(lists::hub_id.eq(hub_id))
        .select(lists::id);

    Ok(submissions::table
        .filter(submissions::id.eq(submission_id))
        .filter(submissions::list_id.eq_any(hub_lists))
        .first::<DbSubmission>(conn)
        .optional()?)
}

fn into_domain_with_requests(
    conn: &mut SqliteConnection,
    submission: DbSubmission,
) -> RepositoryResult<DomainSubmission> {
    use crate::schema::purchase_requests;

    let requests = purchase_requests::table
        .filter(purchase_requests::submission_id.eq(submission.id))
        .order(purchase_requests::id.asc())
        .load::<DbPurchaseRequest>(conn)?;

    submission.into_domain(requests)
}

impl SubmissionReader for DieselRepository {
    fn get_submission_by_id(
        &self,
        id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainSubmission>> {
        let mut conn = self.conn()?;

        let Some(submission) = load_scoped_submission(&mut conn, id, hub_id)? else {
            return Ok(None);
        };

        Ok(Some(into_domain_with_requests(&mut conn, submission)?))
    }

    fn list_submissions(
        &self,
        query: SubmissionListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainSubmission>)> {
        use crate::schema::{lists, purchase_requests, submissions};

        let mut conn = self.conn()?;

        let status_filter = query.status.map(|status| status.as_str());

        let mut count_query = submissions::table
            .filter(
                submissions::list_id.eq_any(
                    lists::table
                        .filter(lists::hub_id.eq(query.hub_id))
                        .select(lists::id),
                ),
            )
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(list_id) = query.list_id {
            count_query = count_query.filter(submissions::list_id.eq(list_id));
        }

        if let Some(status) = status_filter {
            count_query = count_query.filter(submissions::status.eq(status));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = submissions::table
            .filter(
                submissions::list_id.eq_any(
                    lists::table
                        .filter(lists::hub_id.eq(query.hub_id))
                        .select(lists::id),
                ),
            )
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(list_id) = query.list_id {
            items = items.filter(submissions::list_id.eq(list_id));
        }

        if let Some(status) = status_filter {
            items = items.filter(submissions::status.eq(status));
        }

        items = items.order(submissions::submitted_at.desc());

        if let Some(pagination) = query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_submissions = items.load::<DbSubmission>(&mut conn)?;
        if db_submissions.is_empty() {
            return Ok((total, Vec::new()));
        }

        let submission_ids: Vec<i32> = db_submissions.iter().map(|row| row.id).collect();
        let request_rows = purchase_requests::table
            .filter(purchase_requests::submission_id.eq_any(&submission_ids))
            .order(purchase_requests::id.asc())
            .load::<DbPurchaseRequest>(&mut conn)?;

        let mut by_submission: std::collections::HashMap<i32, Vec<DbPurchaseRequest>> =
            std::collections::HashMap::new();
        for request in request_rows {
            if let Some(submission_id) = request.submission_id {
                by_submission.entry(submission_id).or_default().push(request);
            }
        }

        let submissions = db_submissions
            .into_iter()
            .map(|row| {
                let requests = by_submission.remove(&row.id).unwrap_or_default();
                row.into_domain(requests)
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, submissions))
    }
}

impl SubmissionWriter for DieselRepository {
    fn create_submission(
        &self,
        new_submission: &DomainNewSubmission,
    ) -> RepositoryResult<DomainSubmission> {
        use crate::schema::{list_entries, lists, purchase_requests, submissions};

        let mut conn = self.conn()?;

        conn.transaction::<DomainSubmission, RepositoryError, _>(|conn| {
            let list = lists::table
                .filter(lists::id.eq(new_submission.list_id))
                .filter(lists::hub_id.eq(new_submission.hub_id))
                .first::<DbList>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if list.deleted {
                return Err(RepositoryError::NotFound);
            }

            let submitted_at = new_submission.submitted_at;
            let mut reorders: Vec<(i32, Decimal)> = Vec::new();

            for edit in &new_submission.edits {
                if edit.new_current_quantity < Decimal::ZERO {
                    return Err(RepositoryError::InvalidArgument(format!(
                        "negative quantity for item {}",
                        edit.item_id
                    )));
                }

                // Edits referencing entries outside this list are skipped
                // rather than failing the whole batch.
                let entry = list_entries::table
                    .filter(list_entries::list_id.eq(new_submission.list_id))
                    .filter(list_entries::item_id.eq(edit.item_id))
                    .first::<DbListEntry>(conn)
                    .optional()?;

                let Some(entry) = entry else {
                    continue;
                };

                let updated = diesel::update(
                    list_entries::table.filter(list_entries::id.eq(entry.id)),
                )
                .set((
                    list_entries::current_quantity
                        .eq(quantity_to_db(edit.new_current_quantity)),
                    list_entries::last_submitted_at.eq(Some(submitted_at)),
                    list_entries::last_submitted_by
                        .eq(Some(new_submission.user_email.as_str())),
                    list_entries::updated_at.eq(submitted_at),
                ))
                .get_result::<DbListEntry>(conn)?
                .into_domain()?;

                let reorder = updated.compute_reorder();
                if reorder > Decimal::ZERO {
                    reorders.push((updated.item_id, reorder));
                }
            }

            let created = diesel::insert_into(submissions::table)
                .values(&DbNewSubmission {
                    list_id: new_submission.list_id,
                    user_email: new_submission.user_email.as_str(),
                    status: SubmissionStatus::Pending.as_str(),
                    request_count: reorders.len() as i32,
                    submitted_at,
                    updated_at: submitted_at,
                })
                .get_result::<DbSubmission>(conn)?;

            if !reorders.is_empty() {
                let payload: Vec<DbNewPurchaseRequest> = reorders
                    .iter()
                    .map(|(item_id, quantity)| {
                        DbNewPurchaseRequest::pending(
                            created.id,
                            *item_id,
                            &new_submission.user_email,
                            *quantity,
                            submitted_at,
                        )
                    })
                    .collect();

                diesel::insert_into(purchase_requests::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            into_domain_with_requests(conn, created)
        })
    }

    fn revert_submission(
        &self,
        submission_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<DomainSubmission> {
        use crate::schema::{purchase_requests, submissions};

        let mut conn = self.conn()?;

        conn.transaction::<DomainSubmission, RepositoryError, _>(|conn| {
            let submission = load_scoped_submission(conn, submission_id, hub_id)?
                .ok_or(RepositoryError::NotFound)?;

            if submission.status()? == SubmissionStatus::Pending {
                return Err(RepositoryError::InvalidState(format!(
                    "submission {submission_id} is still pending and cannot be reverted"
                )));
            }

            let now = chrono::Local::now().naive_utc();

            diesel::update(
                purchase_requests::table
                    .filter(purchase_requests::submission_id.eq(submission_id)),
            )
            .set((
                purchase_requests::status.eq(RequestStatus::Pending.as_str()),
                purchase_requests::updated_at.eq(now),
            ))
            .execute(conn)?;

            let updated = diesel::update(
                submissions::table.filter(submissions::id.eq(submission_id)),
            )
            .set((
                submissions::status.eq(SubmissionStatus::Pending.as_str()),
                submissions::updated_at.eq(now),
            ))
            .get_result::<DbSubmission>(conn)?;

            into_domain_with_requests(conn, updated)
        })
    }

    fn edit_submission_quantities(
        &self,
        submission_id: i32,
        hub_id: i32,
        edits: &[EntryEdit],
        editor_email: &str,
    ) -> RepositoryResult<DomainSubmission> {
        use crate::schema::{list_entries, purchase_requests, submissions};

        let mut conn = self.conn()?;

        conn.transaction::<DomainSubmission, RepositoryError, _>(|conn| {
            let submission = load_scoped_submission(conn, submission_id, hub_id)?
                .ok_or(RepositoryError::NotFound)?;

            if submission.status()? != SubmissionStatus::Pending {
                return Err(RepositoryError::InvalidState(format!(
                    "submission {submission_id} has already been decided"
                )));
            }

            let now = chrono::Local::now().naive_utc();

            for edit in edits {
                if edit.new_current_quantity < Decimal::ZERO {
                    return Err(RepositoryError::InvalidArgument(format!(
                        "negative quantity for item {}",
                        edit.item_id
                    )));
                }

                let entry = list_entries::table
                    .filter(list_entries::list_id.eq(submission.list_id))
                    .filter(list_entries::item_id.eq(edit.item_id))
                    .first::<DbListEntry>(conn)
                    .optional()?;

                let Some(entry) = entry else {
                    continue;
                };

                let updated = diesel::update(
                    list_entries::table.filter(list_entries::id.eq(entry.id)),
                )
                .set((
                    list_entries::current_quantity
                        .eq(quantity_to_db(edit.new_current_quantity)),
                    list_entries::last_submitted_at.eq(Some(now)),
                    list_entries::last_submitted_by.eq(Some(editor_email)),
                    list_entries::updated_at.eq(now),
                ))
                .get_result::<DbListEntry>(conn)?
                .into_domain()?;

                let reorder = updated.compute_reorder();

                let open_request = purchase_requests::table
                    .filter(purchase_requests::submission_id.eq(submission_id))
                    .filter(purchase_requests::item_id.eq(edit.item_id))
                    .filter(purchase_requests::status.eq(RequestStatus::Pending.as_str()))
                    .first::<DbPurchaseRequest>(conn)
                    .optional()?;

                // The open request tracks the recomputed deficit: replaced in
                // place, created when a deficit appears, dropped when it
                // disappears.
                match (open_request, reorder > Decimal::ZERO) {
                    (Some(request), true) => {
                        diesel::update(
                            purchase_requests::table
                                .filter(purchase_requests::id.eq(request.id)),
                        )
                        .set((
                            purchase_requests::quantity.eq(quantity_to_db(reorder)),
                            purchase_requests::updated_at.eq(now),
                        ))
                        .execute(conn)?;
                    }
                    (Some(request), false) => {
                        diesel::delete(
                            purchase_requests::table
                                .filter(purchase_requests::id.eq(request.id)),
                        )
                        .execute(conn)?;
                    }
                    (None, true) => {
                        diesel::insert_into(purchase_requests::table)
                            .values(&DbNewPurchaseRequest::pending(
                                submission_id,
                                edit.item_id,
                                editor_email,
                                reorder,
                                now,
                            ))
                            .execute(conn)?;
                    }
                    (None, false) => {}
                }
            }

            refresh_submission_request_count(conn, submission_id)?;

            let refreshed = submissions::table
                .filter(submissions::id.eq(submission_id))
                .first::<DbSubmission>(conn)?;

            into_domain_with_requests(conn, refreshed)
        })
    }
}
