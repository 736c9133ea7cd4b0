use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;

use crate::domain::catalog_item::{
    CatalogItem as DomainCatalogItem, CatalogItemListQuery, NewCatalogItem as DomainNewCatalogItem,
    normalize_name,
};
use crate::models::catalog_item::{CatalogItem as DbCatalogItem, NewCatalogItem as DbNewCatalogItem};
use crate::models::list_entry::ListEntry as DbListEntry;
use crate::models::{quantity_from_db, quantity_to_db};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::submission::{refresh_submission_request_count, refresh_submission_status};
use crate::repository::{CatalogItemReader, CatalogItemWriter, DieselRepository};

impl CatalogItemReader for DieselRepository {
    fn get_catalog_item_by_id(
        &self,
        id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainCatalogItem>> {
        use crate::schema::catalog_items;

        let mut conn = self.conn()?;
        let item = catalog_items::table
            .filter(catalog_items::id.eq(id))
            .filter(catalog_items::hub_id.eq(hub_id))
            .first::<DbCatalogItem>(&mut conn)
            .optional()?;

        Ok(item.map(Into::into))
    }

    fn get_catalog_item_by_name(
        &self,
        name: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainCatalogItem>> {
        use crate::schema::catalog_items;

        let mut conn = self.conn()?;
        let normalized = normalize_name(name);
        let item = catalog_items::table
            .filter(catalog_items::normalized_name.eq(normalized))
            .filter(catalog_items::hub_id.eq(hub_id))
            .first::<DbCatalogItem>(&mut conn)
            .optional()?;

        Ok(item.map(Into::into))
    }

    fn list_catalog_items(
        &self,
        query: CatalogItemListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainCatalogItem>)> {
        use crate::schema::catalog_items;

        let mut conn = self.conn()?;

        let search_pattern = query.search.as_ref().map(|term| format!("%{}%", term));

        let mut count_query = catalog_items::table
            .filter(catalog_items::hub_id.eq(query.hub_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(catalog_items::name.like(pattern.clone()));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = catalog_items::table
            .filter(catalog_items::hub_id.eq(query.hub_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref pattern) = search_pattern {
            items = items.filter(catalog_items::name.like(pattern.clone()));
        }

        items = items.order(catalog_items::normalized_name.asc());

        if let Some(pagination) = query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbCatalogItem>(&mut conn)?;

        Ok((total, rows.into_iter().map(Into::into).collect()))
    }
}

impl CatalogItemWriter for DieselRepository {
    fn create_catalog_item(
        &self,
        new_item: &DomainNewCatalogItem,
    ) -> RepositoryResult<DomainCatalogItem> {
        use crate::schema::catalog_items;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(catalog_items::table)
            .values(&DbNewCatalogItem::from(new_item))
            .get_result::<DbCatalogItem>(&mut conn)
            .map_err(|err| match err {
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    RepositoryError::Conflict(format!(
                        "catalog item `{}` already exists",
                        new_item.normalized_name
                    ))
                }
                other => other.into(),
            })?;

        Ok(created.into())
    }

    fn delete_catalog_item(
        &self,
        item_id: i32,
        hub_id: i32,
        cascade: bool,
    ) -> RepositoryResult<()> {
        use crate::schema::{catalog_items, list_entries, purchase_requests};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let item = catalog_items::table
                .filter(catalog_items::id.eq(item_id))
                .filter(catalog_items::hub_id.eq(hub_id))
                .first::<DbCatalogItem>(conn)
                .optional()?;

            if item.is_none() {
                return Err(RepositoryError::NotFound);
            }

            let entry_refs = list_entries::table
                .filter(list_entries::item_id.eq(item_id))
                .count()
                .get_result::<i64>(conn)?;
            let request_refs = purchase_requests::table
                .filter(purchase_requests::item_id.eq(item_id))
                .count()
                .get_result::<i64>(conn)?;

            if (entry_refs > 0 || request_refs > 0) && !cascade {
                return Err(RepositoryError::Conflict(format!(
                    "catalog item {item_id} is referenced by {entry_refs} list entries and {request_refs} purchase requests"
                )));
            }

            // Dependents go first; submissions that lose requests get their
            // materialized status and count refreshed.
            let affected: Vec<Option<i32>> = purchase_requests::table
                .filter(purchase_requests::item_id.eq(item_id))
                .select(purchase_requests::submission_id)
                .load(conn)?;

            diesel::delete(
                purchase_requests::table.filter(purchase_requests::item_id.eq(item_id)),
            )
            .execute(conn)?;
            diesel::delete(list_entries::table.filter(list_entries::item_id.eq(item_id)))
                .execute(conn)?;

            let mut submission_ids: Vec<i32> = affected.into_iter().flatten().collect();
            submission_ids.sort_unstable();
            submission_ids.dedup();
            for submission_id in submission_ids {
                refresh_submission_status(conn, submission_id)?;
                refresh_submission_request_count(conn, submission_id)?;
            }

            diesel::delete(
                catalog_items::table
                    .filter(catalog_items::id.eq(item_id))
                    .filter(catalog_items::hub_id.eq(hub_id)),
            )
            .execute(conn)?;

            Ok(())
        })
    }

    fn merge_catalog_items(
        &self,
        first_id: i32,
        second_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<DomainCatalogItem> {
        use crate::schema::{catalog_items, list_entries, purchase_requests};

        if first_id == second_id {
            return Err(RepositoryError::InvalidArgument(
                "cannot merge a catalog item with itself".to_string(),
            ));
        }

        let mut conn = self.conn()?;

        conn.transaction::<DomainCatalogItem, RepositoryError, _>(|conn| {
            let first = catalog_items::table
                .filter(catalog_items::id.eq(first_id))
                .filter(catalog_items::hub_id.eq(hub_id))
                .first::<DbCatalogItem>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;
            let second = catalog_items::table
                .filter(catalog_items::id.eq(second_id))
                .filter(catalog_items::hub_id.eq(hub_id))
                .first::<DbCatalogItem>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            // Oldest wins; ties fall back to the lower id.
            let (canonical, duplicate) =
                if (first.created_at, first.id) <= (second.created_at, second.id) {
                    (first, second)
                } else {
                    (second, first)
                };

            diesel::update(
                purchase_requests::table.filter(purchase_requests::item_id.eq(duplicate.id)),
            )
            .set(purchase_requests::item_id.eq(canonical.id))
            .execute(conn)?;

            let duplicate_entries = list_entries::table
                .filter(list_entries::item_id.eq(duplicate.id))
                .load::<DbListEntry>(conn)?;

            for entry in duplicate_entries {
                let existing = list_entries::table
                    .filter(list_entries::list_id.eq(entry.list_id))
                    .filter(list_entries::item_id.eq(canonical.id))
                    .first::<DbListEntry>(conn)
                    .optional()?;

                match existing {
                    Some(target) => {
                        // Both items tracked on the same list: sum the
                        // overlapping quantities into the surviving entry.
                        let current = quantity_from_db(&target.current_quantity)?
                            + quantity_from_db(&entry.current_quantity)?;
                        let minimum = quantity_from_db(&target.minimum_quantity)?
                            + quantity_from_db(&entry.minimum_quantity)?;

                        diesel::update(list_entries::table.filter(list_entries::id.eq(target.id)))
                            .set((
                                list_entries::current_quantity.eq(quantity_to_db(current)),
                                list_entries::minimum_quantity.eq(quantity_to_db(minimum)),
                                list_entries::updated_at.eq(chrono::Local::now().naive_utc()),
                            ))
                            .execute(conn)?;

                        diesel::delete(list_entries::table.filter(list_entries::id.eq(entry.id)))
                            .execute(conn)?;
                    }
                    None => {
                        diesel::update(list_entries::table.filter(list_entries::id.eq(entry.id)))
                            .set(list_entries::item_id.eq(canonical.id))
                            .execute(conn)?;
                    }
                }
            }

            diesel::delete(catalog_items::table.filter(catalog_items::id.eq(duplicate.id)))
                .execute(conn)?;

            Ok(canonical.into())
        })
    }
}
