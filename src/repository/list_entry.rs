use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::list_entry::{ListEntry as DomainListEntry, UpsertListEntry};
use crate::models::list_entry::{ListEntry as DbListEntry, NewListEntry as DbNewListEntry};
use crate::models::quantity_to_db;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, ListEntryReader, ListEntryWriter};

/// Invariants on the threshold configuration: non-negative minimum and a
/// positive batch size whenever the batch policy is enabled.
fn validate_config(config: &UpsertListEntry) -> RepositoryResult<()> {
    if config.minimum_quantity < Decimal::ZERO {
        return Err(RepositoryError::InvalidArgument(
            "minimum quantity cannot be negative".to_string(),
        ));
    }

    if config.uses_batch_threshold {
        match config.batch_size {
            Some(batch_size) if batch_size > Decimal::ZERO => {}
            _ => {
                return Err(RepositoryError::InvalidArgument(
                    "batch size must be positive when the batch threshold is enabled".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Confirms the list and the item both exist in the caller's hub.
fn check_scope(
    conn: &mut SqliteConnection,
    list_id: i32,
    item_id: i32,
    hub_id: i32,
) -> RepositoryResult<()> {
    use crate::schema::{catalog_items, lists};

    let list_exists = lists::table
        .filter(lists::id.eq(list_id))
        .filter(lists::hub_id.eq(hub_id))
        .count()
        .get_result::<i64>(conn)?;
    let item_exists = catalog_items::table
        .filter(catalog_items::id.eq(item_id))
        .filter(catalog_items::hub_id.eq(hub_id))
        .count()
        .get_result::<i64>(conn)?;

    if list_exists == 0 || item_exists == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

impl ListEntryReader for DieselRepository {
    fn get_list_entry(
        &self,
        list_id: i32,
        item_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainListEntry>> {
        use crate::schema::{list_entries, lists};

        let mut conn = self.conn()?;

        let hub_lists = lists::table
            .filter(lists::hub_id.eq(hub_id))
            .select(lists::id);

        let entry = list_entries::table
            .filter(list_entries::list_id.eq(list_id))
            .filter(list_entries::item_id.eq(item_id))
            .filter(list_entries::list_id.eq_any(hub_lists))
            .first::<DbListEntry>(&mut conn)
            .optional()?;

        entry.map(DbListEntry::into_domain).transpose()
    }

    fn list_list_entries(
        &self,
        list_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Vec<DomainListEntry>> {
        use crate::schema::{list_entries, lists};

        let mut conn = self.conn()?;

        let hub_lists = lists::table
            .filter(lists::hub_id.eq(hub_id))
            .select(lists::id);

        let rows = list_entries::table
            .filter(list_entries::list_id.eq(list_id))
            .filter(list_entries::list_id.eq_any(hub_lists))
            .order(list_entries::id.asc())
            .load::<DbListEntry>(&mut conn)?;

        rows.into_iter().map(DbListEntry::into_domain).collect()
    }
}

impl ListEntryWriter for DieselRepository {
    fn upsert_list_entry(
        &self,
        list_id: i32,
        item_id: i32,
        hub_id: i32,
        config: &UpsertListEntry,
    ) -> RepositoryResult<DomainListEntry> {
        use crate::schema::list_entries;

        validate_config(config)?;

        let mut conn = self.conn()?;

        conn.transaction::<DomainListEntry, RepositoryError, _>(|conn| {
            check_scope(conn, list_id, item_id, hub_id)?;

            let existing = list_entries::table
                .filter(list_entries::list_id.eq(list_id))
                .filter(list_entries::item_id.eq(item_id))
                .first::<DbListEntry>(conn)
                .optional()?;

            let row = match existing {
                Some(entry) => diesel::update(
                    list_entries::table.filter(list_entries::id.eq(entry.id)),
                )
                .set((
                    list_entries::minimum_quantity.eq(quantity_to_db(config.minimum_quantity)),
                    list_entries::uses_batch_threshold.eq(config.uses_batch_threshold),
                    list_entries::batch_size.eq(config.batch_size.map(quantity_to_db)),
                    list_entries::updated_at.eq(config.updated_at),
                ))
                .get_result::<DbListEntry>(conn)?,
                None => diesel::insert_into(list_entries::table)
                    .values(&DbNewListEntry::from_config(list_id, item_id, config))
                    .get_result::<DbListEntry>(conn)?,
            };

            row.into_domain()
        })
    }

    fn remove_list_entry(&self, list_id: i32, item_id: i32, hub_id: i32) -> RepositoryResult<()> {
        use crate::schema::{list_entries, lists};

        let mut conn = self.conn()?;

        let hub_lists = lists::table
            .filter(lists::hub_id.eq(hub_id))
            .select(lists::id);

        let deleted = diesel::delete(
            list_entries::table
                .filter(list_entries::list_id.eq(list_id))
                .filter(list_entries::item_id.eq(item_id))
                .filter(list_entries::list_id.eq_any(hub_lists)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
