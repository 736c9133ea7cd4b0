use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::list_entry::{ListEntry as DomainListEntry, UpsertListEntry};
use crate::models::{quantity_from_db, quantity_to_db};
use crate::repository::errors::RepositoryResult;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::list_entries)]
pub struct ListEntry {
    pub id: i32,
    pub list_id: i32,
    pub item_id: i32,
    pub current_quantity: String,
    pub minimum_quantity: String,
    pub uses_batch_threshold: bool,
    pub batch_size: Option<String>,
    pub last_submitted_at: Option<NaiveDateTime>,
    pub last_submitted_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::list_entries)]
pub struct NewListEntry {
    pub list_id: i32,
    pub item_id: i32,
    pub current_quantity: String,
    pub minimum_quantity: String,
    pub uses_batch_threshold: bool,
    pub batch_size: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl ListEntry {
    /// Convert the stored row into the domain type. Fails when a quantity
    /// column does not hold a valid decimal.
    pub fn into_domain(self) -> RepositoryResult<DomainListEntry> {
        Ok(DomainListEntry {
            id: self.id,
            list_id: self.list_id,
            item_id: self.item_id,
            current_quantity: quantity_from_db(&self.current_quantity)?,
            minimum_quantity: quantity_from_db(&self.minimum_quantity)?,
            uses_batch_threshold: self.uses_batch_threshold,
            batch_size: self
                .batch_size
                .as_deref()
                .map(quantity_from_db)
                .transpose()?,
            last_submitted_at: self.last_submitted_at,
            last_submitted_by: self.last_submitted_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl NewListEntry {
    /// Build an insert payload for a fresh entry; the current quantity
    /// starts at zero and is only ever changed by submissions.
    pub fn from_config(list_id: i32, item_id: i32, config: &UpsertListEntry) -> Self {
        Self {
            list_id,
            item_id,
            current_quantity: "0".to_string(),
            minimum_quantity: quantity_to_db(config.minimum_quantity),
            uses_batch_threshold: config.uses_batch_threshold,
            batch_size: config.batch_size.map(quantity_to_db),
            updated_at: config.updated_at,
        }
    }
}
