use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// A named, hub-scoped container of list entries with an assigned set of
/// collaborators.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct List {
    /// Unique identifier of the list.
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Display name, unique within the hub.
    pub name: String,
    /// Soft-delete flag; a deleted list sits in the trash until restored or
    /// hard-deleted.
    pub deleted: bool,
    /// Timestamp for when the list was moved to the trash.
    pub deleted_at: Option<NaiveDateTime>,
    /// Emails of users assigned to check in quantities on this list.
    pub collaborators: Vec<String>,
    /// Timestamp for when the record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new list.
#[derive(Debug, Clone)]
pub struct NewList {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Display name.
    pub name: String,
    /// Timestamp captured when the payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewList {
    /// Build a new list payload with the current timestamp.
    pub fn new(hub_id: i32, name: impl Into<String>) -> Self {
        Self {
            hub_id,
            name: name.into(),
            updated_at: chrono::Local::now().naive_utc(),
        }
    }
}

/// Query definition used to list lists for a hub.
#[derive(Debug, Clone)]
pub struct ListListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Whether soft-deleted (trashed) lists are included.
    pub include_deleted: bool,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl ListListQuery {
    /// Construct a query that targets all live lists belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            include_deleted: false,
            pagination: None,
        }
    }

    /// Include lists that have been moved to the trash.
    pub fn include_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
