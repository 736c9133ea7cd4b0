use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// A named, unit-of-measure-tagged product, unique within a hub.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogItem {
    /// Unique identifier of the catalog item.
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Display name as entered (casing preserved).
    pub name: String,
    /// Normalized form of the name that uniqueness is enforced on.
    pub normalized_name: String,
    /// Optional unit of measure (e.g. `kg`, `case`).
    pub unit: Option<String>,
    /// Timestamp for when the record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new catalog item.
#[derive(Debug, Clone)]
pub struct NewCatalogItem {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Display name.
    pub name: String,
    /// Normalized name used for the per-hub uniqueness constraint.
    pub normalized_name: String,
    /// Optional unit of measure.
    pub unit: Option<String>,
    /// Timestamp captured when the payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewCatalogItem {
    /// Build a new catalog item payload, normalizing the name on the way in.
    pub fn new(hub_id: i32, name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized_name = normalize_name(&name);
        Self {
            hub_id,
            name,
            normalized_name,
            unit: None,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    /// Attach a unit of measure to the payload.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Normalize a catalog name for duplicate detection: trim the ends and
/// collapse internal whitespace runs to a single space, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Query definition used to list catalog items for a hub.
#[derive(Debug, Clone)]
pub struct CatalogItemListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Optional search term matched against the item name.
    pub search: Option<String>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl CatalogItemListQuery {
    /// Construct a query that targets all catalog items belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            search: None,
            pagination: None,
        }
    }

    /// Filter the results by a search term applied to the name.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
