use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::catalog_item::{
    CatalogItem as DomainCatalogItem, NewCatalogItem as DomainNewCatalogItem,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::catalog_items)]
pub struct CatalogItem {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub normalized_name: String,
    pub unit: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::catalog_items)]
pub struct NewCatalogItem<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub normalized_name: &'a str,
    pub unit: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl From<CatalogItem> for DomainCatalogItem {
    fn from(value: CatalogItem) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            name: value.name,
            normalized_name: value.normalized_name,
            unit: value.unit,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewCatalogItem> for NewCatalogItem<'a> {
    fn from(value: &'a DomainNewCatalogItem) -> Self {
        Self {
            hub_id: value.hub_id,
            name: value.name.as_str(),
            normalized_name: value.normalized_name.as_str(),
            unit: value.unit.as_deref(),
            updated_at: value.updated_at,
        }
    }
}
