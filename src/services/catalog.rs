use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::{AuthenticatedUser, check_role};
use crate::domain::catalog_item::{CatalogItem, CatalogItemListQuery};
use crate::domain::list_entry::ListEntry;
use crate::forms::catalog::{AddCatalogItemForm, UpsertEntryForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{CatalogItemReader, CatalogItemWriter, ListEntryWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the catalog index.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Optional search string entered by the user.
    pub search: Option<String>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Data required to render the catalog overview.
pub struct CatalogPageData {
    /// Paginated list of catalog items.
    pub items: Paginated<CatalogItem>,
    /// Search query echoed back when present.
    pub search: Option<String>,
}

/// Loads the catalog overview for the caller's hub.
pub fn load_catalog_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: CatalogQuery,
) -> ServiceResult<CatalogPageData>
where
    R: CatalogItemReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let CatalogQuery { search, page } = query;

    let page = page.unwrap_or(1);
    let mut list_query =
        CatalogItemListQuery::new(user.hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(term) = search.as_ref() {
        list_query = list_query.search(term);
    }

    let (total, items) = repo
        .list_catalog_items(list_query)
        .map_err(ServiceError::from)?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(CatalogPageData {
        items: Paginated::new(items, page, total_pages),
        search,
    })
}

/// Creates a new catalog item for the caller's hub.
pub fn create_catalog_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCatalogItemForm,
) -> ServiceResult<CatalogItem>
where
    R: CatalogItemWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_item = form
        .into_new_catalog_item(user.hub_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.create_catalog_item(&new_item)
        .map_err(ServiceError::from)
}

/// Deletes a catalog item; with `cascade` set, its list entries and purchase
/// requests go with it, otherwise deletion is blocked while references exist.
pub fn delete_catalog_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    item_id: i32,
    cascade: bool,
) -> ServiceResult<()>
where
    R: CatalogItemWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_catalog_item(item_id, user.hub_id, cascade)
        .map_err(ServiceError::from)
}

/// Merges two duplicate catalog items; the older row survives.
pub fn merge_catalog_items<R>(
    repo: &R,
    user: &AuthenticatedUser,
    first_id: i32,
    second_id: i32,
) -> ServiceResult<CatalogItem>
where
    R: CatalogItemWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let merged = repo
        .merge_catalog_items(first_id, second_id, user.hub_id)
        .map_err(ServiceError::from)?;

    log::info!(
        "catalog items {first_id} and {second_id} merged into {} by {}",
        merged.id,
        user.email
    );

    Ok(merged)
}

/// Creates or reconfigures the threshold of an item on a list. Never touches
/// the entry's current quantity.
pub fn upsert_list_entry<R>(
    repo: &R,
    user: &AuthenticatedUser,
    list_id: i32,
    item_id: i32,
    form: UpsertEntryForm,
) -> ServiceResult<ListEntry>
where
    R: ListEntryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let config = form
        .into_config()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.upsert_list_entry(list_id, item_id, user.hub_id, &config)
        .map_err(ServiceError::from)
}

/// Removes an item's entry from a list; the catalog item itself stays.
pub fn remove_list_entry<R>(
    repo: &R,
    user: &AuthenticatedUser,
    list_id: i32,
    item_id: i32,
) -> ServiceResult<()>
where
    R: ListEntryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.remove_list_entry(list_id, item_id, user.hub_id)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::{MockCatalogItemWriter, MockListEntryWriter};

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn user_with_role(role: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user".to_string(),
            email: "user@example.com".to_string(),
            hub_id: 11,
            name: "User".to_string(),
            roles: vec![role.to_string()],
            exp: 0,
        }
    }

    fn sample_item(id: i32, hub_id: i32, name: &str) -> CatalogItem {
        CatalogItem {
            id,
            hub_id,
            name: name.to_string(),
            normalized_name: name.to_lowercase(),
            unit: None,
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    #[test]
    fn create_catalog_item_requires_role() {
        let repo = MockCatalogItemWriter::new();
        let mut user = user_with_role(SERVICE_ACCESS_ROLE);
        user.roles.clear();

        let form = AddCatalogItemForm {
            name: "Flour".to_string(),
            unit: None,
        };

        let result = create_catalog_item(&repo, &user, form);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn create_catalog_item_normalizes_name() {
        let mut repo = MockCatalogItemWriter::new();
        let user = user_with_role(SERVICE_ACCESS_ROLE);
        let hub_id = user.hub_id;

        repo.expect_create_catalog_item()
            .times(1)
            .withf(move |new_item| {
                assert_eq!(new_item.hub_id, hub_id);
                assert_eq!(new_item.normalized_name, "olive oil");
                true
            })
            .returning(move |_| Ok(sample_item(1, hub_id, "Olive Oil")));

        let form = AddCatalogItemForm {
            name: " Olive  Oil ".to_string(),
            unit: None,
        };

        let created = create_catalog_item(&repo, &user, form).expect("expected success");
        assert_eq!(created.id, 1);
    }

    #[test]
    fn create_catalog_item_surfaces_conflict() {
        let mut repo = MockCatalogItemWriter::new();
        let user = user_with_role(SERVICE_ACCESS_ROLE);

        repo.expect_create_catalog_item().returning(|_| {
            Err(RepositoryError::Conflict(
                "catalog item `flour` already exists".to_string(),
            ))
        });

        let form = AddCatalogItemForm {
            name: "Flour".to_string(),
            unit: None,
        };

        let result = create_catalog_item(&repo, &user, form);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn upsert_list_entry_rejects_bad_batch_config() {
        let repo = MockListEntryWriter::new();
        let user = user_with_role(SERVICE_ACCESS_ROLE);

        let form = UpsertEntryForm {
            minimum_quantity: "6".to_string(),
            uses_batch_threshold: true,
            batch_size: None,
        };

        let result = upsert_list_entry(&repo, &user, 1, 2, form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn upsert_list_entry_passes_config_through() {
        let mut repo = MockListEntryWriter::new();
        let user = user_with_role(SERVICE_ACCESS_ROLE);
        let hub_id = user.hub_id;

        repo.expect_upsert_list_entry()
            .times(1)
            .withf(move |list_id, item_id, scope_hub, config| {
                assert_eq!(*list_id, 4);
                assert_eq!(*item_id, 9);
                assert_eq!(*scope_hub, hub_id);
                assert_eq!(config.minimum_quantity, Decimal::from(6));
                assert!(config.uses_batch_threshold);
                assert_eq!(config.batch_size, Some(Decimal::from(12)));
                true
            })
            .returning(|list_id, item_id, _, config| {
                Ok(ListEntry {
                    id: 1,
                    list_id,
                    item_id,
                    current_quantity: Decimal::ZERO,
                    minimum_quantity: config.minimum_quantity,
                    uses_batch_threshold: config.uses_batch_threshold,
                    batch_size: config.batch_size,
                    last_submitted_at: None,
                    last_submitted_by: None,
                    created_at: datetime(),
                    updated_at: datetime(),
                })
            });

        let form = UpsertEntryForm {
            minimum_quantity: "6".to_string(),
            uses_batch_threshold: true,
            batch_size: Some("12".to_string()),
        };

        let entry = upsert_list_entry(&repo, &user, 4, 9, form).expect("expected success");
        assert_eq!(entry.batch_size, Some(Decimal::from(12)));
    }
}
