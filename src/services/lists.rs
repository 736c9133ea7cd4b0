use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::{AuthenticatedUser, check_role};
use crate::domain::list::{List, ListListQuery};
use crate::forms::lists::{AddListForm, SetCollaboratorsForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ListReader, ListWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the lists index.
#[derive(Debug, Default, Deserialize)]
pub struct ListsQuery {
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
    /// Whether trashed lists should be included.
    #[serde(default)]
    pub show_deleted: bool,
}

/// Data required to render the lists overview.
pub struct ListsPageData {
    /// Paginated lists of the hub.
    pub lists: Paginated<List>,
    /// Whether trashed lists were requested.
    pub show_deleted: bool,
}

/// Loads the lists overview for the caller's hub.
pub fn load_lists_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ListsQuery,
) -> ServiceResult<ListsPageData>
where
    R: ListReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = query.page.unwrap_or(1);
    let mut list_query = ListListQuery::new(user.hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if query.show_deleted {
        list_query = list_query.include_deleted();
    }

    let (total, lists) = repo.list_lists(list_query).map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(ListsPageData {
        lists: Paginated::new(lists, page, total_pages),
        show_deleted: query.show_deleted,
    })
}

/// Creates a new list for the caller's hub.
pub fn create_list<R>(repo: &R, user: &AuthenticatedUser, form: AddListForm) -> ServiceResult<List>
where
    R: ListWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_list = form
        .into_new_list(user.hub_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.create_list(&new_list).map_err(ServiceError::from)
}

/// Moves a list to the trash.
pub fn soft_delete_list<R>(repo: &R, user: &AuthenticatedUser, list_id: i32) -> ServiceResult<List>
where
    R: ListWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.soft_delete_list(list_id, user.hub_id)
        .map_err(ServiceError::from)
}

/// Restores a list from the trash.
pub fn restore_list<R>(repo: &R, user: &AuthenticatedUser, list_id: i32) -> ServiceResult<List>
where
    R: ListWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.restore_list(list_id, user.hub_id)
        .map_err(ServiceError::from)
}

/// Permanently deletes a trashed list together with its entries,
/// submissions and requests.
pub fn delete_list<R>(repo: &R, user: &AuthenticatedUser, list_id: i32) -> ServiceResult<()>
where
    R: ListWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_list(list_id, user.hub_id)
        .map_err(ServiceError::from)
}

/// Replaces the set of collaborators assigned to a list.
pub fn set_list_collaborators<R>(
    repo: &R,
    user: &AuthenticatedUser,
    list_id: i32,
    form: SetCollaboratorsForm,
) -> ServiceResult<List>
where
    R: ListWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let emails = form
        .into_emails()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.set_list_collaborators(list_id, user.hub_id, &emails)
        .map_err(ServiceError::from)
}
