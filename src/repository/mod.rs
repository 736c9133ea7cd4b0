use rust_decimal::Decimal;

use crate::db::{DbConnection, DbPool};
use crate::domain::catalog_item::{CatalogItem, CatalogItemListQuery, NewCatalogItem};
use crate::domain::list::{List, ListListQuery, NewList};
use crate::domain::list_entry::{EntryEdit, ListEntry, UpsertListEntry};
use crate::domain::purchase_request::{PurchaseRequest, PurchaseRequestListQuery, RequestStatus};
use crate::domain::submission::{NewSubmission, Submission, SubmissionListQuery};
use crate::repository::errors::RepositoryResult;

pub mod catalog_item;
pub mod errors;
pub mod list;
pub mod list_entry;
pub mod purchase_request;
pub mod submission;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over catalog items.
pub trait CatalogItemReader {
    fn get_catalog_item_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<CatalogItem>>;
    /// Lookup by name; the argument is normalized before matching so
    /// near-identical spellings resolve to the same row.
    fn get_catalog_item_by_name(
        &self,
        name: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<CatalogItem>>;
    fn list_catalog_items(
        &self,
        query: CatalogItemListQuery,
    ) -> RepositoryResult<(usize, Vec<CatalogItem>)>;
}

/// Write operations over catalog items.
pub trait CatalogItemWriter {
    fn create_catalog_item(&self, new_item: &NewCatalogItem) -> RepositoryResult<CatalogItem>;
    /// Delete an item. Blocked with `Conflict` while list entries or
    /// purchase requests still reference it, unless `cascade` is set, in
    /// which case dependents are removed first in the same transaction.
    fn delete_catalog_item(&self, item_id: i32, hub_id: i32, cascade: bool)
    -> RepositoryResult<()>;
    /// Merge two duplicate items; the older row survives and absorbs the
    /// other's list entries and purchase requests.
    fn merge_catalog_items(
        &self,
        first_id: i32,
        second_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<CatalogItem>;
}

/// Read-only operations over lists.
pub trait ListReader {
    fn get_list_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<List>>;
    fn list_lists(&self, query: ListListQuery) -> RepositoryResult<(usize, Vec<List>)>;
}

/// Write operations over lists.
pub trait ListWriter {
    fn create_list(&self, new_list: &NewList) -> RepositoryResult<List>;
    fn soft_delete_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<List>;
    fn restore_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<List>;
    /// Hard delete; only legal once the list is in the trash.
    fn delete_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<()>;
    fn set_list_collaborators(
        &self,
        list_id: i32,
        hub_id: i32,
        emails: &[String],
    ) -> RepositoryResult<List>;
}

/// Read-only operations over list entries.
pub trait ListEntryReader {
    fn get_list_entry(
        &self,
        list_id: i32,
        item_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<ListEntry>>;
    fn list_list_entries(&self, list_id: i32, hub_id: i32) -> RepositoryResult<Vec<ListEntry>>;
}

/// Write operations over list entries.
pub trait ListEntryWriter {
    /// Create the entry if absent, otherwise update its minimum/batch
    /// configuration. Never touches the current quantity.
    fn upsert_list_entry(
        &self,
        list_id: i32,
        item_id: i32,
        hub_id: i32,
        config: &UpsertListEntry,
    ) -> RepositoryResult<ListEntry>;
    fn remove_list_entry(&self, list_id: i32, item_id: i32, hub_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over submissions.
pub trait SubmissionReader {
    fn get_submission_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Submission>>;
    fn list_submissions(
        &self,
        query: SubmissionListQuery,
    ) -> RepositoryResult<(usize, Vec<Submission>)>;
}

/// Write operations over submissions.
pub trait SubmissionWriter {
    /// The submission aggregator: atomically applies the batch of quantity
    /// edits, generates purchase requests for the entries left in deficit
    /// and records exactly one submission.
    fn create_submission(&self, new_submission: &NewSubmission) -> RepositoryResult<Submission>;
    /// Reset a decided submission and all its requests back to pending.
    fn revert_submission(&self, submission_id: i32, hub_id: i32) -> RepositoryResult<Submission>;
    /// Re-apply quantity edits to a still-pending submission, replacing its
    /// open request quantities in place instead of creating a new submission.
    fn edit_submission_quantities(
        &self,
        submission_id: i32,
        hub_id: i32,
        edits: &[EntryEdit],
        editor_email: &str,
    ) -> RepositoryResult<Submission>;
}

/// Read-only operations over purchase requests.
pub trait PurchaseRequestReader {
    fn get_request_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<PurchaseRequest>>;
    fn list_requests(
        &self,
        query: PurchaseRequestListQuery,
    ) -> RepositoryResult<(usize, Vec<PurchaseRequest>)>;
}

/// Write operations over purchase requests.
pub trait PurchaseRequestWriter {
    /// Guarded transition from pending; the parent submission's derived
    /// status is refreshed in the same transaction. Fails with
    /// `InvalidState` when the request is already decided.
    fn set_request_status(
        &self,
        request_id: i32,
        hub_id: i32,
        status: RequestStatus,
    ) -> RepositoryResult<PurchaseRequest>;
    /// Change the quantity of a still-pending request.
    fn update_request_quantity(
        &self,
        request_id: i32,
        hub_id: i32,
        quantity: Decimal,
    ) -> RepositoryResult<PurchaseRequest>;
    /// Approve every pending request whose item has an entry on the given
    /// list, across submissions. Returns the number approved.
    fn approve_all_for_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<usize>;
}
