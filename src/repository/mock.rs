use mockall::mock;
use rust_decimal::Decimal;

use super::{
    CatalogItemReader, CatalogItemWriter, ListEntryReader, ListEntryWriter, ListReader,
    ListWriter, PurchaseRequestReader, PurchaseRequestWriter, SubmissionReader, SubmissionWriter,
};
use crate::domain::{
    catalog_item::{CatalogItem, CatalogItemListQuery, NewCatalogItem},
    list::{List, ListListQuery, NewList},
    list_entry::{EntryEdit, ListEntry, UpsertListEntry},
    purchase_request::{PurchaseRequest, PurchaseRequestListQuery, RequestStatus},
    submission::{NewSubmission, Submission, SubmissionListQuery},
};
use crate::repository::errors::RepositoryResult;

mock! {
    pub CatalogItemReader {}

    impl CatalogItemReader for CatalogItemReader {
        fn get_catalog_item_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<CatalogItem>>;
        fn get_catalog_item_by_name(&self, name: &str, hub_id: i32) -> RepositoryResult<Option<CatalogItem>>;
        fn list_catalog_items(&self, query: CatalogItemListQuery) -> RepositoryResult<(usize, Vec<CatalogItem>)>;
    }
}

mock! {
    pub CatalogItemWriter {}

    impl CatalogItemWriter for CatalogItemWriter {
        fn create_catalog_item(&self, new_item: &NewCatalogItem) -> RepositoryResult<CatalogItem>;
        fn delete_catalog_item(&self, item_id: i32, hub_id: i32, cascade: bool) -> RepositoryResult<()>;
        fn merge_catalog_items(&self, first_id: i32, second_id: i32, hub_id: i32) -> RepositoryResult<CatalogItem>;
    }
}

mock! {
    pub ListReader {}

    impl ListReader for ListReader {
        fn get_list_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<List>>;
        fn list_lists(&self, query: ListListQuery) -> RepositoryResult<(usize, Vec<List>)>;
    }
}

mock! {
    pub ListWriter {}

    impl ListWriter for ListWriter {
        fn create_list(&self, new_list: &NewList) -> RepositoryResult<List>;
        fn soft_delete_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<List>;
        fn restore_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<List>;
        fn delete_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<()>;
        fn set_list_collaborators(&self, list_id: i32, hub_id: i32, emails: &[String]) -> RepositoryResult<List>;
    }
}

mock! {
    pub ListEntryReader {}

    impl ListEntryReader for ListEntryReader {
        fn get_list_entry(&self, list_id: i32, item_id: i32, hub_id: i32) -> RepositoryResult<Option<ListEntry>>;
        fn list_list_entries(&self, list_id: i32, hub_id: i32) -> RepositoryResult<Vec<ListEntry>>;
    }
}

mock! {
    pub ListEntryWriter {}

    impl ListEntryWriter for ListEntryWriter {
        fn upsert_list_entry(&self, list_id: i32, item_id: i32, hub_id: i32, config: &UpsertListEntry) -> RepositoryResult<ListEntry>;
        fn remove_list_entry(&self, list_id: i32, item_id: i32, hub_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub SubmissionReader {}

    impl SubmissionReader for SubmissionReader {
        fn get_submission_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Submission>>;
        fn list_submissions(&self, query: SubmissionListQuery) -> RepositoryResult<(usize, Vec<Submission>)>;
    }
}

mock! {
    pub SubmissionWriter {}

    impl SubmissionWriter for SubmissionWriter {
        fn create_submission(&self, new_submission: &NewSubmission) -> RepositoryResult<Submission>;
        fn revert_submission(&self, submission_id: i32, hub_id: i32) -> RepositoryResult<Submission>;
        fn edit_submission_quantities(&self, submission_id: i32, hub_id: i32, edits: &[EntryEdit], editor_email: &str) -> RepositoryResult<Submission>;
    }
}

mock! {
    pub PurchaseRequestReader {}

    impl PurchaseRequestReader for PurchaseRequestReader {
        fn get_request_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<PurchaseRequest>>;
        fn list_requests(&self, query: PurchaseRequestListQuery) -> RepositoryResult<(usize, Vec<PurchaseRequest>)>;
    }
}

mock! {
    pub PurchaseRequestWriter {}

    impl PurchaseRequestWriter for PurchaseRequestWriter {
        fn set_request_status(&self, request_id: i32, hub_id: i32, status: RequestStatus) -> RepositoryResult<PurchaseRequest>;
        fn update_request_quantity(&self, request_id: i32, hub_id: i32, quantity: Decimal) -> RepositoryResult<PurchaseRequest>;
        fn approve_all_for_list(&self, list_id: i32, hub_id: i32) -> RepositoryResult<usize>;
    }
}
