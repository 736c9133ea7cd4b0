use rust_decimal::Decimal;

use restock::domain::auth::AuthenticatedUser;
use restock::domain::catalog_item::NewCatalogItem;
use restock::domain::list::NewList;
use restock::domain::list_entry::UpsertListEntry;
use restock::forms::submissions::{StockEntryForm, SubmitStockForm};
use restock::repository::{
    CatalogItemWriter, DieselRepository, ListEntryWriter, ListWriter, SubmissionReader,
};
use restock::services::{ServiceError, approvals, submissions};
use restock::{SERVICE_ACCESS_ROLE, domain::submission::SubmissionStatus};

mod common;

fn admin(hub_id: i32) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "admin".into(),
        email: "admin@example.com".into(),
        hub_id,
        name: "Admin".into(),
        roles: vec![SERVICE_ACCESS_ROLE.to_string()],
        exp: 0,
    }
}

fn collaborator(hub_id: i32) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "cook".into(),
        email: "cook@example.com".into(),
        hub_id,
        name: "Cook".into(),
        roles: vec![],
        exp: 0,
    }
}

fn seed_list_with_deficit(repo: &DieselRepository, hub_id: i32) -> (i32, i32) {
    let item = repo
        .create_catalog_item(&NewCatalogItem::new(hub_id, "Flour"))
        .expect("create catalog item");
    let list = repo
        .create_list(&NewList::new(hub_id, "Kitchen"))
        .expect("create list");
    repo.upsert_list_entry(
        list.id,
        item.id,
        hub_id,
        &UpsertListEntry::new(Decimal::from(10)),
    )
    .expect("upsert entry");
    repo.set_list_collaborators(list.id, hub_id, &["cook@example.com".to_string()])
        .expect("set collaborators");
    (list.id, item.id)
}

fn stock_form(item_id: i32, quantity: &str) -> SubmitStockForm {
    SubmitStockForm {
        entries: vec![StockEntryForm {
            item_id,
            quantity: quantity.to_string(),
        }],
    }
}

#[test]
fn collaborator_submits_and_admin_reviews() {
    let test_db = common::TestDb::new("service_collaborator_submits_and_admin_reviews.db");
    let repo = DieselRepository::new(test_db.pool());
    let (list_id, item_id) = seed_list_with_deficit(&repo, 1);

    let cook = collaborator(1);
    let receipt = submissions::submit_stock_batch(&repo, &cook, list_id, stock_form(item_id, "4"))
        .expect("submit stock batch");
    assert_eq!(receipt.requests_created, 1);

    let reviewer = admin(1);
    let submission = submissions::get_submission(&repo, &reviewer, receipt.submission_id)
        .expect("get submission");
    assert_eq!(submission.requests[0].quantity, Decimal::from(6));

    let page = submissions::list_pending_requests(
        &repo,
        &reviewer,
        submissions::PendingRequestsQuery {
            list_id: Some(list_id),
            page: None,
        },
    )
    .expect("list pending requests");
    assert_eq!(page.items.len(), 1);

    // A collaborator without the service role cannot review.
    let result = submissions::get_submission(&repo, &cook, receipt.submission_id);
    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}

#[test]
fn unassigned_user_cannot_submit() {
    let test_db = common::TestDb::new("service_unassigned_user_cannot_submit.db");
    let repo = DieselRepository::new(test_db.pool());
    let (list_id, item_id) = seed_list_with_deficit(&repo, 1);

    let mut outsider = collaborator(1);
    outsider.email = "stranger@example.com".into();

    let result =
        submissions::submit_stock_batch(&repo, &outsider, list_id, stock_form(item_id, "4"));
    assert!(matches!(result, Err(ServiceError::Unauthorized)));

    // Same email, wrong hub: the list simply does not exist for them.
    let mut wrong_hub = collaborator(2);
    wrong_hub.email = "cook@example.com".into();
    let result =
        submissions::submit_stock_batch(&repo, &wrong_hub, list_id, stock_form(item_id, "4"));
    assert!(matches!(result, Err(ServiceError::NotFound)));
}

#[test]
fn bulk_approval_reports_per_item_failures() {
    let test_db = common::TestDb::new("service_bulk_approval_reports_per_item_failures.db");
    let repo = DieselRepository::new(test_db.pool());
    let (list_id, item_id) = seed_list_with_deficit(&repo, 1);

    let oil = repo
        .create_catalog_item(&NewCatalogItem::new(1, "Olive Oil"))
        .expect("create second item");
    repo.upsert_list_entry(list_id, oil.id, 1, &UpsertListEntry::new(Decimal::from(6)))
        .expect("upsert second entry");

    let cook = collaborator(1);
    let form = SubmitStockForm {
        entries: vec![
            StockEntryForm {
                item_id,
                quantity: "4".to_string(),
            },
            StockEntryForm {
                item_id: oil.id,
                quantity: "1".to_string(),
            },
        ],
    };
    let receipt = submissions::submit_stock_batch(&repo, &cook, list_id, form)
        .expect("submit stock batch");

    let reviewer = admin(1);
    let submission = submissions::get_submission(&repo, &reviewer, receipt.submission_id)
        .expect("get submission");
    let first = submission.requests[0].id;
    let second = submission.requests[1].id;

    // Pre-decide one request so the bulk call hits an already-decided row
    // and one missing id.
    approvals::approve_request(&repo, &reviewer, second).expect("approve second request");

    let outcome = approvals::approve_bulk(&repo, &reviewer, &[first, second, 9999])
        .expect("bulk approve");
    assert_eq!(outcome.succeeded, vec![first]);
    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.errors[0].id, second);
    assert!(matches!(
        outcome.errors[0].error,
        ServiceError::InvalidState(_)
    ));
    assert_eq!(outcome.errors[1].id, 9999);
    assert!(matches!(outcome.errors[1].error, ServiceError::NotFound));

    let decided = repo
        .get_submission_by_id(receipt.submission_id, 1)
        .expect("get submission")
        .expect("submission should exist");
    assert_eq!(decided.status, SubmissionStatus::Approved);

    // Revert through the service and confirm it reopens the batch.
    let reverted = approvals::revert_submission(&repo, &reviewer, receipt.submission_id)
        .expect("revert submission");
    assert_eq!(reverted.status, SubmissionStatus::Pending);
}
