use rust_decimal::Decimal;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::{AuthenticatedUser, check_role};
use crate::domain::purchase_request::{PurchaseRequest, RequestStatus};
use crate::domain::submission::Submission;
use crate::forms::submissions::SubmitStockForm;
use crate::repository::{PurchaseRequestWriter, SubmissionWriter};
use crate::services::{ServiceError, ServiceResult};

/// Per-id failure inside a bulk operation.
#[derive(Debug)]
pub struct BulkItemError {
    /// The request id that could not be transitioned.
    pub id: i32,
    /// Why it was skipped.
    pub error: ServiceError,
}

/// Result of a best-effort bulk operation. Bulk transitions never roll back
/// successful ids; failures are reported per item so the caller can retry
/// only those.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    /// Ids that were transitioned.
    pub succeeded: Vec<i32>,
    /// Ids that were skipped, with the reason.
    pub errors: Vec<BulkItemError>,
}

/// Counts returned to the UI after a bulk operation.
#[derive(Debug, Serialize)]
pub struct BulkSummary {
    pub succeeded_count: usize,
    pub error_count: usize,
}

impl BulkOutcome {
    pub fn summary(&self) -> BulkSummary {
        BulkSummary {
            succeeded_count: self.succeeded.len(),
            error_count: self.errors.len(),
        }
    }
}

/// Approves a single pending request.
pub fn approve_request<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_id: i32,
) -> ServiceResult<PurchaseRequest>
where
    R: PurchaseRequestWriter + ?Sized,
{
    decide_request(repo, user, request_id, RequestStatus::Approved)
}

/// Rejects a single pending request.
pub fn reject_request<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_id: i32,
) -> ServiceResult<PurchaseRequest>
where
    R: PurchaseRequestWriter + ?Sized,
{
    decide_request(repo, user, request_id, RequestStatus::Rejected)
}

fn decide_request<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_id: i32,
    status: RequestStatus,
) -> ServiceResult<PurchaseRequest>
where
    R: PurchaseRequestWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.set_request_status(request_id, user.hub_id, status)
        .map_err(ServiceError::from)
}

/// Approves each id independently, reporting per-id failures.
pub fn approve_bulk<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_ids: &[i32],
) -> ServiceResult<BulkOutcome>
where
    R: PurchaseRequestWriter + ?Sized,
{
    decide_bulk(repo, user, request_ids, RequestStatus::Approved)
}

/// Rejects each id independently, reporting per-id failures.
pub fn reject_bulk<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_ids: &[i32],
) -> ServiceResult<BulkOutcome>
where
    R: PurchaseRequestWriter + ?Sized,
{
    decide_bulk(repo, user, request_ids, RequestStatus::Rejected)
}

fn decide_bulk<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_ids: &[i32],
    status: RequestStatus,
) -> ServiceResult<BulkOutcome>
where
    R: PurchaseRequestWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let mut outcome = BulkOutcome::default();

    for &request_id in request_ids {
        match repo.set_request_status(request_id, user.hub_id, status) {
            Ok(_) => outcome.succeeded.push(request_id),
            Err(err) => outcome.errors.push(BulkItemError {
                id: request_id,
                error: err.into(),
            }),
        }
    }

    Ok(outcome)
}

/// Changes the quantity of a still-pending request.
pub fn edit_request<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request_id: i32,
    quantity: Decimal,
) -> ServiceResult<PurchaseRequest>
where
    R: PurchaseRequestWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    if quantity <= Decimal::ZERO {
        return Err(ServiceError::InvalidArgument(
            "requested quantity must be positive".to_string(),
        ));
    }

    repo.update_request_quantity(request_id, user.hub_id, quantity)
        .map_err(ServiceError::from)
}

/// Approves every pending request whose item is tracked on the given list,
/// across submissions. Returns the number approved.
pub fn approve_all_for_list<R>(
    repo: &R,
    user: &AuthenticatedUser,
    list_id: i32,
) -> ServiceResult<usize>
where
    R: PurchaseRequestWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let approved = repo
        .approve_all_for_list(list_id, user.hub_id)
        .map_err(ServiceError::from)?;

    log::info!(
        "{approved} pending requests for list {list_id} approved by {}",
        user.email
    );

    Ok(approved)
}

/// Resets a decided submission and all its requests back to pending.
///
/// Logged as a distinct audit event because it reopens decisions that may
/// already have been communicated.
pub fn revert_submission<R>(
    repo: &R,
    user: &AuthenticatedUser,
    submission_id: i32,
) -> ServiceResult<Submission>
where
    R: SubmissionWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let submission = repo
        .revert_submission(submission_id, user.hub_id)
        .map_err(ServiceError::from)?;

    log::warn!(
        "audit: submission {submission_id} reverted to pending by {}",
        user.email
    );

    Ok(submission)
}

/// Re-applies quantity edits to a still-pending submission, replacing its
/// open request quantities in place.
pub fn edit_submission_quantities<R>(
    repo: &R,
    user: &AuthenticatedUser,
    submission_id: i32,
    form: SubmitStockForm,
) -> ServiceResult<Submission>
where
    R: SubmissionWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let edits = form
        .into_edits()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.edit_submission_quantities(submission_id, user.hub_id, &edits, &user.email)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::{MockPurchaseRequestWriter, MockSubmissionWriter};

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn admin(hub_id: i32) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "admin".to_string(),
            email: "admin@example.com".to_string(),
            hub_id,
            name: "Admin".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    fn sample_request(id: i32, status: RequestStatus) -> PurchaseRequest {
        PurchaseRequest {
            id,
            submission_id: Some(1),
            item_id: 1,
            supplier_id: None,
            user_email: "cook@example.com".to_string(),
            quantity: Decimal::from(5),
            status,
            requested_at: datetime(),
            updated_at: datetime(),
        }
    }

    #[test]
    fn approve_request_requires_role() {
        let repo = MockPurchaseRequestWriter::new();
        let mut user = admin(11);
        user.roles.clear();

        assert!(matches!(
            approve_request(&repo, &user, 1),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn approve_bulk_reports_per_item_outcomes() {
        let mut repo = MockPurchaseRequestWriter::new();
        let user = admin(11);

        repo.expect_set_request_status()
            .times(3)
            .returning(|request_id, _, status| match request_id {
                1 => Ok(sample_request(1, status)),
                2 => Err(RepositoryError::InvalidState(
                    "purchase request 2 is already approved".to_string(),
                )),
                _ => Err(RepositoryError::NotFound),
            });

        let outcome = approve_bulk(&repo, &user, &[1, 2, 3]).expect("expected success");

        assert_eq!(outcome.succeeded, vec![1]);
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.errors[0].id, 2);
        assert!(matches!(outcome.errors[0].error, ServiceError::InvalidState(_)));
        assert_eq!(outcome.errors[1].id, 3);
        assert!(matches!(outcome.errors[1].error, ServiceError::NotFound));

        let summary = outcome.summary();
        assert_eq!(summary.succeeded_count, 1);
        assert_eq!(summary.error_count, 2);
    }

    #[test]
    fn edit_request_rejects_non_positive_quantity() {
        let repo = MockPurchaseRequestWriter::new();
        let user = admin(11);

        assert!(matches!(
            edit_request(&repo, &user, 1, Decimal::ZERO),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            edit_request(&repo, &user, 1, Decimal::from(-2)),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn revert_surfaces_invalid_state() {
        let mut repo = MockSubmissionWriter::new();
        let user = admin(11);

        repo.expect_revert_submission().returning(|submission_id, _| {
            Err(RepositoryError::InvalidState(format!(
                "submission {submission_id} is still pending and cannot be reverted"
            )))
        });

        assert!(matches!(
            revert_submission(&repo, &user, 9),
            Err(ServiceError::InvalidState(_))
        ));
    }
}
