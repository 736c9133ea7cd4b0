use serde::{Deserialize, Serialize};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::{AuthenticatedUser, check_role, has_list_access};
use crate::domain::purchase_request::{PurchaseRequest, PurchaseRequestListQuery, RequestStatus};
use crate::domain::submission::{NewSubmission, Submission, SubmissionListQuery};
use crate::forms::submissions::SubmitStockForm;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ListReader, PurchaseRequestReader, SubmissionReader, SubmissionWriter};
use crate::services::{ServiceError, ServiceResult};

/// Outcome of a stock check-in returned to the submitting collaborator.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    /// Identifier of the created submission.
    pub submission_id: i32,
    /// Number of purchase requests the check-in generated.
    pub requests_created: usize,
}

/// Applies a collaborator's batch of counted quantities to a list and
/// materializes the reviewable submission.
///
/// The caller must have access to the list: same hub and either the admin
/// role or a collaborator assignment. Trashed lists are treated as absent.
pub fn submit_stock_batch<R>(
    repo: &R,
    user: &AuthenticatedUser,
    list_id: i32,
    form: SubmitStockForm,
) -> ServiceResult<SubmissionReceipt>
where
    R: ListReader + SubmissionWriter + ?Sized,
{
    let list = repo
        .get_list_by_id(list_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if list.deleted {
        return Err(ServiceError::NotFound);
    }

    if !has_list_access(user, &list) {
        return Err(ServiceError::Unauthorized);
    }

    let edits = form
        .into_edits()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut new_submission = NewSubmission::new(list_id, user.hub_id, &user.email);
    new_submission.edits = edits;

    let submission = repo
        .create_submission(&new_submission)
        .map_err(ServiceError::from)?;

    log::info!(
        "stock batch for list {list_id} submitted by {}: submission {} with {} requests",
        user.email,
        submission.id,
        submission.request_count
    );

    Ok(SubmissionReceipt {
        submission_id: submission.id,
        requests_created: submission.requests.len(),
    })
}

/// Query parameters accepted by the pending-requests review page.
#[derive(Debug, Default, Deserialize)]
pub struct PendingRequestsQuery {
    /// Restrict to requests whose item is tracked on this list.
    pub list_id: Option<i32>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Lists the hub's pending purchase requests for review.
pub fn list_pending_requests<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: PendingRequestsQuery,
) -> ServiceResult<Paginated<PurchaseRequest>>
where
    R: PurchaseRequestReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = query.page.unwrap_or(1);
    let mut list_query = PurchaseRequestListQuery::new(user.hub_id)
        .status(RequestStatus::Pending)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(list_id) = query.list_id {
        list_query = list_query.list_id(list_id);
    }

    let (total, requests) = repo.list_requests(list_query).map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(Paginated::new(requests, page, total_pages))
}

/// Fetches one submission with its requests for review.
pub fn get_submission<R>(
    repo: &R,
    user: &AuthenticatedUser,
    submission_id: i32,
) -> ServiceResult<Submission>
where
    R: SubmissionReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.get_submission_by_id(submission_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Query parameters accepted by the submissions review page.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionsQuery {
    /// Restrict to submissions of this list.
    pub list_id: Option<i32>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Lists the hub's submissions, newest first.
pub fn list_submissions<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SubmissionsQuery,
) -> ServiceResult<Paginated<Submission>>
where
    R: SubmissionReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = query.page.unwrap_or(1);
    let mut list_query =
        SubmissionListQuery::new(user.hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(list_id) = query.list_id {
        list_query = list_query.list_id(list_id);
    }

    let (total, submissions) = repo
        .list_submissions(list_query)
        .map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(Paginated::new(submissions, page, total_pages))
}
