use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::list_entry::EntryEdit;
use crate::domain::purchase_request::{PurchaseRequest, RequestStatus};
use crate::pagination::Pagination;

/// Review status of a submission, derived from its child requests.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    PartiallyApproved,
    Approved,
    Rejected,
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl SubmissionStatus {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyApproved => "partially_approved",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "partially_approved" => Some(Self::PartiallyApproved),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Derive a submission's status from the statuses of its child requests.
///
/// This is the single place submission status is computed; stored status
/// columns are a materialized cache of this function, refreshed in the same
/// transaction as any child mutation. A submission with no requests stays
/// pending until an admin acts on it.
pub fn derive_status(requests: &[RequestStatus]) -> SubmissionStatus {
    if requests.is_empty() {
        return SubmissionStatus::Pending;
    }

    let mut pending = 0usize;
    let mut approved = 0usize;
    let mut rejected = 0usize;
    for status in requests {
        match status {
            RequestStatus::Pending => pending += 1,
            RequestStatus::Approved => approved += 1,
            RequestStatus::Rejected => rejected += 1,
        }
    }

    if pending == requests.len() {
        SubmissionStatus::Pending
    } else if approved == requests.len() {
        SubmissionStatus::Approved
    } else if rejected == requests.len() {
        SubmissionStatus::Rejected
    } else {
        SubmissionStatus::PartiallyApproved
    }
}

/// One collaborator's batch check-in of quantities for a list, grouping the
/// purchase requests it generated.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Submission {
    /// Unique identifier of the submission.
    pub id: i32,
    /// List the quantities were checked in for.
    pub list_id: i32,
    /// Email of the submitting user.
    pub user_email: String,
    /// Derived review status (materialized).
    pub status: SubmissionStatus,
    /// Number of purchase requests generated by this submission.
    pub request_count: i32,
    /// Timestamp for when the batch was submitted.
    pub submitted_at: NaiveDateTime,
    /// Timestamp for the last update to the record.
    pub updated_at: NaiveDateTime,
    /// Child purchase requests.
    pub requests: Vec<PurchaseRequest>,
}

/// Payload consumed by the submission aggregator: one batch of quantity
/// edits for a single list.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    /// Target list identifier.
    pub list_id: i32,
    /// Hub the target list must belong to.
    pub hub_id: i32,
    /// Email of the submitting user.
    pub user_email: String,
    /// Quantity edits, keyed by catalog item.
    pub edits: Vec<EntryEdit>,
    /// Timestamp captured when the payload was created.
    pub submitted_at: NaiveDateTime,
}

impl NewSubmission {
    /// Build an aggregator payload with the current timestamp.
    pub fn new(list_id: i32, hub_id: i32, user_email: impl Into<String>) -> Self {
        Self {
            list_id,
            hub_id,
            user_email: user_email.into(),
            edits: Vec::new(),
            submitted_at: chrono::Local::now().naive_utc(),
        }
    }

    /// Append a quantity edit to the batch.
    pub fn with_edit(mut self, item_id: i32, new_current_quantity: Decimal) -> Self {
        self.edits.push(EntryEdit {
            item_id,
            new_current_quantity,
        });
        self
    }
}

/// Query definition used to list submissions for a hub.
#[derive(Debug, Clone)]
pub struct SubmissionListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Optional list filter.
    pub list_id: Option<i32>,
    /// Optional status filter.
    pub status: Option<SubmissionStatus>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl SubmissionListQuery {
    /// Construct a query that targets all submissions belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            list_id: None,
            status: None,
            pagination: None,
        }
    }

    /// Filter the results by list.
    pub fn list_id(mut self, list_id: i32) -> Self {
        self.list_id = Some(list_id);
        self
    }

    /// Filter the results by the provided status.
    pub fn status(mut self, status: SubmissionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::{Approved, Pending, Rejected};

    #[test]
    fn empty_submission_stays_pending() {
        assert_eq!(derive_status(&[]), SubmissionStatus::Pending);
    }

    #[test]
    fn all_pending_is_pending() {
        assert_eq!(
            derive_status(&[Pending, Pending, Pending]),
            SubmissionStatus::Pending
        );
    }

    #[test]
    fn all_approved_is_approved() {
        assert_eq!(
            derive_status(&[Approved, Approved]),
            SubmissionStatus::Approved
        );
    }

    #[test]
    fn all_rejected_is_rejected() {
        assert_eq!(
            derive_status(&[Rejected, Rejected]),
            SubmissionStatus::Rejected
        );
    }

    #[test]
    fn mixed_terminal_states_are_partially_approved() {
        assert_eq!(
            derive_status(&[Approved, Approved, Rejected]),
            SubmissionStatus::PartiallyApproved
        );
    }

    #[test]
    fn decided_and_pending_mix_is_partially_approved() {
        assert_eq!(
            derive_status(&[Approved, Pending]),
            SubmissionStatus::PartiallyApproved
        );
        assert_eq!(
            derive_status(&[Rejected, Pending, Pending]),
            SubmissionStatus::PartiallyApproved
        );
    }
}
