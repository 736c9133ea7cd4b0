use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Lifecycle states of a purchase request. Pending requests may be edited or
/// decided; approved and rejected are terminal except for a submission-level
/// revert.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl RequestStatus {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A single reorder line generated when an entry's stock fell below its
/// minimum.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PurchaseRequest {
    /// Unique identifier of the request.
    pub id: i32,
    /// Owning submission; `None` only for standalone legacy requests created
    /// outside a submission batch.
    pub submission_id: Option<i32>,
    /// Catalog item being reordered.
    pub item_id: i32,
    /// Optional supplier the reorder is routed to.
    pub supplier_id: Option<i32>,
    /// Email of the user the request is attributed to.
    pub user_email: String,
    /// Quantity to order; always positive.
    pub quantity: Decimal,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Timestamp for when the request was generated.
    pub requested_at: NaiveDateTime,
    /// Timestamp for the last update to the record.
    pub updated_at: NaiveDateTime,
}

/// Query definition used to list purchase requests for a hub.
///
/// Hub scoping is applied through the referenced catalog item.
#[derive(Debug, Clone)]
pub struct PurchaseRequestListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Optional status filter.
    pub status: Option<RequestStatus>,
    /// Restrict to requests whose item belongs to this list's entries.
    pub list_id: Option<i32>,
    /// Restrict to requests of one submission.
    pub submission_id: Option<i32>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl PurchaseRequestListQuery {
    /// Construct a query that targets all requests belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            status: None,
            list_id: None,
            submission_id: None,
            pagination: None,
        }
    }

    /// Filter the results by the provided status.
    pub fn status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter to requests whose item has an entry on the given list.
    pub fn list_id(mut self, list_id: i32) -> Self {
        self.list_id = Some(list_id);
        self
    }

    /// Filter to requests belonging to the given submission.
    pub fn submission_id(mut self, submission_id: i32) -> Self {
        self.submission_id = Some(submission_id);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
