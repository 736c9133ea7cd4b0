use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::purchase_request::{PurchaseRequest as DomainPurchaseRequest, RequestStatus};
use crate::models::{quantity_from_db, quantity_to_db};
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::purchase_requests)]
pub struct PurchaseRequest {
    pub id: i32,
    pub submission_id: Option<i32>,
    pub item_id: i32,
    pub supplier_id: Option<i32>,
    pub user_email: String,
    pub quantity: String,
    pub status: String,
    pub requested_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::purchase_requests)]
pub struct NewPurchaseRequest {
    pub submission_id: Option<i32>,
    pub item_id: i32,
    pub supplier_id: Option<i32>,
    pub user_email: String,
    pub quantity: String,
    pub status: String,
    pub requested_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PurchaseRequest {
    pub fn status(&self) -> RepositoryResult<RequestStatus> {
        RequestStatus::parse(&self.status).ok_or_else(|| {
            RepositoryError::Conversion(format!("unknown request status `{}`", self.status))
        })
    }

    pub fn into_domain(self) -> RepositoryResult<DomainPurchaseRequest> {
        let status = self.status()?;
        Ok(DomainPurchaseRequest {
            id: self.id,
            submission_id: self.submission_id,
            item_id: self.item_id,
            supplier_id: self.supplier_id,
            user_email: self.user_email,
            quantity: quantity_from_db(&self.quantity)?,
            status,
            requested_at: self.requested_at,
            updated_at: self.updated_at,
        })
    }
}

impl NewPurchaseRequest {
    /// Build a pending request generated for `item_id` inside a submission.
    pub fn pending(
        submission_id: i32,
        item_id: i32,
        user_email: &str,
        quantity: Decimal,
        requested_at: NaiveDateTime,
    ) -> Self {
        Self {
            submission_id: Some(submission_id),
            item_id,
            supplier_id: None,
            user_email: user_email.to_string(),
            quantity: quantity_to_db(quantity),
            status: RequestStatus::Pending.as_str().to_string(),
            requested_at,
            updated_at: requested_at,
        }
    }
}
