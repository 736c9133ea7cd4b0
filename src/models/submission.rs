use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::submission::{Submission as DomainSubmission, SubmissionStatus};
use crate::models::purchase_request::PurchaseRequest;
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::submissions)]
pub struct Submission {
    pub id: i32,
    pub list_id: i32,
    pub user_email: String,
    pub status: String,
    pub request_count: i32,
    pub submitted_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::submissions)]
pub struct NewSubmission<'a> {
    pub list_id: i32,
    pub user_email: &'a str,
    pub status: &'a str,
    pub request_count: i32,
    pub submitted_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Submission {
    pub fn status(&self) -> RepositoryResult<SubmissionStatus> {
        SubmissionStatus::parse(&self.status).ok_or_else(|| {
            RepositoryError::Conversion(format!("unknown submission status `{}`", self.status))
        })
    }

    pub fn into_domain(self, requests: Vec<PurchaseRequest>) -> RepositoryResult<DomainSubmission> {
        let status = self.status()?;
        let requests = requests
            .into_iter()
            .map(PurchaseRequest::into_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(DomainSubmission {
            id: self.id,
            list_id: self.list_id,
            user_email: self.user_email,
            status,
            request_count: self.request_count,
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
            requests,
        })
    }
}
