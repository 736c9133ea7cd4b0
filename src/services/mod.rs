use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod approvals;
pub mod catalog;
pub mod lists;
pub mod submissions;

/// Errors surfaced to callers of the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller lacks the required role or list access.
    #[error("unauthorized")]
    Unauthorized,
    /// The referenced record does not exist in the caller's hub.
    #[error("not found")]
    NotFound,
    /// A uniqueness or referential rule was violated.
    #[error("{0}")]
    Conflict(String),
    /// A state transition was attempted from a non-eligible state.
    #[error("{0}")]
    InvalidState(String),
    /// The caller supplied a value the operation cannot accept.
    #[error("{0}")]
    InvalidArgument(String),
    /// The submitted payload failed validation.
    #[error("{0}")]
    Form(String),
    /// Anything unexpected from the storage layer.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(message) => Self::Conflict(message),
            RepositoryError::InvalidState(message) => Self::InvalidState(message),
            RepositoryError::InvalidArgument(message) => Self::InvalidArgument(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Convenience alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
