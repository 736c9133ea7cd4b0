use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The referenced record does not exist in the caller's hub.
    #[error("record not found")]
    NotFound,
    /// A uniqueness or referential rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A state transition was attempted from a non-eligible state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The caller supplied a value the operation cannot accept.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A stored value could not be converted into its domain form.
    #[error("conversion failed: {0}")]
    Conversion(String),
    /// The connection pool failed to hand out a connection.
    #[error(transparent)]
    Pool(#[from] diesel::r2d2::PoolError),
    /// Any other database error.
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

/// Convenience alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
