use thiserror::Error;

use crate::forms::FieldErrors;
use crate::identity::AuthError;
use crate::repository::errors::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the service layer and mapped to HTTP by the routes.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller lacks the role required for the operation.
    #[error("insufficient permissions")]
    Unauthorized,
    /// The request payload failed validation.
    #[error("invalid input: {0:?}")]
    Form(FieldErrors),
    /// The requested record does not exist or is not visible to the caller.
    #[error("not found")]
    NotFound,
    /// The operation conflicts with stored state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The identity provider could not be reached or answered with an error.
    #[error("identity provider error: {0}")]
    Upstream(String),
    /// Anything unexpected; details are logged, never returned to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Upstream(message) => ServiceError::Upstream(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
