use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::money::AmountOutOfRange;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures surfaced by the Diesel repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The targeted record (or one it references) does not exist.
    #[error("record not found")]
    NotFound,
    /// A uniqueness, foreign-key, check, or stock constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(DieselError),
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation),
                info,
            ) => {
                let label = match kind {
                    DatabaseErrorKind::UniqueViolation => "duplicate value",
                    DatabaseErrorKind::ForeignKeyViolation => "record is still referenced",
                    _ => "value out of range",
                };
                RepositoryError::Conflict(format!("{label}: {}", info.message()))
            }
            other => RepositoryError::Database(other),
        }
    }
}

impl From<AmountOutOfRange> for RepositoryError {
    fn from(err: AmountOutOfRange) -> Self {
        RepositoryError::Conflict(err.to_string())
    }
}
