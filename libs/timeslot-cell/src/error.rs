use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeSlotError {
    #[error("Doctor with id '{0}' does not exist")]
    OwnerNotFound(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("Time slot storage unavailable: {0}")]
    RepositoryUnavailable(String),
}

impl From<TimeSlotError> for AppError {
    fn from(err: TimeSlotError) -> Self {
        match err {
            TimeSlotError::OwnerNotFound(_) => AppError::BadRequest(err.to_string()),
            TimeSlotError::InvalidRange(msg) => AppError::ValidationError(msg),
            TimeSlotError::RepositoryUnavailable(_) => AppError::Database(err.to_string()),
        }
    }
}
