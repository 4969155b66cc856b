//! Workflow errors

use crate::db::repository::RepoError;
use crate::utils::AppError;
use thiserror::Error;

/// Errors produced by the reservation and order workflow engines
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Transition rejected by the state machine or a concurrent holder
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for WorkflowError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => WorkflowError::NotFound(msg),
            RepoError::Duplicate(msg) => WorkflowError::Conflict(msg),
            RepoError::Validation(msg) => WorkflowError::Validation(msg),
            RepoError::Database(msg) => WorkflowError::Database(msg),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotFound(msg) => AppError::not_found(msg),
            WorkflowError::Permission(msg) => AppError::forbidden(msg),
            WorkflowError::Validation(msg) => AppError::validation(msg),
            WorkflowError::Conflict(msg) => AppError::conflict(msg),
            WorkflowError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
