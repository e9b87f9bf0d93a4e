//! Planning error types.

use planbook_shared::{AppError, RecordId};
use thiserror::Error;

use crate::workflow::PlanningStatus;

/// Errors returned by planning operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// Malformed or disallowed input.
    #[error("{0}")]
    Validation(String),

    /// An amount that is not a non-negative decimal.
    #[error("{0}")]
    InvalidAmount(String),

    /// A status change that is not an edge of the workflow.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: PlanningStatus,
        /// The attempted target status.
        to: PlanningStatus,
    },

    /// The actor may see the record but not perform the operation.
    #[error("{0}")]
    PermissionDenied(String),

    /// No record with this id is visible to the actor.
    #[error("Record {0} not found")]
    NotFound(RecordId),

    /// Another record already holds the same owner, customer, item and year.
    #[error("A record for this customer, item and year already exists")]
    DuplicateRecord,

    /// The store failed.
    #[error("{0}")]
    Storage(String),
}

impl PlanningError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidAmount(_) | Self::InvalidTransition { .. } => 400,
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::DuplicateRecord => 409,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DuplicateRecord => "DUPLICATE_RECORD",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }
}

impl From<PlanningError> for AppError {
    fn from(err: PlanningError) -> Self {
        let message = err.to_string();
        match err {
            PlanningError::Validation(_) => Self::Validation(message),
            PlanningError::InvalidAmount(_) => Self::InvalidAmount(message),
            PlanningError::InvalidTransition { .. } => Self::InvalidTransition(message),
            PlanningError::PermissionDenied(_) => Self::Forbidden(message),
            PlanningError::NotFound(_) => Self::NotFound(message),
            PlanningError::DuplicateRecord => Self::Conflict(message),
            PlanningError::Storage(_) => Self::Storage(message),
        }
    }
}
