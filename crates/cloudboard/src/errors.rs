//! Error taxonomy of the orchestration layer.
//!
//! Every business-rule failure surfaces as one of three conditions:
//! a referenced entity is missing, the operation breaks a rule, or the acting
//! user does not own the project. Storage faults are carried separately so the
//! HTTP layer can report them as server errors.

use crate::validation::ValidationError;
use thiserror::Error;

/// Result alias used throughout the command layer.
pub type Result<T> = std::result::Result<T, CloudBoardError>;

#[derive(Debug, Error)]
pub enum CloudBoardError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl CloudBoardError {
    /// `"{kind} {id} not found"`, e.g. `"Work item 7 not found"`.
    pub fn not_found(kind: &str, id: i64) -> Self {
        Self::NotFound(format!("{} {} not found", kind, id))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub fn not_owner() -> Self {
        Self::Unauthorized("You do not have access to this project".to_string())
    }

    /// Short machine-friendly label, used in logs and problem responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::Unauthorized(_) => "unauthorized",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<ValidationError> for CloudBoardError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ItemNotFound(_) => Self::NotFound(err.to_string()),
            _ => Self::InvalidOperation(err.to_string()),
        }
    }
}
