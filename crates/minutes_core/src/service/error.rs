//! Caller-facing error for lifecycle operations.
//!
//! # Invariants
//! - Exactly five kinds are visible to callers; each maps to one status code.
//! - `Persistence` carries a message only. Driver errors never escape.

use crate::model::validation::ValidationError;
use crate::policy::AccessDenied;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Malformed input. Rejected before any write.
    Validation(ValidationError),
    /// Access policy denial.
    Forbidden(AccessDenied),
    /// Referenced entity does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Uniqueness rule violated (duplicate attendee).
    Conflict(String),
    /// Transaction failed and was rolled back in full.
    Persistence(String),
}

impl LifecycleError {
    /// Stable upper-snake kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// HTTP-style status for transports.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::Persistence(_) => 500,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Forbidden(err) => write!(f, "forbidden: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Persistence(message) => write!(f, "persistence failure: {message}"),
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Forbidden(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for LifecycleError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AccessDenied> for LifecycleError {
    fn from(value: AccessDenied) -> Self {
        Self::Forbidden(value)
    }
}

impl From<RepoError> for LifecycleError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict { entity } => Self::Conflict(format!("{entity} already exists")),
            other => Self::Persistence(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for LifecycleError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}
