//! Field-level validation shared by all entity inputs.
//!
//! # Responsibility
//! - Reject missing/malformed fields before any transaction opens.
//! - Normalize accepted text (trimmed) so storage never sees padding.
//!
//! # Invariants
//! - Validation is pure: no I/O, no clock reads.
//! - Length limits are counted in Unicode scalar values, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum meeting title length.
pub const TITLE_MAX_CHARS: usize = 200;
/// Maximum meeting location length.
pub const LOCATION_MAX_CHARS: usize = 200;
/// Maximum guest attendee display name length.
pub const NAME_MAX_CHARS: usize = 100;
/// Maximum guest attendee email length.
pub const EMAIL_MAX_CHARS: usize = 120;
/// Maximum attachment name length.
pub const ATTACHMENT_NAME_MAX_CHARS: usize = 255;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Malformed or missing input rejected by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    EmptyField(&'static str),
    /// Text field exceeds its maximum length.
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Enumerated field received a value outside its fixed set.
    InvalidEnumValue {
        field: &'static str,
        value: String,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` is required"),
            Self::TooLong { field, max_chars } => {
                write!(f, "`{field}` must be at most {max_chars} characters")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidEnumValue { field, value } => {
                write!(f, "invalid value `{value}` for `{field}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when empty.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Trims `value`, rejects it when empty or longer than `max_chars`.
pub fn require_bounded_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = require_text(field, value)?;
    ensure_max_chars(field, &trimmed, max_chars)?;
    Ok(trimmed)
}

/// Trims optional free text; empty input is kept as an empty string.
pub fn optional_bounded_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim().to_string();
    ensure_max_chars(field, &trimmed, max_chars)?;
    Ok(trimmed)
}

/// Validates and lowercases an email address.
pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let trimmed = require_bounded_text("email", value, EMAIL_MAX_CHARS)?;
    if !EMAIL_RE.is_match(&trimmed) {
        return Err(ValidationError::InvalidEmail(trimmed));
    }
    Ok(trimmed.to_lowercase())
}

fn ensure_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}
