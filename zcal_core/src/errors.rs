//! # Error Types
//!
//! Structured error types for zcal_core. Every failure a calculation,
//! form submission or endpoint call can produce is one variant of
//! [`CalcError`], so callers can branch on the classification instead of
//! parsing messages.
//!
//! ## Taxonomy
//!
//! | Variant | Meaning | Status |
//! |---------|---------|--------|
//! | `ValidationFailed` | one or more form fields rejected | 400 |
//! | `Domain` | inputs outside the formula's defined range | 400 |
//! | `MissingParameter` | field unresolved after default fallback | 400 |
//! | `NotFound` | unknown geometry type or material key | 404 |
//! | `Transport` | network failure talking to a compute endpoint | 502 |
//! | `Internal` | unexpected failure | 500 |
//!
//! ## Example
//!
//! ```rust
//! use zcal_core::errors::{CalcError, CalcResult};
//!
//! fn check_height(height: f64) -> CalcResult<()> {
//!     if height <= 0.0 {
//!         return Err(CalcError::domain("microstrip", "height must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(check_height(-1.0).unwrap_err().error_code(), "DOMAIN_ERROR");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for zcal_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Form validation failed; `errors` maps field key to message
    #[error("Validation failed: {}", summarize(.errors))]
    ValidationFailed { errors: BTreeMap<String, String> },

    /// Formula inputs outside the mathematically valid range
    #[error("Invalid {geometry} geometry: {reason}")]
    Domain { geometry: String, reason: String },

    /// A required parameter has neither an entered value nor a default
    #[error("Missing required parameter: {field}")]
    MissingParameter { field: String },

    /// Unknown geometry type, material key or endpoint
    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    /// A submission is already in flight
    #[error("A calculation is already in progress")]
    SubmissionInFlight,

    /// Network or connection failure talking to a remote endpoint
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// The remote endpoint rejected the request (4xx)
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Configuration file or environment override is invalid
    #[error("Invalid configuration for '{key}': {reason}")]
    Config { key: String, reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn summarize(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(key, message)| format!("{key}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CalcError {
    /// Create a ValidationFailed error from per-field messages
    pub fn validation_failed(errors: BTreeMap<String, String>) -> Self {
        CalcError::ValidationFailed { errors }
    }

    /// Create a Domain error
    pub fn domain(geometry: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Domain {
            geometry: geometry.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingParameter error
    pub fn missing_parameter(field: impl Into<String>) -> Self {
        CalcError::MissingParameter { field: field.into() }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a Transport error
    pub fn transport(reason: impl Into<String>) -> Self {
        CalcError::Transport { reason: reason.into() }
    }

    /// Create a Config error
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CalcError::Internal { message: message.into() }
    }

    /// Check if the user (or a retry) can recover from this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CalcError::Internal { .. })
    }

    /// Check if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, CalcError::Transport { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::ValidationFailed { .. } => "VALIDATION_FAILED",
            CalcError::Domain { .. } => "DOMAIN_ERROR",
            CalcError::MissingParameter { .. } => "MISSING_PARAMETER",
            CalcError::NotFound { .. } => "NOT_FOUND",
            CalcError::SubmissionInFlight => "SUBMISSION_IN_FLIGHT",
            CalcError::Transport { .. } => "TRANSPORT_ERROR",
            CalcError::Rejected { .. } => "REJECTED",
            CalcError::Serialization { .. } => "SERIALIZATION_ERROR",
            CalcError::Config { .. } => "CONFIG_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// HTTP-equivalent status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            CalcError::ValidationFailed { .. }
            | CalcError::Domain { .. }
            | CalcError::MissingParameter { .. }
            | CalcError::Serialization { .. }
            | CalcError::Config { .. } => 400,
            CalcError::Rejected { status, .. } => *status,
            CalcError::NotFound { .. } => 404,
            CalcError::SubmissionInFlight => 409,
            CalcError::Transport { .. } => 502,
            CalcError::Internal { .. } => 500,
        }
    }

    /// Short classification shown to the user next to the detailed message
    pub fn user_message(&self) -> &'static str {
        match self {
            CalcError::ValidationFailed { .. } => "Some inputs are invalid. Please check the highlighted fields.",
            CalcError::Domain { .. } => "The geometry is outside the range the formula supports.",
            CalcError::MissingParameter { .. } => "A required parameter is missing.",
            CalcError::NotFound { .. } => "The requested item does not exist.",
            CalcError::SubmissionInFlight => "Please wait for the current calculation to finish.",
            CalcError::Transport { .. } => "Could not reach the calculation service. Please retry.",
            CalcError::Rejected { .. } => "The calculation service rejected the request.",
            CalcError::Serialization { .. } => "The data could not be read.",
            CalcError::Config { .. } => "The configuration is invalid.",
            CalcError::Internal { .. } => "An unexpected error occurred.",
        }
    }

    /// Per-field messages, when this error carries them
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            CalcError::ValidationFailed { errors } => Some(errors),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::Serialization { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::domain("microstrip", "w + 2t must be less than 8h");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Domain\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_parameter("width").error_code(), "MISSING_PARAMETER");
        assert_eq!(CalcError::not_found("Material", "FR5").error_code(), "NOT_FOUND");
        assert_eq!(CalcError::SubmissionInFlight.error_code(), "SUBMISSION_IN_FLIGHT");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(CalcError::not_found("Geometry", "slotline").http_status(), 404);
        assert_eq!(CalcError::internal("boom").http_status(), 500);
        assert_eq!(CalcError::domain("coaxial", "bad").http_status(), 400);
        assert_eq!(CalcError::transport("refused").http_status(), 502);
    }

    #[test]
    fn test_recoverability() {
        assert!(CalcError::transport("timeout").is_retryable());
        assert!(!CalcError::domain("coaxial", "bad").is_retryable());
        assert!(CalcError::domain("coaxial", "bad").is_recoverable());
        assert!(!CalcError::internal("boom").is_recoverable());
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let mut errors = BTreeMap::new();
        errors.insert("height".to_string(), "required".to_string());
        errors.insert("width".to_string(), "required".to_string());
        let err = CalcError::validation_failed(errors);
        assert_eq!(err.to_string(), "Validation failed: height: required; width: required");
        assert_eq!(err.field_errors().map(|e| e.len()), Some(2));
    }
}
