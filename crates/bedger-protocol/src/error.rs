//! Validation errors raised while building a message.

use thiserror::Error;

/// Errors raised when caller-supplied fields cannot form a valid message.
///
/// These are always detected before any transport interaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The event type was empty
    #[error("Invalid event_type: must not be empty")]
    EmptyEventType,

    /// The event type is not a PascalCase identifier
    #[error("Invalid event_type: {event_type:?} (expected pattern ^[A-Z][a-zA-Z0-9]*$)")]
    InvalidEventType { event_type: String },

    /// A number inside details has no JSON representation
    #[error("Invalid details: value at {path} is not a finite number")]
    NonFiniteNumber { path: String },

    /// A details payload was not a JSON object
    #[error("Invalid details: expected a JSON object, got {kind}")]
    DetailsNotObject { kind: &'static str },

    /// Severity token not recognized
    #[error("Unknown severity: {value:?} (expected one of INFO, WARNING, ERROR)")]
    UnknownSeverity { value: String },
}

/// Result type for message construction.
pub type ValidationResult<T> = Result<T, ValidationError>;
