//! Bedger Protocol - Event messages for the local agent
//!
//! This crate defines the validated event record sent by edge clients
//! to the Bedger agent, and its JSON wire encoding. It performs no I/O.

pub mod detail;
pub mod error;
pub mod message;
pub mod severity;

pub use detail::{details_from_json, DetailValue, Details};
pub use error::{ValidationError, ValidationResult};
pub use message::{validate_event_type, Message};
pub use severity::Severity;
