//! Bedger Edge - Event client for the local agent
//!
//! This crate connects to the Bedger agent over a Unix socket and sends
//! validated events, waiting for an acknowledgment after each one:
//! - `config` - socket path and I/O limits
//! - `connection` - connection lifecycle and the send/acknowledge exchange
//! - `error` - error taxonomy for connect and transport failures
//!
//! Message construction and encoding live in `bedger_protocol`, re-exported
//! here for convenience.
//!
//! # Panic-Free Guarantees
//!
//! All production code in this crate follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations return `Result`

pub mod config;
pub mod connection;
pub mod error;

pub use config::{ConfigError, EdgeConfig, DEFAULT_ACK_BUFFER_SIZE, DEFAULT_SOCKET_PATH};
pub use connection::{Acknowledgment, Connection, ConnectionState};
pub use error::{EdgeError, Result, TransportOperation};

pub use bedger_protocol::{DetailValue, Details, Message, Severity, ValidationError};
