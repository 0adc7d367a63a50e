//! Error types for the edge connection.
//!
//! All error types use `thiserror` for derive macros. Every variant that
//! wraps an I/O failure keeps the underlying `io::Error` as its source.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free guidelines.
//! No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, or `todo!()`.

use std::fmt;
use std::io;
use std::path::PathBuf;

use bedger_protocol::ValidationError;
use thiserror::Error;

use crate::connection::ConnectionState;

// ============================================================================
// Edge Error Type
// ============================================================================

/// Errors surfaced by [`Connection`](crate::Connection) operations.
///
/// # Error Handling
///
/// - `Validation` is raised before any transport interaction and leaves
///   the connection untouched.
/// - `Connection` means the socket could not be opened; the connection
///   stays unconnected.
/// - `Transport` means a write or read on the socket failed. The
///   connection is not closed automatically.
///
/// None of these are retried by this crate.
#[derive(Error, Debug)]
pub enum EdgeError {
    /// The event could not be turned into a valid message.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failed to connect to the agent socket.
    ///
    /// Common causes: the agent is not running (no such file), the socket
    /// is stale (connection refused), or permissions deny access.
    #[error("Failed to connect to agent socket {}: {source}", socket_path.display())]
    Connection {
        /// Socket path from the configuration.
        socket_path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `connect` was called on a connection that is not unconnected.
    #[error("Cannot connect: connection is {state}")]
    InvalidState {
        /// State the connection was in.
        state: ConnectionState,
    },

    /// A write or read on the established socket failed.
    #[error("Transport {operation} failed: {source}")]
    Transport {
        /// Which half of the exchange failed.
        operation: TransportOperation,
        #[source]
        source: io::Error,
    },
}

impl EdgeError {
    pub(crate) fn transport(operation: TransportOperation, source: io::Error) -> Self {
        Self::Transport { operation, source }
    }

    /// Returns true for errors raised before touching the socket.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the initial connect failed.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns true if a write or read on the socket failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Kind of the underlying I/O error, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Connection { source, .. } | Self::Transport { source, .. } => {
                Some(source.kind())
            }
            Self::Validation(_) | Self::InvalidState { .. } => None,
        }
    }
}

/// Half of the send/acknowledge exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOperation {
    /// Writing the encoded message
    Write,
    /// Reading the acknowledgment
    Read,
}

impl fmt::Display for TransportOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Convenience Result type alias for edge operations.
pub type Result<T> = std::result::Result<T, EdgeError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_transparent() {
        let error: EdgeError = ValidationError::EmptyEventType.into();
        assert!(error.is_validation());
        assert_eq!(
            error.to_string(),
            ValidationError::EmptyEventType.to_string()
        );
    }

    #[test]
    fn test_connection_error_display() {
        let error = EdgeError::Connection {
            socket_path: PathBuf::from("/tmp/missing.sock"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let display = error.to_string();
        assert!(display.contains("Failed to connect to agent socket"));
        assert!(display.contains("/tmp/missing.sock"));
        assert!(display.contains("no such file"));
        assert!(error.is_connection());
        assert_eq!(error.io_kind(), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn test_transport_error_display() {
        let error = EdgeError::transport(
            TransportOperation::Write,
            io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"),
        );
        assert_eq!(error.to_string(), "Transport write failed: broken pipe");
        assert!(error.is_transport());
        assert_eq!(error.io_kind(), Some(io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_transport_error_keeps_source() {
        use std::error::Error as _;

        let error = EdgeError::transport(
            TransportOperation::Read,
            io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        );
        let source = error.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("reset"));
    }

    #[test]
    fn test_invalid_state_display() {
        let error = EdgeError::InvalidState {
            state: ConnectionState::Closed,
        };
        assert_eq!(error.to_string(), "Cannot connect: connection is closed");
        assert_eq!(error.io_kind(), None);
    }
}
