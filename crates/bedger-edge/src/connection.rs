//! Connection to the local Bedger agent.
//!
//! This module provides the `Connection` which handles:
//! - Connecting to the agent via Unix socket
//! - Validating and encoding each event before it touches the socket
//! - The send-then-await-acknowledgment exchange
//! - Releasing the socket on every exit path
//!
//! # Connection Lifecycle
//!
//! ```text
//!  Unconnected ──connect()──▶ Connected ──disconnect()/drop──▶ Closed
//! ```
//!
//! A closed connection never reconnects; open a new one instead.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free guidelines.
//! No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, or `todo!()`.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, error, info, warn};

use bedger_protocol::{Details, Message, Severity};

use crate::config::EdgeConfig;
use crate::error::{EdgeError, Result, TransportOperation};

// ============================================================================
// Connection State
// ============================================================================

/// Lifecycle state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, socket not yet opened
    Unconnected,
    /// Socket open, events may be sent
    Connected,
    /// Socket released; terminal
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconnected => write!(f, "unconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

// ============================================================================
// Acknowledgment
// ============================================================================

/// Raw bytes the agent wrote back after an event.
///
/// The content is not interpreted. An empty acknowledgment means the agent
/// closed its end without writing anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acknowledgment {
    bytes: Vec<u8>,
}

impl Acknowledgment {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Acknowledgment decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Acknowledgment {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

// ============================================================================
// Connection
// ============================================================================

/// One session with the local agent.
///
/// Sends are strictly sequential: each [`send_event`](Self::send_event)
/// returns only after the acknowledgment read completes, and `&mut self`
/// keeps a second send from starting on the same connection.
///
/// Dropping the connection disconnects it, so the socket is released even
/// when a send fails or the caller returns early.
///
/// # Example
///
/// ```rust,ignore
/// use bedger_edge::{Connection, EdgeConfig};
/// use bedger_protocol::{Details, Severity};
///
/// let mut connection = Connection::open(EdgeConfig::from_env()).await?;
///
/// let mut details = Details::new();
/// details.insert("message".to_string(), "hi".into());
///
/// let ack = connection.send_event("TestEvent", Severity::Info, details).await?;
/// println!("agent replied: {}", ack.text());
/// // socket closed here when `connection` goes out of scope
/// ```
#[derive(Debug)]
pub struct Connection {
    /// Shared, read-only configuration.
    config: Arc<EdgeConfig>,

    /// Socket handle; present only while connected.
    socket: Option<UnixStream>,

    state: ConnectionState,
}

impl Connection {
    /// Creates an unconnected connection.
    #[must_use]
    pub fn new(config: impl Into<Arc<EdgeConfig>>) -> Self {
        Self {
            config: config.into(),
            socket: None,
            state: ConnectionState::Unconnected,
        }
    }

    /// Creates a connection and connects it.
    ///
    /// The returned connection disconnects when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeError::Connection`] if the agent socket cannot be reached.
    pub async fn open(config: impl Into<Arc<EdgeConfig>>) -> Result<Self> {
        let mut connection = Self::new(config);
        connection.connect().await?;
        Ok(connection)
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Opens the Unix socket named by the configuration.
    ///
    /// # Errors
    ///
    /// * [`EdgeError::InvalidState`] - already connected, or closed
    /// * [`EdgeError::Connection`] - the socket could not be opened; the
    ///   connection stays unconnected
    pub async fn connect(&mut self) -> Result<()> {
        if self.state != ConnectionState::Unconnected {
            warn!(state = %self.state, "Connect called on a connection that is not unconnected");
            return Err(EdgeError::InvalidState { state: self.state });
        }

        let socket_path = &self.config.socket_path;
        info!(socket_path = %socket_path.display(), "Connecting to agent socket");

        match with_timeout(self.config.io_timeout, UnixStream::connect(socket_path)).await {
            Ok(stream) => {
                self.socket = Some(stream);
                self.state = ConnectionState::Connected;
                info!(socket_path = %socket_path.display(), "Connected to agent socket");
                Ok(())
            }
            Err(source) => {
                error!(
                    socket_path = %socket_path.display(),
                    error = %source,
                    "Error connecting to agent socket"
                );
                Err(EdgeError::Connection {
                    socket_path: socket_path.clone(),
                    source,
                })
            }
        }
    }

    /// Validates an event, sends it, and waits for the acknowledgment.
    ///
    /// # Errors
    ///
    /// * [`EdgeError::Validation`] - the event was rejected; nothing was sent
    /// * [`EdgeError::Transport`] - the write or the acknowledgment read
    ///   failed, or the connection is not open
    pub async fn send_event(
        &mut self,
        event_type: &str,
        severity: Severity,
        details: Details,
    ) -> Result<Acknowledgment> {
        let message = Message::new(event_type, severity, details).map_err(|e| {
            warn!(event_type, error = %e, "Rejected invalid event");
            EdgeError::from(e)
        })?;

        self.send_message(&message).await
    }

    /// Sends an already validated message and waits for the acknowledgment.
    ///
    /// The encoded message is written in full, then a single read of up to
    /// `ack_buffer_size` bytes is performed. A peer that closes without
    /// replying yields an empty acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns [`EdgeError::Transport`] on any write or read failure. The
    /// connection is left as is; the caller decides whether to disconnect.
    pub async fn send_message(&mut self, message: &Message) -> Result<Acknowledgment> {
        let io_timeout = self.config.io_timeout;
        let buffer_size = self.config.effective_ack_buffer_size();

        let Some(stream) = self.socket.as_mut() else {
            let error = EdgeError::transport(
                TransportOperation::Write,
                io::Error::new(
                    io::ErrorKind::NotConnected,
                    format!("connection is {}", self.state),
                ),
            );
            error!(event_type = message.event_type(), error = %error, "Error sending event");
            return Err(error);
        };

        let payload = message.to_bytes();
        debug!(
            event_type = message.event_type(),
            severity = %message.severity(),
            bytes = payload.len(),
            "Sending event"
        );

        match exchange(stream, &payload, buffer_size, io_timeout).await {
            Ok(ack) => {
                info!(ack = %ack.text(), bytes = ack.len(), "Received acknowledgment");
                Ok(ack)
            }
            Err(e) => {
                error!(event_type = message.event_type(), error = %e, "Error sending event");
                Err(e)
            }
        }
    }

    /// Releases the socket.
    ///
    /// Idempotent. Does nothing on a connection that never connected;
    /// otherwise the connection becomes [`ConnectionState::Closed`].
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.socket.take() {
            drop(stream);
            debug!("Disconnected from agent socket");
        }
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Closed;
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Writes the payload, then performs one acknowledgment read.
async fn exchange(
    stream: &mut UnixStream,
    payload: &[u8],
    buffer_size: usize,
    io_timeout: Option<Duration>,
) -> Result<Acknowledgment> {
    with_timeout(io_timeout, async {
        stream.write_all(payload).await?;
        stream.flush().await
    })
    .await
    .map_err(|e| EdgeError::transport(TransportOperation::Write, e))?;

    let mut buffer = vec![0u8; buffer_size];
    let read = with_timeout(io_timeout, stream.read(&mut buffer))
        .await
        .map_err(|e| EdgeError::transport(TransportOperation::Read, e))?;
    buffer.truncate(read);

    Ok(Acknowledgment::new(buffer))
}

/// Bounds an I/O future when a timeout is configured.
async fn with_timeout<T, F>(limit: Option<Duration>, operation: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, operation)
            .await
            .unwrap_or_else(|_| {
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("timed out after {limit:?}"),
                ))
            }),
        None => operation.await,
    }
}

// ============================================================================
// Tests
// ============================================================================
