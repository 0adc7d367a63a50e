//! Connection configuration.
//!
//! The connection only needs a socket path; the remaining knobs bound how
//! much of an acknowledgment is read and how long I/O may block.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default socket path of the local agent.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/bedger.sock";

/// Environment variable overriding the socket path.
pub const SOCKET_ENV_VAR: &str = "BEDGER_SOCKET";

/// Maximum bytes returned by one acknowledgment read.
pub const DEFAULT_ACK_BUFFER_SIZE: usize = 1024;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for an agent connection.
///
/// # Example
///
/// ```rust
/// use bedger_edge::EdgeConfig;
/// use std::time::Duration;
///
/// let config = EdgeConfig {
///     socket_path: std::path::PathBuf::from("/tmp/my-agent.sock"),
///     io_timeout: Some(Duration::from_secs(5)),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfig {
    /// Path to the Unix socket where the agent listens.
    pub socket_path: PathBuf,

    /// Size of the buffer used for the single acknowledgment read.
    ///
    /// Anything the agent sends beyond this stays in the socket.
    pub ack_buffer_size: usize,

    /// Upper bound for connecting, for each write, and for the
    /// acknowledgment read.
    ///
    /// `None` blocks indefinitely, which is the default.
    pub io_timeout: Option<Duration>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            ack_buffer_size: DEFAULT_ACK_BUFFER_SIZE,
            io_timeout: None,
        }
    }
}

impl EdgeConfig {
    /// Creates a config for the given socket path with default settings.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Default::default()
        }
    }

    /// Default config, with `BEDGER_SOCKET` overriding the socket path.
    pub fn from_env() -> Self {
        Self::with_socket_override(env::var(SOCKET_ENV_VAR).ok())
    }

    fn with_socket_override(socket_path: Option<String>) -> Self {
        match socket_path.filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::new(path),
            None => Self::default(),
        }
    }

    /// Parses a TOML config. Missing keys take their defaults.
    ///
    /// ```toml
    /// socket_path = "/run/bedger/agent.sock"
    /// ack_buffer_size = 4096
    /// io_timeout_ms = 2000
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.into())
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Buffer size actually used for reads; never zero.
    pub(crate) fn effective_ack_buffer_size(&self) -> usize {
        self.ack_buffer_size.max(1)
    }
}

/// On-disk representation of [`EdgeConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    socket_path: Option<PathBuf>,
    ack_buffer_size: Option<usize>,
    io_timeout_ms: Option<u64>,
}

impl From<ConfigFile> for EdgeConfig {
    fn from(file: ConfigFile) -> Self {
        let defaults = EdgeConfig::default();
        Self {
            socket_path: file.socket_path.unwrap_or(defaults.socket_path),
            ack_buffer_size: file.ack_buffer_size.unwrap_or(defaults.ack_buffer_size),
            io_timeout: file.io_timeout_ms.map(Duration::from_millis),
        }
    }
}

// ============================================================================
// Config Errors
// ============================================================================

/// Errors raised while loading a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_config_default() {
        let config = EdgeConfig::default();

        assert_eq!(config.socket_path, PathBuf::from("/tmp/bedger.sock"));
        assert_eq!(config.ack_buffer_size, 1024);
        assert_eq!(config.io_timeout, None);
    }

    #[test]
    fn test_edge_config_new_keeps_defaults() {
        let config = EdgeConfig::new("/custom/path.sock");

        assert_eq!(config.socket_path, PathBuf::from("/custom/path.sock"));
        assert_eq!(config.ack_buffer_size, DEFAULT_ACK_BUFFER_SIZE);
    }

    #[test]
    fn test_socket_override() {
        let config = EdgeConfig::with_socket_override(Some("/run/agent.sock".to_string()));
        assert_eq!(config.socket_path, PathBuf::from("/run/agent.sock"));

        let config = EdgeConfig::with_socket_override(Some("  ".to_string()));
        assert_eq!(config, EdgeConfig::default());

        let config = EdgeConfig::with_socket_override(None);
        assert_eq!(config, EdgeConfig::default());
    }

    #[test]
    fn test_from_toml_full() {
        let config = EdgeConfig::from_toml_str(
            r#"
            socket_path = "/run/bedger/agent.sock"
            ack_buffer_size = 4096
            io_timeout_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.socket_path, PathBuf::from("/run/bedger/agent.sock"));
        assert_eq!(config.ack_buffer_size, 4096);
        assert_eq!(config.io_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_from_toml_empty_uses_defaults() {
        let config = EdgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, EdgeConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = EdgeConfig::from_toml_str("socket = \"/tmp/x.sock\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EdgeConfig::load("/nonexistent/bedger/config.toml").unwrap_err();
        match err {
            ConfigError::Read { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/bedger/config.toml"));
            }
            other => panic!("Expected Read error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_ack_buffer_is_clamped() {
        let config = EdgeConfig {
            ack_buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_ack_buffer_size(), 1);
    }
}
