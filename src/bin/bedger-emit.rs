//! Bedger emit - send test events to the local agent
//!
//! Opens one connection to the agent, sends a series of events, and prints
//! each acknowledgment. Useful for checking that an agent is up and
//! answering.
//!
//! # Usage
//!
//! ```bash
//! # Five INFO events, one per second, to the default socket
//! bedger-emit
//!
//! # Custom event against a specific socket
//! bedger-emit --socket /run/bedger/agent.sock --event-type DiskFull \
//!     --severity error --count 1 --details '{"mount": "/var"}'
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bedger_edge::{Connection, EdgeConfig};
use bedger_protocol::{details_from_json, Details, Severity};

/// Send test events to the local Bedger agent
#[derive(Parser, Debug)]
#[command(name = "bedger-emit", version, about)]
struct Args {
    /// Agent socket path (overrides config file and BEDGER_SOCKET)
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event type, PascalCase
    #[arg(short, long, default_value = "TestEvent")]
    event_type: String,

    /// Event severity (info, warning, error)
    #[arg(long, default_value_t = Severity::Info)]
    severity: Severity,

    /// Number of events to send
    #[arg(short = 'n', long, default_value_t = 5)]
    count: u32,

    /// Delay between events in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,

    /// Extra details as a JSON object, merged into every event
    #[arg(short, long)]
    details: Option<String>,

    /// Bound connect, write, and acknowledgment read (milliseconds)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bedger=info".parse()?)
                .add_directive("bedger_edge=info".parse()?)
                .add_directive("bedger_protocol=info".parse()?),
        )
        .init();

    let config = resolve_config(&args)?;
    let extra = parse_extra_details(args.details.as_deref())?;

    run(args, config, extra)
}

fn resolve_config(args: &Args) -> Result<EdgeConfig> {
    let mut config = match &args.config {
        Some(path) => EdgeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EdgeConfig::from_env(),
    };

    if let Some(socket) = &args.socket {
        config.socket_path = socket.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.io_timeout = Some(Duration::from_millis(timeout_ms));
    }

    Ok(config)
}

fn parse_extra_details(raw: Option<&str>) -> Result<Details> {
    let Some(raw) = raw else {
        return Ok(Details::new());
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--details is not valid JSON")?;
    details_from_json(value).context("--details must be a JSON object")
}

#[tokio::main]
async fn run(args: Args, config: EdgeConfig, extra: Details) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        socket_path = %config.socket_path.display(),
        count = args.count,
        "bedger-emit starting"
    );

    let mut connection = Connection::open(config)
        .await
        .context("Is the Bedger agent running?")?;

    for i in 0..args.count {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }

        let mut details = Details::new();
        details.insert("message".to_string(), format!("Test message {i}").into());
        details.extend(extra.clone());

        let ack = connection
            .send_event(&args.event_type, args.severity, details)
            .await
            .with_context(|| format!("Failed to send event {}", i + 1))?;

        println!("[{}/{}] ack: {}", i + 1, args.count, ack.text());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["bedger-emit"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_default_args() {
        let args = args(&[]);
        assert_eq!(args.event_type, "TestEvent");
        assert_eq!(args.severity, Severity::Info);
        assert_eq!(args.count, 5);
        assert_eq!(args.interval_ms, 1000);
    }

    #[test]
    fn test_severity_arg_is_case_insensitive() {
        assert_eq!(args(&["--severity", "WARNING"]).severity, Severity::Warning);
        assert_eq!(args(&["--severity", "error"]).severity, Severity::Error);
        assert!(Args::try_parse_from(["bedger-emit", "--severity", "loud"]).is_err());
    }

    #[test]
    fn test_socket_and_timeout_override_config() {
        let args = args(&["--socket", "/run/agent.sock", "--timeout-ms", "250"]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/run/agent.sock"));
        assert_eq!(config.io_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_extra_details() {
        let details = parse_extra_details(Some(r#"{"host": "edge-1", "port": 22}"#)).unwrap();
        assert_eq!(details.len(), 2);
        assert!(parse_extra_details(None).unwrap().is_empty());
        assert!(parse_extra_details(Some("[1, 2]")).is_err());
        assert!(parse_extra_details(Some("{not json")).is_err());
    }
}
