//! # hue-monitor
//!
//! Polls a lighting service at a fixed rate and reports what changed.
//!
//! ## Output
//!
//! Change records go to stdout as JSON: the full set of lights on the first
//! cycle, then one record per discovered, removed, or changed light. Logs
//! go to stderr and are filtered with `RUST_LOG` (default `info`).
//!
//! ## Exit status
//!
//! Non-zero when the service cannot be reached within the retry budget or
//! the configuration is invalid.

use anyhow::{Context, Result};
use clap::Parser;
use hue_monitor_adapter_http::{HttpTransport, Scheme};
use hue_monitor_poller::Poller;
use tracing_subscriber::EnvFilter;

mod config;
mod output;

pub use config::AgentConfig;
use output::JsonSink;

/// Command-line options. Each one overrides its environment variable.
#[derive(Debug, Parser)]
#[command(name = "hue-monitor")]
#[command(about = "Report light changes from a lighting service")]
#[command(version)]
struct Cli {
    /// Maximum time in seconds for each HTTP request
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Poll cycles per minute
    #[arg(short, long)]
    samples_per_minute: Option<u32>,

    /// Attempts at reaching the service before exiting
    #[arg(short, long)]
    retry_requests: Option<u32>,

    /// Service port
    #[arg(short, long)]
    port: Option<u16>,

    /// Service hostname
    #[arg(short = 'n', long)]
    hostname: Option<String>,

    /// Connect over HTTPS
    #[arg(long)]
    https: bool,
}

impl Cli {
    fn apply(self, config: &mut AgentConfig) {
        if let Some(secs) = self.timeout {
            config.connection.timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(rate) = self.samples_per_minute {
            config.polling.samples_per_minute = rate;
        }
        if let Some(attempts) = self.retry_requests {
            config.polling.retry_attempts = attempts;
        }
        if let Some(port) = self.port {
            config.connection.port = port;
        }
        if let Some(hostname) = self.hostname {
            config.connection.hostname = hostname;
        }
        if self.https {
            config.connection.scheme = Scheme::Https;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let mut config = AgentConfig::from_env()?;
    Cli::parse().apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let context = config.poll_context()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        hostname = %config.connection.hostname,
        port = config.connection.port,
        samples_per_minute = config.polling.samples_per_minute,
        seconds_between_requests = context.poll_interval.as_secs_f64(),
        retry_attempts = config.polling.retry_attempts,
        timeout_secs = config.connection.timeout.as_secs(),
        "Starting hue-monitor"
    );

    let transport =
        HttpTransport::new(&config.transport()).context("Failed to create HTTP transport")?;
    let mut poller = Poller::new(transport, context);
    let mut sink = JsonSink::new(std::io::stdout());

    // Run until Ctrl+C or the service becomes unreachable
    poller
        .run_until(&mut sink, tokio::signal::ctrl_c())
        .await
        .context("Polling stopped")?;

    tracing::info!(cycles = poller.cycles(), "hue-monitor stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn short_flags_match_long_flags() {
        let cli = Cli::try_parse_from([
            "hue-monitor", "-t", "5", "-s", "30", "-r", "2", "-p", "8080", "-n", "bridge",
        ])
        .unwrap();

        let mut config = AgentConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.connection.timeout, Duration::from_secs(5));
        assert_eq!(config.polling.samples_per_minute, 30);
        assert_eq!(config.polling.retry_attempts, 2);
        assert_eq!(config.connection.port, 8080);
        assert_eq!(config.connection.hostname, "bridge");
        assert_eq!(config.connection.scheme, Scheme::Http);
    }

    #[test]
    fn flags_left_out_keep_existing_values() {
        let cli = Cli::try_parse_from(["hue-monitor", "--port", "9000", "--https"]).unwrap();

        let mut config = AgentConfig::default();
        config.connection.hostname = "from-env".to_string();
        cli.apply(&mut config);

        assert_eq!(config.connection.hostname, "from-env");
        assert_eq!(config.connection.port, 9000);
        assert_eq!(config.connection.scheme, Scheme::Https);
        assert_eq!(config.polling.retry_attempts, 10);
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["hue-monitor", "--port", "http"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
