//! Agent configuration.

use anyhow::{bail, Context, Result};
use hue_monitor_adapter_http::{Endpoints, HttpTransportConfig, Scheme};
use hue_monitor_poller::{PollContext, RetryPolicy};
use std::str::FromStr;
use std::time::Duration;

/// Agent configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Where the lighting service lives
    pub connection: ConnectionConfig,

    /// How often and how persistently to poll
    pub polling: PollingConfig,
}

/// Service connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Service host
    pub hostname: String,

    /// Service port
    pub port: u16,

    /// URL scheme
    pub scheme: Scheme,

    /// Per-request timeout
    pub timeout: Duration,
}

/// Polling configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingConfig {
    /// Poll cycles per minute
    pub samples_per_minute: u32,

    /// Attempts at the light listing before giving up
    pub retry_attempts: u32,

    /// Delay between listing attempts; defaults to the poll interval
    pub retry_delay: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig {
                hostname: "localhost".to_string(),
                port: 80,
                scheme: Scheme::Http,
                timeout: Duration::from_secs(10),
            },
            polling: PollingConfig {
                samples_per_minute: 60,
                retry_attempts: 10,
                retry_delay: None,
            },
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HUE_MONITOR_HOSTNAME`: Service host
    /// - `HUE_MONITOR_PORT`: Service port
    /// - `HUE_MONITOR_SCHEME`: "http" or "https"
    /// - `HUE_MONITOR_TIMEOUT`: Request timeout in seconds
    /// - `HUE_MONITOR_SAMPLES_PER_MINUTE`: Poll cycles per minute
    /// - `HUE_MONITOR_RETRY_REQUESTS`: Listing attempts before giving up
    /// - `HUE_MONITOR_RETRY_DELAY_MS`: Delay between listing attempts
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns error if a value is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(hostname) = lookup("HUE_MONITOR_HOSTNAME") {
            config.connection.hostname = hostname;
        }

        if let Some(port) = parse_var(&lookup, "HUE_MONITOR_PORT")? {
            config.connection.port = port;
        }

        if let Some(scheme) = lookup("HUE_MONITOR_SCHEME") {
            config.connection.scheme = match scheme.to_ascii_lowercase().as_str() {
                "http" => Scheme::Http,
                "https" => Scheme::Https,
                other => bail!("Invalid HUE_MONITOR_SCHEME: {other}"),
            };
        }

        if let Some(secs) = parse_var(&lookup, "HUE_MONITOR_TIMEOUT")? {
            config.connection.timeout = Duration::from_secs(secs);
        }

        if let Some(rate) = parse_var(&lookup, "HUE_MONITOR_SAMPLES_PER_MINUTE")? {
            config.polling.samples_per_minute = rate;
        }

        if let Some(attempts) = parse_var(&lookup, "HUE_MONITOR_RETRY_REQUESTS")? {
            config.polling.retry_attempts = attempts;
        }

        if let Some(ms) = parse_var(&lookup, "HUE_MONITOR_RETRY_DELAY_MS")? {
            config.polling.retry_delay = Some(Duration::from_millis(ms));
        }

        Ok(config)
    }

    /// Check that the configuration can drive a poller.
    ///
    /// # Errors
    ///
    /// Returns error on a zero timeout, rate, or attempt count.
    pub fn validate(&self) -> Result<()> {
        if self.connection.timeout.is_zero() {
            bail!("timeout must be at least one second");
        }
        if self.polling.samples_per_minute == 0 {
            bail!("samples per minute must be greater than zero");
        }
        if self.polling.retry_attempts == 0 {
            bail!("retry requests must be greater than zero");
        }
        Ok(())
    }

    /// Sleep between poll cycles, `60s / samples_per_minute`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(60) / self.polling.samples_per_minute.max(1)
    }

    /// Transport settings.
    #[must_use]
    pub fn transport(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            timeout: self.connection.timeout,
        }
    }

    /// Build the context handed to the poller.
    ///
    /// # Errors
    ///
    /// Returns error if the host and port do not form a valid URL.
    pub fn poll_context(&self) -> Result<PollContext> {
        let endpoints = Endpoints::new(
            self.connection.scheme,
            &self.connection.hostname,
            self.connection.port,
        )
        .context("Invalid service address")?;

        let interval = self.poll_interval();
        let connect_retry = RetryPolicy::new(
            self.polling.retry_attempts,
            self.polling.retry_delay.unwrap_or(interval),
        );

        Ok(PollContext::new(endpoints, connect_retry, interval))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid {key}: {raw:?}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.connection.hostname, "localhost");
        assert_eq!(config.connection.port, 80);
        assert_eq!(config.connection.timeout, Duration::from_secs(10));
        assert_eq!(config.polling.samples_per_minute, 60);
        assert_eq!(config.polling.retry_attempts, 10);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = AgentConfig::from_lookup(lookup_from(&[
            ("HUE_MONITOR_HOSTNAME", "bridge.local"),
            ("HUE_MONITOR_PORT", "8080"),
            ("HUE_MONITOR_SCHEME", "HTTPS"),
            ("HUE_MONITOR_TIMEOUT", "3"),
            ("HUE_MONITOR_SAMPLES_PER_MINUTE", "30"),
            ("HUE_MONITOR_RETRY_REQUESTS", "4"),
            ("HUE_MONITOR_RETRY_DELAY_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.connection.hostname, "bridge.local");
        assert_eq!(config.connection.port, 8080);
        assert_eq!(config.connection.scheme, Scheme::Https);
        assert_eq!(config.connection.timeout, Duration::from_secs(3));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.polling.retry_attempts, 4);
        assert_eq!(config.polling.retry_delay, Some(Duration::from_millis(250)));
    }

    #[test]
    fn unparsable_value_is_an_error() {
        let err = AgentConfig::from_lookup(lookup_from(&[("HUE_MONITOR_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("HUE_MONITOR_PORT"));

        assert!(AgentConfig::from_lookup(lookup_from(&[("HUE_MONITOR_SCHEME", "ftp")])).is_err());
    }

    #[test]
    fn validate_rejects_zeroes() {
        let mut config = AgentConfig::default();
        config.polling.samples_per_minute = 0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.polling.retry_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AgentConfig::default();
        config.connection.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn poll_interval_from_rate() {
        let mut config = AgentConfig::default();
        config.polling.samples_per_minute = 120;
        assert_eq!(config.poll_interval(), Duration::from_millis(500));

        config.polling.samples_per_minute = 7;
        assert_eq!(config.poll_interval(), Duration::from_secs(60) / 7);
    }

    #[test]
    fn poll_context_uses_interval_as_default_retry_delay() {
        let mut config = AgentConfig::default();
        config.connection.port = 8000;
        config.polling.samples_per_minute = 30;
        config.polling.retry_attempts = 5;

        let ctx = config.poll_context().unwrap();

        assert_eq!(
            ctx.endpoints.lights(),
            "http://localhost:8000/api/newdeveloper/lights/"
        );
        assert_eq!(ctx.poll_interval, Duration::from_secs(2));
        assert_eq!(ctx.connect_retry, RetryPolicy::new(5, Duration::from_secs(2)));
        assert_eq!(ctx.detail_retry, RetryPolicy::DETAIL);
    }

    #[test]
    fn poll_context_rejects_bad_host() {
        let mut config = AgentConfig::default();
        config.connection.hostname = "not a host".to_string();
        assert!(config.poll_context().is_err());
    }
}
