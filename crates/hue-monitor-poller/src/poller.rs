//! The polling state machine.
//!
//! ```text
//! Connecting -> PollingCount -> PollingDetails -> Reconciling -> Sleeping
//!                    ^                                              |
//!                    +----------------------------------------------+
//! ```
//!
//! The first cycle that reaches reconciliation seeds the registry and
//! reports a full snapshot; every later cycle reports field-level changes.

use crate::decode::{count_lights, DecodeError};
use crate::fetcher::LightFetcher;
use crate::retry::{RetryError, RetryPolicy};
use crate::sink::EventSink;
use hue_monitor_adapter_http::{Endpoints, Transport};
use hue_monitor_core::{ChangeEvent, Registry};
use std::future::Future;
use std::time::Duration;

/// Everything a poller needs to know about its target.
#[derive(Debug, Clone)]
pub struct PollContext {
    /// Service URLs
    pub endpoints: Endpoints,
    /// Policy for the light listing; exhausting it is fatal
    pub connect_retry: RetryPolicy,
    /// Policy for each light's detail request
    pub detail_retry: RetryPolicy,
    /// Sleep between cycles
    pub poll_interval: Duration,
}

impl PollContext {
    /// Create a context using [`RetryPolicy::DETAIL`] for light details.
    #[must_use]
    pub fn new(endpoints: Endpoints, connect_retry: RetryPolicy, poll_interval: Duration) -> Self {
        Self {
            endpoints,
            connect_retry,
            detail_retry: RetryPolicy::DETAIL,
            poll_interval,
        }
    }
}

/// Where the poller currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first successful listing
    Connecting,
    /// Fetching the light listing
    PollingCount,
    /// Fetching details for lights `1..=count`
    PollingDetails {
        /// Number of lights in the listing
        count: u32,
    },
    /// Comparing the snapshot against the registry
    Reconciling,
    /// Waiting for the next cycle
    Sleeping,
}

/// Why a cycle ended before fetching details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The listing body was empty
    EmptyListing,
    /// The listing could not be decoded
    InvalidListing(DecodeError),
}

/// Counts from a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Zero-based index of this cycle
    pub cycle: u64,
    /// Lights in the listing
    pub listed: u32,
    /// Lights fetched and decoded
    pub fetched: usize,
    /// Lights that answered with an empty body
    pub offline: usize,
    /// Lights skipped on transport or decode failure
    pub failed: usize,
    /// Change events emitted (zero for the initial snapshot)
    pub changes: usize,
}

/// Outcome of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// The listing was unusable; the cycle will be retried
    Skipped(SkipReason),
    /// The cycle ran through reconciliation
    Completed(CycleSummary),
}

/// Drives the fetch, reconcile, emit, sleep loop against one service.
pub struct Poller<T> {
    transport: T,
    context: PollContext,
    registry: Registry,
    phase: Phase,
    cycles: u64,
}

impl<T: Transport> Poller<T> {
    /// Create a poller. No requests are made until it is driven.
    #[must_use]
    pub fn new(transport: T, context: PollContext) -> Self {
        Self {
            transport,
            context,
            registry: Registry::new(),
            phase: Phase::Connecting,
            cycles: 0,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Lights known after the last completed cycle.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of cycles that reached reconciliation.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// The context this poller was built with.
    #[must_use]
    pub fn context(&self) -> &PollContext {
        &self.context
    }

    /// Run one cycle: listing, details, reconciliation.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Unreachable`] if the listing cannot be fetched
    /// within the connect retry budget.
    pub async fn run_cycle<S: EventSink>(&mut self, sink: &mut S) -> Result<CycleReport, PollError> {
        let listing_url = self.context.endpoints.lights().to_string();

        if self.phase == Phase::Connecting {
            tracing::info!(url = %listing_url, "Connecting");
        } else {
            self.phase = Phase::PollingCount;
        }

        let body = self
            .context
            .connect_retry
            .get(&self.transport, &listing_url)
            .await
            .map_err(|source| PollError::Unreachable {
                url: listing_url.clone(),
                source,
            })?;
        self.phase = Phase::PollingCount;

        if body.trim().is_empty() {
            tracing::warn!(url = %listing_url, "Empty light listing, restarting cycle");
            return Ok(CycleReport::Skipped(SkipReason::EmptyListing));
        }

        let listed = match count_lights(&body) {
            Ok(count) => count,
            Err(err) => {
                tracing::error!(url = %listing_url, error = %err, "Unable to parse light listing");
                return Ok(CycleReport::Skipped(SkipReason::InvalidListing(err)));
            }
        };

        self.phase = Phase::PollingDetails { count: listed };
        let batch = {
            let fetcher = LightFetcher::new(
                &self.transport,
                &self.context.endpoints,
                self.context.detail_retry,
            );
            fetcher.fetch_range(listed).await
        };

        self.phase = Phase::Reconciling;
        let mut summary = CycleSummary {
            cycle: self.cycles,
            listed,
            fetched: batch.lights.len(),
            offline: batch.offline.len(),
            failed: batch.failed.len(),
            changes: 0,
        };

        if self.cycles == 0 {
            self.registry.seed(batch.lights.iter().cloned());
            sink.initial_snapshot(&batch.lights);
        } else {
            let events = self.registry.reconcile(batch.lights);
            for event in &events {
                log_event(event);
                sink.change(event);
            }
            summary.changes = events.len();
        }

        self.cycles += 1;
        tracing::debug!(
            cycle = summary.cycle,
            listed = summary.listed,
            fetched = summary.fetched,
            offline = summary.offline,
            failed = summary.failed,
            changes = summary.changes,
            "Cycle complete"
        );

        Ok(CycleReport::Completed(summary))
    }

    /// Poll until `shutdown` resolves or a fatal error occurs.
    ///
    /// `shutdown` is only observed between cycles; a cycle in progress
    /// always runs to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Unreachable`] when the service cannot be reached.
    pub async fn run_until<S, F>(&mut self, sink: &mut S, shutdown: F) -> Result<(), PollError>
    where
        S: EventSink,
        F: Future,
    {
        tokio::pin!(shutdown);

        loop {
            self.run_cycle(sink).await?;

            self.phase = Phase::Sleeping;
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(cycles = self.cycles, "Shutdown signal received");
                    return Ok(());
                }
                () = tokio::time::sleep(self.context.poll_interval) => {}
            }
        }
    }

    /// Poll until a fatal error occurs.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Unreachable`] when the service cannot be reached.
    pub async fn run<S: EventSink>(&mut self, sink: &mut S) -> Result<(), PollError> {
        self.run_until(sink, std::future::pending::<()>()).await
    }
}

fn log_event(event: &ChangeEvent) {
    match event {
        ChangeEvent::Discovered(light) => {
            tracing::info!(id = light.id(), name = light.name(), "New light discovered");
        }
        ChangeEvent::Removed { id } => {
            tracing::info!(id, "No longer receiving communication from light, removing it");
        }
        ChangeEvent::Changed { id, change } => {
            tracing::debug!(id, field = change.field(), "Light changed");
        }
    }
}

/// Errors that stop the poller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// The light listing could not be fetched within the retry budget
    #[error("unable to establish connection to server at {url}")]
    Unreachable {
        /// Listing URL
        url: String,
        /// Final retry failure
        source: RetryError,
    },
}
