//! # hue-monitor Poller
//!
//! Interval-driven change detection for a lighting service.
//!
//! Each cycle fetches the light listing to learn how many lights exist,
//! fetches every light's detail, and reconciles the result against the
//! registry from the previous cycle. Changes are handed to an
//! [`EventSink`].
//!
//! ## Failure handling
//!
//! - Transport failures are retried under a [`RetryPolicy`].
//! - Exhausting the retry budget on the listing is fatal.
//! - Exhausting it on a single light, or failing to decode one, only skips
//!   that light for the cycle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decode;
pub mod fetcher;
pub mod poller;
pub mod retry;
pub mod sink;

pub use decode::{count_lights, decode_light, DecodeError};
pub use fetcher::{Batch, FetchError, LightFetcher};
pub use poller::{CycleReport, CycleSummary, Phase, PollContext, PollError, Poller, SkipReason};
pub use retry::{RetryError, RetryPolicy};
pub use sink::{EventSink, MemorySink};
