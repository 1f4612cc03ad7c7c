//! # hue-monitor Core
//!
//! Light model and change detection for hue-monitor.
//!
//! This crate provides:
//! - `LightRecord`, the last-known state of one light, with brightness
//!   clamping and percent derivation
//! - `LightSummary`, the external representation printed to consumers
//! - `Registry`, the authoritative set of lights from the previous poll
//! - Reconciliation of a registry against a fresh snapshot, producing
//!   field-scoped `ChangeEvent`s

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod light;
pub mod reconcile;
pub mod registry;

pub use event::{ChangeEvent, FieldChange};
pub use light::{brightness_percent, clamp_brightness, LightId, LightRecord, LightSummary};
pub use reconcile::reconcile;
pub use registry::Registry;
