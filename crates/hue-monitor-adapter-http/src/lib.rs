//! # hue-monitor HTTP Adapter
//!
//! Read-only HTTP access to the lighting service.
//!
//! ## Endpoints
//!
//! - `GET {scheme}://{host}:{port}/api/newdeveloper/lights/`: all lights,
//!   keyed by id
//! - `GET {scheme}://{host}:{port}/api/newdeveloper/lights/{id}`: one light
//!
//! The [`Transport`] trait is the seam the poller is written against;
//! [`HttpTransport`] is the `reqwest` implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod endpoints;
pub mod transport;

pub use endpoints::{Endpoints, Scheme};
pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportError};
