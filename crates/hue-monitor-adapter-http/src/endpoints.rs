//! URL layout of the lighting service.

use crate::transport::TransportError;
use hue_monitor_core::LightId;
use std::fmt;
use url::Url;

/// Path of the lights collection on the service.
pub const LIGHTS_PATH: &str = "/api/newdeveloper/lights/";

/// URL scheme used to reach the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP
    #[default]
    Http,
    /// HTTP over TLS
    Https,
}

impl Scheme {
    /// Scheme as it appears in a URL.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved URLs for the lights collection and individual lights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    lights: Url,
}

impl Endpoints {
    /// Build the endpoints for a service at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if the host does not form a
    /// valid URL.
    pub fn new(scheme: Scheme, host: &str, port: u16) -> Result<Self, TransportError> {
        let raw = format!("{scheme}://{host}:{port}{LIGHTS_PATH}");
        let lights = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))?;

        if lights.host_str().map_or(true, str::is_empty) {
            return Err(TransportError::InvalidUrl(raw));
        }

        Ok(Self { lights })
    }

    /// URL listing all lights.
    #[must_use]
    pub fn lights(&self) -> &str {
        self.lights.as_str()
    }

    /// URL of a single light's detail.
    #[must_use]
    pub fn light(&self, id: LightId) -> String {
        format!("{}{id}", self.lights)
    }
}
