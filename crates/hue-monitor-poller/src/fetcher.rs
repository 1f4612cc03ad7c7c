//! Per-light detail fetching.

use crate::decode::{decode_light, DecodeError};
use crate::retry::{RetryError, RetryPolicy};
use hue_monitor_adapter_http::{Endpoints, Transport};
use hue_monitor_core::{LightId, LightRecord};

/// Result of fetching a range of lights.
///
/// `lights` is the snapshot handed to reconciliation. Lights in `offline`
/// or `failed` are simply absent from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// Successfully decoded lights, in id order
    pub lights: Vec<LightRecord>,
    /// Ids that answered with an empty body
    pub offline: Vec<LightId>,
    /// Ids skipped because of a transport or decode failure
    pub failed: Vec<LightId>,
}

/// Fetches and decodes light details one id at a time.
pub struct LightFetcher<'a, T> {
    transport: &'a T,
    endpoints: &'a Endpoints,
    retry: RetryPolicy,
}

impl<'a, T: Transport> LightFetcher<'a, T> {
    /// Create a fetcher using `retry` for each light request.
    #[must_use]
    pub fn new(transport: &'a T, endpoints: &'a Endpoints, retry: RetryPolicy) -> Self {
        Self {
            transport,
            endpoints,
            retry,
        }
    }

    /// Fetch a single light.
    ///
    /// Returns `Ok(None)` when the service answers with an empty body,
    /// meaning the light is currently offline.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the light cannot be reached within the
    /// retry budget or its payload cannot be decoded.
    pub async fn fetch_one(&self, id: LightId) -> Result<Option<LightRecord>, FetchError> {
        let url = self.endpoints.light(id);
        let body = self.retry.get(self.transport, &url).await?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        decode_light(id, &body)
            .map(Some)
            .map_err(|source| FetchError::Decode { id, source })
    }

    /// Fetch lights `1..=count`, sequentially.
    ///
    /// A failure on one light never stops the rest of the batch.
    pub async fn fetch_range(&self, count: u32) -> Batch {
        let mut batch = Batch::default();

        for id in 1..=count {
            match self.fetch_one(id).await {
                Ok(Some(light)) => batch.lights.push(light),
                Ok(None) => {
                    tracing::debug!(id, "Empty response, treating light as offline");
                    batch.offline.push(id);
                }
                Err(FetchError::Decode { id, source }) => {
                    tracing::error!(id, error = %source, "Unable to parse light payload");
                    batch.failed.push(id);
                }
                Err(FetchError::Transport(err)) => {
                    tracing::warn!(id, error = %err, "Skipping unreachable light");
                    batch.failed.push(id);
                }
            }
        }

        batch
    }
}

/// Errors that can occur fetching a single light.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Retry budget exhausted
    #[error(transparent)]
    Transport(#[from] RetryError),
    /// Payload could not be decoded
    #[error("light {id}: {source}")]
    Decode {
        /// Light whose payload failed
        id: LightId,
        /// Underlying decode failure
        source: DecodeError,
    },
}
