//! Payload decoding for the light listing and light details.

use hue_monitor_core::{LightId, LightRecord};
use serde::Deserialize;
use serde_json::error::Category;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct LightPayload {
    name: String,
    state: StatePayload,
}

#[derive(Debug, Deserialize)]
struct StatePayload {
    on: bool,
    bri: i64,
}

/// Decode one light's detail payload into a record.
///
/// The id comes from the request, not the payload. Brightness is clamped.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is not JSON or lacks `name`,
/// `state.on`, or `state.bri` with the expected types.
pub fn decode_light(id: LightId, body: &str) -> Result<LightRecord, DecodeError> {
    let payload: LightPayload = serde_json::from_str(body).map_err(DecodeError::from)?;
    Ok(LightRecord::new(
        id,
        payload.name,
        payload.state.on,
        payload.state.bri,
    ))
}

/// Count the entries in the light listing.
///
/// Only the number of entries is used; their contents are ignored.
///
/// # Errors
///
/// Returns [`DecodeError`] if the body is not JSON or is not an object or
/// array.
pub fn count_lights(body: &str) -> Result<u32, DecodeError> {
    let listing: Value = serde_json::from_str(body).map_err(DecodeError::from)?;
    let count = match &listing {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        other => {
            return Err(DecodeError::Schema(format!(
                "expected a light listing, found {}",
                kind_of(other)
            )))
        }
    };
    u32::try_from(count).map_err(|_| DecodeError::Schema(format!("{count} lights is too many")))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A payload could not be turned into the expected data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Body is not well-formed JSON
    #[error("malformed JSON: {0}")]
    Malformed(String),
    /// JSON is well-formed but required fields are missing or mistyped
    #[error("unexpected payload shape: {0}")]
    Schema(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DecodeError::Schema(err.to_string()),
            Category::Io | Category::Syntax | Category::Eof => {
                DecodeError::Malformed(err.to_string())
            }
        }
    }
}
