//! Light records and brightness scaling.
//!
//! The lighting service reports brightness on the device's native scale,
//! where 1 is the dimmest the light can go and 254 the brightest. Raw
//! values outside that range are clamped on ingestion, never rejected.

use serde::{Deserialize, Serialize};

/// Stable identifier assigned to a light by the service.
pub type LightId = u32;

/// Lowest raw brightness a light can report.
pub const MIN_RAW_BRIGHTNESS: u8 = 1;

/// Highest raw brightness a light can report.
pub const MAX_RAW_BRIGHTNESS: u8 = 254;

/// Clamp a raw brightness value into `[1, 254]`.
#[must_use]
pub fn clamp_brightness(raw: i64) -> u8 {
    let clamped = raw.clamp(
        i64::from(MIN_RAW_BRIGHTNESS),
        i64::from(MAX_RAW_BRIGHTNESS),
    );
    u8::try_from(clamped).unwrap_or(MAX_RAW_BRIGHTNESS)
}

/// Derive the brightness percentage, `floor(100 * raw / 254)`.
///
/// The raw value is clamped first, so the result is always in `[0, 100]`.
#[must_use]
pub fn brightness_percent(raw: u8) -> u8 {
    let raw = u16::from(raw.clamp(MIN_RAW_BRIGHTNESS, MAX_RAW_BRIGHTNESS));
    let percent = raw * 100 / u16::from(MAX_RAW_BRIGHTNESS);
    u8::try_from(percent).unwrap_or(100)
}

/// Smallest raw brightness that maps back onto `percent`.
fn raw_for_percent(percent: u8) -> u8 {
    let percent = u16::from(percent.min(100));
    let max = u16::from(MAX_RAW_BRIGHTNESS);
    let raw = (percent * max).div_ceil(100);
    clamp_brightness(i64::from(raw))
}

/// Last-known state of a single light.
///
/// `brightness_percent` is always derived from the clamped raw value and is
/// recomputed whenever the raw value changes. The `valid` flag only
/// matters inside a reconciliation pass and is ignored by equality.
#[derive(Debug, Clone)]
pub struct LightRecord {
    id: LightId,
    name: String,
    on: bool,
    raw_brightness: u8,
    brightness_percent: u8,
    valid: bool,
}

impl LightRecord {
    /// Create a record from values reported by the service.
    #[must_use]
    pub fn new(id: LightId, name: impl Into<String>, on: bool, raw_brightness: i64) -> Self {
        let raw = clamp_brightness(raw_brightness);
        Self {
            id,
            name: name.into(),
            on,
            raw_brightness: raw,
            brightness_percent: brightness_percent(raw),
            valid: true,
        }
    }

    /// Service-assigned identifier.
    #[must_use]
    pub fn id(&self) -> LightId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Power state.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Clamped brightness on the native `[1, 254]` scale.
    #[must_use]
    pub fn raw_brightness(&self) -> u8 {
        self.raw_brightness
    }

    /// Brightness in `[0, 100]`.
    #[must_use]
    pub fn brightness_percent(&self) -> u8 {
        self.brightness_percent
    }

    /// Whether the light was observed in the most recent poll.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Update the raw brightness, clamping it and re-deriving the percent.
    pub fn set_raw_brightness(&mut self, raw: i64) {
        self.raw_brightness = clamp_brightness(raw);
        self.brightness_percent = brightness_percent(self.raw_brightness);
    }

    pub(crate) fn set_on(&mut self, on: bool) {
        self.on = on;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// External representation of this record.
    #[must_use]
    pub fn summary(&self) -> LightSummary {
        LightSummary::from(self)
    }
}

impl PartialEq for LightRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.on == other.on
            && self.raw_brightness == other.raw_brightness
    }
}

impl Eq for LightRecord {}

/// The representation of a light handed to consumers.
///
/// `brightness` is the percentage, not the raw device value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightSummary {
    /// Display name
    pub name: String,
    /// Service-assigned identifier
    pub id: LightId,
    /// Power state
    pub on: bool,
    /// Brightness in `[0, 100]`
    pub brightness: u8,
}

impl From<&LightRecord> for LightSummary {
    fn from(record: &LightRecord) -> Self {
        Self {
            name: record.name.clone(),
            id: record.id,
            on: record.on,
            brightness: record.brightness_percent,
        }
    }
}

impl From<LightSummary> for LightRecord {
    /// Rebuild a record from its summary.
    ///
    /// The raw brightness is the smallest native value that derives the
    /// same percentage, so `id`, `name`, `on` and the percent round-trip.
    fn from(summary: LightSummary) -> Self {
        let raw = raw_for_percent(summary.brightness);
        Self::new(summary.id, summary.name, summary.on, i64::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_out_of_range() {
        assert_eq!(clamp_brightness(300), 254);
        assert_eq!(clamp_brightness(0), 1);
        assert_eq!(clamp_brightness(-40), 1);
        assert_eq!(clamp_brightness(i64::MAX), 254);
        assert_eq!(clamp_brightness(127), 127);
    }

    #[test]
    fn clamp_is_idempotent() {
        for raw in [-5, 0, 1, 100, 254, 255, 1000] {
            let once = clamp_brightness(raw);
            assert_eq!(clamp_brightness(i64::from(once)), once);
        }
    }

    #[test]
    fn percent_at_bounds() {
        let high = LightRecord::new(1, "Lamp", true, 300);
        assert_eq!(high.raw_brightness(), 254);
        assert_eq!(high.brightness_percent(), 100);

        let low = LightRecord::new(1, "Lamp", true, 0);
        assert_eq!(low.raw_brightness(), 1);
        assert_eq!(low.brightness_percent(), 0);
    }

    #[test]
    fn percent_always_in_range() {
        for raw in 0..=u8::MAX {
            assert!(brightness_percent(raw) <= 100);
        }
        assert_eq!(brightness_percent(127), 50);
        assert_eq!(brightness_percent(0), 0);
        assert_eq!(brightness_percent(255), 100);
    }

    #[test]
    fn set_raw_brightness_rederives_percent() {
        let mut light = LightRecord::new(3, "Desk", false, 254);
        light.set_raw_brightness(127);
        assert_eq!(light.raw_brightness(), 127);
        assert_eq!(light.brightness_percent(), 50);

        light.set_raw_brightness(9000);
        assert_eq!(light.brightness_percent(), 100);
    }

    #[test]
    fn summary_roundtrip_preserves_observable_fields() {
        for raw in 1..=254 {
            let light = LightRecord::new(12, "Hall", raw % 2 == 0, raw);
            let restored = LightRecord::from(light.summary());

            assert_eq!(restored.id(), light.id());
            assert_eq!(restored.name(), light.name());
            assert_eq!(restored.is_on(), light.is_on());
            assert_eq!(restored.brightness_percent(), light.brightness_percent());
        }
    }

    #[test]
    fn equality_ignores_valid_flag() {
        let a = LightRecord::new(1, "Lamp", true, 100);
        let mut b = a.clone();
        b.set_valid(false);
        assert_eq!(a, b);
    }
}
