//! Change events produced by reconciliation.

use crate::light::{LightId, LightRecord, LightSummary};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single field that changed on a known light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Power state changed
    On(bool),
    /// Brightness percentage changed
    Brightness(u8),
    /// Display name changed
    Name(String),
}

impl FieldChange {
    /// Name of the changed field as it appears in the output.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            FieldChange::On(_) => "on",
            FieldChange::Brightness(_) => "brightness",
            FieldChange::Name(_) => "name",
        }
    }
}

/// A discrete notification about one light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A light id was seen for the first time
    Discovered(LightRecord),
    /// One field of a known light changed
    Changed {
        /// Light the change applies to
        id: LightId,
        /// The field and its new value
        change: FieldChange,
    },
    /// A known light was not seen in the latest poll
    Removed {
        /// Light that went away
        id: LightId,
    },
}

impl ChangeEvent {
    /// Identifier of the light this event is about.
    #[must_use]
    pub fn id(&self) -> LightId {
        match self {
            ChangeEvent::Discovered(light) => light.id(),
            ChangeEvent::Changed { id, .. } | ChangeEvent::Removed { id } => *id,
        }
    }

    /// Short marker naming the kind of event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Discovered(_) => "discovered",
            ChangeEvent::Changed { .. } => "changed",
            ChangeEvent::Removed { .. } => "removed",
        }
    }
}

impl Serialize for ChangeEvent {
    /// Serializes as a flat object, e.g. `{"event":"changed","id":1,"on":false}`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("event", self.kind())?;
        map.serialize_entry("id", &self.id())?;
        match self {
            ChangeEvent::Discovered(light) => {
                map.serialize_entry("light", &LightSummary::from(light))?;
            }
            ChangeEvent::Changed { change, .. } => match change {
                FieldChange::On(on) => map.serialize_entry(change.field(), on)?,
                FieldChange::Brightness(percent) => map.serialize_entry(change.field(), percent)?,
                FieldChange::Name(name) => map.serialize_entry(change.field(), name)?,
            },
            ChangeEvent::Removed { .. } => {}
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn changed_serializes_flat() {
        let event = ChangeEvent::Changed {
            id: 1,
            change: FieldChange::On(false),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "changed", "id": 1, "on": false})
        );
    }

    #[test]
    fn discovered_carries_full_record() {
        let event = ChangeEvent::Discovered(LightRecord::new(7, "Porch", true, 254));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "discovered",
                "id": 7,
                "light": {"name": "Porch", "id": 7, "on": true, "brightness": 100}
            })
        );
    }

    #[test]
    fn removed_is_id_only() {
        let event = ChangeEvent::Removed { id: 3 };
        assert_eq!(event.id(), 3);
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "removed", "id": 3})
        );
    }
}
