//! Snapshot reconciliation.
//!
//! Each pass runs in three phases over the registry:
//!
//! 1. **Invalidate**: every known light is marked not seen.
//! 2. **Match**: each light in the snapshot either reconfirms a known
//!    record (emitting one event per changed field, in the order power,
//!    brightness, name) or is inserted as a new discovery.
//! 3. **Prune**: records never reconfirmed are removed and reported.
//!
//! Removal is deferred to its own phase so the registry is never mutated
//! while it is being walked.

use crate::event::{ChangeEvent, FieldChange};
use crate::light::LightRecord;
use crate::registry::Registry;

/// Reconcile `registry` against a freshly fetched snapshot.
///
/// Updates the registry in place and returns the change events in the
/// order they were produced.
pub fn reconcile(
    registry: &mut Registry,
    snapshot: impl IntoIterator<Item = LightRecord>,
) -> Vec<ChangeEvent> {
    let mut events = Vec::new();

    registry.invalidate_all();

    for incoming in snapshot {
        if let Some(existing) = registry.get_mut(incoming.id()) {
            existing.set_valid(true);
            diff_fields(existing, &incoming, &mut events);
        } else {
            let mut light = incoming;
            light.set_valid(true);
            events.push(ChangeEvent::Discovered(light.clone()));
            registry.insert(light);
        }
    }

    for id in registry.prune_invalid() {
        events.push(ChangeEvent::Removed { id });
    }

    tracing::trace!(known = registry.len(), events = events.len(), "Reconciled snapshot");
    events
}

/// Compare one reconfirmed record against its incoming state.
///
/// Brightness is compared on the percentage; a raw change that keeps the
/// same percentage is stored without an event.
fn diff_fields(existing: &mut LightRecord, incoming: &LightRecord, events: &mut Vec<ChangeEvent>) {
    let id = existing.id();

    if existing.is_on() != incoming.is_on() {
        existing.set_on(incoming.is_on());
        events.push(ChangeEvent::Changed {
            id,
            change: FieldChange::On(incoming.is_on()),
        });
    }

    if existing.brightness_percent() != incoming.brightness_percent() {
        events.push(ChangeEvent::Changed {
            id,
            change: FieldChange::Brightness(incoming.brightness_percent()),
        });
    }
    if existing.raw_brightness() != incoming.raw_brightness() {
        existing.set_raw_brightness(i64::from(incoming.raw_brightness()));
    }

    if existing.name() != incoming.name() {
        let name = incoming.name().to_owned();
        existing.set_name(name.clone());
        events.push(ChangeEvent::Changed {
            id,
            change: FieldChange::Name(name),
        });
    }
}

impl Registry {
    /// Reconcile this registry against a snapshot. See [`reconcile`].
    pub fn reconcile(&mut self, snapshot: impl IntoIterator<Item = LightRecord>) -> Vec<ChangeEvent> {
        reconcile(self, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp(id: u32, on: bool, raw: i64, name: &str) -> LightRecord {
        LightRecord::new(id, name, on, raw)
    }

    fn seeded(lights: Vec<LightRecord>) -> Registry {
        let mut registry = Registry::new();
        registry.seed(lights);
        registry
    }

    #[test]
    fn power_change_emits_single_event() {
        let mut registry = seeded(vec![lamp(1, true, 127, "Lamp")]);

        let events = registry.reconcile(vec![lamp(1, false, 127, "Lamp")]);

        assert_eq!(
            events,
            vec![ChangeEvent::Changed {
                id: 1,
                change: FieldChange::On(false)
            }]
        );
        assert!(!registry.get(1).unwrap().is_on());
    }

    #[test]
    fn empty_snapshot_removes_everything() {
        let mut registry = seeded(vec![lamp(1, true, 127, "Lamp")]);

        let events = registry.reconcile(Vec::new());

        assert_eq!(events, vec![ChangeEvent::Removed { id: 1 }]);
        assert!(registry.is_empty());
    }

    #[test]
    fn new_light_is_discovered_and_inserted() {
        let mut registry = Registry::new();

        let events = registry.reconcile(vec![lamp(7, true, 200, "Porch")]);

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ChangeEvent::Discovered(light) if light.id() == 7));
        let stored = registry.get(7).unwrap();
        assert!(stored.is_valid());
        assert_eq!(stored.name(), "Porch");
    }

    #[test]
    fn simultaneous_changes_follow_power_brightness_name_order() {
        let mut registry = seeded(vec![lamp(4, false, 254, "Old")]);

        let events = registry.reconcile(vec![lamp(4, true, 127, "New")]);

        assert_eq!(
            events,
            vec![
                ChangeEvent::Changed {
                    id: 4,
                    change: FieldChange::On(true)
                },
                ChangeEvent::Changed {
                    id: 4,
                    change: FieldChange::Brightness(50)
                },
                ChangeEvent::Changed {
                    id: 4,
                    change: FieldChange::Name("New".to_string())
                },
            ]
        );
        let stored = registry.get(4).unwrap();
        assert!(stored.is_on());
        assert_eq!(stored.brightness_percent(), 50);
        assert_eq!(stored.raw_brightness(), 127);
        assert_eq!(stored.name(), "New");
    }

    #[test]
    fn unchanged_snapshot_emits_nothing() {
        let lights = vec![lamp(1, true, 10, "a"), lamp(2, false, 20, "b")];
        let mut registry = seeded(lights.clone());

        let events = registry.reconcile(lights);

        assert!(events.is_empty());
        assert_eq!(registry.len(), 2);
        assert!(registry.iter().all(LightRecord::is_valid));
    }

    #[test]
    fn raw_change_within_same_percent_is_silent() {
        // 3 and 4 both derive 1%
        let mut registry = seeded(vec![lamp(1, true, 3, "Lamp")]);

        let events = registry.reconcile(vec![lamp(1, true, 4, "Lamp")]);

        assert!(events.is_empty());
        assert_eq!(registry.get(1).unwrap().raw_brightness(), 4);
    }

    #[test]
    fn mixed_pass_keeps_size_accounting() {
        let mut registry = seeded(vec![
            lamp(1, true, 100, "a"),
            lamp(2, true, 100, "b"),
            lamp(3, true, 100, "c"),
        ]);
        let before = registry.len();

        let events = registry.reconcile(vec![
            lamp(2, false, 100, "b"),
            lamp(5, true, 100, "e"),
            lamp(6, true, 100, "f"),
        ]);

        let removed = events
            .iter()
            .filter(|e| matches!(e, ChangeEvent::Removed { .. }))
            .count();
        let inserted = events
            .iter()
            .filter(|e| matches!(e, ChangeEvent::Discovered(_)))
            .count();

        assert_eq!(removed, 2);
        assert_eq!(inserted, 2);
        assert_eq!(registry.len(), before - removed + inserted);
        assert!(registry.iter().all(LightRecord::is_valid));
    }

    #[test]
    fn removals_come_after_matches() {
        let mut registry = seeded(vec![lamp(1, true, 100, "a"), lamp(2, true, 100, "b")]);

        let events = registry.reconcile(vec![lamp(3, true, 100, "c"), lamp(2, false, 100, "b")]);

        let kinds: Vec<&str> = events.iter().map(ChangeEvent::kind).collect();
        assert_eq!(kinds, vec!["discovered", "changed", "removed"]);
        assert_eq!(events[2].id(), 1);
    }
}
