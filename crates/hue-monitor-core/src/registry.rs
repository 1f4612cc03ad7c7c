//! In-memory set of known lights.

use crate::light::{LightId, LightRecord};
use std::collections::BTreeMap;

/// The authoritative set of lights from the previous poll cycle.
///
/// Holds exactly one record per light id, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    lights: BTreeMap<LightId, LightRecord>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known lights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no lights are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Look up a light by id.
    #[must_use]
    pub fn get(&self, id: LightId) -> Option<&LightRecord> {
        self.lights.get(&id)
    }

    /// Check if a light id is known.
    #[must_use]
    pub fn contains(&self, id: LightId) -> bool {
        self.lights.contains_key(&id)
    }

    /// Iterate over known lights in id order.
    pub fn iter(&self) -> impl Iterator<Item = &LightRecord> {
        self.lights.values()
    }

    /// Replace the contents with a snapshot, without diffing.
    ///
    /// Used for the first poll cycle. Later records win on duplicate ids.
    pub fn seed(&mut self, snapshot: impl IntoIterator<Item = LightRecord>) {
        self.lights.clear();
        for mut light in snapshot {
            light.set_valid(true);
            self.lights.insert(light.id(), light);
        }
    }

    pub(crate) fn get_mut(&mut self, id: LightId) -> Option<&mut LightRecord> {
        self.lights.get_mut(&id)
    }

    pub(crate) fn insert(&mut self, light: LightRecord) {
        self.lights.insert(light.id(), light);
    }

    pub(crate) fn invalidate_all(&mut self) {
        for light in self.lights.values_mut() {
            light.set_valid(false);
        }
    }

    /// Remove every record not reconfirmed since the last invalidation.
    ///
    /// Returns the removed ids in ascending order.
    pub(crate) fn prune_invalid(&mut self) -> Vec<LightId> {
        let stale: Vec<LightId> = self
            .lights
            .values()
            .filter(|light| !light.is_valid())
            .map(LightRecord::id)
            .collect();

        for id in &stale {
            self.lights.remove(id);
        }

        stale
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a LightRecord;
    type IntoIter = std::collections::btree_map::Values<'a, LightId, LightRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.lights.values()
    }
}
