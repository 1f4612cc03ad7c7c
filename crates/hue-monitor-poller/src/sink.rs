//! Destination for poll output.

use hue_monitor_core::{ChangeEvent, LightRecord};

/// Receives what each poll cycle produces.
pub trait EventSink {
    /// Called once, on the first completed cycle, with every light found.
    fn initial_snapshot(&mut self, lights: &[LightRecord]);

    /// Called for each change event of a later cycle, in production order.
    fn change(&mut self, event: &ChangeEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn initial_snapshot(&mut self, lights: &[LightRecord]) {
        (**self).initial_snapshot(lights);
    }

    fn change(&mut self, event: &ChangeEvent) {
        (**self).change(event);
    }
}

/// Collects everything in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    /// Initial snapshot, once received
    pub snapshot: Option<Vec<LightRecord>>,
    /// Change events in arrival order
    pub changes: Vec<ChangeEvent>,
}

impl EventSink for MemorySink {
    fn initial_snapshot(&mut self, lights: &[LightRecord]) {
        self.snapshot = Some(lights.to_vec());
    }

    fn change(&mut self, event: &ChangeEvent) {
        self.changes.push(event.clone());
    }
}
