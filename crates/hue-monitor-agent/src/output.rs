//! JSON output of snapshots and change events.

use hue_monitor_core::{ChangeEvent, LightRecord, LightSummary};
use hue_monitor_poller::EventSink;
use std::io::Write;

/// Writes each snapshot and event as pretty-printed JSON.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn emit<T: serde::Serialize + ?Sized>(&mut self, value: &T) {
        let result = serde_json::to_writer_pretty(&mut self.writer, value)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.writer))
            .and_then(|()| self.writer.flush());

        if let Err(err) = result {
            tracing::warn!(error = %err, "Failed to write output");
        }
    }
}

impl<W: Write> EventSink for JsonSink<W> {
    fn initial_snapshot(&mut self, lights: &[LightRecord]) {
        let summaries: Vec<LightSummary> = lights.iter().map(LightRecord::summary).collect();
        self.emit(&summaries);
    }

    fn change(&mut self, event: &ChangeEvent) {
        self.emit(event);
    }
}
