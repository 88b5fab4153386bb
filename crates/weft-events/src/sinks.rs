//! Event sinks.
//!
//! Sinks consume flushed events from the bus: log them, collect them
//! for assertions, or forward them to gameplay listeners.

use crate::events::{EventKind, SimEvent};

/// An event consumer registered with the bus.
pub trait EventSink: Send {
    fn handle(&mut self, event: &SimEvent);

    /// Called once at shutdown. Flush buffers, close files.
    fn finalize(&mut self) {}

    fn name(&self) -> &str;
}

/// Collects events into a `Vec`, for tests and offline inspection.
#[derive(Default)]
pub struct VecSink {
    pub events: Vec<SimEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events through `tracing`, with per-step events at debug and
/// the chattier per-substep events at trace.
#[derive(Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimEvent) {
        match &event.kind {
            EventKind::SubstepEnd { .. } => {
                tracing::trace!(step = event.step, event = ?event.kind, "sim_event");
            }
            EventKind::Contact(contact) => {
                tracing::info!(step = event.step, phase = ?contact.phase, "contact");
            }
            _ => {
                tracing::debug!(step = event.step, event = ?event.kind, "sim_event");
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
