//! Event buffering and delivery.
//!
//! The solver emits events throughout a step and flushes once at the
//! end, so the bus is a plain buffer in front of the registered sinks.
//! Events carry no references and delivery happens on the flushing
//! thread, so sinks see them in emission order.

use crate::events::SimEvent;
use crate::sinks::EventSink;

/// Buffered event fan-out to registered sinks.
#[derive(Default)]
pub struct EventBus {
    /// Events emitted since the last flush.
    pending: Vec<SimEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    disabled: bool,
}

impl EventBus {
    /// Creates a bus with no sinks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sink. Sinks receive every event flushed after
    /// registration, in emission order.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Enables or disables the bus. While disabled, `emit` drops
    /// events instead of buffering them.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Buffers an event for the next flush.
    pub fn emit(&mut self, event: SimEvent) {
        if !self.disabled {
            self.pending.push(event);
        }
    }

    /// Number of events awaiting delivery.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Delivers buffered events to every sink. The solver calls this
    /// once per step.
    pub fn flush(&mut self) {
        for event in self.pending.drain(..) {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
    }

    /// Flushes remaining events and finalizes every sink. Call at
    /// shutdown.
    pub fn close(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}
