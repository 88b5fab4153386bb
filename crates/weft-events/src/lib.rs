//! # weft-events
//!
//! Contact event dispatch and simulation telemetry. The dispatcher
//! diffs each step's contact set against the previous step's to raise
//! enter/stay/exit notifications; the bus forwards structured events
//! (timing, contact counts, individual contact transitions) to
//! pluggable sinks (tracing, in-memory vecs, custom listeners).

pub mod bus;
pub mod dispatcher;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use dispatcher::ContactDispatcher;
pub use events::{ContactEvent, ContactPhase, EventKind, SimEvent};
