//! Domain layer: pure counter arithmetic and per-signal state machines.
//!
//! Nothing in this layer performs I/O. Persistence ordering is owned by the
//! service, which calls the planners here, persists, then commits.

pub mod arena;
pub mod diagnostics;
pub mod reconstruction;
pub mod signal_state;

pub use arena::SignalArena;
pub use diagnostics::DiagnosticsCounters;
pub use reconstruction::{reconstruct, Reconstruction};
pub use signal_state::{SignalCounterState, ValidationPlan};
