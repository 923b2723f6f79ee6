//! Cooperative, tick-driven sequencing.
//!
//! Nothing here suspends a thread. A wait is a handler bound to some bus's
//! tick event that accumulates simulated time and resolves a [`SyncFuture`]
//! on the tick that crosses its duration.
//!
//! Submodules:
//! - [`future`] – synchronous-resolution future and its resolver
//! - [`loops`] – `do_for` / `wait_for` bound to a tick event

pub mod future;
pub mod loops;

pub use future::{Resolver, SyncFuture};
pub use loops::{Completion, Loops};

use crate::events::bus::BusEvent;

/// Simulated time carried by one tick event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInfo {
    pub delta: f64,
    /// Running total of the clock that emitted the tick, when it has one.
    pub total: Option<f64>,
    /// Tick counter, for world-level ticks.
    pub tick: Option<u64>,
}

/// An event that may carry a tick of simulated time.
pub trait TickEvent: BusEvent {
    fn tick_info(&self) -> Option<TickInfo>;
}
