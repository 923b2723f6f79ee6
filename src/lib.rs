//! Scrollkit library.
//!
//! Simulation kernel for 2D side-scrolling action games: entities composed
//! from traits, a per-object event bus, fixed-step world simulation, stateful
//! collision detection and tick-aligned cooperative scheduling.

pub mod components;
pub mod error;
pub mod events;
pub mod math;
pub mod resources;
pub mod scheduler;
pub mod systems;
pub mod traits;
pub mod world;

pub use components::entity::{Entity, EntityId};
pub use error::{EngineError, EngineResult};
pub use world::World;
