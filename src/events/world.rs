//! World-level events.
//!
//! The [`World`](crate::world::World) triggers these on its own bus:
//! admission and purge of entities, the per-step `Simulated` tick that
//! scheduled waits key off, and audio announcements.

use crate::components::entity::EntityId;
use crate::events::bus::BusEvent;
use crate::scheduler::{TickEvent, TickInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// An entity became live.
    Added(EntityId),
    /// An entity was purged; render-side containers should drop it.
    Removed(EntityId),
    /// One fixed step finished, collisions included.
    Simulated { step: f64, total: f64, tick: u64 },
    /// Some entity or script asked for a sound to be played.
    EmitAudio(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldEventKind {
    Added,
    Removed,
    Simulated,
    EmitAudio,
}

impl BusEvent for WorldEvent {
    type Kind = WorldEventKind;

    fn kind(&self) -> WorldEventKind {
        match self {
            WorldEvent::Added(_) => WorldEventKind::Added,
            WorldEvent::Removed(_) => WorldEventKind::Removed,
            WorldEvent::Simulated { .. } => WorldEventKind::Simulated,
            WorldEvent::EmitAudio(_) => WorldEventKind::EmitAudio,
        }
    }
}

impl TickEvent for WorldEvent {
    fn tick_info(&self) -> Option<TickInfo> {
        match self {
            WorldEvent::Simulated { step, total, tick } => Some(TickInfo {
                delta: *step,
                total: Some(*total),
                tick: Some(*tick),
            }),
            _ => None,
        }
    }
}
