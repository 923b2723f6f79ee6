//! Entity-level events.
//!
//! [`Lifecycle`] is the closed set of callbacks traits subscribe to on their
//! host. [`EntityEvent`] is what the entity's own [`EventBus`] carries for
//! scripts and scheduled waits: world admission, per-step time shifts, trait
//! attachment and collision notifications by id.
//!
//! [`EventBus`]: crate::events::bus::EventBus

use crate::components::entity::EntityId;
use crate::events::bus::BusEvent;
use crate::scheduler::{TickEvent, TickInfo};

/// Lifecycle callbacks a trait can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    TimeShift,
    Collide,
    Obstruct,
    Uncollide,
}

impl Lifecycle {
    pub const ALL: [Lifecycle; 4] = [
        Lifecycle::TimeShift,
        Lifecycle::Collide,
        Lifecycle::Obstruct,
        Lifecycle::Uncollide,
    ];
}

/// Side of the *attacking* box that made contact with an obstruction.
///
/// `Bottom` means the attacker landed on top of the obstacle; `Left` means the
/// attacker's left side ran into the obstacle's right side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Top,
    Bottom,
    Left,
    Right,
}

impl Surface {
    pub fn opposite(self) -> Surface {
        match self {
            Surface::Top => Surface::Bottom,
            Surface::Bottom => Surface::Top,
            Surface::Left => Surface::Right,
            Surface::Right => Surface::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    WorldAdd,
    WorldRemove,
    TimeShift { delta: f64, time: f64 },
    TraitAttached { name: String },
    TraitDetached { name: String },
    Collide { other: Option<EntityId> },
    Uncollide { other: Option<EntityId> },
    Obstruct { other: Option<EntityId>, attack: Surface },
    /// Trait-defined notification such as `"attach"` or `"death"`.
    Custom { name: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityEventKind {
    WorldAdd,
    WorldRemove,
    TimeShift,
    TraitAttached,
    TraitDetached,
    Collide,
    Uncollide,
    Obstruct,
    Custom(&'static str),
}

impl BusEvent for EntityEvent {
    type Kind = EntityEventKind;

    fn kind(&self) -> EntityEventKind {
        match self {
            EntityEvent::WorldAdd => EntityEventKind::WorldAdd,
            EntityEvent::WorldRemove => EntityEventKind::WorldRemove,
            EntityEvent::TimeShift { .. } => EntityEventKind::TimeShift,
            EntityEvent::TraitAttached { .. } => EntityEventKind::TraitAttached,
            EntityEvent::TraitDetached { .. } => EntityEventKind::TraitDetached,
            EntityEvent::Collide { .. } => EntityEventKind::Collide,
            EntityEvent::Uncollide { .. } => EntityEventKind::Uncollide,
            EntityEvent::Obstruct { .. } => EntityEventKind::Obstruct,
            EntityEvent::Custom { name } => EntityEventKind::Custom(name),
        }
    }
}

impl TickEvent for EntityEvent {
    fn tick_info(&self) -> Option<TickInfo> {
        match self {
            EntityEvent::TimeShift { delta, time } => Some(TickInfo {
                delta: *delta,
                total: Some(*time),
                tick: None,
            }),
            _ => None,
        }
    }
}
