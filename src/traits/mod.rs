//! Composable behavior units.
//!
//! A [`Trait`] is attached to one [`Entity`] and receives lifecycle callbacks
//! from it: time shifts, collisions, obstructions and separations. Callbacks
//! get the host as `&mut Entity`; while one runs, the trait is lifted out of
//! the host's trait set so sibling traits stay reachable through the host.
//!
//! Catalogue:
//! - [`attach`] – stick to the side of a solid on impact
//! - [`deathzone`] – kill whatever health touches it
//! - [`health`] – energy pool with damage, healing and death
//! - [`invincibility`] – temporary immunity after damage
//! - [`lifetime`] – remove the host after a duration
//! - [`physics`] – gravity, wind, named forces and drag
//! - [`solid`] – obstruct other entities along a resolved surface

pub mod attach;
pub mod deathzone;
pub mod health;
pub mod invincibility;
pub mod lifetime;
pub mod physics;
pub mod solid;

use std::any::{Any, TypeId};

use smallvec::SmallVec;

use crate::components::boundingbox::BoundingBox;
use crate::components::entity::Entity;
use crate::events::lifecycle::{Lifecycle, Surface};
use crate::resources::forces::Forces;

pub use attach::Attach;
pub use deathzone::DeathZone;
pub use health::Health;
pub use invincibility::Invincibility;
pub use lifetime::Lifetime;
pub use physics::Physics;
pub use solid::Solid;

/// Downcasting support for trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A trait type that must already be on the host at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub type_id: TypeId,
    pub name: &'static str,
}

impl Requirement {
    pub fn of<T: Trait>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

/// The pair of boxes that made contact, from the receiver's point of view.
#[derive(Debug, Clone)]
pub struct Contact {
    pub ours: BoundingBox,
    pub theirs: BoundingBox,
    pub our_index: usize,
    pub their_index: usize,
}

impl Contact {
    /// Same contact seen from the other entity.
    pub fn flipped(&self) -> Contact {
        Contact {
            ours: self.theirs.clone(),
            theirs: self.ours.clone(),
            our_index: self.their_index,
            their_index: self.our_index,
        }
    }
}

/// World state visible to traits during a time shift.
#[derive(Debug, Clone, Copy)]
pub struct SimContext<'a> {
    pub forces: &'a Forces,
    /// Index of the fixed step being simulated.
    pub tick: u64,
    /// World time including the step being simulated.
    pub total: f64,
}

static NO_FORCES: Forces = Forces::ZERO;

impl SimContext<'static> {
    /// Context for entities advanced outside any world.
    pub fn standalone() -> Self {
        Self {
            forces: &NO_FORCES,
            tick: 0,
            total: 0.0,
        }
    }
}

/// Opt-in capability for traits that can be restored to a fresh state.
pub trait Resettable {
    fn reset(&mut self, host: &mut Entity);
}

/// A named behavior unit attached to an entity.
///
/// Only `name` is required. Every callback defaults to a no-op, and
/// [`lifecycle`](Trait::lifecycle) narrows which ones the host dispatches.
#[allow(unused_variables)]
pub trait Trait: AsAny {
    /// Unique per host.
    fn name(&self) -> &str;

    fn requires(&self) -> SmallVec<[Requirement; 2]> {
        SmallVec::new()
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &Lifecycle::ALL
    }

    fn on_attach(&mut self, host: &mut Entity) {}

    fn on_detach(&mut self, host: &mut Entity) {}

    fn time_shift(&mut self, host: &mut Entity, dt: f64, ctx: &SimContext<'_>) {}

    fn collides(&mut self, host: &mut Entity, other: &mut Entity, contact: &Contact) {}

    /// `attack` is the side of the host box that ran into `other`.
    fn obstruct(&mut self, host: &mut Entity, other: &mut Entity, attack: Surface, contact: &Contact) {}

    fn uncollides(&mut self, host: &mut Entity, other: &mut Entity) {}

    fn resettable(&mut self) -> Option<&mut dyn Resettable> {
        None
    }
}
