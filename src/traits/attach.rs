//! Sticks the host to the side of a [`Solid`] it flies into.
//!
//! Hitting a solid from above or below only nudges the host out. Hitting it
//! from the side stops the host, turns off its collision and [`Physics`], and
//! from then on keeps it at a fixed offset from the solid's live position.
//! The host hears `Custom { name: "attach" }` when that happens.

use glam::{DVec2, DVec3};
use log::{debug, warn};

use crate::components::entity::Entity;
use crate::components::position::SharedPosition;
use crate::events::lifecycle::{EntityEvent, Lifecycle, Surface};
use crate::traits::physics::Physics;
use crate::traits::solid::{Solid, push_out};
use crate::traits::{Contact, Resettable, SimContext, Trait};

pub const EVENT_ATTACH: &str = "attach";

#[derive(Debug, Default)]
pub struct Attach {
    attached_to: Option<SharedPosition>,
    offset: DVec3,
}

impl Attach {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.attached_to.is_some()
    }
}

/// Physics is optional on the host.
fn toggle_physics(host: &mut Entity, enabled: bool) {
    if !host.has_trait::<Physics>() {
        return;
    }
    if let Err(err) = host.set_trait_enabled::<Physics>(enabled) {
        warn!("{:?}: {err}", host.name);
    }
}

impl Trait for Attach {
    fn name(&self) -> &str {
        "attach"
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[Lifecycle::TimeShift, Lifecycle::Collide]
    }

    fn collides(&mut self, host: &mut Entity, other: &mut Entity, contact: &Contact) {
        if self.is_attached() || !other.has_trait::<Solid>() {
            return;
        }
        let attack = Solid::attack_direction(&contact.theirs, &contact.ours);
        push_out(&contact.theirs, &contact.ours, attack);
        if matches!(attack, Surface::Top | Surface::Bottom) {
            return;
        }

        host.velocity = DVec2::ZERO;
        host.reset_integrator();
        self.offset = host.position().get() - other.position().get();
        self.attached_to = Some(other.position().clone());
        host.collidable = false;
        toggle_physics(host, false);
        debug!("{:?} attached to {:?}", host.name, other.name);
        host.events().trigger(&EntityEvent::Custom { name: EVENT_ATTACH });
    }

    fn time_shift(&mut self, host: &mut Entity, _dt: f64, _ctx: &SimContext<'_>) {
        if let Some(target) = &self.attached_to {
            host.position().set(target.get() + self.offset);
        }
    }

    fn resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for Attach {
    fn reset(&mut self, host: &mut Entity) {
        self.attached_to = None;
        self.offset = DVec3::ZERO;
        host.collidable = true;
        toggle_physics(host, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_turns_physics_and_collision_back_on() {
        let mut e = Entity::named("arrow");
        e.apply_trait(Physics::new(1.0)).expect("physics");
        e.apply_trait(Attach::new()).expect("attach");
        e.collidable = false;
        e.disable_trait::<Physics>().expect("physics");

        e.reset();

        assert!(e.collidable);
        assert!(e.is_trait_enabled::<Physics>());
        assert!(!e.get_trait::<Attach>().is_some_and(Attach::is_attached));
    }

    #[test]
    fn reset_without_physics_is_quiet() {
        let mut e = Entity::named("dart");
        e.apply_trait(Attach::new()).expect("attach");
        e.collidable = false;

        e.reset();

        assert!(e.collidable);
        assert!(!e.has_trait::<Physics>());
    }
}
