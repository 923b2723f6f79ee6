//! Energy pool.
//!
//! Damage and healing announce themselves on the host bus as
//! `Custom { name: "hurt" }` and `Custom { name: "heal" }`; running out of
//! energy announces `Custom { name: "death" }` once. The host's `health`
//! scalar signal mirrors the remaining fraction for animation rules.

use crate::components::entity::Entity;
use crate::events::lifecycle::{EntityEvent, Lifecycle};
use crate::traits::invincibility::Invincibility;
use crate::traits::{Resettable, Trait};

pub const EVENT_HURT: &str = "hurt";
pub const EVENT_HEAL: &str = "heal";
pub const EVENT_DEATH: &str = "death";

#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    pub max: f64,
    energy: f64,
    /// Ignore damage while set. [`Health::kill`] still applies.
    pub infinite: bool,
    hits: u64,
}

impl Health {
    pub fn new(max: f64) -> Self {
        Self {
            max,
            energy: max,
            infinite: false,
            hits: 0,
        }
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn fraction(&self) -> f64 {
        if self.max > 0.0 { self.energy / self.max } else { 0.0 }
    }

    pub fn is_depleted(&self) -> bool {
        self.energy <= 0.0
    }

    /// Damage taken so far.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Subtract `points`. Returns whether damage was taken. A landed hit
    /// opens the host's [`Invincibility`] window, if it has one.
    pub fn inflict(&mut self, host: &mut Entity, points: f64) -> bool {
        if self.infinite || self.is_depleted() {
            return false;
        }
        self.energy = (self.energy - points).clamp(0.0, self.max);
        self.hits += 1;
        if host.is_trait_enabled::<Invincibility>() {
            self.infinite = host
                .with_trait::<Invincibility, _>(|inv, _| inv.start_window())
                .unwrap_or(false);
        }
        self.publish(host);
        host.events().trigger(&EntityEvent::Custom { name: EVENT_HURT });
        if self.is_depleted() {
            host.events().trigger(&EntityEvent::Custom { name: EVENT_DEATH });
        }
        true
    }

    pub fn heal(&mut self, host: &mut Entity, points: f64) {
        if self.is_depleted() {
            return;
        }
        self.energy = (self.energy + points).min(self.max);
        self.publish(host);
        host.events().trigger(&EntityEvent::Custom { name: EVENT_HEAL });
    }

    /// Drop energy to zero regardless of `infinite`.
    pub fn kill(&mut self, host: &mut Entity) {
        if self.is_depleted() {
            return;
        }
        self.energy = 0.0;
        self.publish(host);
        host.events().trigger(&EntityEvent::Custom { name: EVENT_DEATH });
    }

    /// Back to full energy.
    pub fn fill(&mut self, host: &mut Entity) {
        self.energy = self.max;
        self.publish(host);
    }

    fn publish(&self, host: &mut Entity) {
        host.signals.set_scalar("health", self.fraction());
    }

    /// Inflict on `target`'s health, if it has one.
    pub fn inflict_on(target: &mut Entity, points: f64) -> bool {
        target
            .with_trait::<Health, _>(|health, host| health.inflict(host, points))
            .unwrap_or(false)
    }
}

impl Trait for Health {
    fn name(&self) -> &str {
        "health"
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[]
    }

    fn on_attach(&mut self, host: &mut Entity) {
        self.publish(host);
    }

    fn resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for Health {
    fn reset(&mut self, host: &mut Entity) {
        self.infinite = false;
        self.hits = 0;
        self.fill(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::lifecycle::EntityEventKind;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn damage_clamps_and_announces_death_once() {
        let mut e = Entity::new();
        e.apply_trait(Health::new(30.0)).expect("attach");
        let deaths = Rc::new(Cell::new(0));
        let d = Rc::clone(&deaths);
        e.events()
            .on(EntityEventKind::Custom(EVENT_DEATH), move |_| d.set(d.get() + 1));

        assert!(Health::inflict_on(&mut e, 20.0));
        assert_eq!(e.get_trait::<Health>().map(Health::energy), Some(10.0));
        assert!(Health::inflict_on(&mut e, 50.0));
        assert!(!Health::inflict_on(&mut e, 5.0));
        assert_eq!(e.get_trait::<Health>().map(Health::energy), Some(0.0));
        assert_eq!(deaths.get(), 1);
        assert_eq!(e.signals.get_scalar("health"), Some(0.0));
    }

    #[test]
    fn infinite_ignores_damage_but_not_kill() {
        let mut e = Entity::new();
        let mut health = Health::new(10.0);
        health.infinite = true;
        e.apply_trait(health).expect("attach");
        assert!(!Health::inflict_on(&mut e, 5.0));
        e.with_trait::<Health, _>(|h, host| h.kill(host));
        assert!(e.get_trait::<Health>().is_some_and(Health::is_depleted));
    }

    #[test]
    fn reset_restores_full_energy() {
        let mut e = Entity::new();
        e.apply_trait(Health::new(10.0)).expect("attach");
        Health::inflict_on(&mut e, 4.0);
        e.reset();
        let health = e.get_trait::<Health>().expect("attached");
        assert_eq!((health.energy(), health.hits()), (10.0, 0));
    }

    #[test]
    fn without_health_nothing_happens() {
        let mut e = Entity::new();
        assert!(!Health::inflict_on(&mut e, 1.0));
    }
}
