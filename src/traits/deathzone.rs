use crate::components::entity::Entity;
use crate::events::lifecycle::Lifecycle;
use crate::traits::health::Health;
use crate::traits::{Contact, Trait};

/// Kills the [`Health`] of anything that touches it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeathZone;

impl Trait for DeathZone {
    fn name(&self) -> &str {
        "death_zone"
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[Lifecycle::Collide]
    }

    fn collides(&mut self, _host: &mut Entity, other: &mut Entity, _contact: &Contact) {
        other.with_trait::<Health, _>(|health, victim| {
            if !health.is_depleted() {
                health.kill(victim);
            }
        });
    }
}
