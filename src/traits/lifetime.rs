//! Removes its host from the world after a fixed amount of local time.

use crate::components::entity::Entity;
use crate::events::lifecycle::Lifecycle;
use crate::traits::{Resettable, SimContext, Trait};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    /// Seconds of host time before removal.
    pub duration: f64,
    elapsed: f64,
    expired: bool,
}

impl Lifetime {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            expired: false,
        }
    }

    pub fn remaining(&self) -> f64 {
        (self.duration - self.elapsed).max(0.0)
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

impl Trait for Lifetime {
    fn name(&self) -> &str {
        "lifetime"
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[Lifecycle::TimeShift]
    }

    fn time_shift(&mut self, host: &mut Entity, dt: f64, _ctx: &SimContext<'_>) {
        if self.expired {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.expired = true;
            host.remove_from_world();
        }
    }

    fn resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for Lifetime {
    fn reset(&mut self, _host: &mut Entity) {
        self.elapsed = 0.0;
        self.expired = false;
    }
}
