//! Temporary immunity after taking damage.
//!
//! [`Health::inflict`] opens the window as soon as a hit lands, so later hits
//! in the same step are refused. Each time shift blinks `visible` until
//! `duration` seconds have passed.

use smallvec::{SmallVec, smallvec};

use crate::components::entity::Entity;
use crate::events::lifecycle::Lifecycle;
use crate::traits::health::Health;
use crate::traits::{Requirement, Resettable, SimContext, Trait};

#[derive(Debug)]
pub struct Invincibility {
    pub duration: f64,
    engaged: bool,
    elapsed: f64,
}

impl Default for Invincibility {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Invincibility {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            engaged: false,
            elapsed: 0.0,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Restart the window. Returns `false` for a zero duration, which never
    /// grants immunity. The caller owns making [`Health`] infinite.
    pub fn start_window(&mut self) -> bool {
        if self.duration == 0.0 {
            return false;
        }
        self.elapsed = 0.0;
        self.engaged = true;
        true
    }

    pub fn engage(&mut self, host: &mut Entity) {
        if !self.start_window() {
            return;
        }
        if let Some(health) = host.get_trait_mut::<Health>() {
            health.infinite = true;
        }
    }

    pub fn disengage(&mut self, host: &mut Entity) {
        if let Some(health) = host.get_trait_mut::<Health>() {
            health.infinite = false;
        }
        host.visible = true;
        self.engaged = false;
    }
}

impl Trait for Invincibility {
    fn name(&self) -> &str {
        "invincibility"
    }

    fn requires(&self) -> SmallVec<[Requirement; 2]> {
        smallvec![Requirement::of::<Health>()]
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[Lifecycle::TimeShift]
    }

    fn on_detach(&mut self, host: &mut Entity) {
        if self.engaged {
            self.disengage(host);
        }
    }

    fn time_shift(&mut self, host: &mut Entity, dt: f64, _ctx: &SimContext<'_>) {
        if !self.engaged {
            return;
        }
        host.visible = !host.visible;
        if self.elapsed >= self.duration {
            self.disengage(host);
        } else {
            self.elapsed += dt;
        }
    }

    fn resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for Invincibility {
    fn reset(&mut self, host: &mut Entity) {
        self.disengage(host);
    }
}
