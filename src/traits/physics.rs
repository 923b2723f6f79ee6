//! Velocity from forces.
//!
//! [`Physics`] turns world gravity and wind plus any named forces of its own
//! into velocity each step, applies drag and an optional speed cap, and
//! cancels the velocity component driving into a surface when obstructed.
//!
//! ```ignore
//! let mut physics = Physics::new(2.0);
//! physics.add_force("thrust", DVec2::new(0.0, 400.0));
//! physics.set_force_enabled("thrust", false);
//! ```

use glam::DVec2;

use crate::components::entity::Entity;
use crate::events::lifecycle::{Lifecycle, Surface};
use crate::traits::{Contact, SimContext, Trait};

/// A named acceleration that can be toggled on/off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerationForce {
    /// Units per second squared.
    pub value: DVec2,
    pub enabled: bool,
}

impl AccelerationForce {
    pub fn new(value: DVec2) -> Self {
        Self {
            value,
            enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Physics {
    /// Scales how strongly wind pushes the body. Zero ignores wind.
    pub mass: f64,
    /// Velocity damping: `velocity *= 1 - drag * dt`.
    pub drag: f64,
    pub gravity_scale: f64,
    pub max_speed: Option<f64>,
    forces: Vec<(String, AccelerationForce)>,
}

impl Default for Physics {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Physics {
    pub fn new(mass: f64) -> Self {
        Self {
            mass,
            drag: 0.0,
            gravity_scale: 1.0,
            max_speed: None,
            forces: Vec::new(),
        }
    }

    pub fn with_drag(mut self, drag: f64) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    /// Add or replace a named force. Forces apply in insertion order.
    pub fn add_force(&mut self, name: impl Into<String>, value: DVec2) {
        let name = name.into();
        match self.forces.iter_mut().find(|(n, _)| *n == name) {
            Some((_, force)) => *force = AccelerationForce::new(value),
            None => self.forces.push((name, AccelerationForce::new(value))),
        }
    }

    pub fn remove_force(&mut self, name: &str) -> Option<AccelerationForce> {
        let index = self.forces.iter().position(|(n, _)| n == name)?;
        Some(self.forces.remove(index).1)
    }

    pub fn set_force_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.forces.iter_mut().find(|(n, _)| n == name) {
            Some((_, force)) => {
                force.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn force(&self, name: &str) -> Option<&AccelerationForce> {
        self.forces.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Sum of world and own accelerations acting on this body.
    pub fn acceleration(&self, ctx: &SimContext<'_>) -> DVec2 {
        let mut total = ctx.forces.gravity * self.gravity_scale;
        if self.mass > 0.0 {
            total += ctx.forces.wind / self.mass;
        }
        for (_, force) in &self.forces {
            if force.enabled {
                total += force.value;
            }
        }
        total
    }
}

impl Trait for Physics {
    fn name(&self) -> &str {
        "physics"
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[Lifecycle::TimeShift, Lifecycle::Obstruct]
    }

    fn time_shift(&mut self, host: &mut Entity, dt: f64, ctx: &SimContext<'_>) {
        host.velocity += self.acceleration(ctx) * dt;
        if self.drag > 0.0 {
            host.velocity *= (1.0 - self.drag * dt).max(0.0);
        }
        if let Some(max) = self.max_speed {
            host.velocity = host.velocity.clamp_length_max(max);
        }
    }

    fn obstruct(&mut self, host: &mut Entity, _other: &mut Entity, attack: Surface, _contact: &Contact) {
        let v = &mut host.velocity;
        match attack {
            Surface::Bottom if v.y < 0.0 => v.y = 0.0,
            Surface::Top if v.y > 0.0 => v.y = 0.0,
            Surface::Left if v.x < 0.0 => v.x = 0.0,
            Surface::Right if v.x > 0.0 => v.x = 0.0,
            _ => {}
        }
    }
}
