//! Trapezoidal ("Verlet-style") motion integrator.
//!
//! Displacement for a step is the average of the previous and current
//! velocity samples times `dt`. Only the axes the velocity sample carries are
//! touched: a [`DVec2`] sample moves x and y, a [`DVec3`] sample also moves z.

use glam::{DVec2, DVec3};

/// Velocity sample the integrator can apply to a 3D position.
pub trait VelocitySample: Copy + Default {
    /// Add `(previous + current) / 2 * dt` to the tracked axes of `position`.
    fn apply(previous: Self, current: Self, dt: f64, position: &mut DVec3);
}

impl VelocitySample for DVec2 {
    fn apply(previous: Self, current: Self, dt: f64, position: &mut DVec3) {
        let step = (previous + current) * 0.5 * dt;
        position.x += step.x;
        position.y += step.y;
    }
}

impl VelocitySample for DVec3 {
    fn apply(previous: Self, current: Self, dt: f64, position: &mut DVec3) {
        *position += (previous + current) * 0.5 * dt;
    }
}

/// Holds the previous-step velocity sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Verlet<V: VelocitySample> {
    previous: V,
}

impl<V: VelocitySample> Verlet<V> {
    pub fn new() -> Self {
        Self {
            previous: V::default(),
        }
    }

    /// Start from an already-established velocity.
    pub fn with_velocity(previous: V) -> Self {
        Self { previous }
    }

    pub fn previous(&self) -> V {
        self.previous
    }

    /// Advance `position` and remember `velocity` for the next step.
    pub fn integrate(&mut self, position: &mut DVec3, velocity: V, dt: f64) {
        V::apply(self.previous, velocity, dt, position);
        self.previous = velocity;
    }

    /// Forget the stored sample. Call after teleports or attachments so the
    /// next step does not blend in a stale velocity.
    pub fn reset(&mut self) {
        self.previous = V::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn first_step_from_rest_averages_with_zero() {
        let mut v = Verlet::<DVec2>::new();
        let mut pos = DVec3::ZERO;
        v.integrate(&mut pos, DVec2::new(10.0, -4.0), 1.0);
        assert!(approx_eq(pos.x, 5.0));
        assert!(approx_eq(pos.y, -2.0));
        assert_eq!(v.previous(), DVec2::new(10.0, -4.0));
    }

    #[test]
    fn planar_sample_leaves_z_alone() {
        let mut v = Verlet::with_velocity(DVec2::new(1.0, 1.0));
        let mut pos = DVec3::new(0.0, 0.0, 9.0);
        v.integrate(&mut pos, DVec2::new(1.0, 1.0), 2.0);
        assert_eq!(pos, DVec3::new(2.0, 2.0, 9.0));
    }

    #[test]
    fn spatial_sample_moves_z() {
        let mut v = Verlet::with_velocity(DVec3::new(0.0, 0.0, 2.0));
        let mut pos = DVec3::ZERO;
        v.integrate(&mut pos, DVec3::new(0.0, 0.0, 2.0), 0.5);
        assert!(approx_eq(pos.z, 1.0));
    }

    #[test]
    fn substeps_match_single_step_at_constant_velocity() {
        let velocity = DVec2::new(3.5, -1.25);
        let total = 2.0;

        for n in [1usize, 2, 7, 120, 1000] {
            let mut split = Verlet::with_velocity(velocity);
            let mut pos_split = DVec3::ZERO;
            let dt = total / n as f64;
            for _ in 0..n {
                split.integrate(&mut pos_split, velocity, dt);
            }

            let mut whole = Verlet::with_velocity(velocity);
            let mut pos_whole = DVec3::ZERO;
            whole.integrate(&mut pos_whole, velocity, total);

            assert!(approx_eq(pos_split.x, pos_whole.x), "n = {n}");
            assert!(approx_eq(pos_split.y, pos_whole.y), "n = {n}");
        }
    }

    #[test]
    fn reset_prevents_phantom_blend() {
        let mut v = Verlet::with_velocity(DVec2::new(100.0, 0.0));
        v.reset();
        let mut pos = DVec3::ZERO;
        v.integrate(&mut pos, DVec2::ZERO, 1.0);
        assert_eq!(pos, DVec3::ZERO);
    }
}
