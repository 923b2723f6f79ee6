//! Fixed-step simulation clock.

/// Default fixed step: 120 simulation steps per second.
pub const DEFAULT_STEP: f64 = 1.0 / 120.0;

/// Slack used when comparing the accumulator against the step, so deltas that
/// are exact multiples of the step never lose a step to rounding.
const ACCUMULATOR_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    /// Length of one fixed step in seconds.
    pub step: f64,
    /// Real time fed in but not yet simulated.
    pub accumulator: f64,
    /// Simulated seconds so far.
    pub total: f64,
    /// Number of completed steps with a positive length.
    pub tick: u64,
    /// Multiplier applied to real time before it is accumulated.
    pub time_stretch: f64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            step: DEFAULT_STEP,
            accumulator: 0.0,
            total: 0.0,
            tick: 0,
            time_stretch: 1.0,
        }
    }
}

impl WorldTime {
    /// Add stretched real time to the accumulator.
    pub fn accumulate(&mut self, real_delta: f64) {
        self.accumulator += real_delta * self.time_stretch;
    }

    /// Take one step off the accumulator if a full step is available.
    pub fn consume_step(&mut self) -> Option<f64> {
        if self.step > 0.0 && self.accumulator + ACCUMULATOR_EPSILON >= self.step {
            self.accumulator -= self.step;
            Some(self.step)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_whole_steps_only() {
        let mut time = WorldTime {
            step: 0.5,
            ..Default::default()
        };
        time.accumulate(1.2);
        assert_eq!(time.consume_step(), Some(0.5));
        assert_eq!(time.consume_step(), Some(0.5));
        assert_eq!(time.consume_step(), None);
        assert!((time.accumulator - 0.2).abs() < 1e-12);
    }

    #[test]
    fn stretch_scales_accumulated_time() {
        let mut time = WorldTime {
            step: 0.1,
            time_stretch: 0.5,
            ..Default::default()
        };
        time.accumulate(0.4);
        let mut steps = 0;
        while time.consume_step().is_some() {
            steps += 1;
        }
        assert_eq!(steps, 2);
    }

    #[test]
    fn zero_step_never_loops() {
        let mut time = WorldTime {
            step: 0.0,
            ..Default::default()
        };
        time.accumulate(1.0);
        assert_eq!(time.consume_step(), None);
    }
}
