//! Global force fields entities may consult during a time shift.

use glam::DVec2;

/// World-wide accelerations, in units per second squared.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Forces {
    pub gravity: DVec2,
    /// Applied scaled by the inverse of a body's mass.
    pub wind: DVec2,
}

impl Forces {
    pub const ZERO: Forces = Forces {
        gravity: DVec2::ZERO,
        wind: DVec2::ZERO,
    };

    pub fn new(gravity: DVec2, wind: DVec2) -> Self {
        Self { gravity, wind }
    }
}
