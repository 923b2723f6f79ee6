//! Obstruction along a resolved surface.
//!
//! When something overlaps a [`Solid`], the solid works out which side of the
//! intruder made contact (smallest penetration wins), pushes the intruder back
//! out along that axis and reports it through [`Entity::obstruct`]. Each side
//! of the solid can be switched off, e.g. for one-way platforms.

use crate::components::boundingbox::BoundingBox;
use crate::components::entity::Entity;
use crate::events::lifecycle::{Lifecycle, Surface};
use crate::traits::{Contact, Trait};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solid {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Default for Solid {
    fn default() -> Self {
        Self::new()
    }
}

impl Solid {
    pub fn new() -> Self {
        Self {
            top: true,
            bottom: true,
            left: true,
            right: true,
        }
    }

    /// Only landing on top is blocked.
    pub fn one_way() -> Self {
        Self {
            top: true,
            bottom: false,
            left: false,
            right: false,
        }
    }

    /// Side of `attacker` that ran into `solid`, by smallest penetration.
    /// Vertical contact wins ties.
    pub fn attack_direction(solid: &BoundingBox, attacker: &BoundingBox) -> Surface {
        let candidates = [
            (Surface::Bottom, solid.top() - attacker.bottom()),
            (Surface::Top, attacker.top() - solid.bottom()),
            (Surface::Right, attacker.right() - solid.left()),
            (Surface::Left, solid.right() - attacker.left()),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        best.0
    }

    /// Whether this solid blocks an attacker hitting it with `attack`.
    pub fn blocks(&self, attack: Surface) -> bool {
        match attack {
            Surface::Bottom => self.top,
            Surface::Top => self.bottom,
            Surface::Right => self.left,
            Surface::Left => self.right,
        }
    }
}

/// Move `attacker` so that its `attack` side rests on `solid`.
pub fn push_out(solid: &BoundingBox, attacker: &BoundingBox, attack: Surface) {
    match attack {
        Surface::Bottom => attacker.set_bottom(solid.top()),
        Surface::Top => attacker.set_top(solid.bottom()),
        Surface::Right => attacker.set_right(solid.left()),
        Surface::Left => attacker.set_left(solid.right()),
    }
}

impl Trait for Solid {
    fn name(&self) -> &str {
        "solid"
    }

    fn lifecycle(&self) -> &'static [Lifecycle] {
        &[Lifecycle::Collide]
    }

    fn collides(&mut self, host: &mut Entity, other: &mut Entity, contact: &Contact) {
        if other.has_trait::<Solid>() {
            return;
        }
        let attack = Solid::attack_direction(&contact.ours, &contact.theirs);
        if !self.blocks(attack) {
            return;
        }
        push_out(&contact.ours, &contact.theirs, attack);
        other.obstruct(host, attack, &contact.flipped());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::position::SharedPosition;
    use glam::{DVec2, DVec3};

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox::new(
            SharedPosition::new(DVec3::new(x, y, 0.0)),
            DVec2::new(w, h),
            DVec2::ZERO,
        )
    }

    #[test]
    fn landing_on_top_is_a_bottom_attack() {
        let floor = boxed(0.0, 0.0, 100.0, 10.0);
        let feet = boxed(0.0, 9.0, 10.0, 10.0);
        assert_eq!(Solid::attack_direction(&floor, &feet), Surface::Bottom);
        push_out(&floor, &feet, Surface::Bottom);
        assert_eq!(feet.bottom(), 5.0);
    }

    #[test]
    fn running_into_a_wall_is_a_side_attack() {
        let wall = boxed(0.0, 0.0, 10.0, 100.0);
        let runner = boxed(-8.0, 0.0, 10.0, 10.0);
        assert_eq!(Solid::attack_direction(&wall, &runner), Surface::Right);
        let other = boxed(8.0, 0.0, 10.0, 10.0);
        assert_eq!(Solid::attack_direction(&wall, &other), Surface::Left);
    }

    #[test]
    fn one_way_only_blocks_from_above() {
        let platform = Solid::one_way();
        assert!(platform.blocks(Surface::Bottom));
        assert!(!platform.blocks(Surface::Top));
        assert!(!platform.blocks(Surface::Left));
    }
}
