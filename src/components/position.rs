//! Shared, live-updating entity position.
//!
//! An entity owns exactly one [`SharedPosition`]. Collision boxes and any
//! render-side consumer hold clones of the same handle, so every system reads
//! the same coordinates without copying them around.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use glam::{DVec2, DVec3};

/// Reference-counted position cell.
///
/// Cloning the handle shares the storage; use [`SharedPosition::detached`] to
/// get an independent copy.
#[derive(Clone, Default)]
pub struct SharedPosition(Rc<Cell<DVec3>>);

impl SharedPosition {
    pub fn new(position: DVec3) -> Self {
        Self(Rc::new(Cell::new(position)))
    }

    pub fn get(&self) -> DVec3 {
        self.0.get()
    }

    pub fn set(&self, position: DVec3) {
        self.0.set(position);
    }

    pub fn x(&self) -> f64 {
        self.get().x
    }

    pub fn y(&self) -> f64 {
        self.get().y
    }

    pub fn set_x(&self, x: f64) {
        let mut p = self.get();
        p.x = x;
        self.set(p);
    }

    pub fn set_y(&self, y: f64) {
        let mut p = self.get();
        p.y = y;
        self.set(p);
    }

    /// Planar part of the position.
    pub fn xy(&self) -> DVec2 {
        self.get().truncate()
    }

    /// Set x and y, leaving z (render depth) untouched.
    pub fn set_xy(&self, xy: DVec2) {
        let z = self.get().z;
        self.set(xy.extend(z));
    }

    /// True when both handles point at the same storage.
    pub fn same_as(&self, other: &SharedPosition) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Independent copy of the current value.
    pub fn detached(&self) -> Self {
        Self::new(self.get())
    }
}

impl fmt::Debug for SharedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedPosition").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let a = SharedPosition::new(DVec3::new(1.0, 2.0, 3.0));
        let b = a.clone();
        b.set_x(7.0);
        assert_eq!(a.get(), DVec3::new(7.0, 2.0, 3.0));
        assert!(a.same_as(&b));
    }

    #[test]
    fn detached_copy_is_independent() {
        let a = SharedPosition::new(DVec3::ZERO);
        let b = a.detached();
        b.set_xy(DVec2::new(4.0, 5.0));
        assert_eq!(a.get(), DVec3::ZERO);
        assert!(!a.same_as(&b));
    }
}
