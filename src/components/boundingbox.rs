use glam::DVec2;

use crate::components::position::SharedPosition;
use crate::math::rectangles_intersect;

/// Axis-aligned collision box anchored to an owner position.
///
/// Edges are derived on every read from the shared owner position plus a
/// fixed offset, so moving the owner moves the box. Writing an edge moves the
/// owner instead of the box.
#[derive(Debug, Clone)]
pub struct BoundingBox {
    position: SharedPosition,
    offset: DVec2,
    size: DVec2,
    half: DVec2,
}

impl BoundingBox {
    /// Create a box of `size` centred at `position + offset`.
    ///
    /// Negative sizes are normalised so `left <= right` and `bottom <= top`.
    pub fn new(position: SharedPosition, size: DVec2, offset: DVec2) -> Self {
        let size = size.abs();
        Self {
            position,
            offset,
            size,
            half: size / 2.0,
        }
    }

    pub fn position(&self) -> &SharedPosition {
        &self.position
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    /// Centre x in world space.
    pub fn x(&self) -> f64 {
        self.position.x() + self.offset.x
    }

    pub fn set_x(&self, v: f64) {
        self.position.set_x(v - self.offset.x);
    }

    /// Centre y in world space.
    pub fn y(&self) -> f64 {
        self.position.y() + self.offset.y
    }

    pub fn set_y(&self, v: f64) {
        self.position.set_y(v - self.offset.y);
    }

    pub fn left(&self) -> f64 {
        self.x() - self.half.x
    }

    pub fn set_left(&self, v: f64) {
        self.set_x(v + self.half.x);
    }

    pub fn right(&self) -> f64 {
        self.x() + self.half.x
    }

    pub fn set_right(&self, v: f64) {
        self.set_x(v - self.half.x);
    }

    pub fn top(&self) -> f64 {
        self.y() + self.half.y
    }

    pub fn set_top(&self, v: f64) {
        self.set_y(v - self.half.y);
    }

    pub fn bottom(&self) -> f64 {
        self.y() - self.half.y
    }

    pub fn set_bottom(&self, v: f64) {
        self.set_y(v + self.half.y);
    }

    /// AABB vs AABB overlap test; touching edges are not an overlap.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        rectangles_intersect(
            self.x(),
            self.y(),
            self.size.x,
            self.size.y,
            other.x(),
            other.y(),
            other.size.x,
            other.size.y,
        )
    }

    /// Point containment in world space, edges inclusive.
    pub fn contains_point(&self, point: DVec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.bottom()
            && point.y <= self.top()
    }
}
