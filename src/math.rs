//! Small geometry and interpolation helpers shared by collision and traits.
//!
//! Rectangles are centre-anchored: `(x, y)` is the centre and `(w, h)` the
//! full extent.

/// Linear interpolation between `start` and `end`.
pub fn apply_ratio(ratio: f64, start: f64, end: f64) -> f64 {
    start + (end - start) * ratio
}

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Inverse of [`apply_ratio`]: where `pos` sits between `low` and `high`.
pub fn find_ratio(pos: f64, low: f64, high: f64) -> f64 {
    (pos - low) / (high - low)
}

/// Two centre-anchored boxes overlap iff both axis projections overlap.
///
/// Touching edges do not count as overlap.
#[allow(clippy::too_many_arguments)]
pub fn rectangles_intersect(
    x1: f64,
    y1: f64,
    w1: f64,
    h1: f64,
    x2: f64,
    y2: f64,
    w2: f64,
    h2: f64,
) -> bool {
    let (w1, h1, w2, h2) = (w1 / 2.0, h1 / 2.0, w2 / 2.0, h2 / 2.0);
    x1 + w1 > x2 - w2 && x1 - w1 < x2 + w2 && y1 + h1 > y2 - h2 && y1 - h1 < y2 + h2
}

/// Strict circle overlap.
pub fn circles_intersect(r1: f64, r2: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> bool {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let radii = r1 + r2;
    dx * dx + dy * dy < radii * radii
}

/// Circle of radius `r` at `(x, y)` against a centre-anchored rectangle.
#[allow(clippy::too_many_arguments)]
pub fn circle_in_rectangle(r: f64, x: f64, y: f64, a: f64, b: f64, w: f64, h: f64) -> bool {
    let cx = (x - a).abs();
    let cy = (y - b).abs();

    if cx > w / 2.0 + r || cy > h / 2.0 + r {
        return false;
    }
    if cx <= w / 2.0 || cy <= h / 2.0 {
        return true;
    }

    let corner_sq = (cx - w / 2.0).powi(2) + (cy - h / 2.0).powi(2);
    corner_sq <= r * r
}
