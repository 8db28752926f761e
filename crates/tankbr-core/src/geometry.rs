//! Geometry kernel for collision and line-of-detection tests.
//!
//! Everything here is a pure function over [`Vec2`] values. Stages call into
//! this module; nothing in it touches the entity store.
//!
//! # Conventions
//!
//! - Angles are in degrees, measured counter-clockwise from the +x axis.
//! - Degenerate input (zero-length segments, non-finite coordinates) never
//!   panics and never divides by zero; it reports "no hit".

use glam::Vec2;

/// Squared Euclidean distance between two points.
#[must_use]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Unit direction vector for a facing angle in degrees.
#[must_use]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Normalizes an angle in degrees into `[0, 360)`.
#[must_use]
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Returns true if two circles touch along their boundary ring.
///
/// The test is `(r0 - r1)^2 <= |c0 - c1|^2 <= (r0 + r1)^2`. A small circle
/// lying entirely inside a much larger one is *not* reported as overlapping.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use tankbr_core::geometry::circles_overlap;
///
/// assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 5.0));
/// assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(20.0, 0.0), 5.0));
/// // nested with a large radius difference
/// assert!(!circles_overlap(Vec2::ZERO, 50.0, Vec2::new(1.0, 0.0), 2.0));
/// ```
#[must_use]
pub fn circles_overlap(c0: Vec2, r0: f32, c1: Vec2, r1: f32) -> bool {
    let d2 = distance_squared(c0, c1);
    let low = (r0 - r1) * (r0 - r1);
    let high = (r0 + r1) * (r0 + r1);
    low <= d2 && d2 <= high
}

/// Returns true if the finite segment `p0 -> p1` passes through the circle.
///
/// `seg_len` is the length of the segment, supplied by the caller (sensors
/// already know their range). Three conditions must all hold:
///
/// 1. the target is within `seg_len + radius` of the segment start,
/// 2. the target is within `seg_len` of the segment end (it lies in front),
/// 3. the infinite line through the segment crosses the circle
///    (`radius^2 * |p1 - p0|^2 - D^2 > 0`, `D` being the cross product of
///    the endpoints relative to the circle center).
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use tankbr_core::geometry::segment_intersects_circle;
///
/// let start = Vec2::ZERO;
/// let end = Vec2::new(100.0, 0.0);
/// assert!(segment_intersects_circle(start, end, 100.0, Vec2::new(50.0, 0.0), 1.0));
/// assert!(!segment_intersects_circle(start, end, 100.0, Vec2::new(-10.0, 0.0), 1.0));
/// ```
#[must_use]
pub fn segment_intersects_circle(
    p0: Vec2,
    p1: Vec2,
    seg_len: f32,
    center: Vec2,
    radius: f32,
) -> bool {
    if !(p0.is_finite() && p1.is_finite() && center.is_finite()) {
        return false;
    }
    if seg_len <= 0.0 || p0 == p1 {
        return false;
    }

    let reach = seg_len + radius;
    let in_range = distance_squared(p0, center) < reach * reach;
    let in_front = distance_squared(center, p1) < seg_len * seg_len;

    let a = p0 - center;
    let b = p1 - center;
    let dr_squared = distance_squared(a, b);
    let cross = a.x * b.y - b.x * a.y;
    let discriminant = radius * radius * dr_squared - cross * cross;

    discriminant > 0.0 && in_front && in_range
}
