use macroquad::math::{Vec2, vec2};
use std::f32::consts::PI;

/// Tolerance used when checking that a direction is a unit vector.
pub const UNIT_TOLERANCE: f32 = 1e-3;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector pointing from `origin` towards `target`.
///
/// `origin` and `target` must differ; the result is undefined otherwise.
#[inline]
pub fn direction(origin: Vec2, target: Vec2) -> Vec2 {
    debug_assert!(origin != target, "direction between coincident points");
    (target - origin) / distance(origin, target)
}

/// Returns true when `v` has unit length within `tolerance`.
#[inline]
pub fn is_unit(v: Vec2, tolerance: f32) -> bool {
    (v.length() - 1.0).abs() <= tolerance
}

/// Rotates `v` by the angle encoded in the unit vector `by`, composing the two
/// like complex numbers.
#[inline]
pub fn rotate_by(v: Vec2, by: Vec2) -> Vec2 {
    debug_assert!(is_unit(by, UNIT_TOLERANCE), "rotation by non-unit vector");
    vec2(v.x * by.x - v.y * by.y, v.x * by.y + v.y * by.x)
}

/// Rotates `v` by `radians`. Equivalent to `rotate_by(v, (cos r, -sin r))`,
/// so a positive angle turns counter-clockwise on a y-down screen.
#[inline]
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    rotate_by(v, vec2(cos, -sin))
}

/// 2-D cross product. Positive when `b` lies on the positive-angle side of `a`
/// in standard math orientation.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Turns `current` towards `desired` by at most `max_radians`.
///
/// The turn side is picked with the sign of the cross product. If the step
/// crosses over `desired` the result snaps to `desired` exactly. Steps are
/// capped at half a turn, past which the side test would wrap around.
pub fn rotate_towards(current: Vec2, desired: Vec2, max_radians: f32) -> Vec2 {
    let max_radians = max_radians.min(PI);
    let gap = cross(current, desired).atan2(current.dot(desired)).abs();
    if gap <= max_radians {
        return desired;
    }

    let was_left = cross(current, desired) > 0.0;
    let step = if was_left { -max_radians } else { max_radians };
    let rotated = rotate(current, step);
    let is_left = cross(rotated, desired) > 0.0;

    if was_left != is_left {
        desired
    } else {
        rotated
    }
}

/// Point `distance` to the left of `p` relative to the heading `dir`.
#[inline]
pub fn leftward(p: Vec2, distance: f32, dir: Vec2) -> Vec2 {
    p + vec2(dir.y, -dir.x) * distance
}

/// Point `distance` to the right of `p` relative to the heading `dir`.
#[inline]
pub fn rightward(p: Vec2, distance: f32, dir: Vec2) -> Vec2 {
    p + vec2(-dir.y, dir.x) * distance
}

#[inline]
pub fn point_in_circle(p: Vec2, center: Vec2, radius: f32) -> bool {
    p.distance_squared(center) < radius * radius
}

/// True when the center distance is strictly below the radius sum.
#[inline]
pub fn circles_overlap(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    let reach = r1 + r2;
    c1.distance_squared(c2) < reach * reach
}

/// True when any point of the closed segment `a`-`b` lies within `radius`
/// of `center`.
pub fn segment_intersects_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();

    let closest = if len_sq == 0.0 {
        a
    } else {
        let t = ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0);
        a + ab * t
    };

    closest.distance_squared(center) <= radius * radius
}

/// True when `p` lies inside the axis-aligned rectangle `[0, size]`.
#[inline]
pub fn point_in_bounds(p: Vec2, size: Vec2) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x <= size.x && p.y <= size.y
}

/// Linear interpolation, not clamped.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Inverse of [`lerp`]: 0 at `a`, 1 at `b`, not clamped.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    (v - a) / (b - a)
}
