use glam::Vec3;

use crate::error::Error;

/// Lengths below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Normalize `v`, or fail if it has no meaningful direction.
pub fn try_normalize(v: Vec3) -> Result<Vec3, Error> {
    if !v.is_finite() || v.length_squared() < EPSILON * EPSILON {
        return Err(Error::DegenerateVector);
    }
    Ok(v.normalize())
}

/// Unit vector pointing from `from` to `to`.
pub fn direction(from: Vec3, to: Vec3) -> Result<Vec3, Error> {
    try_normalize(to - from)
}

pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Component of `v` perpendicular to the unit vector `axis`.
pub fn reject(v: Vec3, axis: Vec3) -> Vec3 {
    v - axis * v.dot(axis)
}

/// Two unit vectors `(e1, e2)` such that `(e1, e2, axis)` is a right handed
/// orthonormal frame, with `e1` as close to `up` as possible. Points
/// generated as `cos(t) * e1 + sin(t) * e2` go counter-clockwise around
/// `axis`. When `up` is parallel to `axis` an arbitrary perpendicular is
/// used.
pub fn frame(axis: Vec3, up: Vec3) -> (Vec3, Vec3) {
    let r = reject(up, axis);
    let e1 = if r.length_squared() > 1e-6 {
        r.normalize()
    } else {
        axis.any_orthonormal_vector()
    };
    (e1, axis.cross(e1))
}

/// Angle of `v` around `axis`, measured counter-clockwise from `e1` of the
/// frame `(e1, e2, axis)`. In the range `(-pi, pi]`.
pub fn angle_around(v: Vec3, e1: Vec3, e2: Vec3) -> f32 {
    v.dot(e2).atan2(v.dot(e1))
}

/// Twice the area weighted normal of the triangle, following the right hand
/// rule.
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Check if `p` is inside the triangle `(a, b, c)` or on its boundary, with
/// all points assumed to lie in the plane with the given `normal`.
pub fn point_in_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3, normal: Vec3) -> bool {
    let s0 = triangle_normal(a, b, p).dot(normal);
    let s1 = triangle_normal(b, c, p).dot(normal);
    let s2 = triangle_normal(c, a, p).dot(normal);
    (s0 >= 0.0 && s1 >= 0.0 && s2 >= 0.0) || (s0 <= 0.0 && s1 <= 0.0 && s2 <= 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Sphere { center, radius }
    }

    /// How far the two spheres penetrate each other. Negative when they are
    /// apart.
    pub fn penetration(&self, other: &Sphere) -> f32 {
        self.radius + other.radius - self.center.distance(other.center)
    }

    /// Spheres overlap meaningfully when they penetrate by more than a small
    /// fraction of the smaller radius. Touching spheres do not overlap.
    pub fn overlaps(&self, other: &Sphere) -> bool {
        self.penetration(other) > 1e-3 * self.radius.min(other.radius)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }
}
