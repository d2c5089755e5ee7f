//! Gift wrapping of rings of points lying on a common sphere.
//!
//! The result is the convex hull of all the points, without the flat faces
//! spanning each ring. Every ring edge is a boundary edge of the result, left
//! open for the tube attached to the ring.

use std::collections::{HashMap, HashSet, VecDeque};

use glam::Vec3;

use super::segment::Ring;
use crate::vector::{EPSILON, reject, triangle_normal};

/// Dihedral and angular differences below this are ties.
const TIE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum WrapFailure {
    /// Points of other rings lie in front of the plane of this ring.
    RingOverlap(usize),
    /// No point could close the edge between the two points.
    NoPivot(usize, usize),
    /// Wrapping produced more triangles than a hull of the points can have.
    Runaway,
    /// A point was not used by any triangle.
    UnusedPoint(usize),
    /// A point lies in front of a triangle.
    NotConvex(usize),
}

struct Wrapper<'a> {
    points: &'a [Vec3],
    ring_of: &'a [usize],
    /// Directed edges already used by a tube or a triangle.
    used: HashSet<(usize, usize)>,
    /// Directed edges waiting for a triangle on the other side, with a point
    /// on the face they already have.
    front: HashMap<(usize, usize), Vec3>,
    queue: VecDeque<(usize, usize)>,
}

impl Wrapper<'_> {
    fn push(&mut self, edge: (usize, usize), reference: Vec3) {
        self.used.insert(edge);
        if self.front.remove(&(edge.1, edge.0)).is_none() {
            self.front.insert(edge, reference);
            self.queue.push_back(edge);
        }
    }

    /// The point `x` completing the triangle `(b, a, x)` of the hull on the
    /// other side of the edge from `reference`. Coplanar candidates are
    /// resolved in favor of the widest angle at `a`, then the lowest index.
    fn pivot(&self, a: usize, b: usize, reference: Vec3) -> Option<usize> {
        let (pa, pb) = (self.points[a], self.points[b]);
        let e = (pb - pa).normalize_or_zero();
        let wf = reject(reference - pa, e).normalize_or_zero();
        let mut best: Option<(usize, f32, f32)> = None;
        for (x, px) in self.points.iter().enumerate() {
            if x == a
                || x == b
                || (self.ring_of[x] == self.ring_of[a] && self.ring_of[x] == self.ring_of[b])
                || self.used.contains(&(a, x))
                || self.used.contains(&(x, b))
            {
                continue;
            }
            let w = reject(*px - pa, e);
            if w.length_squared() < EPSILON * EPSILON {
                continue;
            }
            let dihedral = wf.dot(w.normalize());
            let spread = e.dot((*px - pa).normalize_or_zero());
            best = match best {
                Some((_, bd, bs))
                    if dihedral < bd - TIE || (dihedral <= bd + TIE && spread < bs - TIE) =>
                {
                    Some((x, dihedral, spread))
                }
                None => Some((x, dihedral, spread)),
                current => current,
            };
        }
        best.map(|(x, _, _)| x)
    }
}

/// Wrap the rings, returning the points of all rings in order and the
/// triangles indexing into them. `tolerance` is the distance by which a point
/// may lie in front of a triangle.
pub(super) fn wrap(
    rings: &[Ring],
    tolerance: f32,
) -> Result<(Vec<Vec3>, Vec<[usize; 3]>), WrapFailure> {
    let points: Vec<Vec3> = rings.iter().flat_map(|r| r.points.iter().copied()).collect();
    let ring_of: Vec<usize> = rings
        .iter()
        .enumerate()
        .flat_map(|(ri, r)| std::iter::repeat_n(ri, r.len()))
        .collect();
    for (ri, ring) in rings.iter().enumerate() {
        if points
            .iter()
            .zip(ring_of.iter())
            .any(|(p, r)| *r != ri && ring.axis.dot(*p - ring.center) > tolerance)
        {
            return Err(WrapFailure::RingOverlap(ri));
        }
    }
    let mut wrapper = Wrapper {
        points: &points,
        ring_of: &ring_of,
        used: HashSet::new(),
        front: HashMap::new(),
        queue: VecDeque::new(),
    };
    let mut offset = 0usize;
    for ring in rings {
        let n = ring.len();
        for k in 0..n {
            wrapper.push((offset + k, offset + (k + 1) % n), ring.center);
        }
        offset += n;
    }
    // Euler's formula bounds the number of triangles.
    let max_triangles = 2 * points.len();
    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(max_triangles);
    while let Some((a, b)) = wrapper.queue.pop_front() {
        let Some(reference) = wrapper.front.remove(&(a, b)) else {
            // Closed by a later triangle.
            continue;
        };
        if triangles.len() >= max_triangles {
            return Err(WrapFailure::Runaway);
        }
        let x = wrapper
            .pivot(a, b, reference)
            .ok_or(WrapFailure::NoPivot(a, b))?;
        triangles.push([b, a, x]);
        wrapper.used.insert((b, a));
        wrapper.push((a, x), points[b]);
        wrapper.push((x, b), points[a]);
    }
    let mut used_points = vec![false; points.len()];
    for &i in triangles.iter().flatten() {
        used_points[i] = true;
    }
    if let Some(i) = used_points.iter().position(|u| !u) {
        return Err(WrapFailure::UnusedPoint(i));
    }
    for (ti, [a, b, c]) in triangles.iter().enumerate() {
        let normal = triangle_normal(points[*a], points[*b], points[*c]);
        let len = normal.length();
        if points
            .iter()
            .any(|p| normal.dot(*p - points[*a]) > tolerance * len)
        {
            return Err(WrapFailure::NotConvex(ti));
        }
    }
    Ok((points, triangles))
}
