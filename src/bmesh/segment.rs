use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::{
    element::{NodeH, VH},
    error::Error,
    mesh::PolyMesh,
    vector,
};

/// The ring of points at one end of a tube.
///
/// `axis` is the direction from the node that owns the ring towards the
/// other end of the tube. The points go counter-clockwise around `axis`, so
/// the tube walks the ring edges forward and the joint walks them backward.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Ring {
    pub center: Vec3,
    pub axis: Vec3,
    pub points: Vec<Vec3>,
}

impl Ring {
    /// `count` points evenly spaced on the ellipse around `center` in the
    /// plane perpendicular to `normal`. The first point is in the direction
    /// of `up`, as far as possible. `radii.x` is the radius along that
    /// direction and `radii.y` the radius across it.
    pub fn ellipse(center: Vec3, normal: Vec3, up: Vec3, radii: Vec2, count: usize) -> Vec<Vec3> {
        let (e1, e2) = vector::frame(normal, up);
        (0..count)
            .map(|k| {
                let t = TAU * k as f32 / count as f32;
                center + e1 * (t.cos() * radii.x) + e2 * (t.sin() * radii.y)
            })
            .collect()
    }

    pub fn new(center: Vec3, axis: Vec3, up: Vec3, radii: Vec2, count: usize) -> Self {
        Ring {
            center,
            axis,
            points: Self::ellipse(center, axis, up, radii, count),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The same points in the opposite order, starting from the same point.
    pub fn reversed_points(&self) -> Vec<Vec3> {
        let n = self.points.len();
        (0..n).map(|k| self.points[(n - k) % n]).collect()
    }
}

fn vh(i: usize) -> VH {
    (i as u32).into()
}

/// Rotation of the far ring that best lines it up with the near ring.
fn best_shift(near: &[Vec3], far: &[Vec3]) -> usize {
    let n = near.len();
    let twist = |s: usize| -> f32 {
        near.iter()
            .enumerate()
            .map(|(k, p)| p.distance_squared(far[(k + s) % n]))
            .sum()
    };
    (0..n)
        .map(|s| (s, twist(s)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(s, _)| s)
        .unwrap_or(0)
}

/// Open tube of quads connecting the ring of `a` towards `b` with the ring of
/// `b` towards `a`. Fails if the rings are closer than `min_length` along the
/// edge, or on the wrong side of each other.
pub(super) fn tube(
    a: NodeH,
    b: NodeH,
    near: &Ring,
    far: &Ring,
    min_length: f32,
) -> Result<PolyMesh, Error> {
    let n = near.len();
    if far.len() != n || n < 3 {
        return Err(Error::UnresolvedJoint(a));
    }
    let separation = (far.center - near.center).dot(near.axis);
    if separation < min_length.max(vector::EPSILON) {
        return Err(Error::ShortEdge(a, b));
    }
    // Same winding as the near ring.
    let far_points = far.reversed_points();
    let shift = best_shift(&near.points, &far_points);
    let mut mesh = PolyMesh::with_capacity(2 * n, n);
    mesh.add_vertices(&near.points)?;
    mesh.add_vertices(&far_points)?;
    for k in 0..n {
        let k1 = (k + 1) % n;
        mesh.add_quad_face(
            vh(k),
            vh(k1),
            vh(n + (k1 + shift) % n),
            vh(n + (k + shift) % n),
        )?;
    }
    Ok(mesh)
}

#[cfg(test)]
mod test {
    use glam::{Vec2, Vec3, vec3};

    use super::{Ring, best_shift, tube};
    use crate::{error::ErrorKind, macros::assert_vec3_eq};

    #[test]
    fn t_ring_winding() {
        let ring = Ring::new(Vec3::ZERO, Vec3::Z, Vec3::X, Vec2::splat(2.0), 8);
        assert_eq!(8, ring.len());
        assert_vec3_eq!(vec3(2.0, 0.0, 0.0), ring.points[0]);
        assert_vec3_eq!(vec3(0.0, 2.0, 0.0), ring.points[2]);
        let rev = ring.reversed_points();
        assert_eq!(ring.points[0], rev[0]);
        assert_eq!(ring.points[7], rev[1]);
    }

    #[test]
    fn t_ellipse_radii() {
        let ring = Ring::new(Vec3::ZERO, Vec3::Z, Vec3::X, Vec2::new(2.0, 0.5), 8);
        assert_vec3_eq!(vec3(2.0, 0.0, 0.0), ring.points[0]);
        assert_vec3_eq!(vec3(0.0, 0.5, 0.0), ring.points[2]);
        assert_vec3_eq!(vec3(-2.0, 0.0, 0.0), ring.points[4]);
    }

    #[test]
    fn t_best_shift() {
        let near = Ring::new(Vec3::ZERO, Vec3::Z, Vec3::X, Vec2::splat(1.0), 6);
        let mut far = near.points.clone();
        far.rotate_left(2);
        assert_eq!(4, best_shift(&near.points, &far));
        assert_eq!(0, best_shift(&near.points, &near.points));
    }

    #[test]
    fn t_tube_faces_outward() {
        let near = Ring::new(Vec3::ZERO, Vec3::Z, Vec3::X, Vec2::splat(1.0), 8);
        let far = Ring::new(vec3(0.0, 0.0, 3.0), -Vec3::Z, Vec3::Y, Vec2::splat(0.5), 8);
        let mesh = tube(0.into(), 1.into(), &near, &far, 1e-4).expect("Cannot make tube");
        assert_eq!(16, mesh.num_vertices());
        assert_eq!(8, mesh.num_faces());
        // Two boundary loops, one per ring.
        assert_eq!(16, mesh.topology().boundary_edges().count());
        for (f, n) in mesh.faces().zip(mesh.calc_face_normals()) {
            let c = mesh.calc_face_centroid(f);
            let radial = vec3(c.x, c.y, 0.0);
            assert!(n.dot(radial) > 0.0);
        }
    }

    #[test]
    fn t_tube_inverted_rings() {
        let near = Ring::new(vec3(0.0, 0.0, 2.0), Vec3::Z, Vec3::X, Vec2::splat(1.0), 8);
        let far = Ring::new(vec3(0.0, 0.0, 1.0), -Vec3::Z, Vec3::X, Vec2::splat(1.0), 8);
        let err = tube(0.into(), 1.into(), &near, &far, 1e-4).expect_err("Inverted tube was built");
        assert_eq!(ErrorKind::DegenerateEdge, err.kind());
    }
}
