use glam::Vec3;

use crate::{
    element::{FH, Handle, VH},
    mesh::PolyMesh,
};

impl PolyMesh {
    /// Compute the face normal using Newell's method. Degenerate faces get a
    /// zero normal.
    pub fn calc_face_normal(&self, f: FH) -> Vec3 {
        Self::newell_normal(self.face_points(f)).normalize_or_zero()
    }

    /// Unnormalized Newell normal of a closed polygon. Its length is twice the
    /// area of a planar polygon.
    pub(crate) fn newell_normal(points: impl Iterator<Item = Vec3> + Clone) -> Vec3 {
        let next = points.clone().cycle().skip(1);
        points.zip(next).fold(Vec3::ZERO, |total, (pc, pn)| {
            let (a, b) = (pc - pn, pc + pn);
            total + Vec3::new(a.y * b.z, a.z * b.x, a.x * b.y)
        })
    }

    pub fn calc_face_normals(&self) -> Vec<Vec3> {
        self.faces().map(|f| self.calc_face_normal(f)).collect()
    }

    pub fn calc_face_centroid(&self, f: FH) -> Vec3 {
        let (count, total) = self
            .face_points(f)
            .fold((0usize, Vec3::ZERO), |(count, total), p| (count + 1, total + p));
        total / count as f32
    }

    /// Vertex normals computed as the normalized sum of the normals of the
    /// incident faces. Vertices without faces get a zero normal.
    pub fn calc_vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.num_vertices()];
        for f in self.faces() {
            let fnormal = self.calc_face_normal(f);
            for v in self.fv_ccw_iter(f) {
                normals[v.index() as usize] += fnormal;
            }
        }
        for n in normals.iter_mut() {
            *n = n.normalize_or_zero();
        }
        normals
    }

    pub fn calc_vertex_normal(&self, v: VH) -> Vec3 {
        self.faces()
            .filter(|f| self.face_vertices(*f).contains(&v))
            .fold(Vec3::ZERO, |total, f| total + self.calc_face_normal(f))
            .normalize_or_zero()
    }

    /// Area of the face `f`. Exact for planar faces, convex or not.
    pub fn calc_face_area(&self, f: FH) -> f32 {
        Self::newell_normal(self.face_points(f)).length() * 0.5
    }

    pub fn calc_area(&self) -> f32 {
        self.faces().map(|f| self.calc_face_area(f)).sum()
    }

    /// Volume enclosed by the mesh. Meshes with boundary edges enclose no
    /// volume, so this is zero for them.
    pub fn calc_volume(&self) -> f32 {
        if self.topology().boundary_edges().next().is_some() {
            // Not closed.
            return 0.0;
        }
        let points = self.points();
        self.triangulated_vertices().fold(0.0, |total, [a, b, c]| {
            let (p0, p1, p2) = (
                points[a.index() as usize],
                points[b.index() as usize],
                points[c.index() as usize],
            );
            total + p0.dot((p1 - p0).cross(p2 - p0)) / 6.0
        })
    }

    /// Axis aligned bounding box as `(min, max)`. `None` for a mesh without
    /// vertices.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points().first()?;
        Some(
            self.points()
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}
