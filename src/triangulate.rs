use glam::Vec3;

use crate::{
    element::{FH, Handle, VH},
    error::Error,
    mesh::PolyMesh,
    vector::{point_in_triangle, triangle_normal},
};

/// Clip ears off the polygon until a triangle remains. If no ear can be
/// found, e.g. because the polygon is badly non-planar, the remaining
/// polygon is fan triangulated. Triangles keep the winding of the polygon.
fn ear_clip(points: &[Vec3], poly: &[VH], out: &mut Vec<[VH; 3]>) {
    if poly.len() == 3 {
        out.push([poly[0], poly[1], poly[2]]);
        return;
    }
    let pos = |v: VH| points[v.index() as usize];
    let normal = PolyMesh::newell_normal(poly.iter().map(|v| pos(*v)));
    let mut remaining = poly.to_vec();
    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|i| {
            let (a, b, c) = (
                remaining[(i + n - 1) % n],
                remaining[*i],
                remaining[(i + 1) % n],
            );
            let (pa, pb, pc) = (pos(a), pos(b), pos(c));
            if triangle_normal(pa, pb, pc).dot(normal) <= 0.0 {
                // Reflex or degenerate corner.
                return false;
            }
            !remaining
                .iter()
                .filter(|v| **v != a && **v != b && **v != c)
                .any(|v| point_in_triangle(pos(*v), pa, pb, pc, normal))
        });
        match ear {
            Some(i) => {
                out.push([remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]]);
                remaining.remove(i);
            }
            None => break,
        }
    }
    for i in 1..(remaining.len() - 1) {
        out.push([remaining[0], remaining[i], remaining[i + 1]]);
    }
}

impl PolyMesh {
    /// Fan triangulation of the face `f`, without modifying the mesh. This is
    /// only correct for convex faces. See [`Self::face_triangles`] for
    /// arbitrary faces.
    pub fn triangulated_face_vertices(&self, f: FH) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        let fverts = self.face_vertices(f);
        let vstart = fverts[0];
        fverts[1..]
            .windows(2)
            .map(move |pair| [vstart, pair[0], pair[1]])
    }

    /// Fan triangulation of all faces.
    pub fn triangulated_vertices(&self) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        self.faces()
            .flat_map(move |f| self.triangulated_face_vertices(f))
    }

    /// Ear clipping triangulation of the face `f`, without modifying the
    /// mesh.
    pub fn face_triangles(&self, f: FH) -> Vec<[VH; 3]> {
        let fverts = self.face_vertices(f);
        let mut out = Vec::with_capacity(fverts.len().saturating_sub(2));
        ear_clip(self.points(), fverts, &mut out);
        out
    }

    /// Lazily triangulate every face of the mesh, in face order.
    pub fn triangles(&self) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        self.faces().flat_map(move |f| self.face_triangles(f))
    }

    /// Unit normals of the triangles produced by [`Self::triangles`].
    pub fn triangle_normals(&self) -> impl Iterator<Item = Vec3> + use<'_> {
        let points = self.points();
        self.triangles().map(move |[a, b, c]| {
            triangle_normal(
                points[a.index() as usize],
                points[b.index() as usize],
                points[c.index() as usize],
            )
            .normalize_or_zero()
        })
    }

    /// Copy of this mesh with every face split into triangles.
    pub fn triangulated(&self) -> Result<PolyMesh, Error> {
        let mut out = PolyMesh::with_capacity(self.num_vertices(), self.num_faces() * 2);
        out.add_vertices(self.points())?;
        for tri in self.triangles() {
            out.add_face(&tri)?;
        }
        Ok(out)
    }

    /// Split every face with more than 3 vertices into triangles. Triangles
    /// are left untouched, so triangulating twice is the same as
    /// triangulating once.
    pub fn triangulate(&mut self) -> Result<(), Error> {
        if self.is_triangle_mesh() {
            return Ok(());
        }
        *self = self.triangulated()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use glam::vec3;

    use crate::{element::Handle, macros::assert_f32_eq, mesh::PolyMesh};

    fn l_shape() -> PolyMesh {
        let mut mesh = PolyMesh::new();
        // Start at a vertex that cannot see the whole polygon, so a fan
        // triangulation would produce flipped triangles.
        mesh.add_vertices(&[
            vec3(2.0, 1.0, 0.0),
            vec3(1.0, 1.0, 0.0),
            vec3(1.0, 2.0, 0.0),
            vec3(0.0, 2.0, 0.0),
            vec3(0.0, 0.0, 0.0),
            vec3(2.0, 0.0, 0.0),
        ])
        .expect("Cannot add vertices");
        mesh.add_face(&[0.into(), 1.into(), 2.into(), 3.into(), 4.into(), 5.into()])
            .expect("Cannot add face");
        mesh
    }

    #[test]
    fn t_box_triangulated_indices() {
        let qbox = PolyMesh::unit_box().expect("Cannot create box");
        assert_eq!(
            qbox.triangulated_vertices()
                .flatten()
                .map(|v| v.index())
                .collect::<Vec<_>>(),
            &[
                0, 3, 2, 0, 2, 1, 0, 1, 5, 0, 5, 4, 1, 2, 6, 1, 6, 5, 2, 3, 7, 2, 7, 6, 3, 0, 4, 3,
                4, 7, 4, 5, 6, 4, 6, 7
            ]
        );
    }

    #[test]
    fn t_box_triangulate() {
        let mut qbox = PolyMesh::unit_box().expect("Cannot create box");
        qbox.triangulate().expect("Cannot triangulate");
        assert_eq!(8, qbox.num_vertices());
        assert_eq!(12, qbox.num_faces());
        assert_eq!(18, qbox.num_edges());
        assert!(qbox.is_triangle_mesh());
        qbox.check_closed_manifold()
            .expect("Topological errors found");
        assert_f32_eq!(1.0, qbox.calc_volume(), 1e-6);
    }

    #[test]
    fn t_triangulate_idempotent() {
        let mut once = PolyMesh::unit_box().expect("Cannot create box");
        once.triangulate().expect("Cannot triangulate");
        let mut twice = once.clone();
        twice.triangulate().expect("Cannot triangulate");
        assert_eq!(once, twice);
        assert_eq!(
            once,
            once.triangulated().expect("Cannot triangulate")
        );
    }

    #[test]
    fn t_ear_clip_concave() {
        let mesh = l_shape();
        let tris = mesh.face_triangles(0.into());
        assert_eq!(4, tris.len());
        let mut tmesh = mesh.clone();
        tmesh.triangulate().expect("Cannot triangulate");
        for n in tmesh.triangle_normals() {
            assert_eq!(vec3(0.0, 0.0, 1.0), n);
        }
        assert_f32_eq!(3.0, tmesh.calc_area(), 1e-6);
        assert_f32_eq!(3.0, mesh.calc_area(), 1e-6);
    }

    #[test]
    fn t_empty_triangulate() {
        let mut mesh = PolyMesh::new();
        mesh.triangulate().expect("Cannot triangulate");
        assert!(mesh.is_empty());
    }
}
