mod catmull;
mod loop_subd;

use crate::{error::Error, mesh::PolyMesh};

impl PolyMesh {
    /// Subdivide the mesh for the given number of `iterations`.
    ///
    /// Meshes without triangles are refined with the [Catmull-Clark
    /// scheme](https://en.wikipedia.org/wiki/Catmull%E2%80%93Clark_subdivision_surface),
    /// which splits an n-gon into n quads. Meshes with any triangles are
    /// triangulated and refined with the Loop scheme, which splits every
    /// triangle into four. Either way, every iteration at least quadruples
    /// the number of faces. Boundaries are preserved.
    ///
    /// Empty meshes are left as they are. Non-manifold meshes cannot be
    /// subdivided.
    ///
    /// ```rust
    /// use sinew::PolyMesh;
    ///
    /// let mut mesh = PolyMesh::unit_box().expect("Cannot create box");
    /// mesh.subdivide(1).expect("Subdivision failed");
    /// assert_eq!((26, 48, 24), (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()));
    /// ```
    pub fn subdivide(&mut self, iterations: usize) -> Result<(), Error> {
        if iterations == 0 || self.num_faces() == 0 {
            return Ok(());
        }
        if self.has_triangles() {
            self.subdivide_loop(iterations)
        } else {
            self.subdivide_catmull_clark(iterations)
        }
    }
}

#[cfg(test)]
mod test {
    use glam::vec3;

    use crate::{error::ErrorKind, mesh::PolyMesh};

    #[test]
    fn t_subdivide_quadruples_faces() {
        let mut qbox = PolyMesh::unit_box().expect("Cannot create box");
        qbox.subdivide(2).expect("Cannot subdivide");
        assert_eq!(6 * 16, qbox.num_faces());
        qbox.check_closed_manifold()
            .expect("Topological errors found");
        let mut oct = PolyMesh::octahedron(1.0).expect("Cannot create octahedron");
        oct.subdivide(1).expect("Cannot subdivide");
        assert_eq!(32, oct.num_faces());
        assert!(oct.is_triangle_mesh());
        oct.check_closed_manifold()
            .expect("Topological errors found");
    }

    #[test]
    fn t_subdivide_empty() {
        let mut mesh = PolyMesh::new();
        mesh.subdivide(3).expect("Cannot subdivide");
        assert!(mesh.is_empty());
    }

    #[test]
    fn t_subdivide_non_manifold() {
        let mut mesh = PolyMesh::new();
        mesh.add_vertices(&[
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            vec3(0.0, -1.0, 0.0),
            vec3(0.0, 0.0, 1.0),
        ])
        .expect("Cannot add vertices");
        // Three triangles on the edge (0, 1).
        mesh.add_tri_face(0.into(), 1.into(), 2.into())
            .expect("Cannot add face");
        mesh.add_tri_face(1.into(), 0.into(), 3.into())
            .expect("Cannot add face");
        mesh.add_tri_face(1.into(), 0.into(), 4.into())
            .expect("Cannot add face");
        let before = mesh.clone();
        let err = mesh.subdivide(1).expect_err("Non-manifold mesh was subdivided");
        assert_eq!(ErrorKind::InvalidTopology, err.kind());
        assert_eq!(before, mesh);
    }
}
