use glam::Vec3;

use crate::{
    element::{FH, Handle, VH},
    error::Error,
    mesh::PolyMesh,
    topol::Topology,
};

/// Points of one Catmull-Clark iteration, before the new faces are built.
struct CatmullClark {
    vertex_points: Vec<Vec3>,
    edge_points: Vec<Vec3>,
    face_points: Vec<Vec3>,
}

impl CatmullClark {
    fn compute(mesh: &PolyMesh, topol: &Topology) -> Self {
        let points = mesh.points();
        let face_points: Vec<Vec3> = mesh.faces().map(|f| mesh.calc_face_centroid(f)).collect();
        let edge_points: Vec<Vec3> = topol
            .edges()
            .map(|e| {
                let edge = topol.edge(e);
                let (a, b) = edge.vertices;
                let vsum = points[a.index() as usize] + points[b.index() as usize];
                if edge.num_faces() == 2 {
                    let fsum = edge
                        .faces()
                        .fold(Vec3::ZERO, |total, f| total + face_points[f.index() as usize]);
                    (vsum + fsum) * 0.25
                } else {
                    vsum * 0.5
                }
            })
            .collect();
        let nverts = mesh.num_vertices();
        let mut face_sums = vec![Vec3::ZERO; nverts];
        for f in mesh.faces() {
            for v in mesh.fv_ccw_iter(f) {
                face_sums[v.index() as usize] += face_points[f.index() as usize];
            }
        }
        let mut valences = vec![0usize; nverts];
        let mut neighbor_sums = vec![Vec3::ZERO; nverts];
        let mut boundary = vec![(0usize, Vec3::ZERO); nverts];
        for e in topol.edges() {
            let edge = topol.edge(e);
            let (a, b) = (edge.vertices.0.index() as usize, edge.vertices.1.index() as usize);
            valences[a] += 1;
            valences[b] += 1;
            neighbor_sums[a] += points[b];
            neighbor_sums[b] += points[a];
            if edge.is_boundary() {
                let epos = edge_points[e.index() as usize];
                for vi in [a, b] {
                    let (count, total) = boundary[vi];
                    boundary[vi] = (count + 1, total + epos);
                }
            }
        }
        let vertex_points = points
            .iter()
            .enumerate()
            .map(|(vi, p)| {
                let (bcount, bsum) = boundary[vi];
                let valence = valences[vi] as f32;
                if bcount > 0 {
                    (*p + bsum) / (bcount + 1) as f32
                } else if valences[vi] == 0 {
                    // Isolated vertex doesn't move.
                    *p
                } else {
                    ((face_sums[vi] + neighbor_sums[vi]) / valence + *p * (valence - 2.0))
                        / valence
                }
            })
            .collect();
        CatmullClark {
            vertex_points,
            edge_points,
            face_points,
        }
    }

    fn build(self, mesh: &PolyMesh, topol: &Topology) -> Result<PolyMesh, Error> {
        let nv = self.vertex_points.len() as u32;
        let ne = self.edge_points.len() as u32;
        let nquads = mesh.face_lists().map(|f| f.len()).sum();
        let mut out = PolyMesh::with_capacity(
            self.vertex_points.len() + self.edge_points.len() + self.face_points.len(),
            nquads,
        );
        out.add_vertices(&self.vertex_points)?;
        out.add_vertices(&self.edge_points)?;
        out.add_vertices(&self.face_points)?;
        let edge_vertex = |a: VH, b: VH| -> Result<VH, Error> {
            topol
                .find_edge(a, b)
                .map(|e| VH::from(nv + e.index()))
                .ok_or(Error::NonManifoldEdge(a, b))
        };
        for f in mesh.faces() {
            let fverts = mesh.face_vertices(f);
            let fv = face_vertex(nv + ne, f);
            let n = fverts.len();
            for i in 0..n {
                let (prev, v, next) = (fverts[(i + n - 1) % n], fverts[i], fverts[(i + 1) % n]);
                out.add_quad_face(v, edge_vertex(v, next)?, fv, edge_vertex(prev, v)?)?;
            }
        }
        Ok(out)
    }
}

fn face_vertex(offset: u32, f: FH) -> VH {
    (offset + f.index()).into()
}

impl PolyMesh {
    /// Subdivide the mesh according to the [Catmull-Clark
    /// scheme](https://en.wikipedia.org/wiki/Catmull%E2%80%93Clark_subdivision_surface),
    /// for the given number of `iterations`. After the first iteration, the
    /// mesh only contains quads.
    pub fn subdivide_catmull_clark(&mut self, iterations: usize) -> Result<(), Error> {
        if iterations == 0 {
            return Ok(());
        }
        self.check_topology()?;
        for _ in 0..iterations {
            let topol = self.topology();
            let scheme = CatmullClark::compute(self, &topol);
            *self = scheme.build(self, &topol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use glam::vec3;

    use crate::{macros::assert_vec3_eq, mesh::PolyMesh};

    #[test]
    fn t_box_catmull_clark() {
        let mut mesh = PolyMesh::unit_box().expect("Cannot create box");
        mesh.subdivide_catmull_clark(1)
            .expect("Cannot subdivide");
        mesh.check_closed_manifold()
            .expect("Topological errors found");
        assert_eq!(26, mesh.num_vertices());
        assert_eq!(48, mesh.num_edges());
        assert_eq!(24, mesh.num_faces());
        // Corners move towards the center.
        assert_vec3_eq!(vec3(2.0, 2.0, 2.0) / 9.0, mesh.points()[0]);
        // Face points are centroids.
        assert_vec3_eq!(vec3(0.5, 0.5, 0.0), mesh.points()[8 + 12]);
    }

    #[test]
    fn t_quad_catmull_clark_boundary() {
        let mut mesh = PolyMesh::new();
        mesh.add_vertices(&[
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(1.0, 1.0, 0.0),
            vec3(0.0, 1.0, 0.0),
        ])
        .expect("Cannot add vertices");
        mesh.add_quad_face(0.into(), 1.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        mesh.subdivide_catmull_clark(1)
            .expect("Cannot subdivide");
        assert_eq!(9, mesh.num_vertices());
        assert_eq!(4, mesh.num_faces());
        assert_eq!(12, mesh.num_edges());
        mesh.check_topology().expect("Topological errors found");
        // Corner averaged with its two boundary edge midpoints.
        assert_vec3_eq!(vec3(0.5, 0.5, 0.0) / 3.0, mesh.points()[0]);
        for n in mesh.calc_face_normals() {
            assert_vec3_eq!(vec3(0.0, 0.0, 1.0), n);
        }
    }
}
