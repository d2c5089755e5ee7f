use std::f32::consts::TAU;

use glam::Vec3;

use crate::{
    element::{Handle, VH},
    error::Error,
    mesh::PolyMesh,
    topol::Topology,
};

/// Weights of the vertex itself and of each of its neighbors, for an interior
/// vertex with the given valence.
fn compute_weights(valence: usize) -> (f32, f32) {
    const THREE_OVER_EIGHT: f32 = 3.0 / 8.0;
    let n = valence as f32;
    let alpha = THREE_OVER_EIGHT + f32::powi(THREE_OVER_EIGHT + 0.25 * f32::cos(TAU / n), 2);
    (alpha, (1.0 - alpha) / n)
}

/// Points of one Loop iteration, before the new faces are built.
struct LoopScheme {
    vertex_points: Vec<Vec3>,
    edge_points: Vec<Vec3>,
}

impl LoopScheme {
    fn compute(mesh: &PolyMesh, topol: &Topology) -> Self {
        let points = mesh.points();
        let edge_points: Vec<Vec3> = topol
            .edges()
            .map(|e| {
                let edge = topol.edge(e);
                let (a, b) = edge.vertices;
                let vsum = points[a.index() as usize] + points[b.index() as usize];
                if edge.num_faces() != 2 {
                    return vsum * 0.5;
                }
                let opposite = edge
                    .faces()
                    .filter_map(|f| {
                        mesh.fv_ccw_iter(f).find(|v| *v != a && *v != b)
                    })
                    .fold(Vec3::ZERO, |total, v| total + points[v.index() as usize]);
                (vsum * 3.0 + opposite) / 8.0
            })
            .collect();
        let nverts = mesh.num_vertices();
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
                let (count, total) = boundary[a];
                boundary[a] = (count + 1, total + points[b]);
                let (count, total) = boundary[b];
                boundary[b] = (count + 1, total + points[a]);
            }
        }
        let vertex_points = points
            .iter()
            .enumerate()
            .map(|(vi, p)| match (boundary[vi], valences[vi]) {
                ((2, bsum), _) => (*p * 6.0 + bsum) / 8.0,
                // Corners of non-manifold boundaries, and isolated vertices
                // don't move.
                ((1.., _), _) | (_, 0) => *p,
                (_, valence) => {
                    let (a, b) = compute_weights(valence);
                    *p * a + neighbor_sums[vi] * b
                }
            })
            .collect();
        LoopScheme {
            vertex_points,
            edge_points,
        }
    }

    fn build(self, mesh: &PolyMesh, topol: &Topology) -> Result<PolyMesh, Error> {
        let nv = self.vertex_points.len() as u32;
        let mut out = PolyMesh::with_capacity(
            self.vertex_points.len() + self.edge_points.len(),
            mesh.num_faces() * 4,
        );
        out.add_vertices(&self.vertex_points)?;
        out.add_vertices(&self.edge_points)?;
        let edge_vertex = |a: VH, b: VH| -> Result<VH, Error> {
            topol
                .find_edge(a, b)
                .map(|e| VH::from(nv + e.index()))
                .ok_or(Error::NonManifoldEdge(a, b))
        };
        for f in mesh.faces() {
            let &[a, b, c] = mesh.face_vertices(f) else {
                return Err(Error::FaceTooSmall(mesh.face_valence(f)));
            };
            let (ab, bc, ca) = (edge_vertex(a, b)?, edge_vertex(b, c)?, edge_vertex(c, a)?);
            out.add_tri_face(a, ab, ca)?;
            out.add_tri_face(b, bc, ab)?;
            out.add_tri_face(c, ca, bc)?;
            out.add_tri_face(ab, bc, ca)?;
        }
        Ok(out)
    }
}

impl PolyMesh {
    /// Subdivide the mesh according to the [Loop subdivision
    /// scheme](https://en.wikipedia.org/wiki/Loop_subdivision_surface).
    ///
    /// Subdivisions are carried out for the given number of
    /// `iterations`. Loop subdivision is meant for triangle meshes. If the
    /// mesh is not a triangle mesh, it will be triangulated before any
    /// subdivision is performed.
    pub fn subdivide_loop(&mut self, iterations: usize) -> Result<(), Error> {
        if iterations == 0 {
            return Ok(());
        }
        self.check_topology()?;
        self.triangulate()?;
        for _ in 0..iterations {
            let topol = self.topology();
            let scheme = LoopScheme::compute(self, &topol);
            *self = scheme.build(self, &topol)?;
        }
        Ok(())
    }
}
