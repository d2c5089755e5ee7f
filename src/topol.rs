use std::collections::{HashMap, hash_map::Entry};

use crate::{
    element::{EH, FH, Handle, VH},
    mesh::PolyMesh,
};

/// An undirected edge, and the faces incident on it.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// The vertices of the edge, lower index first.
    pub vertices: (VH, VH),
    faces: [Option<FH>; 2],
    num_faces: u32,
    /// Number of faces that walk the edge from the lower to the higher
    /// index, and the other way around.
    directed: [u32; 2],
}

impl Edge {
    /// A boundary edge has exactly one incident face.
    pub fn is_boundary(&self) -> bool {
        self.num_faces == 1
    }

    /// An edge is manifold if it has at most two incident faces, and they
    /// are oriented consistently, i.e. walk the edge in opposite directions.
    pub fn is_manifold(&self) -> bool {
        self.num_faces <= 2 && self.directed[0] <= 1 && self.directed[1] <= 1
    }

    pub fn num_faces(&self) -> usize {
        self.num_faces as usize
    }

    /// The first two faces incident on this edge.
    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        self.faces.into_iter().flatten()
    }
}

/// Edge connectivity derived from the face lists of a [`PolyMesh`].
///
/// Edges are numbered in the order in which they are first encountered when
/// walking the faces.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    edges: Vec<Edge>,
    lookup: HashMap<(VH, VH), EH>,
}

fn edge_key(a: VH, b: VH) -> ((VH, VH), usize) {
    if a < b { ((a, b), 0) } else { ((b, a), 1) }
}

impl Topology {
    pub fn new(mesh: &PolyMesh) -> Self {
        let mut topol = Topology {
            edges: Vec::with_capacity(mesh.num_faces() * 2),
            lookup: HashMap::with_capacity(mesh.num_faces() * 2),
        };
        for f in mesh.faces() {
            let fverts = mesh.face_vertices(f);
            for (i, a) in fverts.iter().enumerate() {
                let b = fverts[(i + 1) % fverts.len()];
                topol.add_halfedge(*a, b, f);
            }
        }
        topol
    }

    fn add_halfedge(&mut self, a: VH, b: VH, f: FH) {
        let (key, dir) = edge_key(a, b);
        let e = match self.lookup.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let e: EH = (self.edges.len() as u32).into();
                self.edges.push(Edge {
                    vertices: key,
                    faces: [None, None],
                    num_faces: 0,
                    directed: [0, 0],
                });
                *entry.insert(e)
            }
        };
        let edge = &mut self.edges[e.index() as usize];
        if let Some(slot) = edge.faces.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(f);
        }
        edge.num_faces += 1;
        edge.directed[dir] += 1;
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        (0..self.edges.len() as u32).map(EH::from)
    }

    /// Panics if `e` is out of bounds.
    pub fn edge(&self, e: EH) -> &Edge {
        &self.edges[e.index() as usize]
    }

    pub fn edge_vertices(&self, e: EH) -> (VH, VH) {
        self.edge(e).vertices
    }

    pub fn find_edge(&self, a: VH, b: VH) -> Option<EH> {
        self.lookup.get(&edge_key(a, b).0).copied()
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        self.edge(e).is_boundary()
    }

    pub fn boundary_edges(&self) -> impl Iterator<Item = EH> + use<'_> {
        self.edges().filter(|e| self.is_boundary_edge(*e))
    }

    /// Per vertex flag indicating whether the vertex lies on a boundary edge.
    pub fn boundary_vertices(&self, num_vertices: usize) -> Vec<bool> {
        let mut flags = vec![false; num_vertices];
        for edge in self.edges.iter().filter(|e| e.is_boundary()) {
            flags[edge.vertices.0.index() as usize] = true;
            flags[edge.vertices.1.index() as usize] = true;
        }
        flags
    }

    /// Number of edges incident on each vertex.
    pub fn valences(&self, num_vertices: usize) -> Vec<usize> {
        let mut valences = vec![0usize; num_vertices];
        for edge in &self.edges {
            valences[edge.vertices.0.index() as usize] += 1;
            valences[edge.vertices.1.index() as usize] += 1;
        }
        valences
    }
}

impl PolyMesh {
    /// Compute the edge connectivity of this mesh.
    pub fn topology(&self) -> Topology {
        Topology::new(self)
    }

    /// The unique undirected edges of this mesh, as pairs of vertices with
    /// the lower index first.
    pub fn edge_vertices(&self) -> Vec<(VH, VH)> {
        let topol = self.topology();
        topol.edges().map(|e| topol.edge_vertices(e)).collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{element::VH, mesh::PolyMesh};

    #[test]
    fn t_box_edges() {
        let qbox = PolyMesh::unit_box().expect("Cannot create box");
        let topol = qbox.topology();
        assert_eq!(12, topol.num_edges());
        for e in topol.edges() {
            let edge = topol.edge(e);
            assert_eq!(2, edge.num_faces());
            assert!(edge.is_manifold());
            assert!(!edge.is_boundary());
        }
        assert_eq!(vec![3usize; 8], topol.valences(qbox.num_vertices()));
        assert!(topol.find_edge(0.into(), 3.into()).is_some());
        assert!(topol.find_edge(3.into(), 0.into()).is_some());
        assert!(topol.find_edge(0.into(), 6.into()).is_none());
    }

    #[test]
    fn t_open_quad_boundary() {
        let mut mesh = PolyMesh::new();
        for p in [
            glam::vec3(0.0, 0.0, 0.0),
            glam::vec3(1.0, 0.0, 0.0),
            glam::vec3(1.0, 1.0, 0.0),
            glam::vec3(0.0, 1.0, 0.0),
        ] {
            mesh.add_vertex(p).expect("Cannot add vertex");
        }
        mesh.add_quad_face(0.into(), 1.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        let topol = mesh.topology();
        assert_eq!(4, topol.boundary_edges().count());
        assert_eq!(vec![true; 4], topol.boundary_vertices(4));
        assert_eq!(
            vec![
                (VH::from(0u32), VH::from(1u32)),
                (1.into(), 2.into()),
                (2.into(), 3.into()),
                (0.into(), 3.into())
            ],
            mesh.edge_vertices()
        );
    }

    #[test]
    fn t_inconsistent_orientation() {
        let mut mesh = PolyMesh::new();
        for p in [
            glam::vec3(0.0, 0.0, 0.0),
            glam::vec3(1.0, 0.0, 0.0),
            glam::vec3(1.0, 1.0, 0.0),
            glam::vec3(0.0, 1.0, 0.0),
        ] {
            mesh.add_vertex(p).expect("Cannot add vertex");
        }
        mesh.add_tri_face(0.into(), 1.into(), 2.into())
            .expect("Cannot add face");
        // Walks the edge (0, 2) opposite to the first face.
        mesh.add_tri_face(0.into(), 2.into(), 3.into())
            .expect("Cannot add face");
        let topol = mesh.topology();
        let e = topol
            .find_edge(0.into(), 2.into())
            .expect("Cannot find edge");
        assert!(topol.edge(e).is_manifold());
        // Third face on the same edge, walking it like the first face.
        mesh.add_tri_face(2.into(), 0.into(), 3.into())
            .expect("Cannot add face");
        let topol = mesh.topology();
        let e = topol
            .find_edge(0.into(), 2.into())
            .expect("Cannot find edge");
        assert!(!topol.edge(e).is_manifold());
    }
}
