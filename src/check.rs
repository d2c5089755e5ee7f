use crate::{
    element::{FH, VH},
    error::Error,
    mesh::PolyMesh,
    topol::Topology,
};

fn check_faces(mesh: &PolyMesh) -> Result<(), Error> {
    let nverts = mesh.num_vertices();
    for f in mesh.faces() {
        let fverts = mesh.face_vertices(f);
        if fverts.len() < 3 {
            return Err(Error::FaceTooSmall(fverts.len()));
        }
        if let Some(v) = fverts.iter().find(|v| !v.is_valid(nverts)) {
            return Err(Error::InvalidVertex(*v));
        }
        // Repeated vertices make the face degenerate.
        for (i, v) in fverts.iter().enumerate() {
            if fverts[(i + 1)..].contains(v) {
                return Err(Error::DegenerateFace(f));
            }
        }
    }
    Ok(())
}

fn check_edges(topol: &Topology) -> Result<(), Error> {
    match topol.edges().find(|e| !topol.edge(*e).is_manifold()) {
        Some(e) => {
            let (a, b) = topol.edge_vertices(e);
            Err(Error::NonManifoldEdge(a, b))
        }
        None => Ok(()),
    }
}

/// Corner of a face at vertex `v`, between the outgoing edge towards `next`
/// and the incoming edge from `prev`.
#[derive(Debug, Clone, Copy)]
struct Wedge {
    v: VH,
    next: VH,
    prev: VH,
}

fn collect_wedges(mesh: &PolyMesh) -> Vec<Wedge> {
    let mut wedges = Vec::with_capacity(mesh.num_faces() * 4);
    for f in mesh.faces() {
        let fverts = mesh.face_vertices(f);
        let n = fverts.len();
        wedges.extend((0..n).map(|i| Wedge {
            v: fverts[i],
            next: fverts[(i + 1) % n],
            prev: fverts[(i + n - 1) % n],
        }));
    }
    wedges.sort_unstable_by_key(|w| (w.v, w.next));
    wedges
}

/// The faces around a manifold vertex form a single fan. Going from a wedge
/// to the neighboring wedge across the incoming edge must visit all wedges
/// of the vertex, either as a closed cycle or as one open chain.
fn check_vertex_fan(wedges: &[Wedge]) -> Result<(), Error> {
    let v = wedges[0].v;
    let find = |key: VH| {
        wedges
            .binary_search_by_key(&key, |w| w.next)
            .ok()
            .map(|i| wedges[i])
    };
    if wedges.windows(2).any(|pair| pair[0].next == pair[1].next) {
        return Err(Error::NonManifoldVertex(v));
    }
    let mut starts = wedges
        .iter()
        .filter(|w| !wedges.iter().any(|other| other.prev == w.next));
    let start = match (starts.next(), starts.next()) {
        (None, _) => wedges[0],
        (Some(w), None) => *w,
        (Some(_), Some(_)) => return Err(Error::NonManifoldVertex(v)),
    };
    let mut count = 1usize;
    let mut current = start;
    while let Some(w) = find(current.prev) {
        if w.next == start.next || count > wedges.len() {
            break;
        }
        count += 1;
        current = w;
    }
    if count == wedges.len() {
        Ok(())
    } else {
        Err(Error::NonManifoldVertex(v))
    }
}

fn check_vertices(mesh: &PolyMesh) -> Result<(), Error> {
    let wedges = collect_wedges(mesh);
    wedges
        .chunk_by(|a, b| a.v == b.v)
        .try_for_each(check_vertex_fan)
}

impl PolyMesh {
    /// Check the topology of the mesh.
    ///
    /// This returns an error if any face has out of bounds or repeated
    /// vertices, if any edge has more than two faces or two faces with
    /// inconsistent orientation, or if the faces around any vertex don't form
    /// a single fan. Boundaries are allowed.
    pub fn check_topology(&self) -> Result<(), Error> {
        check_faces(self)?;
        check_edges(&self.topology())?;
        check_vertices(self)
    }

    /// Like [`Self::check_topology`], but also requires every edge to have
    /// exactly two faces.
    pub fn check_closed_manifold(&self) -> Result<(), Error> {
        check_faces(self)?;
        let topol = self.topology();
        check_edges(&topol)?;
        if let Some(e) = topol.boundary_edges().next() {
            let (a, b) = topol.edge_vertices(e);
            return Err(Error::OpenBoundary(a, b));
        }
        check_vertices(self)
    }

    pub fn is_closed_manifold(&self) -> bool {
        self.check_closed_manifold().is_ok()
    }

    /// Faces with a zero area normal.
    pub fn degenerate_faces(&self) -> impl Iterator<Item = FH> + use<'_> {
        self.faces()
            .filter(|f| self.calc_face_normal(*f).length_squared() == 0.0)
    }
}
