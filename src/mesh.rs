use std::ops::{Add, AddAssign, Range};

use glam::{Affine3A, Vec3};

use crate::{
    element::{FH, Handle, VH},
    error::Error,
};

/// Indexed polygon mesh.
///
/// Vertex positions are stored in one array. Faces are stored as flattened
/// lists of vertex indices, in counter-clockwise order when viewed from
/// outside the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyMesh {
    points: Vec<Vec3>,
    face_offsets: Vec<u32>,
    face_verts: Vec<VH>,
}

impl Default for PolyMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyMesh {
    pub fn new() -> Self {
        PolyMesh {
            points: Vec::new(),
            face_offsets: vec![0],
            face_verts: Vec::new(),
        }
    }

    pub fn with_capacity(nverts: usize, nfaces: usize) -> Self {
        let mut face_offsets = Vec::with_capacity(nfaces + 1);
        face_offsets.push(0);
        PolyMesh {
            points: Vec::with_capacity(nverts),
            face_offsets,
            // Assume mostly quads.
            face_verts: Vec::with_capacity(nfaces * 4),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.points.len()
    }

    pub fn num_faces(&self) -> usize {
        self.face_offsets.len() - 1
    }

    /// Number of unique undirected edges across all faces.
    pub fn num_edges(&self) -> usize {
        self.edge_vertices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.num_faces() == 0
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..self.num_vertices() as u32).map(VH::from)
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        (0..self.num_faces() as u32).map(FH::from)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Vec3] {
        &mut self.points
    }

    pub fn point(&self, v: VH) -> Result<Vec3, Error> {
        self.points
            .get(v.index() as usize)
            .copied()
            .ok_or(Error::InvalidVertex(v))
    }

    pub fn set_point(&mut self, v: VH, pos: Vec3) -> Result<(), Error> {
        let dst = self
            .points
            .get_mut(v.index() as usize)
            .ok_or(Error::InvalidVertex(v))?;
        *dst = pos;
        Ok(())
    }

    /// The vertices of the face `f`, in counter-clockwise order.
    ///
    /// Panics if `f` is out of bounds.
    pub fn face_vertices(&self, f: FH) -> &[VH] {
        let fi = f.index() as usize;
        let start = self.face_offsets[fi] as usize;
        let stop = self.face_offsets[fi + 1] as usize;
        &self.face_verts[start..stop]
    }

    pub fn fv_ccw_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        self.face_vertices(f).iter().copied()
    }

    /// Iterate over the vertex positions of the face `f`.
    pub fn face_points(&self, f: FH) -> impl Iterator<Item = Vec3> + Clone + use<'_> {
        self.face_vertices(f)
            .iter()
            .map(|v| self.points[v.index() as usize])
    }

    pub fn face_valence(&self, f: FH) -> usize {
        self.face_vertices(f).len()
    }

    /// Iterate over the vertex lists of all faces.
    pub fn face_lists(&self) -> impl Iterator<Item = &[VH]> + use<'_> {
        self.faces().map(|f| self.face_vertices(f))
    }

    pub fn is_triangle_mesh(&self) -> bool {
        self.faces().all(|f| self.face_valence(f) == 3)
    }

    pub fn has_triangles(&self) -> bool {
        self.faces().any(|f| self.face_valence(f) == 3)
    }

    pub fn add_vertex(&mut self, pos: Vec3) -> Result<VH, Error> {
        let vi = self.points.len() as u32;
        self.points.push(pos);
        Ok(vi.into())
    }

    /// Add all the given positions as vertices, returning the range of
    /// indices of the new vertices.
    pub fn add_vertices(&mut self, positions: &[Vec3]) -> Result<Range<u32>, Error> {
        let start = self.points.len() as u32;
        self.points.extend_from_slice(positions);
        Ok(start..(self.points.len() as u32))
    }

    /// Add a face with the given vertices, in counter-clockwise order.
    pub fn add_face(&mut self, verts: &[VH]) -> Result<FH, Error> {
        if verts.len() < 3 {
            return Err(Error::FaceTooSmall(verts.len()));
        }
        if let Some(v) = verts.iter().find(|v| !v.is_valid(self.num_vertices())) {
            return Err(Error::InvalidVertex(*v));
        }
        let fi = self.num_faces() as u32;
        self.face_verts.extend_from_slice(verts);
        self.face_offsets.push(self.face_verts.len() as u32);
        Ok(fi.into())
    }

    pub fn add_tri_face(&mut self, v0: VH, v1: VH, v2: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2])
    }

    pub fn add_quad_face(&mut self, v0: VH, v1: VH, v2: VH, v3: VH) -> Result<FH, Error> {
        self.add_face(&[v0, v1, v2, v3])
    }

    /// Append the vertices and faces of `other` to this mesh. Face indices of
    /// `other` are offset by the current vertex count. Nothing is
    /// deduplicated. Returns the range of the appended vertices.
    pub fn merge(&mut self, other: &PolyMesh) -> Range<u32> {
        let voffset = self.points.len() as u32;
        self.points.extend_from_slice(&other.points);
        let foffset = self.face_verts.len() as u32;
        self.face_verts
            .extend(other.face_verts.iter().map(|v| VH::from(v.index() + voffset)));
        self.face_offsets
            .extend(other.face_offsets.iter().skip(1).map(|o| o + foffset));
        voffset..(self.points.len() as u32)
    }

    /// Multiply every vertex coordinate by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for p in self.points.iter_mut() {
            *p *= factor;
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in self.points.iter_mut() {
            *p += offset;
        }
    }

    pub fn transform(&mut self, xform: &Affine3A) {
        for p in self.points.iter_mut() {
            *p = xform.transform_point3(*p);
        }
    }

    /// Flip the orientation of every face.
    pub fn reverse_faces(&mut self) {
        for fi in 0..self.num_faces() {
            let start = self.face_offsets[fi] as usize;
            let stop = self.face_offsets[fi + 1] as usize;
            self.face_verts[start..stop].reverse();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.face_verts.clear();
        self.face_offsets.clear();
        self.face_offsets.push(0);
    }

    /// Build a mesh directly from positions and face lists.
    pub fn from_faces<F>(points: Vec<Vec3>, faces: impl IntoIterator<Item = F>) -> Result<Self, Error>
    where
        F: AsRef<[VH]>,
    {
        let mut mesh = PolyMesh {
            points,
            face_offsets: vec![0],
            face_verts: Vec::new(),
        };
        for f in faces {
            mesh.add_face(f.as_ref())?;
        }
        Ok(mesh)
    }
}

impl Add<&PolyMesh> for PolyMesh {
    type Output = PolyMesh;

    fn add(mut self, rhs: &PolyMesh) -> Self::Output {
        self.merge(rhs);
        self
    }
}

impl AddAssign<&PolyMesh> for PolyMesh {
    fn add_assign(&mut self, rhs: &PolyMesh) {
        self.merge(rhs);
    }
}
