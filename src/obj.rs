use std::{
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::Path,
};

use glam::Vec3;

use crate::{
    element::{Handle, VH},
    error::Error,
    mesh::PolyMesh,
};

impl PolyMesh {
    /// Load a mesh from a Wavefront OBJ file. All objects in the file are
    /// merged into one mesh. Materials and texture coordinates are ignored.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let options = tobj::LoadOptions::default();
        let (models, _) =
            tobj::load_obj(path, &options).map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        Self::from_obj_models(models)
    }

    /// Read a mesh from OBJ text. Material libraries referenced by the text
    /// are not loaded. Vertices are renumbered in the order in which the faces
    /// first reference them, and vertices not used by any face are dropped.
    pub fn read_obj<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        let options = tobj::LoadOptions::default();
        let (models, _) = tobj::load_obj_buf(reader, &options, |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        Self::from_obj_models(models)
    }

    fn from_obj_models(models: Vec<tobj::Model>) -> Result<Self, Error> {
        let (nverts, nfaces) = models
            .iter()
            .fold((0usize, 0usize), |(nverts, nfaces), model| {
                let msh = &model.mesh;
                let nf = if msh.face_arities.is_empty() {
                    msh.indices.len() / 3
                } else {
                    msh.face_arities.len()
                };
                (nverts + (msh.positions.len() / 3), nfaces + nf)
            });
        let mut outmesh = PolyMesh::with_capacity(nverts, nfaces);
        let mut positions = Vec::new();
        let mut fvs = Vec::new();
        for model in models {
            let mesh = model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
            }
            positions.clear();
            positions.extend(mesh.positions.chunks_exact(3).map(|triplet| {
                Vec3::new(triplet[0] as f32, triplet[1] as f32, triplet[2] as f32)
            }));
            let voffset = outmesh.add_vertices(&positions)?.start;
            // No arities means every face is a triangle.
            let arities: Vec<usize> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.iter().map(|a| *a as usize).collect()
            };
            let mut start = 0usize;
            for size in arities {
                let indices = mesh
                    .indices
                    .get(start..(start + size))
                    .ok_or(Error::FaceTooSmall(mesh.indices.len().saturating_sub(start)))?;
                start += size;
                fvs.clear();
                fvs.extend(indices.iter().map(|i| VH::from(i + voffset)));
                outmesh.add_face(&fvs)?;
            }
        }
        Ok(outmesh)
    }

    /// Write the mesh as OBJ text, with one `v` line per vertex and one `f`
    /// line per face.
    pub fn write_obj<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        for p in self.points() {
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for fverts in self.face_lists() {
            write!(writer, "f")?;
            for v in fverts {
                // OBJ indices are 1-based.
                write!(writer, " {}", v.index() + 1)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Save the mesh to an OBJ file at `path`, replacing any existing file.
    pub fn save_obj(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_obj(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
