use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "obj")]
use std::path::Path;

use glam::{Affine3A, Vec3};
use log::debug;

use crate::{
    bmesh::GenerateOptions,
    boolean::{self, BooleanKernel, BooleanOp},
    buffer::fill_buffer,
    element::NodeH,
    error::Error,
    mesh::PolyMesh,
    registry::{ObjectId, Registry},
    skeleton::Skeleton,
};

fn next_context_id() -> u32 {
    static COUNTER: AtomicU32 = AtomicU32::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct SkeletonObject {
    skeleton: Skeleton,
    /// Overrides the options of the context.
    options: Option<GenerateOptions>,
}

#[derive(Debug, Clone)]
enum Object {
    Mesh(PolyMesh),
    Skeleton(SkeletonObject),
}

/**
 * Owner of meshes and skeletons, addressed by [`ObjectId`]s.
 *
 * Every operation runs to completion before returning. A failed operation
 * leaves all objects unchanged, and registers nothing new. Dropping the
 * context drops every object it owns.
 *
 * ```rust
 * use glam::vec3;
 * use sinew::Context;
 *
 * let mut ctx = Context::new();
 * let sk = ctx.create_skeleton();
 * let a = ctx.add_node(sk, vec3(0.0, 0.0, 0.0), 1.0).expect("Cannot add node");
 * let b = ctx.add_node(sk, vec3(0.0, 0.0, 5.0), 1.0).expect("Cannot add node");
 * ctx.add_edge(sk, a, b).expect("Cannot add edge");
 * let mesh = ctx.generate(sk, a).expect("Cannot generate mesh");
 * let mut positions = vec![0.0f32; 3 * ctx.vertex_count(mesh).expect("Not a mesh")];
 * ctx.vertex_positions(mesh, &mut positions).expect("Cannot read positions");
 * ```
 */
pub struct Context {
    objects: Registry<Object>,
    options: GenerateOptions,
    kernel: Option<Box<dyn BooleanKernel>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("objects", &self.objects.len())
            .field("options", &self.options)
            .field("kernel", &self.kernel.is_some())
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_options(GenerateOptions::default())
    }

    /// Context using `options` to generate meshes from skeletons that don't
    /// have their own options.
    pub fn with_options(options: GenerateOptions) -> Self {
        Context {
            objects: Registry::new(next_context_id()),
            options: options.sanitized(),
            kernel: None,
        }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: GenerateOptions) {
        self.options = options.sanitized();
    }

    /// Install the kernel used for boolean operations.
    pub fn set_boolean_kernel<K>(&mut self, kernel: K)
    where
        K: BooleanKernel + 'static,
    {
        self.kernel = Some(Box::new(kernel));
    }

    /// Number of live meshes and skeletons.
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    /// Ids of all live meshes and skeletons.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + use<'_> {
        self.objects.ids()
    }

    /// Destroy a mesh or a skeleton. The id is invalid afterwards.
    pub fn destroy(&mut self, id: ObjectId) -> Result<(), Error> {
        self.objects.remove(id)?;
        debug!("Destroyed {}", id);
        Ok(())
    }

    pub fn mesh(&self, id: ObjectId) -> Result<&PolyMesh, Error> {
        match self.objects.get(id)? {
            Object::Mesh(mesh) => Ok(mesh),
            Object::Skeleton(_) => Err(Error::NotAMesh(id)),
        }
    }

    fn mesh_mut(&mut self, id: ObjectId) -> Result<&mut PolyMesh, Error> {
        match self.objects.get_mut(id)? {
            Object::Mesh(mesh) => Ok(mesh),
            Object::Skeleton(_) => Err(Error::NotAMesh(id)),
        }
    }

    pub fn skeleton(&self, id: ObjectId) -> Result<&Skeleton, Error> {
        match self.objects.get(id)? {
            Object::Skeleton(obj) => Ok(&obj.skeleton),
            Object::Mesh(_) => Err(Error::NotASkeleton(id)),
        }
    }

    fn skeleton_mut(&mut self, id: ObjectId) -> Result<&mut SkeletonObject, Error> {
        match self.objects.get_mut(id)? {
            Object::Skeleton(obj) => Ok(obj),
            Object::Mesh(_) => Err(Error::NotASkeleton(id)),
        }
    }

    /// Take ownership of `mesh`.
    pub fn add_mesh(&mut self, mesh: PolyMesh) -> ObjectId {
        self.objects.insert(Object::Mesh(mesh))
    }

    pub fn create_mesh(&mut self) -> ObjectId {
        self.add_mesh(PolyMesh::new())
    }

    pub fn clone_mesh(&mut self, id: ObjectId) -> Result<ObjectId, Error> {
        let mesh = self.mesh(id)?.clone();
        Ok(self.add_mesh(mesh))
    }

    #[cfg(feature = "obj")]
    pub fn import_obj(&mut self, path: &Path) -> Result<ObjectId, Error> {
        let mesh = PolyMesh::load_obj(path)?;
        debug!(
            "Imported {} vertices and {} faces from {}",
            mesh.num_vertices(),
            mesh.num_faces(),
            path.display()
        );
        Ok(self.add_mesh(mesh))
    }

    #[cfg(feature = "obj")]
    pub fn export_obj(&self, id: ObjectId, path: &Path) -> Result<(), Error> {
        self.mesh(id)?.save_obj(path)
    }

    pub fn triangulate(&mut self, id: ObjectId) -> Result<(), Error> {
        self.mesh_mut(id)?.triangulate()
    }

    /// Subdivide the mesh in place. The mesh is unchanged if subdivision
    /// fails.
    pub fn subdivide(&mut self, id: ObjectId, iterations: usize) -> Result<(), Error> {
        let mut mesh = self.mesh(id)?.clone();
        mesh.subdivide(iterations)?;
        *self.mesh_mut(id)? = mesh;
        Ok(())
    }

    pub fn scale(&mut self, id: ObjectId, factor: f32) -> Result<(), Error> {
        self.mesh_mut(id)?.scale(factor);
        Ok(())
    }

    pub fn translate(&mut self, id: ObjectId, offset: Vec3) -> Result<(), Error> {
        self.mesh_mut(id)?.translate(offset);
        Ok(())
    }

    pub fn transform(&mut self, id: ObjectId, xform: &Affine3A) -> Result<(), Error> {
        self.mesh_mut(id)?.transform(xform);
        Ok(())
    }

    /// Combine two meshes with the installed kernel into a new mesh.
    pub fn boolean(
        &mut self,
        op: BooleanOp,
        first: ObjectId,
        second: ObjectId,
    ) -> Result<ObjectId, Error> {
        let result = boolean::combine(
            self.kernel.as_deref(),
            op,
            self.mesh(first)?,
            self.mesh(second)?,
        )?;
        Ok(self.add_mesh(result))
    }

    pub fn union(&mut self, first: ObjectId, second: ObjectId) -> Result<ObjectId, Error> {
        self.boolean(BooleanOp::Union, first, second)
    }

    pub fn difference(&mut self, first: ObjectId, second: ObjectId) -> Result<ObjectId, Error> {
        self.boolean(BooleanOp::Difference, first, second)
    }

    pub fn intersection(&mut self, first: ObjectId, second: ObjectId) -> Result<ObjectId, Error> {
        self.boolean(BooleanOp::Intersection, first, second)
    }

    pub fn vertex_count(&self, id: ObjectId) -> Result<usize, Error> {
        Ok(self.mesh(id)?.num_vertices())
    }

    pub fn face_count(&self, id: ObjectId) -> Result<usize, Error> {
        Ok(self.mesh(id)?.num_faces())
    }

    /// Number of triangles after triangulating the faces of the mesh.
    pub fn triangle_count(&self, id: ObjectId) -> Result<usize, Error> {
        Ok(self.mesh(id)?.num_triangles())
    }

    pub fn edge_count(&self, id: ObjectId) -> Result<usize, Error> {
        Ok(self.mesh(id)?.num_edges())
    }

    /// Copy `[x, y, z]` of every vertex into `out`. Returns the number of
    /// vertices copied.
    pub fn vertex_positions(&self, id: ObjectId, out: &mut [f32]) -> Result<usize, Error> {
        fill_buffer(self.mesh(id)?.vertex_position_array(), out)
    }

    /// Copy the three vertex indices of every triangle into `out`. Returns
    /// the number of triangles copied.
    pub fn triangle_indices(&self, id: ObjectId, out: &mut [u32]) -> Result<usize, Error> {
        fill_buffer(self.mesh(id)?.triangle_index_array(), out)
    }

    /// Copy the unit normal of every triangle into `out`, in the same order
    /// as [`Self::triangle_indices`].
    pub fn triangle_normals(&self, id: ObjectId, out: &mut [f32]) -> Result<usize, Error> {
        fill_buffer(self.mesh(id)?.triangle_normal_array(), out)
    }

    /// Copy the two vertex indices of every edge into `out`.
    pub fn edge_indices(&self, id: ObjectId, out: &mut [u32]) -> Result<usize, Error> {
        fill_buffer(self.mesh(id)?.edge_index_array(), out)
    }

    pub fn create_skeleton(&mut self) -> ObjectId {
        self.objects.insert(Object::Skeleton(SkeletonObject {
            skeleton: Skeleton::new(),
            options: None,
        }))
    }

    pub fn add_node(&mut self, id: ObjectId, position: Vec3, radius: f32) -> Result<NodeH, Error> {
        self.skeleton_mut(id)?
            .skeleton
            .add_node(position, radius)
    }

    pub fn add_edge(&mut self, id: ObjectId, a: NodeH, b: NodeH) -> Result<(), Error> {
        self.skeleton_mut(id)?.skeleton.add_edge(a, b)
    }

    /// Options used to generate meshes from this skeleton. `None` falls back
    /// to the options of the context.
    pub fn set_skeleton_options(
        &mut self,
        id: ObjectId,
        options: Option<GenerateOptions>,
    ) -> Result<(), Error> {
        self.skeleton_mut(id)?.options = options.map(|o| o.sanitized());
        Ok(())
    }

    /// Generate a mesh from the component of the skeleton reachable from
    /// `root`, and register it as a new mesh.
    pub fn generate(&mut self, id: ObjectId, root: NodeH) -> Result<ObjectId, Error> {
        let options = match self.objects.get(id)? {
            Object::Skeleton(obj) => obj.options.unwrap_or(self.options),
            Object::Mesh(_) => return Err(Error::NotASkeleton(id)),
        };
        self.generate_with(id, root, &options)
    }

    /// Like [`Self::generate`], with explicit options.
    pub fn generate_with(
        &mut self,
        id: ObjectId,
        root: NodeH,
        options: &GenerateOptions,
    ) -> Result<ObjectId, Error> {
        let mesh = self.skeleton(id)?.generate(root, options)?;
        let mesh_id = self.add_mesh(mesh);
        debug!("Generated {} from {} of {}", mesh_id, root, id);
        Ok(mesh_id)
    }
}
