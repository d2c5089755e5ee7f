/*!
This crate is a polygon mesh engine whose main feature is generating closed
meshes from skeletons of spheres.

# Overview

+ A [`Skeleton`] is a graph of [`Node`]s, each a sphere with a position and a
  radius, connected by edges. [`Skeleton::generate`] wraps the part of the
  skeleton reachable from a root node in a single watertight triangle mesh:
  every edge becomes a tapered tube, terminal nodes are capped with domes,
  and nodes where several edges meet are closed by the convex hull of the
  rings of their tubes. Generation is controlled by [`GenerateOptions`].

+ A [`PolyMesh`] stores vertex positions and polygonal faces, and supports
  triangulation, Catmull-Clark and Loop subdivision, welding, merging,
  normals, topology checks and, with the `obj` feature, reading and writing
  Wavefront OBJ files.

+ A [`Context`] owns meshes and skeletons and addresses them with
  [`ObjectId`]s. It copies mesh data into caller provided flat buffers, and
  delegates boolean operations to a [`BooleanKernel`] installed by the
  caller.

```rust
use glam::vec3;
use sinew::{GenerateOptions, Skeleton};

let mut skeleton = Skeleton::new();
let hub = skeleton.add_node(vec3(0.0, 0.0, 0.0), 1.0).expect("Cannot add node");
for dir in [vec3(1.0, 0.0, 0.0), vec3(-0.5, 0.8, 0.0), vec3(-0.5, -0.8, 0.3)] {
    let leaf = skeleton.add_node(dir * 5.0, 0.5).expect("Cannot add node");
    skeleton.add_edge(hub, leaf).expect("Cannot add edge");
}
let mesh = skeleton
    .generate(hub, &GenerateOptions::default())
    .expect("Cannot generate mesh");
assert!(mesh.is_closed_manifold());
```
*/

mod bmesh;
mod boolean;
mod buffer;
mod check;
mod context;
mod element;
mod error;
mod macros;
mod math;
mod mesh;
#[cfg(feature = "obj")]
mod obj;
mod primitive;
mod registry;
mod skeleton;
mod subdiv;
mod topol;
mod triangulate;
mod weld;

pub mod vector;

pub use bmesh::{GenerateOptions, IsolatedNode};
pub use boolean::{BooleanKernel, BooleanOp};
pub use buffer::fill_buffer;
pub use context::Context;
pub use element::{EH, FH, Handle, NodeH, VH};
pub use error::{Error, ErrorKind};
pub use mesh::PolyMesh;
pub use registry::ObjectId;
pub use skeleton::{Node, Skeleton};
pub use topol::{Edge, Topology};
pub use vector::Sphere;
