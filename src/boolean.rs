use log::debug;

use crate::{error::Error, mesh::PolyMesh};

/// Boolean operation between two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    /// The first solid minus the second.
    Difference,
    Intersection,
}

/// A boundary representation boolean kernel. This crate does not implement
/// one. Install an implementation in a [`Context`](crate::Context) to enable
/// boolean operations on its meshes.
///
/// Both inputs are closed manifold triangle meshes.
pub trait BooleanKernel {
    fn apply(&self, op: BooleanOp, first: &PolyMesh, second: &PolyMesh) -> Result<PolyMesh, Error>;
}

impl<F> BooleanKernel for F
where
    F: Fn(BooleanOp, &PolyMesh, &PolyMesh) -> Result<PolyMesh, Error>,
{
    fn apply(&self, op: BooleanOp, first: &PolyMesh, second: &PolyMesh) -> Result<PolyMesh, Error> {
        self(op, first, second)
    }
}

/// Triangulate both inputs, hand them to the kernel and check that the
/// result is a valid mesh.
pub(crate) fn combine(
    kernel: Option<&dyn BooleanKernel>,
    op: BooleanOp,
    first: &PolyMesh,
    second: &PolyMesh,
) -> Result<PolyMesh, Error> {
    let kernel = kernel.ok_or(Error::BooleanUnavailable)?;
    let first = first.triangulated()?;
    let second = second.triangulated()?;
    first.check_closed_manifold()?;
    second.check_closed_manifold()?;
    let result = kernel.apply(op, &first, &second)?;
    result
        .check_topology()
        .map_err(|e| Error::BooleanFailed(format!("{:?} produced an invalid mesh: {}", op, e)))?;
    debug!(
        "{:?} of meshes with {} and {} faces has {} faces",
        op,
        first.num_faces(),
        second.num_faces(),
        result.num_faces()
    );
    Ok(result)
}
