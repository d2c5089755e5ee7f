use thiserror::Error;

use crate::{
    element::{FH, NodeH, VH},
    registry::ObjectId,
};

/// Broad classification of an [`Error`], for callers that only need to know
/// what category of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown, destroyed or mistyped object id.
    InvalidHandle,
    /// Reference to a node that does not exist, or to an edge that already
    /// exists.
    InvalidReference,
    /// Zero-length geometry or an invalid radius.
    DegenerateEdge,
    /// Malformed faces or indices in a mesh operation.
    InvalidTopology,
    /// Generation root is not present in the skeleton.
    UnreachableRoot,
    /// Caller-provided output buffer is too small.
    BufferTooSmall,
    /// Reading or writing a mesh file failed.
    Io,
    /// The operation needs a collaborator that is not installed.
    Unsupported,
}

#[derive(Debug, Error)]
pub enum Error {
    // Registry.
    #[error("No object with id {0}")]
    InvalidObject(ObjectId),
    #[error("Object {0} is not a mesh")]
    NotAMesh(ObjectId),
    #[error("Object {0} is not a skeleton")]
    NotASkeleton(ObjectId),
    // Skeleton.
    #[error("{0} does not exist in the skeleton")]
    InvalidNode(NodeH),
    #[error("{0} and {1} are already connected")]
    DuplicateEdge(NodeH, NodeH),
    #[error("Cannot connect {0} to itself")]
    SelfLoop(NodeH),
    #[error("{0} and {1} are coincident")]
    CoincidentNodes(NodeH, NodeH),
    #[error("Invalid node position {0:?}")]
    InvalidPosition([f32; 3]),
    #[error("Invalid node radius {0}")]
    InvalidRadius(f32),
    #[error("Radius of {0} is below the minimum radius")]
    RadiusTooSmall(NodeH),
    #[error("Edge between {0} and {1} is too short to generate a segment")]
    ShortEdge(NodeH, NodeH),
    #[error("Branches at {0} are coincident")]
    CoincidentBranches(NodeH),
    #[error("Cannot normalize a zero length vector")]
    DegenerateVector,
    #[error("Root {0} is not in the skeleton")]
    UnreachableRoot(NodeH),
    #[error("Cannot resolve the joint at {0}")]
    UnresolvedJoint(NodeH),
    // Topology.
    #[error("{0} is out of bounds")]
    InvalidVertex(VH),
    #[error("A face needs at least 3 vertices, found {0}")]
    FaceTooSmall(usize),
    #[error("{0} is degenerate")]
    DegenerateFace(FH),
    #[error("Edge ({0}, {1}) is not manifold")]
    NonManifoldEdge(VH, VH),
    #[error("{0} is not manifold")]
    NonManifoldVertex(VH),
    #[error("Edge ({0}, {1}) is on an open boundary")]
    OpenBoundary(VH, VH),
    // Buffers.
    #[error("Buffer too small: {required} required, {written} written")]
    BufferTooSmall { required: usize, written: usize },
    // Obj.
    #[error("Cannot load obj file: {0}")]
    ObjLoadFailed(String),
    #[error("Incorrect number of coordinates: {0}")]
    IncorrectNumberOfCoordinates(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    // Booleans.
    #[error("No boolean kernel is installed")]
    BooleanUnavailable,
    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidObject(_) | Error::NotAMesh(_) | Error::NotASkeleton(_) => {
                ErrorKind::InvalidHandle
            }
            Error::InvalidNode(_) | Error::DuplicateEdge(..) => ErrorKind::InvalidReference,
            Error::SelfLoop(_)
            | Error::CoincidentNodes(..)
            | Error::InvalidPosition(_)
            | Error::InvalidRadius(_)
            | Error::RadiusTooSmall(_)
            | Error::ShortEdge(..)
            | Error::CoincidentBranches(_)
            | Error::DegenerateVector => ErrorKind::DegenerateEdge,
            Error::UnreachableRoot(_) => ErrorKind::UnreachableRoot,
            Error::UnresolvedJoint(_)
            | Error::InvalidVertex(_)
            | Error::FaceTooSmall(_)
            | Error::DegenerateFace(_)
            | Error::NonManifoldEdge(..)
            | Error::NonManifoldVertex(_)
            | Error::OpenBoundary(..) => ErrorKind::InvalidTopology,
            Error::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            Error::ObjLoadFailed(_) | Error::IncorrectNumberOfCoordinates(_) | Error::Io(_) => {
                ErrorKind::Io
            }
            Error::BooleanUnavailable | Error::BooleanFailed(_) => ErrorKind::Unsupported,
        }
    }
}
