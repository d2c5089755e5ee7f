use std::fmt::{Debug, Display};

/**
 * All elements of a mesh or skeleton implement this trait. They are
 * identified by their index.
 */
pub trait Handle {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

macro_rules! handle_type {
    ($name:ident, $label:literal) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            idx: u32,
        }

        impl Handle for $name {
            fn index(&self) -> u32 {
                self.idx
            }
        }

        impl From<u32> for $name {
            fn from(idx: u32) -> Self {
                $name { idx }
            }
        }

        impl From<&u32> for $name {
            fn from(idx: &u32) -> Self {
                $name { idx: *idx }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.idx)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.idx)
            }
        }
    };
}

handle_type!(VH, "VH");
handle_type!(EH, "EH");
handle_type!(FH, "FH");
handle_type!(NodeH, "NodeH");

impl VH {
    /// Check if this vertex is valid for a mesh with `num_vertices` vertices.
    pub fn is_valid(self, num_vertices: usize) -> bool {
        (self.idx as usize) < num_vertices
    }
}

impl NodeH {
    pub(crate) fn graph_index(self) -> petgraph::graph::NodeIndex {
        petgraph::graph::NodeIndex::new(self.idx as usize)
    }
}

impl From<petgraph::graph::NodeIndex> for NodeH {
    fn from(value: petgraph::graph::NodeIndex) -> Self {
        NodeH {
            idx: value.index() as u32,
        }
    }
}
