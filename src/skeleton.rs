use std::collections::VecDeque;

use glam::Vec3;
use petgraph::{graph::UnGraph, visit::EdgeRef};

use crate::{
    element::{Handle, NodeH},
    error::Error,
    vector::{EPSILON, Sphere},
};

/// A positioned sphere in a skeleton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub position: Vec3,
    pub radius: f32,
}

impl Node {
    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.position, self.radius)
    }
}

/// Graph of spheres connected by edges, from which a mesh is generated.
///
/// Nodes are never removed, so node handles stay valid for the lifetime of
/// the skeleton. The graph need not be connected.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    graph: UnGraph<Node, ()>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nnodes: usize, nedges: usize) -> Self {
        Skeleton {
            graph: UnGraph::with_capacity(nnodes, nedges),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, n: NodeH) -> bool {
        (n.index() as usize) < self.graph.node_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeH> + use<> {
        (0..self.graph.node_count() as u32).map(NodeH::from)
    }

    /// Add a sphere with the given center and radius. The position must be
    /// finite and the radius positive.
    pub fn add_node(&mut self, position: Vec3, radius: f32) -> Result<NodeH, Error> {
        if !position.is_finite() {
            return Err(Error::InvalidPosition(position.to_array()));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidRadius(radius));
        }
        Ok(self.graph.add_node(Node { position, radius }).into())
    }

    /// Connect two existing, distinct, non-coincident nodes that are not
    /// already connected. The skeleton is unchanged when this fails.
    pub fn add_edge(&mut self, a: NodeH, b: NodeH) -> Result<(), Error> {
        let pa = self.node(a)?.position;
        let pb = self.node(b)?.position;
        if a == b {
            return Err(Error::SelfLoop(a));
        }
        if self.are_connected(a, b) {
            return Err(Error::DuplicateEdge(a, b));
        }
        if pa.distance(pb) < EPSILON {
            return Err(Error::CoincidentNodes(a, b));
        }
        self.graph.add_edge(a.graph_index(), b.graph_index(), ());
        Ok(())
    }

    pub fn node(&self, n: NodeH) -> Result<&Node, Error> {
        self.graph
            .node_weight(n.graph_index())
            .ok_or(Error::InvalidNode(n))
    }

    pub fn position(&self, n: NodeH) -> Result<Vec3, Error> {
        Ok(self.node(n)?.position)
    }

    pub fn radius(&self, n: NodeH) -> Result<f32, Error> {
        Ok(self.node(n)?.radius)
    }

    pub fn are_connected(&self, a: NodeH, b: NodeH) -> bool {
        self.contains(a)
            && self.contains(b)
            && self
                .graph
                .find_edge(a.graph_index(), b.graph_index())
                .is_some()
    }

    pub fn degree(&self, n: NodeH) -> Result<usize, Error> {
        self.node(n)?;
        Ok(self.graph.neighbors(n.graph_index()).count())
    }

    /// Neighbors of `n`, in ascending order.
    pub fn neighbors(&self, n: NodeH) -> Result<Vec<NodeH>, Error> {
        self.node(n)?;
        let mut nbs: Vec<NodeH> = self
            .graph
            .neighbors(n.graph_index())
            .map(NodeH::from)
            .collect();
        nbs.sort();
        Ok(nbs)
    }

    /// All edges, with the lower node first, in the order they were added.
    pub fn edges(&self) -> impl Iterator<Item = (NodeH, NodeH)> + use<'_> {
        self.graph.edge_references().map(|e| {
            let (a, b) = (NodeH::from(e.source()), NodeH::from(e.target()));
            (a.min(b), a.max(b))
        })
    }

    /// Breadth first traversal of the component containing `root`. Returns
    /// every reachable node with the node it was discovered from. Neighbors
    /// are visited in ascending order, so the traversal is deterministic.
    pub fn traverse(&self, root: NodeH) -> Result<Vec<(NodeH, Option<NodeH>)>, Error> {
        if !self.contains(root) {
            return Err(Error::UnreachableRoot(root));
        }
        let mut visited = vec![false; self.num_nodes()];
        let mut queue = VecDeque::from([(root, None)]);
        visited[root.index() as usize] = true;
        let mut order = Vec::new();
        while let Some((n, parent)) = queue.pop_front() {
            order.push((n, parent));
            for nb in self.neighbors(n)? {
                let seen = &mut visited[nb.index() as usize];
                if !*seen {
                    *seen = true;
                    queue.push_back((nb, Some(n)));
                }
            }
        }
        Ok(order)
    }

    /// Nodes of the component containing `root`, in breadth first order.
    pub fn component(&self, root: NodeH) -> Result<Vec<NodeH>, Error> {
        Ok(self.traverse(root)?.into_iter().map(|(n, _)| n).collect())
    }

    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_undirected(&self.graph)
    }

    /// Edges whose end spheres overlap each other.
    pub fn overlapping_edges(&self) -> Vec<(NodeH, NodeH)> {
        self.graph
            .edge_references()
            .filter(|e| {
                let (a, b) = (&self.graph[e.source()], &self.graph[e.target()]);
                a.sphere().overlaps(&b.sphere())
            })
            .map(|e| (NodeH::from(e.source()), NodeH::from(e.target())))
            .collect()
    }
}
