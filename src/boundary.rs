use crate::edge::EdgeId;
use crate::id::Id;
use crate::node::NodeId;

pub type BoundaryId = Id<Boundary>;

/// A named group of boundary edges and the nodes that sit on them. Ordered
/// membership is rebuilt from scratch by `update` every refresh (§4.5.5),
/// so the vectors here only need to be correct between refreshes.
#[derive(Debug, Clone)]
pub struct Boundary {
    pub marker: i32,
    pub name: String,

    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,

    /// Dense leaf-edge array, rebuilt by `update` alongside the mesh-wide
    /// leaf arrays.
    pub leaf_edges: Vec<EdgeId>,
}

impl Boundary {
    pub fn new(marker: i32, name: impl Into<String>) -> Self {
        Boundary {
            marker,
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            leaf_edges: Vec::new(),
        }
    }

    pub fn add_edge(&mut self, e: EdgeId) {
        self.edges.push(e);
    }

    /// Adds `node` to this boundary's membership list (deduped). Does not
    /// set the node's own `bdry[0..1]` back-reference -- that half of
    /// `icfBdry_addNode` needs the node arena too, so it lives on
    /// [`crate::mesh::Mesh::add_boundary_node`], the only place that holds
    /// both.
    pub fn add_node(&mut self, node: NodeId) {
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
    }

    pub fn remove_edge(&mut self, e: EdgeId) {
        self.edges.retain(|&x| x != e);
    }

    pub fn remove_node(&mut self, n: NodeId) {
        self.nodes.retain(|&x| x != n);
    }
}
