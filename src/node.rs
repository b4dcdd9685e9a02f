use trimesh_math::vector::Vec2;

use crate::edge::EdgeId;
use crate::id::Id;
use crate::tri::TriId;

pub type NodeId = Id<Node>;

/// A mesh vertex. Every node is created by [`crate::mesh::Mesh::create_node`]
/// during ingest (level 0) or by [`crate::refine::split_edge`] (as an edge
/// midpoint, one level deeper in the refinement tree).
#[derive(Debug, Clone)]
pub struct Node {
    pub pos: Vec2<f64>,

    /// Dense index, assigned by [`crate::metrics::update`]. Only meaningful
    /// right after a refresh; stale once further topology changes happen.
    pub index: usize,

    /// Sibling links populated when this node is the midpoint created by a
    /// [`crate::refine::split_edge`] call. `None` for level-0 nodes and for
    /// any side that had no adjacent triangle to split. Indexed H0, V0, H1,
    /// V1 as in the parent edge's own `e_c`.
    pub e_c: [Option<EdgeId>; 4],
    /// Sibling triangles, indexed R0, R1, L1, L0 -- the order `mergeEdge`
    /// wants them in when walking back up the tree.
    pub t_c: [Option<TriId>; 4],

    /// Up to two boundaries this node sits on (a corner node sits on both
    /// halves of a split boundary edge).
    pub bdry: [Option<crate::boundary::BoundaryId>; 2],

    /// Median-dual control volume area, accumulated by `calcDualMetrics`.
    pub vol: f64,
}

impl Node {
    pub fn new(pos: Vec2<f64>) -> Self {
        Node {
            pos,
            index: 0,
            e_c: [None; 4],
            t_c: [None; 4],
            bdry: [None, None],
            vol: 0.0,
        }
    }

    /// True once this node has been attached to a boundary in both of its
    /// slots -- the state a split boundary-edge midpoint reaches (B2).
    pub fn is_boundary_corner(&self) -> bool {
        self.bdry[0].is_some() && self.bdry[1].is_some()
    }
}
