use trimesh_math::vector::Vec2;

use crate::edge::EdgeId;
use crate::id::Id;
use crate::node::NodeId;

pub type TriId = Id<Tri>;

/// A CCW-ordered triangle. `e[i]` is the edge opposite `n[i]`; `t[i]` is the
/// neighbor triangle across `e[i]`, or `None` on a boundary (I2).
#[derive(Debug, Clone)]
pub struct Tri {
    pub n: [NodeId; 3],
    pub e: [EdgeId; 3],
    pub t: [Option<TriId>; 3],

    /// Dense insertion-order index, reassigned by `update` every refresh;
    /// used by `printMesh` and by ingest's neighbor-index resolution.
    pub index: usize,

    pub centroid: Vec2<f64>,
    pub area: f64,
    pub aspect_ratio: f64,

    pub split: bool,
    pub merge: bool,
    pub is_split: bool,

    pub tree_level: u32,
    pub parent: Option<TriId>,
    pub t_c: [Option<TriId>; 2],
    pub n_c: Option<NodeId>,
    /// The edge this triangle is scheduled to split along, set together
    /// with `split` by `markToSplit`.
    pub e_split: Option<EdgeId>,

    pub leaf_slot: Option<usize>,
}

impl Tri {
    pub fn new_unset(n: [NodeId; 3], e: [EdgeId; 3]) -> Self {
        Tri {
            n,
            e,
            t: [None; 3],
            index: 0,
            centroid: Vec2 { x: 0.0, y: 0.0 },
            area: 0.0,
            aspect_ratio: 1.0,
            split: false,
            merge: false,
            is_split: false,
            tree_level: 0,
            parent: None,
            t_c: [None; 2],
            n_c: None,
            e_split: None,
            leaf_slot: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_split
    }

    /// Position of edge `e` in `self.e`, the index search every rotation
    /// in split/merge relies on. `None` means a consistency violation --
    /// the caller is responsible for turning that into a proper error.
    pub fn edge_slot(&self, e: EdgeId) -> Option<usize> {
        self.e.iter().position(|&x| x == e)
    }

    pub fn node_slot(&self, n: NodeId) -> Option<usize> {
        self.n.iter().position(|&x| x == n)
    }
}
