use trimesh_math::vector::Vec2;

use crate::boundary::BoundaryId;
use crate::id::Id;
use crate::node::NodeId;
use crate::tri::TriId;

pub type EdgeId = Id<Edge>;

/// Outward half-normal stored on a boundary edge, one per endpoint, read by
/// the flow solver to build per-node boundary fluxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfNormal {
    pub n0: Vec2<f64>,
    pub n1: Vec2<f64>,
}

/// An oriented edge `n[0] -> n[1]` with up to two adjacent triangles:
/// `t[0]` is the triangle to the left of the edge direction, `t[1]` the
/// triangle to the right. A boundary edge has exactly one of the two set.
#[derive(Debug, Clone)]
pub struct Edge {
    pub n: [NodeId; 2],
    pub t: [Option<TriId>; 2],

    /// Dense insertion-order index, reassigned by `update` every refresh.
    pub index: usize,

    pub length: f64,
    pub centroid: Vec2<f64>,

    pub split: bool,
    pub is_split: bool,
    pub merge: bool,

    pub tree_level: u32,
    pub parent: Option<EdgeId>,
    /// `e_c[0]`, `e_c[1]` are the two collinear halves (H0, H1); `e_c[2]`,
    /// `e_c[3]` are the vertical edges created on the right and left side
    /// of the split respectively (V0, V1). Any entry may be absent when
    /// the corresponding side of the parent edge had no triangle.
    pub e_c: [Option<EdgeId>; 4],
    pub n_c: Option<NodeId>,

    pub bdry: Option<BoundaryId>,

    /// Interior face-normal vector, recomputed whole-cloth by
    /// `calcDualMetrics` every refresh (never accumulated across refreshes,
    /// see the sign/accumulation note in the design docs).
    pub intr_norm: Vec2<f64>,
    /// Set only when `bdry.is_some()`.
    pub half_norm: Option<HalfNormal>,

    /// Dense leaf-array position, written by `update` and consulted by
    /// `mergeEdge` to null out a slot before the next refresh compacts it.
    pub leaf_slot: Option<usize>,
}

impl Edge {
    pub fn new_unset(n0: NodeId, n1: NodeId) -> Self {
        Edge {
            n: [n0, n1],
            t: [None, None],
            index: 0,
            length: 0.0,
            centroid: Vec2 { x: 0.0, y: 0.0 },
            split: false,
            is_split: false,
            merge: false,
            tree_level: 0,
            parent: None,
            e_c: [None; 4],
            n_c: None,
            bdry: None,
            intr_norm: Vec2 { x: 0.0, y: 0.0 },
            half_norm: None,
            leaf_slot: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_split
    }

    /// The other endpoint of the edge, given one of its two nodes.
    pub fn other(&self, n: NodeId) -> NodeId {
        if self.n[0] == n {
            self.n[1]
        } else {
            debug_assert_eq!(self.n[1], n, "node not incident to edge");
            self.n[0]
        }
    }
}
