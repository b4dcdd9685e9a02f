//! The topology store (spec §3, §4.1, §4.2).
//!
//! `Mesh` owns every node, edge, triangle and boundary through a typed
//! [`Arena`] per entity kind. All other references -- neighbor slots,
//! parent/child links, boundary back-references -- are non-owning
//! [`crate::id::Id`]s. Destroying the mesh drops the arenas in declaration
//! order (edges, triangles, boundaries, then nodes), matching the source's
//! teardown order.

use trimesh_math::vector::Vec2;

use crate::boundary::{Boundary, BoundaryId};
use crate::diag::Verbosity;
use crate::edge::Edge;
use crate::edge::EdgeId;
use crate::error::{MeshError, MeshResult};
use crate::id::Arena;
use crate::node::{Node, NodeId};
use crate::tri::{Tri, TriId};

pub struct Mesh {
    pub(crate) edges: Arena<Edge>,
    pub(crate) tris: Arena<Tri>,
    pub(crate) bdrys: Arena<Boundary>,
    pub(crate) nodes: Arena<Node>,

    /// Dense node array, rebuilt by `update`.
    pub node_array: Vec<NodeId>,
    /// Dense leaf arrays, rebuilt by `update`.
    pub edge_leaves: Vec<EdgeId>,
    pub tri_leaves: Vec<TriId>,

    pub verbosity: Verbosity,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Mesh {
            nodes: Arena::new(),
            edges: Arena::new(),
            tris: Arena::new(),
            bdrys: Arena::new(),
            node_array: Vec::new(),
            edge_leaves: Vec::new(),
            tri_leaves: Vec::new(),
            verbosity: Verbosity::default(),
        }
    }

    //
    // Entity accessors
    //

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id)
    }
    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges.get(id)
    }
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        self.edges.get_mut(id)
    }
    pub fn tri(&self, id: TriId) -> &Tri {
        self.tris.get(id)
    }
    pub fn tri_mut(&mut self, id: TriId) -> &mut Tri {
        self.tris.get_mut(id)
    }
    pub fn bdry(&self, id: BoundaryId) -> &Boundary {
        self.bdrys.get(id)
    }
    pub fn bdry_mut(&mut self, id: BoundaryId) -> &mut Boundary {
        self.bdrys.get_mut(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
    pub fn tri_count(&self) -> usize {
        self.tris.len()
    }

    pub fn nodes_iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }
    pub fn edges_iter(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }
    pub fn tris_iter(&self) -> impl Iterator<Item = (TriId, &Tri)> {
        self.tris.iter()
    }
    pub fn bdrys_iter(&self) -> impl Iterator<Item = (BoundaryId, &Boundary)> {
        self.bdrys.iter()
    }

    //
    // Constructors (§4.2)
    //

    /// `Node_create`: appends a node at `pos`. Index is left at its default
    /// until the next `update`.
    pub fn create_node(&mut self, pos: Vec2<f64>) -> NodeId {
        self.nodes.insert(Node::new(pos))
    }

    /// `Edge_create` + `Edge_setNodes` in one call: every call site in the
    /// source sets the nodes immediately after creating the edge, so we
    /// fold the two steps together and keep `set_edge_nodes` around for the
    /// (rarer) case of re-pointing an edge's endpoints.
    pub fn create_edge(&mut self, n0: NodeId, n1: NodeId) -> EdgeId {
        let id = self.edges.insert(Edge::new_unset(n0, n1));
        self.set_edge_nodes(id, n0, n1);
        id
    }

    /// `Edge_setNodes`: assigns endpoints and recomputes length/centroid.
    pub fn set_edge_nodes(&mut self, e: EdgeId, n0: NodeId, n1: NodeId) {
        let p0 = self.node(n0).pos;
        let p1 = self.node(n1).pos;
        let edge = self.edge_mut(e);
        edge.n = [n0, n1];
        edge.length = (p1 - p0).length();
        edge.centroid = (p0 + p1).scale(0.5);
    }

    /// `Edge_setTris`: assigns the left/right triangle slots.
    pub fn set_edge_tris(&mut self, e: EdgeId, t0: Option<TriId>, t1: Option<TriId>) {
        self.edge_mut(e).t = [t0, t1];
    }

    /// `Tri_create` + `Tri_setNodes` + `Tri_setEdges` in one call, mirroring
    /// the ingest and split call sites which always have all six handles in
    /// hand up front.
    pub fn create_tri(&mut self, n: [NodeId; 3], e: [EdgeId; 3]) -> TriId {
        let id = self.tris.insert(Tri::new_unset(n, e));
        self.set_tri_nodes(id, n[0], n[1], n[2]);
        self.set_tri_edges(id, e[0], e[1], e[2]);
        id
    }

    /// `Tri_setNodes`: assigns the three nodes in CCW order and recomputes
    /// the centroid and signed area (I3: `area > 0`).
    pub fn set_tri_nodes(&mut self, t: TriId, n0: NodeId, n1: NodeId, n2: NodeId) {
        let p0 = self.node(n0).pos;
        let p1 = self.node(n1).pos;
        let p2 = self.node(n2).pos;
        let centroid = (p0 + p1 + p2).scale(1.0 / 3.0);
        let area = trimesh_math::signed_area2(p0, p1, p2) * 0.5;
        let tri = self.tri_mut(t);
        tri.n = [n0, n1, n2];
        tri.centroid = centroid;
        tri.area = area;
    }

    /// `Tri_setEdges`: assigns `e[i]` opposite `n[i]` (I2) and recomputes
    /// the aspect ratio `maxEdgeLen / minEdgeLen`.
    pub fn set_tri_edges(&mut self, t: TriId, e0: EdgeId, e1: EdgeId, e2: EdgeId) {
        let l0 = self.edge(e0).length;
        let l1 = self.edge(e1).length;
        let l2 = self.edge(e2).length;
        let max_len = l0.max(l1).max(l2);
        let min_len = l0.min(l1).min(l2);
        let tri = self.tri_mut(t);
        tri.e = [e0, e1, e2];
        tri.aspect_ratio = if min_len > 0.0 {
            max_len / min_len
        } else {
            f64::INFINITY
        };
    }

    /// `Tri_setTris`: assigns the three neighbor slots, `t[i]` across `e[i]`.
    pub fn set_tri_tris(&mut self, t: TriId, t0: Option<TriId>, t1: Option<TriId>, t2: Option<TriId>) {
        self.tri_mut(t).t = [t0, t1, t2];
    }

    pub fn create_boundary(&mut self, marker: i32, name: impl Into<String>) -> BoundaryId {
        self.bdrys.insert(Boundary::new(marker, name))
    }

    /// `icfBdry_addNode`: attaches `node` to boundary `b`'s membership list
    /// and records the back-reference in the node's own `bdry[index]` slot
    /// (`index` is 0 or 1 -- a boundary-corner node, e.g. a split boundary
    /// edge's midpoint, occupies both). Needs both arenas at once, which is
    /// why it lives here rather than on `Boundary` itself.
    pub fn add_boundary_node(&mut self, b: BoundaryId, node: NodeId, index: usize) {
        self.node_mut(node).bdry[index] = Some(b);
        self.bdry_mut(b).add_node(node);
    }

    pub fn find_boundary(&self, marker: i32) -> Option<BoundaryId> {
        self.bdrys_iter()
            .find(|(_, b)| b.marker == marker)
            .map(|(id, _)| id)
    }

    //
    // Destruction -- removal of a non-member is a programming error and
    // panics inside the arena (§4.1).
    //

    pub fn destroy_node(&mut self, id: NodeId) {
        self.nodes.remove(id);
    }
    pub fn destroy_edge(&mut self, id: EdgeId) {
        self.edges.remove(id);
    }
    pub fn destroy_tri(&mut self, id: TriId) {
        self.tris.remove(id);
    }

    /// Whether `id` still names a live entity. Coarsening gathers its leaf
    /// edges up front, and merging one midpoint's family can destroy a
    /// sibling edge that a later iteration of the same pass was also going
    /// to visit; callers walking a snapshot like that must check this
    /// before dereferencing.
    pub fn node_exists(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }
    pub fn edge_exists(&self, id: EdgeId) -> bool {
        self.edges.contains(id)
    }
    pub fn tri_exists(&self, id: TriId) -> bool {
        self.tris.contains(id)
    }

    //
    // Shared geometric helpers used by both the refinement and coarsening
    // engines.
    //

    /// The index (0..=2) of `t`'s longest edge, and that edge's id.
    pub fn longest_edge(&self, t: TriId) -> (usize, EdgeId) {
        let tri = self.tri(t);
        let mut best_i = 0;
        let mut best_len = self.edge(tri.e[0]).length;
        for i in 1..3 {
            let len = self.edge(tri.e[i]).length;
            if len > best_len {
                best_len = len;
                best_i = i;
            }
        }
        (best_i, tri.e[best_i])
    }

    /// Looks up `e`'s slot in `t.e`, turning "not found" into a
    /// [`MeshError::Consistency`] instead of panicking -- this is exactly
    /// the rotation-search failure mode §7 calls out.
    pub fn edge_slot_in(&self, t: TriId, e: EdgeId) -> MeshResult<usize> {
        self.tri(t).edge_slot(e).ok_or_else(|| {
            MeshError::Consistency(format!("edge {:?} not found among tri {:?}'s edges", e, t))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assert_adjacency_reciprocal, unit_square};

    #[test]
    fn create_node_appends_at_origin_position() {
        let mut mesh = Mesh::new();
        let id = mesh.create_node(Vec2 { x: 3.0, y: 4.0 });
        assert_eq!(mesh.node(id).pos, Vec2 { x: 3.0, y: 4.0 });
        assert_eq!(mesh.node_count(), 1);
    }

    #[test]
    fn create_edge_computes_length_and_centroid() {
        let mut mesh = Mesh::new();
        let n0 = mesh.create_node(Vec2 { x: 0.0, y: 0.0 });
        let n1 = mesh.create_node(Vec2 { x: 3.0, y: 4.0 });
        let e = mesh.create_edge(n0, n1);
        assert_eq!(mesh.edge(e).length, 5.0);
        assert_eq!(mesh.edge(e).centroid, Vec2 { x: 1.5, y: 2.0 });
    }

    #[test]
    fn create_tri_computes_ccw_area_and_aspect_ratio() {
        let (mesh, _nodes, tris) = unit_square();
        for t in tris {
            assert!(mesh.tri(t).area > 0.0, "triangle {:?} should be CCW", t);
            assert_eq!(mesh.tri(t).area, 0.5);
        }
    }

    #[test]
    fn unit_square_fixture_is_internally_consistent() {
        let (mesh, _nodes, _tris) = unit_square();
        assert_adjacency_reciprocal(&mesh);
        assert_eq!(mesh.node_count(), 4);
        assert_eq!(mesh.edge_count(), 5);
        assert_eq!(mesh.tri_count(), 2);
    }

    #[test]
    fn destroy_tri_then_exists_reports_false() {
        let (mut mesh, _nodes, tris) = unit_square();
        let t0 = tris[0];
        assert!(mesh.tri_exists(t0));
        // detach it from its neighbor first so the arena removal alone is
        // under test, not the rest of the topology.
        mesh.set_tri_tris(t0, None, None, None);
        mesh.destroy_tri(t0);
        assert!(!mesh.tri_exists(t0));
    }

    #[test]
    fn edge_slot_in_reports_consistency_error_for_foreign_edge() {
        let (mesh, _nodes, tris) = unit_square();
        // `Id` equality is index+generation only, with no arena tag, so a
        // foreign edge must be pushed past every index `t0.e` actually uses
        // (0, 1, 2 in the fixture) or it would coincidentally compare equal
        // to one of them.
        let mut other = Mesh::new();
        let a = other.create_node(Vec2 { x: 0.0, y: 0.0 });
        let b = other.create_node(Vec2 { x: 1.0, y: 0.0 });
        for _ in 0..10 {
            other.create_edge(a, b);
        }
        let foreign_edge = other.create_edge(a, b);
        let err = mesh.edge_slot_in(tris[0], foreign_edge).unwrap_err();
        assert!(matches!(err, MeshError::Consistency(_)));
    }

    #[test]
    fn longest_edge_of_unit_square_half_is_the_diagonal() {
        let (mesh, _nodes, tris) = unit_square();
        for t in tris {
            let (_, e) = mesh.longest_edge(t);
            assert!(
                (mesh.edge(e).length - std::f64::consts::SQRT_2).abs() < 1e-12,
                "longest edge of {:?} should be the diagonal",
                t
            );
        }
    }
}
