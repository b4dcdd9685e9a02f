//! Leaf-index refresh and median-dual metric computation (spec §4.5).
//!
//! `update` is the one function every driver loop calls between topology
//! batches: it re-derives everything that is only meaningful for a
//! quiescent mesh (dense indices, leaf arrays, boundary membership order)
//! and then recomputes the metrics the flow solver reads.

use trimesh_math::vector::Vec2;

use crate::boundary::BoundaryId;
use crate::edge::HalfNormal;
use crate::mesh::Mesh;

/// Summary of one `update` pass, handed back mostly for logging/tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateReport {
    pub node_count: usize,
    pub tri_leaf_count: usize,
    pub edge_leaf_count: usize,
}

/// Walks nodes/edges/triangles in their stable insertion order, reassigns
/// dense indices, rebuilds the leaf and boundary arrays, and recomputes the
/// median-dual metrics. Must be called after any batch of splits/merges
/// before the leaf arrays or metrics are read.
pub fn update(mesh: &mut Mesh) -> UpdateReport {
    // 1. Dense node indices and node array.
    let mut node_array = Vec::with_capacity(mesh.node_count());
    let node_ids: Vec<_> = mesh.nodes_iter().map(|(id, _)| id).collect();
    for (idx, id) in node_ids.iter().enumerate() {
        mesh.node_mut(*id).index = idx;
        node_array.push(*id);
    }
    mesh.node_array = node_array;

    // 2. Triangle leaf count. `index` is the dense position within the leaf
    // array (`curTri->index = i` over `triLeafs`, not arena order) -- a
    // non-leaf parent keeps whatever `index` it was last given and is never
    // read again until it becomes a leaf itself on a later coarsen.
    let tri_ids: Vec<_> = mesh.tris_iter().map(|(id, _)| id).collect();
    let mut tri_leaves = Vec::new();
    for id in &tri_ids {
        let tri = mesh.tri_mut(*id);
        tri.split = false;
        tri.merge = false;
        if tri.is_leaf() {
            let idx = tri_leaves.len();
            tri.index = idx;
            tri.leaf_slot = Some(idx);
            tri_leaves.push(*id);
        } else {
            tri.leaf_slot = None;
        }
    }
    mesh.tri_leaves = tri_leaves;

    // 3. Edge leaf count, same dense-leaf-position indexing as triangles.
    let edge_ids: Vec<_> = mesh.edges_iter().map(|(id, _)| id).collect();
    let mut edge_leaves = Vec::new();
    for id in &edge_ids {
        let edge = mesh.edge_mut(*id);
        edge.split = false;
        edge.merge = false;
        if edge.is_leaf() {
            let idx = edge_leaves.len();
            edge.index = idx;
            edge.leaf_slot = Some(idx);
            edge_leaves.push(*id);
        } else {
            edge.leaf_slot = None;
        }
    }
    mesh.edge_leaves = edge_leaves;

    // 4. Boundary node/leaf-edge arrays.
    let bdry_ids: Vec<_> = mesh.bdrys_iter().map(|(id, _)| id).collect();
    for b_id in bdry_ids {
        rebuild_boundary(mesh, b_id);
    }

    calc_dual_metrics(mesh);

    UpdateReport {
        node_count: mesh.node_count(),
        tri_leaf_count: mesh.tri_leaves.len(),
        edge_leaf_count: mesh.edge_leaves.len(),
    }
}

/// Rebuilds one boundary's ordered node array and leaf-edge array from its
/// (possibly stale, non-leaf-filtered) running `edges`/`nodes` lists.
fn rebuild_boundary(mesh: &mut Mesh, b_id: BoundaryId) {
    let member_edges = mesh.bdry(b_id).edges.clone();
    let mut leaf_edges = Vec::new();
    let mut nodes = Vec::new();
    for e in member_edges {
        if !mesh.edge(e).is_leaf() {
            continue;
        }
        leaf_edges.push(e);
        for n in mesh.edge(e).n {
            if !nodes.contains(&n) {
                nodes.push(n);
            }
        }
    }
    let b = mesh.bdry_mut(b_id);
    b.leaf_edges = leaf_edges;
    b.nodes = nodes;
}

/// Recomputes every leaf edge's interior face normal (or boundary
/// half-normals) and every node's control-volume area, from scratch.
/// `intrNorm` and `vol` are reset to zero first: the source increments
/// both across refreshes, which would silently accumulate stale
/// contributions from earlier topology states.
pub fn calc_dual_metrics(mesh: &mut Mesh) {
    for id in mesh.nodes_iter().map(|(id, _)| id).collect::<Vec<_>>() {
        mesh.node_mut(id).vol = 0.0;
    }

    let leaves = mesh.edge_leaves.clone();
    for e in leaves {
        let (n0, n1, centroid, t0, t1, bdry) = {
            let edge = mesh.edge(e);
            (edge.n[0], edge.n[1], edge.centroid, edge.t[0], edge.t[1], edge.bdry)
        };

        let c0 = t0.map(|t| mesh.tri(t).centroid);
        let c1 = t1.map(|t| mesh.tri(t).centroid);

        let (dx0, dy0) = match c0 {
            Some(c) => (c.x - centroid.x, c.y - centroid.y),
            None => (0.0, 0.0),
        };
        let (dx1, dy1) = match c1 {
            Some(c) => (centroid.x - c.x, centroid.y - c.y),
            None => (0.0, 0.0),
        };

        mesh.edge_mut(e).intr_norm = Vec2 {
            x: dy0 + dy1,
            y: -dx0 - dx1,
        };

        let p0 = mesh.node(n0).pos;
        let p1 = mesh.node(n1).pos;

        // Each side contributes a signed half-quadrilateral
        // (node, edge-midpoint, triangle-centroid) to both endpoints. The
        // source accumulates this with `-=`; picking a sign here is an
        // open question (§9) since it depends on the cross-product operand
        // order chosen for `a`/`b`, and this ordering needs `+=` for CCW
        // triangles to yield positive nodal volumes (verified by P7).
        if let Some(c) = c0 {
            accumulate_side(mesh, n0, n1, p0, p1, centroid, c);
        }
        if let Some(c) = c1 {
            accumulate_side(mesh, n1, n0, p1, p0, centroid, c);
        }

        if bdry.is_some() {
            let half = HalfNormal {
                n0: Vec2 {
                    x: centroid.y - p0.y,
                    y: -(centroid.x - p0.x),
                },
                n1: Vec2 {
                    x: p1.y - centroid.y,
                    y: -(p1.x - centroid.x),
                },
            };
            mesh.edge_mut(e).half_norm = Some(half);
        } else {
            mesh.edge_mut(e).half_norm = None;
        }
    }
}

/// Adds the half-quadrilateral `(na, edge-midpoint, tri-centroid)` signed
/// area contribution to `na.vol`, and the mirrored `(nb, mid, centroid)`
/// contribution to `nb.vol`. Called once per side per edge, so each node
/// of each leaf edge picks up one contribution from each adjacent
/// triangle (two per interior edge, one per boundary edge).
fn accumulate_side(
    mesh: &mut Mesh,
    na: crate::node::NodeId,
    nb: crate::node::NodeId,
    pa: Vec2<f64>,
    pb: Vec2<f64>,
    mid: Vec2<f64>,
    centroid: Vec2<f64>,
) {
    let a = (mid - pa).cross(centroid - pa) * 0.5;
    let b = (centroid - pb).cross(mid - pb) * 0.5;
    mesh.node_mut(na).vol += a;
    mesh.node_mut(nb).vol += b;
}
