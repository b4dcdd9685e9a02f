//! Longest-edge bisection refinement (spec §4.3).
//!
//! A refine pass has two phases that stay strictly separate, the same way
//! the source keeps `icfTri_markToSplit` and `icfEdge_split` apart:
//!
//! 1. **Marking.** Walk every triangle in its stable insertion order (not
//!    just the leaves -- a non-leaf is simply never a leaf so it can never
//!    pass the predicate check) and mark the ones the caller's predicate
//!    selects, propagating the mark across the paired triangle on the
//!    other side of the longest edge.
//! 2. **Splitting.** Every edge left with `split == true` after the
//!    marking pass gets bisected exactly once, which is why marking
//!    dedupes naturally: two triangles that share a longest edge both end
//!    up pointing at the same `EdgeId`.
//!
//! A consistency violation part-way through a split aborts that split and
//! is reported (`MeshError::Consistency`); it is not rolled back, per §5.

use crate::diag::{mesh_diag, Verbosity};
use crate::edge::EdgeId;
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::node::NodeId;
use crate::tri::{Tri, TriId};

/// Summary of one `refine` call, handed back to the caller so a driver loop
/// can decide whether to keep iterating (e.g. for the aspect-ratio
/// cascade).
#[derive(Debug, Default, Clone, Copy)]
pub struct RefineReport {
    pub tris_marked: usize,
    pub edges_split: usize,
}

/// Marks `t` for split if it is not already marked: finds `t`'s longest
/// edge, marks both `t` and (if present) the neighbor across that edge.
/// One propagation hop per call, exactly as in the source.
pub fn mark_to_split(mesh: &mut Mesh, t: TriId) -> MeshResult<()> {
    if mesh.tri(t).split {
        return Ok(());
    }
    if !mesh.tri(t).is_leaf() {
        return Ok(());
    }

    let (i_nb, e_l) = mesh.longest_edge(t);

    {
        let tri = mesh.tri_mut(t);
        tri.split = true;
        tri.e_split = Some(e_l);
    }
    mesh.edge_mut(e_l).split = true;

    let paired = mesh.tri(t).t[i_nb];
    if let Some(nb) = paired {
        let nb_tri = mesh.tri_mut(nb);
        nb_tri.split = true;
        nb_tri.e_split = Some(e_l);
    }

    mesh_diag!(
        mesh.verbosity,
        Verbosity::Debug,
        "marked tri {:?} to split along {:?}",
        t,
        e_l
    );
    Ok(())
}

/// Runs the predicate over every triangle in stable order and marks the
/// ones it selects, then bisects every edge left with `split == true`.
/// Returns how many triangles were newly marked and how many edges were
/// actually split this pass.
pub fn refine<F>(
    mesh: &mut Mesh,
    flow: &F,
    mut predicate: impl FnMut(&F, &Tri) -> bool,
) -> MeshResult<RefineReport> {
    let candidates: Vec<TriId> = mesh
        .tris_iter()
        .filter(|(_, t)| t.is_leaf())
        .map(|(id, _)| id)
        .collect();

    let mut tris_marked = 0;
    for id in candidates {
        if mesh.tri(id).split {
            continue;
        }
        if predicate(flow, mesh.tri(id)) {
            mark_to_split(mesh, id)?;
            tris_marked += 1;
        }
    }

    let marked_edges: Vec<EdgeId> = mesh
        .edges_iter()
        .filter(|(_, e)| e.is_leaf() && e.split)
        .map(|(id, _)| id)
        .collect();

    let mut edges_split = 0;
    for e in marked_edges {
        split_edge(mesh, e)?;
        edges_split += 1;
    }

    Ok(RefineReport {
        tris_marked,
        edges_split,
    })
}

/// Optional policy (§4.3): after a refine pass, rescan leaves and mark any
/// whose aspect ratio still exceeds `max_aspect_ratio`, up to
/// `max_iterations` extra passes. The source uses 4.0 with an iteration
/// cap; we take both as parameters instead of hardcoding them.
pub fn refine_until_aspect_ratio<F>(
    mesh: &mut Mesh,
    flow: &F,
    max_aspect_ratio: f64,
    max_iterations: usize,
) -> MeshResult<usize> {
    let mut passes = 0;
    for _ in 0..max_iterations {
        let over_ratio: Vec<TriId> = mesh
            .tris_iter()
            .filter(|(_, t)| t.is_leaf() && t.aspect_ratio > max_aspect_ratio)
            .map(|(id, _)| id)
            .collect();
        if over_ratio.is_empty() {
            break;
        }
        let report = refine(mesh, flow, |_, t| t.aspect_ratio > max_aspect_ratio)?;
        passes += 1;
        if report.edges_split == 0 {
            break;
        }
    }
    Ok(passes)
}

/// One side of a bisected edge: the triangle that used to sit there, now
/// replaced by the two new sub-triangles that share the new vertical edge.
struct SplitSide {
    tri_a: TriId,
    tri_b: TriId,
    n_a: NodeId,
    n_b: NodeId,
    vertical: EdgeId,
}

impl SplitSide {
    fn tri_touching(&self, n: NodeId) -> TriId {
        if self.n_a == n {
            self.tri_a
        } else {
            debug_assert_eq!(self.n_b, n);
            self.tri_b
        }
    }
}

/// Bisects `e`: creates the midpoint node, the two collinear halves, and
/// (for each side that has a triangle) the vertical edge and the pair of
/// new sub-triangles, then rewires every outer neighbor to point at the
/// new children instead of the destroyed-in-spirit (but not destroyed --
/// split never destroys anything) parent.
///
/// Precondition (§4.3): `e.split` and at least one of `e.t[0]`, `e.t[1]`
/// is set.
pub fn split_edge(mesh: &mut Mesh, e: EdgeId) -> MeshResult<()> {
    if !mesh.edge(e).split {
        return Err(MeshError::Precondition(format!(
            "edge {:?} is not marked for split",
            e
        )));
    }
    let (t_left, t_right) = {
        let edge = mesh.edge(e);
        (edge.t[0], edge.t[1])
    };
    if t_left.is_none() && t_right.is_none() {
        return Err(MeshError::Precondition(format!(
            "edge {:?} has no adjacent triangle to split",
            e
        )));
    }

    let (n0, n1) = {
        let edge = mesh.edge(e);
        (edge.n[0], edge.n[1])
    };
    let centroid = mesh.edge(e).centroid;
    let mid = mesh.create_node(centroid);

    let eh0 = mesh.create_edge(n0, mid);
    let eh1 = mesh.create_edge(mid, n1);

    let left = t_left
        .map(|t| split_side(mesh, t, e, mid, eh0, eh1))
        .transpose()?;
    let right = t_right
        .map(|t| split_side(mesh, t, e, mid, eh0, eh1))
        .transpose()?;

    let tri_near0 = |side: &SplitSide| side.tri_touching(n0);
    let tri_near1 = |side: &SplitSide| side.tri_touching(n1);

    let left_n0 = left.as_ref().map(tri_near0);
    let right_n0 = right.as_ref().map(tri_near0);
    let left_n1 = left.as_ref().map(tri_near1);
    let right_n1 = right.as_ref().map(tri_near1);

    mesh.set_edge_tris(eh0, left_n0, right_n0);
    mesh.set_edge_tris(eh1, left_n1, right_n1);

    // Each side's vertical edge runs mid -> apex, which is exactly the
    // direction `tri_a`'s own CCW boundary walk traverses it in (its node
    // order is `[apex, n_a, mid]`, so its last boundary edge goes
    // `mid -> apex`); `tri_b`'s walk (`[apex, mid, n_b]`) crosses it the
    // other way. So `tri_a` is always the left (`t[0]`) side and `tri_b`
    // the right (`t[1]`) side of the vertical edge, on both sides of the
    // split (`eV1.t=(tL0,tL1)`, `eV0.t=(tR0,tR1)` per the spec).
    if let Some(side) = &left {
        mesh.set_edge_tris(side.vertical, Some(side.tri_a), Some(side.tri_b));
    }
    if let Some(side) = &right {
        mesh.set_edge_tris(side.vertical, Some(side.tri_a), Some(side.tri_b));
    }

    // Cross-side neighbor slot 0 of each new sub-triangle (the slot
    // opposite its half-edge) points at whichever triangle sits on the
    // *other* side of that half-edge.
    if let Some(side) = &left {
        let a_cross = if side.n_a == n0 { right_n0 } else { right_n1 };
        let b_cross = if side.n_b == n0 { right_n0 } else { right_n1 };
        patch_tri_neighbor_slot0(mesh, side.tri_a, a_cross);
        patch_tri_neighbor_slot0(mesh, side.tri_b, b_cross);
    }
    if let Some(side) = &right {
        let a_cross = if side.n_a == n0 { left_n0 } else { left_n1 };
        let b_cross = if side.n_b == n0 { left_n0 } else { left_n1 };
        patch_tri_neighbor_slot0(mesh, side.tri_a, a_cross);
        patch_tri_neighbor_slot0(mesh, side.tri_b, b_cross);
    }

    // Boundary propagation (§4.3, B1/B2): the two halves and the midpoint
    // inherit the parent edge's boundary.
    if let Some(bdry) = mesh.edge(e).bdry {
        mesh.edge_mut(eh0).bdry = Some(bdry);
        mesh.edge_mut(eh1).bdry = Some(bdry);
        mesh.bdry_mut(bdry).add_edge(eh0);
        mesh.bdry_mut(bdry).add_edge(eh1);
        // the midpoint is a corner of the two new halves, so it occupies
        // both of the node's boundary slots (B2).
        mesh.add_boundary_node(bdry, mid, 0);
        mesh.add_boundary_node(bdry, mid, 1);
    }

    // Tree bookkeeping.
    let level = mesh.edge(e).tree_level;
    let ev0 = right.as_ref().map(|s| s.vertical);
    let ev1 = left.as_ref().map(|s| s.vertical);
    for child in [Some(eh0), Some(eh1), ev0, ev1].into_iter().flatten() {
        let c = mesh.edge_mut(child);
        c.parent = Some(e);
        c.tree_level = level + 1;
        c.n_c = Some(mid);
    }
    {
        let edge = mesh.edge_mut(e);
        edge.e_c = [Some(eh0), Some(eh1), ev0, ev1];
        edge.n_c = Some(mid);
        edge.is_split = true;
        edge.split = false;
    }

    {
        let node = mesh.node_mut(mid);
        node.e_c = [Some(eh0), ev0, Some(eh1), ev1];
        node.t_c = [right_n0, right_n1, left_n1, left_n0];
    }

    for (side_tri, tri_opt) in [
        (t_left, left.as_ref()),
        (t_right, right.as_ref()),
    ] {
        if let (Some(parent), Some(side)) = (side_tri, tri_opt) {
            let tlevel = mesh.tri(parent).tree_level;
            for &child in &[side.tri_a, side.tri_b] {
                let c = mesh.tri_mut(child);
                c.parent = Some(parent);
                c.tree_level = tlevel + 1;
                c.n_c = Some(mid);
            }
            let p = mesh.tri_mut(parent);
            p.t_c = [Some(side.tri_a), Some(side.tri_b)];
            p.is_split = true;
            p.split = false;
            p.e_split = None;
        }
    }

    mesh_diag!(
        mesh.verbosity,
        Verbosity::Info,
        "split edge {:?} -> node {:?}, halves ({:?},{:?})",
        e,
        mid,
        eh0,
        eh1
    );
    Ok(())
}

/// Replaces the neighbor-slot-0 entry of `t` (the slot opposite its own
/// half-edge) with `nbr`. `None` is a legitimate value on a boundary.
fn patch_tri_neighbor_slot0(mesh: &mut Mesh, t: TriId, nbr: Option<TriId>) {
    let tri = mesh.tri_mut(t);
    tri.t[0] = nbr;
}

/// Processes one triangle adjacent to the edge being split: builds the two
/// new sub-triangles, rewires the two outer (non-split) edges/triangles to
/// point at them instead of the parent, and returns the bookkeeping the
/// caller needs to finish wiring the halves and the vertical edge.
fn split_side(
    mesh: &mut Mesh,
    t_side: TriId,
    e: EdgeId,
    mid: NodeId,
    eh0: EdgeId,
    eh1: EdgeId,
) -> MeshResult<SplitSide> {
    let i = mesh.edge_slot_in(t_side, e)?;
    let tri = mesh.tri(t_side).clone_shape();
    let apex = tri.n[i];
    let n_a = tri.n[(i + 1) % 3];
    let n_b = tri.n[(i + 2) % 3];
    let e_apex_a = tri.e[(i + 2) % 3]; // opposite n_b: connects apex & n_a
    let e_apex_b = tri.e[(i + 1) % 3]; // opposite n_a: connects apex & n_b
    let t_outer_a = tri.t[(i + 2) % 3];
    let t_outer_b = tri.t[(i + 1) % 3];

    let (e_n0, _e_n1) = {
        let edge = mesh.edge(e);
        (edge.n[0], edge.n[1])
    };
    let (h_near_a, h_near_b) = if e_n0 == n_a {
        (eh0, eh1)
    } else {
        (eh1, eh0)
    };

    let vertical = mesh.create_edge(mid, apex);

    let tri_a = mesh.create_tri([apex, n_a, mid], [h_near_a, vertical, e_apex_a]);
    let tri_b = mesh.create_tri([apex, mid, n_b], [h_near_b, e_apex_b, vertical]);

    // slot 0 (opposite the half-edge) is patched in by the caller once
    // both sides are known; slot 1/2 are this side's own business.
    mesh.set_tri_tris(tri_a, None, Some(tri_b), t_outer_a);
    mesh.set_tri_tris(tri_b, None, t_outer_b, Some(tri_a));

    if let Some(outer) = t_outer_a {
        replace_tri_neighbor(mesh, outer, t_side, tri_a);
        replace_edge_tri(mesh, e_apex_a, t_side, tri_a);
    }
    if let Some(outer) = t_outer_b {
        replace_tri_neighbor(mesh, outer, t_side, tri_b);
        replace_edge_tri(mesh, e_apex_b, t_side, tri_b);
    }

    Ok(SplitSide {
        tri_a,
        tri_b,
        n_a,
        n_b,
        vertical,
    })
}

/// Finds `old` in `t`'s neighbor slots and replaces it with `new` (outer
/// triangle reciprocity, §4.3 "outer-neighbor reciprocity").
fn replace_tri_neighbor(mesh: &mut Mesh, t: TriId, old: TriId, new: TriId) {
    let tri = mesh.tri_mut(t);
    for slot in tri.t.iter_mut() {
        if *slot == Some(old) {
            *slot = Some(new);
        }
    }
}

/// Finds `old` in `e`'s adjacent-triangle slots and replaces it with `new`.
fn replace_edge_tri(mesh: &mut Mesh, e: EdgeId, old: TriId, new: TriId) {
    let edge = mesh.edge_mut(e);
    for slot in edge.t.iter_mut() {
        if *slot == Some(old) {
            *slot = Some(new);
        }
    }
}

impl Tri {
    /// Cheap `Copy`-free snapshot of the shape fields `split_side` needs
    /// while it still holds other mutable borrows of the mesh.
    fn clone_shape(&self) -> TriShape {
        TriShape {
            n: self.n,
            e: self.e,
            t: self.t,
        }
    }
}

struct TriShape {
    n: [NodeId; 3],
    e: [EdgeId; 3],
    t: [Option<TriId>; 3],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;
    use crate::test_support::{assert_adjacency_reciprocal, leaf_area_sum, unit_square};

    #[test]
    fn mark_to_split_propagates_across_shared_longest_edge() {
        let (mut mesh, _nodes, tris) = unit_square();
        mark_to_split(&mut mesh, tris[0]).unwrap();
        assert!(mesh.tri(tris[0]).split);
        assert!(mesh.tri(tris[1]).split, "split mark should cross the shared diagonal");
        assert_eq!(mesh.tri(tris[0]).e_split, mesh.tri(tris[1]).e_split);
    }

    #[test]
    fn mark_to_split_is_idempotent() {
        let (mut mesh, _nodes, tris) = unit_square();
        mark_to_split(&mut mesh, tris[0]).unwrap();
        let e_split_first = mesh.tri(tris[0]).e_split;
        mark_to_split(&mut mesh, tris[0]).unwrap();
        assert_eq!(mesh.tri(tris[0]).e_split, e_split_first);
    }

    #[test]
    fn refine_all_on_unit_square_splits_the_shared_diagonal_once() {
        let (mut mesh, _nodes, tris) = unit_square();
        let report = refine(&mut mesh, &(), predicate::refine_all).unwrap();
        assert_eq!(report.tris_marked, 2);
        assert_eq!(report.edges_split, 1);

        assert!(mesh.tri(tris[0]).is_split);
        assert!(mesh.tri(tris[1]).is_split);
        assert_eq!(mesh.tri_count(), 6); // 2 parents + 4 children, none destroyed
        assert_eq!(mesh.node_count(), 5); // +1 midpoint

        assert_adjacency_reciprocal(&mesh);
        let area = leaf_area_sum(&mesh);
        assert!((area - 1.0).abs() < 1e-12, "leaf area should still sum to 1.0, got {area}");
    }

    #[test]
    fn splitting_an_interior_edge_leaves_boundary_membership_untouched() {
        let (mut mesh, _nodes, tris) = unit_square();
        refine(&mut mesh, &(), predicate::refine_all).unwrap();

        for (_, tri) in mesh.tris_iter().filter(|(_, t)| t.is_leaf()) {
            assert!(tri.area > 0.0, "every leaf triangle must stay CCW after a split");
        }

        // the diagonal that was split is interior, so none of its children
        // (the two halves or either vertical edge) should pick up a
        // boundary.
        let children: Vec<_> = mesh
            .edges_iter()
            .filter(|(_, e)| e.parent.is_some())
            .collect();
        assert_eq!(children.len(), 4, "one split should produce 4 child edges");
        for (_, e) in &children {
            assert!(e.bdry.is_none());
        }
    }

    #[test]
    fn split_edge_without_marking_is_a_precondition_error() {
        let (mut mesh, _nodes, tris) = unit_square();
        let (_, e) = mesh.longest_edge(tris[0]);
        let err = split_edge(&mut mesh, e).unwrap_err();
        assert!(matches!(err, MeshError::Precondition(_)));
    }

    #[test]
    fn refine_until_aspect_ratio_terminates_once_every_leaf_is_within_bound() {
        let (mut mesh, _nodes, _tris) = unit_square();
        // aspect ratio of each half is sqrt(2), well under a threshold of 10.
        let passes = refine_until_aspect_ratio(&mut mesh, &(), 10.0, 5).unwrap();
        assert_eq!(passes, 0, "no triangle in the fixture should exceed the bound");
    }

    #[test]
    fn refine_until_aspect_ratio_bounds_the_diagonal_split() {
        let (mut mesh, _nodes, _tris) = unit_square();
        // aspect ratio of the halves of the unit-square diagonal split is
        // sqrt(2) ~= 1.41; a threshold just below that forces one pass.
        let passes = refine_until_aspect_ratio(&mut mesh, &(), 1.0, 3).unwrap();
        assert!(passes >= 1);
        assert_adjacency_reciprocal(&mesh);
    }
}
