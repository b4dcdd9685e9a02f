//! Coarsening: undoing one bisection (spec §4.4).
//!
//! Mirrors [`crate::refine`]'s two-phase shape: a marking pass over the
//! leaf triangles, then a merge pass over whatever ended up marked. Unlike
//! splitting, a single merge touches up to four sibling edges and four
//! sibling triangles at once (everything born from one midpoint node), so
//! the driver dedups by midpoint node before calling [`merge_edge`] --
//! calling it twice for the same node would mean operating on an already
//! -destroyed node the second time.

use std::collections::HashSet;

use crate::diag::{mesh_diag, Verbosity};
use crate::edge::EdgeId;
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::node::NodeId;
use crate::tri::{Tri, TriId};

#[derive(Debug, Default, Clone, Copy)]
pub struct CoarsenReport {
    pub tris_marked: usize,
    pub nodes_merged: usize,
}

/// Marks `t` and all of its siblings (the triangles and edges born from
/// the same midpoint node) for merge. A no-op if `t` has no midpoint
/// ancestry (`t.n_c` is `None` -- it was never produced by a split) or is
/// already marked or is not a leaf.
pub fn mark_to_merge(mesh: &mut Mesh, t: TriId) -> MeshResult<()> {
    if mesh.tri(t).merge || !mesh.tri(t).is_leaf() {
        return Ok(());
    }
    let n = match mesh.tri(t).n_c {
        Some(n) => n,
        None => return Ok(()),
    };

    let t_c = mesh.node(n).t_c;
    for sib in t_c.into_iter().flatten() {
        mesh.tri_mut(sib).merge = true;
    }
    let e_c = mesh.node(n).e_c;
    for sib in e_c.into_iter().flatten() {
        mesh.edge_mut(sib).merge = true;
    }

    mesh_diag!(
        mesh.verbosity,
        Verbosity::Debug,
        "marked midpoint {:?}'s family for merge",
        n
    );
    Ok(())
}

/// Runs the predicate over every leaf triangle and marks the ones it
/// selects (and their siblings), then merges every distinct midpoint node
/// left with a fully-merge-marked family.
pub fn coarsen<F>(
    mesh: &mut Mesh,
    flow: &F,
    mut predicate: impl FnMut(&F, &Tri) -> bool,
) -> MeshResult<CoarsenReport> {
    let candidates: Vec<TriId> = mesh
        .tris_iter()
        .filter(|(_, t)| t.is_leaf())
        .map(|(id, _)| id)
        .collect();

    let mut tris_marked = 0;
    for id in candidates {
        if mesh.tri(id).merge {
            continue;
        }
        if predicate(flow, mesh.tri(id)) {
            mark_to_merge(mesh, id)?;
            tris_marked += 1;
        }
    }

    let mut seen = HashSet::new();
    let merge_edges: Vec<EdgeId> = mesh
        .edges_iter()
        .filter(|(_, e)| e.is_leaf() && e.merge)
        .map(|(id, _)| id)
        .collect();

    let mut nodes_merged = 0;
    for e in merge_edges {
        // A sibling edge collected above may already have been destroyed by
        // an earlier iteration's `merge_node` call on the same midpoint's
        // family (eH0, eH1, eV0, eV1 are frequently all leaves at once).
        if !mesh.edge_exists(e) {
            continue;
        }
        let n = match mesh.edge(e).n_c {
            Some(n) => n,
            None => continue,
        };
        if !seen.insert(n) {
            continue;
        }
        if merge_node(mesh, n)? {
            nodes_merged += 1;
        }
    }

    Ok(CoarsenReport {
        tris_marked,
        nodes_merged,
    })
}

/// Resolves `e`'s midpoint and merges that family. Exposed for callers
/// that already know which edge they want to collapse; [`coarsen`] dedups
/// internally and calls [`merge_node`] directly.
pub fn merge_edge(mesh: &mut Mesh, e: EdgeId) -> MeshResult<bool> {
    let n = mesh
        .edge(e)
        .n_c
        .ok_or_else(|| MeshError::Precondition(format!("edge {:?} has no midpoint to merge", e)))?;
    merge_node(mesh, n)
}

/// Undoes the split that produced midpoint node `n`: restores the parent
/// edge and the (one or two) parent triangles, and destroys `n` and every
/// entity born alongside it. Returns `false` (a conservative no-op,
/// mirroring the source's "can't merge a further-refined region" check)
/// if any present sibling triangle has itself been split further.
pub fn merge_node(mesh: &mut Mesh, n: NodeId) -> MeshResult<bool> {
    let t_c = mesh.node(n).t_c;
    for sib in t_c.into_iter().flatten() {
        if !mesh.tri(sib).is_leaf() {
            return Ok(false);
        }
    }

    let e_c = mesh.node(n).e_c;
    let [eh0, ev0, eh1, ev1] = e_c;
    let [tr0, tr1, tl1, tl0] = t_c;

    let e_p = [eh0, eh1]
        .into_iter()
        .flatten()
        .find_map(|e| mesh.edge(e).parent)
        .ok_or_else(|| {
            MeshError::Consistency(format!("midpoint {:?}'s halves have no parent edge", n))
        })?;

    if let (Some(a), Some(b)) = (tl0, tl1) {
        restore_side(mesh, a, b)?;
    }
    if let (Some(a), Some(b)) = (tr0, tr1) {
        restore_side(mesh, a, b)?;
    }

    for child in [eh0, eh1, ev0, ev1].into_iter().flatten() {
        mesh.destroy_edge(child);
    }
    mesh.destroy_node(n);

    if let Some(bdry) = mesh.edge(e_p).bdry {
        let b = mesh.bdry_mut(bdry);
        if let Some(e) = eh0 {
            b.remove_edge(e);
        }
        if let Some(e) = eh1 {
            b.remove_edge(e);
        }
        b.remove_node(n);
    }

    {
        let edge = mesh.edge_mut(e_p);
        edge.e_c = [None; 4];
        edge.n_c = None;
        edge.is_split = false;
        edge.split = false;
    }

    mesh_diag!(
        mesh.verbosity,
        Verbosity::Info,
        "merged midpoint {:?} back into edge {:?}",
        n,
        e_p
    );
    Ok(true)
}

/// Restores one side's parent triangle (recovered from either child's
/// `.parent`) and rewires the outer neighbor back onto it, then destroys
/// the two children.
///
/// Which of `tri_a`/`tri_b` was built as the `[apex, n_a, mid]` shape versus
/// the `[apex, mid, n_b]` shape during the original split depends on
/// whichever of the edge's two endpoints happened to land in `n_a`'s slot
/// (§4.3's three rotational cases), so the outer edge cannot be found by a
/// fixed slot index here. Instead, for each child, the outer (non-split)
/// edge is the one of its three edges whose endpoints do not include the
/// midpoint -- the other two both touch it (the half-edge and the
/// vertical).
fn restore_side(mesh: &mut Mesh, tri_a: TriId, tri_b: TriId) -> MeshResult<()> {
    let parent = mesh.tri(tri_a).parent.ok_or_else(|| {
        MeshError::Consistency(format!("split child {:?} has no parent triangle", tri_a))
    })?;
    let mid = mesh.tri(tri_a).n_c.ok_or_else(|| {
        MeshError::Consistency(format!(
            "split child {:?} has no midpoint back-reference",
            tri_a
        ))
    })?;

    for child in [tri_a, tri_b] {
        let (outer_edge, outer_tri) = outer_slot(mesh, child, mid)?;
        if let Some(ot) = outer_tri {
            replace_tri_neighbor(mesh, ot, child, parent);
        }
        replace_edge_tri(mesh, outer_edge, child, parent);
    }

    mesh.destroy_tri(tri_a);
    mesh.destroy_tri(tri_b);

    let tri = mesh.tri_mut(parent);
    tri.t_c = [None, None];
    tri.is_split = false;
    tri.split = false;
    tri.e_split = None;

    Ok(())
}

/// Finds the one edge of `t` that does not touch `mid` -- the outer,
/// non-split edge -- and the neighbor triangle sitting across it.
fn outer_slot(mesh: &Mesh, t: TriId, mid: NodeId) -> MeshResult<(EdgeId, Option<TriId>)> {
    let tri = mesh.tri(t);
    for i in 0..3 {
        let e = tri.e[i];
        let edge = mesh.edge(e);
        if edge.n[0] != mid && edge.n[1] != mid {
            return Ok((e, tri.t[i]));
        }
    }
    Err(MeshError::Consistency(format!(
        "triangle {:?} has no outer edge avoiding midpoint {:?}",
        t, mid
    )))
}

fn replace_tri_neighbor(mesh: &mut Mesh, t: TriId, old: TriId, new: TriId) {
    let tri = mesh.tri_mut(t);
    for slot in tri.t.iter_mut() {
        if *slot == Some(old) {
            *slot = Some(new);
        }
    }
}

fn replace_edge_tri(mesh: &mut Mesh, e: EdgeId, old: TriId, new: TriId) {
    let edge = mesh.edge_mut(e);
    for slot in edge.t.iter_mut() {
        if *slot == Some(old) {
            *slot = Some(new);
        }
    }
}
