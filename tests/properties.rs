//! Property-based integration tests: randomized sequences of refine/coarsen
//! calls over a fixed starting mesh, checked against the invariants and
//! round-trip properties every topology mutation must preserve.

use proptest::prelude::*;

use trimesh::edge::EdgeId;
use trimesh::mesh::Mesh;
use trimesh::node::NodeId;
use trimesh::tri::TriId;
use trimesh::{coarsen, metrics, predicate, refine};

/// Builds the same two-triangle unit square used by the crate's own unit
/// tests, through nothing but the public `Mesh` constructors -- this crate
/// boundary can't reach the library's `#[cfg(test)]`-only fixture module.
fn unit_square() -> (Mesh, [NodeId; 4], [TriId; 2]) {
    use trimesh_math::vector::Vec2;

    let mut mesh = Mesh::new();
    let n0 = mesh.create_node(Vec2 { x: 0.0, y: 0.0 });
    let n1 = mesh.create_node(Vec2 { x: 1.0, y: 0.0 });
    let n2 = mesh.create_node(Vec2 { x: 1.0, y: 1.0 });
    let n3 = mesh.create_node(Vec2 { x: 0.0, y: 1.0 });

    let bdry = mesh.create_boundary(1, "outer");

    let bottom = mesh.create_edge(n0, n1);
    let right = mesh.create_edge(n1, n2);
    let diagonal = mesh.create_edge(n2, n0);
    let top = mesh.create_edge(n2, n3);
    let left = mesh.create_edge(n3, n0);

    let t0 = mesh.create_tri([n0, n1, n2], [right, diagonal, bottom]);
    let t1 = mesh.create_tri([n0, n2, n3], [top, left, diagonal]);

    mesh.set_tri_tris(t0, None, Some(t1), None);
    mesh.set_tri_tris(t1, None, None, Some(t0));

    mesh.set_edge_tris(bottom, Some(t0), None);
    mesh.set_edge_tris(right, Some(t0), None);
    mesh.set_edge_tris(diagonal, Some(t0), Some(t1));
    mesh.set_edge_tris(top, Some(t1), None);
    mesh.set_edge_tris(left, Some(t1), None);

    for e in [bottom, right, top, left] {
        mesh.edge_mut(e).bdry = Some(bdry);
        mesh.bdry_mut(bdry).add_edge(e);
    }
    for n in [n0, n1, n2, n3] {
        mesh.add_boundary_node(bdry, n, 0);
    }

    (mesh, [n0, n1, n2, n3], [t0, t1])
}

/// I1/I2/I7: every leaf triangle's edges point back at it, and every
/// neighbor slot is reciprocated by the neighbor's own slots.
fn assert_reciprocal_adjacency(mesh: &Mesh) {
    for (tid, tri) in mesh.tris_iter() {
        if !tri.is_leaf() {
            continue;
        }
        for i in 0..3 {
            let edge = mesh.edge(tri.e[i]);
            assert!(
                edge.t[0] == Some(tid) || edge.t[1] == Some(tid),
                "leaf tri {:?} not reciprocated by its own edge {:?}",
                tid,
                tri.e[i]
            );
            if let Some(nbr) = tri.t[i] {
                assert!(
                    mesh.tri(nbr).t.contains(&Some(tid)),
                    "leaf tri {:?}'s neighbor {:?} does not reciprocate",
                    tid,
                    nbr
                );
            }
        }
    }
}

/// I3: every leaf triangle stays CCW (positive signed area).
fn assert_all_leaves_ccw(mesh: &Mesh) {
    for (tid, tri) in mesh.tris_iter().filter(|(_, t)| t.is_leaf()) {
        assert!(tri.area > 0.0, "leaf tri {:?} lost CCW orientation", tid);
    }
}

fn leaf_area_sum(mesh: &Mesh) -> f64 {
    mesh.tris_iter()
        .filter(|(_, t)| t.is_leaf())
        .map(|(_, t)| t.area)
        .sum()
}

#[derive(Debug, Clone, Copy)]
enum Op {
    RefineAll,
    RefineSmallAspect,
    CoarsenAll,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            Just(Op::RefineAll),
            Just(Op::RefineSmallAspect),
            Just(Op::CoarsenAll),
        ],
        0..8,
    )
}

fn apply(mesh: &mut Mesh, op: Op) {
    match op {
        Op::RefineAll => {
            refine::refine(mesh, &(), predicate::refine_all).unwrap();
        }
        Op::RefineSmallAspect => {
            refine::refine_until_aspect_ratio(mesh, &(), 1.2, 2).unwrap();
        }
        Op::CoarsenAll => {
            coarsen::coarsen(mesh, &(), predicate::refine_all).unwrap();
        }
    }
    metrics::update(mesh);
}

proptest! {
    /// P1-P3, P7: after any sequence of refine/coarsen calls, leaf
    /// adjacency stays reciprocal, every leaf is CCW, and total leaf area
    /// matches the mesh's fixed domain area (1.0) to within rounding.
    #[test]
    fn invariants_hold_after_any_refine_coarsen_sequence(ops in arb_ops()) {
        let (mut mesh, _nodes, _tris) = unit_square();
        metrics::update(&mut mesh);
        prop_assert!((leaf_area_sum(&mesh) - 1.0).abs() < 1e-9);

        for op in ops {
            apply(&mut mesh, op);
            assert_reciprocal_adjacency(&mesh);
            assert_all_leaves_ccw(&mesh);
            let area = leaf_area_sum(&mesh);
            prop_assert!(
                (area - 1.0).abs() < 1e-9,
                "leaf area drifted to {} after applying {:?}",
                area,
                op
            );
            let vol_total: f64 = mesh.nodes_iter().map(|(_, n)| n.vol).sum();
            prop_assert!(
                (vol_total - 1.0).abs() < 1e-9,
                "nodal volume drifted to {} after applying {:?}",
                vol_total,
                op
            );
        }
    }

    /// R2/R3: running the exact same refine sequence twice from the same
    /// starting mesh produces the same leaf count and total area -- the
    /// engine has no hidden nondeterminism (no hashmap iteration order, no
    /// randomness) that a replayed sequence could disagree with.
    #[test]
    fn replaying_the_same_sequence_is_deterministic(ops in arb_ops()) {
        let (mut a, _, _) = unit_square();
        let (mut b, _, _) = unit_square();
        metrics::update(&mut a);
        metrics::update(&mut b);

        for op in &ops {
            apply(&mut a, *op);
            apply(&mut b, *op);
        }

        prop_assert_eq!(a.tri_leaves.len(), b.tri_leaves.len());
        prop_assert_eq!(a.edge_leaves.len(), b.edge_leaves.len());
        let area_a = leaf_area_sum(&a);
        let area_b = leaf_area_sum(&b);
        prop_assert!((area_a - area_b).abs() < 1e-12);
    }
}

/// R1: refining then immediately coarsening everything returns the mesh to
/// its starting entity counts.
#[test]
fn refine_then_coarsen_round_trips_entity_counts() {
    let (mut mesh, _nodes, _tris) = unit_square();
    let nodes_before = mesh.node_count();
    let edges_before = mesh.edge_count();
    let tris_before = mesh.tri_count();

    refine::refine(&mut mesh, &(), predicate::refine_all).unwrap();
    coarsen::coarsen(&mut mesh, &(), predicate::refine_all).unwrap();

    assert_eq!(mesh.node_count(), nodes_before);
    assert_eq!(mesh.edge_count(), edges_before);
    assert_eq!(mesh.tri_count(), tris_before);
}

/// S2: repeated uniform refinement strictly grows the leaf count (never
/// shrinks or stalls) and always conserves total domain area, across
/// several consecutive passes.
#[test]
fn seven_consecutive_refine_passes_monotonically_grow_the_mesh() {
    let (mut mesh, _nodes, _tris) = unit_square();
    metrics::update(&mut mesh);
    let mut last_leaf_count = mesh.tri_leaves.len();

    for pass in 0..7 {
        let report = refine::refine(&mut mesh, &(), predicate::refine_all).unwrap();
        metrics::update(&mut mesh);
        assert!(
            report.edges_split > 0,
            "pass {pass} should have found at least one edge to split"
        );
        let leaf_count = mesh.tri_leaves.len();
        assert!(
            leaf_count > last_leaf_count,
            "pass {pass}: leaf count did not grow ({last_leaf_count} -> {leaf_count})"
        );
        last_leaf_count = leaf_count;

        let area = leaf_area_sum(&mesh);
        assert!(
            (area - 1.0).abs() < 1e-9,
            "pass {pass}: leaf area drifted to {area}"
        );
    }
}

/// B1/B2: splitting a boundary edge propagates the boundary marker to both
/// new halves and to the new midpoint node, and merging it back removes
/// that membership again. Driven directly at a single boundary edge
/// (rather than through a predicate) so which edge gets bisected is known
/// up front.
#[test]
fn boundary_membership_survives_a_split_and_unwinds_on_merge() {
    let (mut mesh, _nodes, tris) = unit_square();
    metrics::update(&mut mesh);

    let bottom = mesh
        .edges_iter()
        .find(|(_, e)| e.bdry.is_some() && e.t[0] == Some(tris[0]) && e.n.contains(&_nodes[0]) && e.n.contains(&_nodes[1]))
        .map(|(id, _)| id)
        .expect("the bottom edge should be a boundary edge of tris[0]");
    let bdry_marker = mesh.edge(bottom).bdry;

    mesh.edge_mut(bottom).split = true;
    refine::split_edge(&mut mesh, bottom).unwrap();

    let mid = mesh.edge(bottom).n_c.unwrap();
    assert_eq!(mesh.node(mid).bdry[0], bdry_marker);

    let [h0, h1, _v0, _v1] = mesh.edge(bottom).e_c;
    for half in [h0, h1].into_iter().flatten() {
        assert_eq!(mesh.edge(half).bdry, bdry_marker, "both halves must inherit the parent's boundary");
    }

    metrics::update(&mut mesh);
    assert!(
        mesh.bdry(bdry_marker.unwrap()).leaf_edges.len() >= 2,
        "the boundary's leaf-edge list should include both new halves"
    );

    coarsen::merge_edge(&mut mesh, h0.unwrap()).unwrap();
    assert!(!mesh.node_exists(mid));
    assert!(!mesh.edge_exists(h0.unwrap()));
    assert_eq!(mesh.edge(bottom).bdry, bdry_marker);
}
