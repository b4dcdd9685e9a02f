//! Shared fixtures for the unit tests in this crate. Not part of the public
//! API; only compiled under `#[cfg(test)]`.

use trimesh_math::vector::Vec2;

use crate::mesh::Mesh;
use crate::node::NodeId;
use crate::tri::TriId;

/// A two-triangle unit square, split along the `(0,0)-(1,1)` diagonal:
///
/// ```text
///   n3 --- n2
///   |  t1 / |
///   |   /   |
///   | /  t0 |
///   n0 --- n1
/// ```
///
/// All four outer edges belong to one boundary (marker 1, "outer"); the
/// diagonal is interior. Both triangles are CCW with area `0.5`, so the
/// mesh covers area `1.0` exactly -- the number every median-dual volume
/// test checks its node volumes sum back up to.
pub fn unit_square() -> (Mesh, [NodeId; 4], [TriId; 2]) {
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
        let b = mesh.bdry_mut(bdry);
        b.add_edge(e);
    }
    for n in [n0, n1, n2, n3] {
        mesh.add_boundary_node(bdry, n, 0);
    }

    (mesh, [n0, n1, n2, n3], [t0, t1])
}

/// Every edge reachable from a leaf triangle reports that triangle back
/// among its own `t[]` slots, and vice versa (I1/I2/I7).
pub fn assert_adjacency_reciprocal(mesh: &Mesh) {
    for (tid, tri) in mesh.tris_iter() {
        if !tri.is_leaf() {
            continue;
        }
        for i in 0..3 {
            let e = tri.e[i];
            let edge = mesh.edge(e);
            assert!(
                edge.t[0] == Some(tid) || edge.t[1] == Some(tid),
                "tri {:?} claims edge {:?} but the edge doesn't point back",
                tid,
                e
            );
            if let Some(nbr) = tri.t[i] {
                let nbr_tri = mesh.tri(nbr);
                assert!(
                    nbr_tri.t.contains(&Some(tid)),
                    "tri {:?} claims neighbor {:?} but it doesn't reciprocate",
                    tid,
                    nbr
                );
            }
        }
    }
}

pub fn leaf_area_sum(mesh: &Mesh) -> f64 {
    mesh.tris_iter()
        .filter(|(_, t)| t.is_leaf())
        .map(|(_, t)| t.area)
        .sum()
}
