//! `printMesh` (spec §6): writes the dense leaf-level snapshot of a mesh in
//! the same tab-separated section format `readMesh` consumes, using the
//! dense indices [`crate::metrics::update`] assigns on the last refresh.

use std::io::Write;

use crate::mesh::Mesh;

/// Writes `mesh` to `w` as `NODES`/`TRIANGLES`/`EDGES`/`TRI NEIGHBORS`
/// sections. Triangle/edge rows walk leaf order, not arena order, so the
/// `index` fields referenced here and the row's own position agree.
///
/// Callers are expected to have called [`crate::metrics::update`] first;
/// printing a mesh whose indices are stale from a refine/coarsen call
/// just reproduces whatever was current as of the last refresh.
pub fn print_mesh(mesh: &Mesh, w: &mut impl Write) -> std::io::Result<()> {
    print_nodes(mesh, w)?;
    print_triangles(mesh, w)?;
    print_edges(mesh, w)?;
    print_tri_neighbors(mesh, w)?;
    Ok(())
}

fn print_nodes(mesh: &Mesh, w: &mut impl Write) -> std::io::Result<()> {
    writeln!(w, "NODES\t{}", mesh.node_count())?;
    let mut rows: Vec<_> = mesh.nodes_iter().collect();
    rows.sort_by_key(|(_, n)| n.index);
    let name = |slot: Option<crate::boundary::BoundaryId>| -> String {
        slot.map(|b| mesh.bdry(b).name.clone()).unwrap_or_else(|| "None".to_string())
    };
    for (_, n) in rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            n.index,
            n.pos.x,
            n.pos.y,
            name(n.bdry[0]),
            name(n.bdry[1]),
        )?;
    }
    Ok(())
}

fn print_triangles(mesh: &Mesh, w: &mut impl Write) -> std::io::Result<()> {
    let mut rows: Vec<_> = mesh.tris_iter().filter(|(_, t)| t.is_leaf()).collect();
    rows.sort_by_key(|(_, t)| t.index);
    writeln!(w, "TRIANGLES\t{}", rows.len())?;
    for (_, t) in rows {
        let n = |id: crate::node::NodeId| mesh.node(id).index;
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            t.index,
            n(t.n[0]),
            n(t.n[1]),
            n(t.n[2]),
        )?;
    }
    Ok(())
}

fn print_edges(mesh: &Mesh, w: &mut impl Write) -> std::io::Result<()> {
    let mut rows: Vec<_> = mesh.edges_iter().filter(|(_, e)| e.leaf_slot.is_some()).collect();
    rows.sort_by_key(|(_, e)| e.index);
    writeln!(w, "EDGES\t{}", rows.len())?;
    for (_, e) in rows {
        let n = |id: crate::node::NodeId| mesh.node(id).index;
        let t = |id: Option<crate::tri::TriId>| id.map(|t| mesh.tri(t).index as i64).unwrap_or(-1);
        let bdry = e
            .bdry
            .map(|b| mesh.bdry(b).name.clone())
            .unwrap_or_else(|| "None".to_string());
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            e.index,
            n(e.n[0]),
            n(e.n[1]),
            t(e.t[0]),
            t(e.t[1]),
            bdry,
        )?;
    }
    Ok(())
}

fn print_tri_neighbors(mesh: &Mesh, w: &mut impl Write) -> std::io::Result<()> {
    let mut rows: Vec<_> = mesh.tris_iter().filter(|(_, t)| t.is_leaf()).collect();
    rows.sort_by_key(|(_, t)| t.index);
    writeln!(w, "TRI NEIGHBORS\t{}", rows.len())?;
    for (_, t) in rows {
        let tid = |id: Option<crate::tri::TriId>| id.map(|t| mesh.tri(t).index as i64).unwrap_or(-1);
        let eid = |id: crate::edge::EdgeId| mesh.edge(id).index;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            t.index,
            tid(t.t[0]),
            tid(t.t[1]),
            tid(t.t[2]),
            eid(t.e[0]),
            eid(t.e[1]),
            eid(t.e[2]),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use crate::test_support::unit_square;

    fn print_to_string(mesh: &Mesh) -> String {
        let mut buf = Vec::new();
        print_mesh(mesh, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn print_mesh_emits_four_sections_with_matching_counts() {
        let (mut mesh, _nodes, _tris) = unit_square();
        metrics::update(&mut mesh);
        let out = print_to_string(&mesh);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "NODES\t4");
        // 4 node rows, then the TRIANGLES header.
        assert_eq!(lines[5], "TRIANGLES\t2");
        assert_eq!(lines[8], "EDGES\t5");
        assert_eq!(lines[14], "TRI NEIGHBORS\t2");
    }

    #[test]
    fn print_mesh_only_lists_leaf_triangles_and_edges() {
        let (mut mesh, _nodes, _tris) = unit_square();
        crate::refine::refine(&mut mesh, &(), crate::predicate::refine_all).unwrap();
        metrics::update(&mut mesh);
        let out = print_to_string(&mesh);

        assert!(
            out.contains("TRIANGLES\t4"),
            "only the 4 leaf children should be printed, not the 2 split parents"
        );
        let triangle_rows: Vec<&str> = out
            .lines()
            .skip_while(|l| *l != "TRIANGLES\t4")
            .skip(1)
            .take(4)
            .collect();
        let mut indices: Vec<&str> = triangle_rows
            .iter()
            .map(|r| r.split('\t').next().unwrap())
            .collect();
        indices.sort();
        assert_eq!(indices, ["0", "1", "2", "3"]);
    }

    #[test]
    fn print_mesh_rows_are_indexed_in_leaf_order() {
        let (mut mesh, _nodes, _tris) = unit_square();
        metrics::update(&mut mesh);
        let out = print_to_string(&mesh);
        let triangle_rows: Vec<&str> = out
            .lines()
            .skip_while(|l| *l != "TRIANGLES\t2")
            .skip(1)
            .take(2)
            .collect();
        assert_eq!(triangle_rows[0].split('\t').next().unwrap(), "0");
        assert_eq!(triangle_rows[1].split('\t').next().unwrap(), "1");
    }
}
