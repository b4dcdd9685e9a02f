//! `readMesh` (spec §4.6): parses the `NODES`/`TRIANGLES`/`NEIGHBORS` text
//! format and populates a [`Mesh`] with level-0 entities using only its
//! public constructors.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use trimesh_math::vector::Vec2;

use crate::io::error::IoError;
use crate::mesh::Mesh;
use crate::node::NodeId;
use crate::tri::TriId;

/// Reads the mesh file at `path` into `mesh`. Any boundary marker
/// referenced by a negative neighbor index must already exist on `mesh`
/// (via [`Mesh::create_boundary`]) -- the file format itself carries no
/// boundary section.
pub fn read_mesh(path: &Path, mesh: &mut Mesh) -> Result<(), IoError> {
    let file = File::open(path)?;
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .collect::<Result<_, _>>()?;

    let (n_nodes, node_lines) = find_section(&lines, "NODES")?;
    let (n_tris, tri_lines) = find_section(&lines, "TRIANGLES")?;
    let (n_nbrs, nbr_lines) = find_section(&lines, "NEIGHBORS")?;

    let xy = parse_nodes(&node_lines, n_nodes)?;
    let tri_verts = parse_triples(&tri_lines, n_tris, "TRIANGLES")?;
    let tri_nbrs = parse_triples(&nbr_lines, n_nbrs, "NEIGHBORS")?;

    build_mesh(mesh, &xy, &tri_verts, &tri_nbrs)
}

/// Finds the line `KEYWORD n` and returns `n` plus the `n` non-blank,
/// non-comment lines that follow it.
fn find_section<'a>(
    lines: &'a [String],
    keyword: &'static str,
) -> Result<(usize, Vec<&'a str>), IoError> {
    let header_idx = lines
        .iter()
        .position(|l| l.split_whitespace().next() == Some(keyword))
        .ok_or(IoError::MissingSection(keyword))?;

    let count: usize = lines[header_idx]
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or(IoError::MissingSection(keyword))?;

    let data: Vec<&str> = lines[header_idx + 1..]
        .iter()
        .map(|s| s.as_str())
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .take(count)
        .collect();

    Ok((count, data))
}

fn parse_nodes(lines: &[&str], n: usize) -> Result<Vec<Vec2<f64>>, IoError> {
    let mut xy = vec![Vec2 { x: 0.0, y: 0.0 }; n];
    for (line_no, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(IoError::BadColumnCount {
                section: "NODES",
                line: line_no,
                expected: 3,
                found: fields.len(),
            });
        }
        let id = parse_field::<i64>("NODES", line_no, fields[0])?;
        if id < 0 || id as usize >= n {
            return Err(IoError::IdOutOfRange {
                section: "NODES",
                line: line_no,
                id,
                count: n,
            });
        }
        let x = parse_field::<f64>("NODES", line_no, fields[1])?;
        let y = parse_field::<f64>("NODES", line_no, fields[2])?;
        xy[id as usize] = Vec2 { x, y };
    }
    Ok(xy)
}

/// Parses the `TRIANGLES`/`NEIGHBORS` sections, both of which share the
/// `id v0 v1 v2` shape (neighbor fields are signed; vertex fields are
/// not, but we keep everything as `i64` until the caller interprets it).
fn parse_triples(
    lines: &[&str],
    n: usize,
    section: &'static str,
) -> Result<Vec<[i64; 3]>, IoError> {
    let mut out = vec![[0i64; 3]; n];
    for (line_no, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 4 {
            return Err(IoError::BadColumnCount {
                section,
                line: line_no,
                expected: 4,
                found: fields.len(),
            });
        }
        let id = parse_field::<i64>(section, line_no, fields[0])?;
        if id < 0 || id as usize >= n {
            return Err(IoError::IdOutOfRange {
                section,
                line: line_no,
                id,
                count: n,
            });
        }
        let v0 = parse_field::<i64>(section, line_no, fields[1])?;
        let v1 = parse_field::<i64>(section, line_no, fields[2])?;
        let v2 = parse_field::<i64>(section, line_no, fields[3])?;
        out[id as usize] = [v0, v1, v2];
    }
    Ok(out)
}

fn parse_field<T: std::str::FromStr>(
    section: &'static str,
    line: usize,
    field: &str,
) -> Result<T, IoError> {
    field.trim().parse().map_err(|_| IoError::BadNumber {
        section,
        line,
        field: field.to_string(),
    })
}

/// One shared (not-yet-triangle-wired) edge discovered while walking the
/// neighbor table, recorded so its `t[0]`/`t[1]` slots can be filled in
/// once every triangle has been created.
struct PendingEdge {
    edge: crate::edge::EdgeId,
    owner_tri: usize,
    other_tri: Option<usize>,
}

fn build_mesh(
    mesh: &mut Mesh,
    xy: &[Vec2<f64>],
    tri_verts: &[[i64; 3]],
    tri_nbrs: &[[i64; 3]],
) -> Result<(), IoError> {
    let n_tris = tri_verts.len();

    let nodes: Vec<NodeId> = xy.iter().map(|&p| mesh.create_node(p)).collect();

    // Phase B: walk the neighbor table and create every edge exactly once
    // (an interior edge the first time its larger-indexed triangle sees
    // it; a boundary edge whenever a negative marker is found), recording
    // each triangle's three edge handles along the way (I2: `e[j]`
    // opposite `n[j]`, i.e. connecting the other two vertices).
    let mut tri_edges: Vec<[Option<crate::edge::EdgeId>; 3]> = vec![[None; 3]; n_tris];
    let mut pending = Vec::new();

    for i in 0..n_tris {
        for j in 0..3 {
            if tri_edges[i][j].is_some() {
                continue;
            }
            let nbr = tri_nbrs[i][j];
            let n0_idx = tri_verts[i][(j + 1) % 3] as usize;
            let n1_idx = tri_verts[i][(j + 2) % 3] as usize;

            if nbr < 0 {
                let marker = (-nbr) as i32;
                let bdry = mesh
                    .find_boundary(marker)
                    .ok_or(IoError::UnresolvedBoundaryMarker(marker))?;
                let e = mesh.create_edge(nodes[n0_idx], nodes[n1_idx]);
                mesh.edge_mut(e).bdry = Some(bdry);
                mesh.bdry_mut(bdry).add_edge(e);
                mesh.add_boundary_node(bdry, nodes[n0_idx], 0);
                mesh.add_boundary_node(bdry, nodes[n1_idx], 1);
                tri_edges[i][j] = Some(e);
                pending.push(PendingEdge {
                    edge: e,
                    owner_tri: i,
                    other_tri: None,
                });
            } else if (nbr as usize) > i {
                let other = nbr as usize;
                let e = mesh.create_edge(nodes[n0_idx], nodes[n1_idx]);
                tri_edges[i][j] = Some(e);

                // The neighbor's own slot for this shared edge is whichever
                // of its three vertices is *not* one of this edge's two
                // endpoints (I2: the edge opposite that vertex).
                let other_slot = (0..3)
                    .find(|&k| {
                        let v = tri_verts[other][k] as usize;
                        v != n0_idx && v != n1_idx
                    })
                    .ok_or(IoError::BadConnectivity(other))?;
                tri_edges[other][other_slot] = Some(e);

                pending.push(PendingEdge {
                    edge: e,
                    owner_tri: i,
                    other_tri: Some(other),
                });
            }
            // nbr < i: the edge (and both triangles' slots for it) was
            // already created while walking triangle `nbr`.
        }
    }

    // Phase C: now that every triangle has all three edges, create them.
    let mut tri_ids: Vec<TriId> = Vec::with_capacity(n_tris);
    for i in 0..n_tris {
        let n = [
            nodes[tri_verts[i][0] as usize],
            nodes[tri_verts[i][1] as usize],
            nodes[tri_verts[i][2] as usize],
        ];
        let e = [
            tri_edges[i][0].ok_or(IoError::BadConnectivity(i))?,
            tri_edges[i][1].ok_or(IoError::BadConnectivity(i))?,
            tri_edges[i][2].ok_or(IoError::BadConnectivity(i))?,
        ];
        tri_ids.push(mesh.create_tri(n, e));
    }

    // Phase D: wire up triangle neighbor slots and edge/triangle
    // reciprocity now that every `TriId` exists.
    for i in 0..n_tris {
        let t = [
            tri_nbrs[i][0],
            tri_nbrs[i][1],
            tri_nbrs[i][2],
        ]
        .map(|nbr| if nbr >= 0 { Some(tri_ids[nbr as usize]) } else { None });
        mesh.set_tri_tris(tri_ids[i], t[0], t[1], t[2]);
    }
    for p in pending {
        mesh.set_edge_tris(
            p.edge,
            Some(tri_ids[p.owner_tri]),
            p.other_tri.map(|k| tri_ids[k]),
        );
    }

    Ok(())
}
