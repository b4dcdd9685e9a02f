//! Refine/coarsen predicates (spec §4.3/§4.4/§6).
//!
//! The mesh engine never looks inside the flow state `F` -- it only asks
//! the predicate a yes/no question about one leaf triangle at a time. The
//! solver itself is out of scope here; `F` is left generic so a caller can
//! plug in whatever per-cell error estimate or feature detector it has
//! without this crate depending on it.

use crate::tri::Tri;

/// Always refines every leaf; mainly useful for tests and for uniform
/// initial refinement of a coarse input mesh.
pub fn refine_all<F>(_flow: &F, _tri: &Tri) -> bool {
    true
}

/// Never refines or coarsens anything; a predicate that turns a pass into
/// a no-op, handy as a baseline in tests.
pub fn never<F>(_flow: &F, _tri: &Tri) -> bool {
    false
}

/// Refines a leaf whenever its area exceeds `max_area`. A closure over the
/// mesh itself (to inspect edge lengths directly) is usually a better fit
/// for longest-edge-driven refinement; this one only needs the triangle.
pub fn area_over(max_area: f64) -> impl FnMut(&(), &Tri) -> bool {
    move |_flow: &(), tri: &Tri| tri.area > max_area
}
