//! Error taxonomy for the mesh engine (spec §7).
//!
//! Consistency violations and precondition violations are both reported
//! through [`MeshError`] and are non-fatal to the *program*: the caller
//! gets an `Err` back and the mesh is left usable (a consistency violation
//! aborts only the split/merge in progress and is not rolled back, so the
//! entity it touched should be considered suspect -- see the module docs
//! on [`crate::refine`] and [`crate::coarsen`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    /// A rotation/identity search failed -- e.g. an edge wasn't found at
    /// any of its triangle's three slots. Treated as a bug, not a
    /// recoverable condition; the current split or merge aborts.
    #[error("consistency violation: {0}")]
    Consistency(String),

    /// Splitting an edge with no adjacent triangle, merging an edge whose
    /// midpoint has no sibling record, adding an edge to a boundary that
    /// isn't on the mesh, or an unresolvable negative neighbor marker.
    #[error("precondition violation: {0}")]
    Precondition(String),
}

pub type MeshResult<T> = Result<T, MeshError>;
