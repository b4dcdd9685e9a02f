//! Mesh-file ingest and `printMesh` output (spec §4.6, §6).
//!
//! This is external-collaborator code, not part of the refinement core: it
//! only calls the topology store's public constructors (`create_node`,
//! `create_tri`, ...) and never reaches into the refinement/coarsening
//! engines. Kept as a module of the main crate rather than a separate
//! sibling crate since, unlike the math library, nothing else needs to
//! depend on it independently of the mesh types it builds.

pub mod error;
pub mod print;
pub mod read;

pub use error::IoError;
pub use print::print_mesh;
pub use read::read_mesh;
