//! Diagnostic sink.
//!
//! The source gates everything behind a compile-time `ICF_DEBUG` level.
//! We expose the same knob at runtime instead, as a [`Verbosity`] carried
//! on the [`crate::mesh::Mesh`], and route it through `tracing` so a host
//! binary can choose its own subscriber (the CLI in `main.rs` installs a
//! plain fmt subscriber gated by `RUST_LOG`/`-v`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Errors,
    Info,
    Debug,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Errors
    }
}

/// Emits a diagnostic at the given level, gated by `verbosity`. Mirrors the
/// source's `icfPrint` macro; real formatting/filtering is deferred to
/// `tracing` so it composes with whatever the host installs.
macro_rules! mesh_diag {
    ($verbosity:expr, $level:expr, $($arg:tt)*) => {
        if $verbosity >= $level {
            match $level {
                $crate::diag::Verbosity::Debug => tracing::debug!($($arg)*),
                $crate::diag::Verbosity::Info => tracing::info!($($arg)*),
                _ => tracing::error!($($arg)*),
            }
        }
    };
}

pub(crate) use mesh_diag;
