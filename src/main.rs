//! CLI driver: ingest a mesh file, run refine/coarsen cycles against a
//! built-in area predicate, refresh the leaf index and metrics, print the
//! result. The refinement core this wraps has no CLI of its own (§6) --
//! this binary exists only to exercise it end to end.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trimesh::io::{print_mesh, read_mesh};
use trimesh::mesh::Mesh;
use trimesh::{metrics, predicate, refine};

#[derive(Parser)]
#[command(name = "trimesh", about = "Adaptive triangular mesh refinement")]
struct Cli {
    /// Path to a NODES/TRIANGLES/NEIGHBORS mesh file.
    input: PathBuf,

    /// Refine every leaf triangle whose area exceeds this, repeated
    /// `passes` times. Omit to skip refinement entirely.
    #[arg(long)]
    max_area: Option<f64>,

    /// Number of refine passes to run when `--max-area` is set.
    #[arg(long, default_value_t = 1)]
    passes: usize,

    /// Increase diagnostic verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("error"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut mesh = Mesh::new();
    read_mesh(&cli.input, &mut mesh)?;
    metrics::update(&mut mesh);

    if let Some(max_area) = cli.max_area {
        let mut pred = predicate::area_over(max_area);
        for pass in 0..cli.passes {
            let report = refine::refine(&mut mesh, &(), &mut pred)?;
            tracing::info!(pass, tris_marked = report.tris_marked, edges_split = report.edges_split, "refine pass complete");
            metrics::update(&mut mesh);
        }
    }

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    print_mesh(&mesh, &mut handle)?;
    Ok(())
}
