use thiserror::Error;

/// Input-format failures (§7 category 4): reported, ingest stops
/// populating further entities, and whatever was already created stays
/// owned by the mesh until the mesh itself is dropped.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read mesh file: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing section header {0:?}")]
    MissingSection(&'static str),

    #[error("{section} line {line}: expected {expected} tab-separated fields, found {found}")]
    BadColumnCount {
        section: &'static str,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{section} line {line}: could not parse field {field:?} as a number")]
    BadNumber {
        section: &'static str,
        line: usize,
        field: String,
    },

    #[error("neighbor index {0} does not resolve to a defined boundary marker")]
    UnresolvedBoundaryMarker(i32),

    #[error("triangle connectivity inconsistent while resolving neighbor edge for tri {0}")]
    BadConnectivity(usize),

    #[error("{section} line {line}: id {id} is out of range for a section of {count} entries")]
    IdOutOfRange {
        section: &'static str,
        line: usize,
        id: i64,
        count: usize,
    },
}
