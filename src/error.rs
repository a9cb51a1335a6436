//! Typed failures for the report pipeline.
//!
//! Command-level code wraps these in `anyhow` with context; the variants
//! here are the ones callers (and tests) need to tell apart.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrismaError {
    /// A required input file or directory is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// A sheet was found but lacks a column we need.
    #[error("{sheet} sheet in {} has no '{column}' column", path.display())]
    MissingColumn {
        path: PathBuf,
        sheet: &'static str,
        column: &'static str,
    },

    /// No post could be matched to a publish date; every aggregate would be empty.
    #[error(
        "all {total} posts failed to resolve a publish date; check date and URL alignment \
         between the classified posts and the analytics export"
    )]
    AllMergesFailed { total: usize },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("workbook error in {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
