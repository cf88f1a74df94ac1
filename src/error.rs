//! Error types for dit operations

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DitError>;

/// Which side of a diff a column was expected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {}{}: {message}", .path.display(), .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("unsupported file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    // Exact wording is load-bearing: regression fixtures match on it.
    #[error("attempted to diff when least one of the files have no data")]
    EmptyInput,

    #[error("key column `{column}` not found in {side} table")]
    MissingKeyColumn { column: String, side: Side },

    #[error("metric column `{column}` not found in {side} table")]
    MissingMetricColumn { column: String, side: Side },

    #[error("metric `{agg}` requires a numeric column, but `{column}` is {ty}")]
    TypeMismatch {
        agg: String,
        column: String,
        ty: String,
    },

    #[error("malformed key spec `{spec}` at segment {segment}")]
    BadKeySpec { spec: String, segment: usize },

    #[error("failed to parse metric config: {0}")]
    BadMetricSpec(String),
}

impl DitError {
    pub fn parse(path: impl Into<PathBuf>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
