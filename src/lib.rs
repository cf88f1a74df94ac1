//! dit - data inspection toolkit
//!
//! Peek at, diff, profile, and infer schemas for tabular data files
//! (CSV, JSON, NDJSON, Parquet) without loading them into a database.

pub mod ddl;
pub mod diff;
pub mod error;
pub mod model;
pub mod output;
pub mod profile;
pub mod reader;

pub use diff::{DiffEngine, DiffReport};
pub use error::{DitError, Result};
pub use model::Table;
pub use reader::{ReadOptions, ReaderFactory};
