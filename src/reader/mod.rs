//! Ingestion layer: one reader per source format

mod csv;
mod json;
mod ndjson;
mod parquet;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{DitError, Result};
use crate::model::Table;

pub use self::csv::CsvReader;
pub use self::json::JsonReader;
pub use self::ndjson::NdjsonReader;
pub use self::parquet::ParquetReader;

/// Options applied while ingesting a source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Cap on ingested rows. Commands that cap ingestion (peek, infer)
    /// intentionally narrow the inference sample with it.
    pub limit: Option<usize>,
}

impl ReadOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }

    pub(crate) fn reached(&self, rows: usize) -> bool {
        self.limit.map(|n| rows >= n).unwrap_or(false)
    }
}

/// Trait for reading a tabular source into a [`Table`].
pub trait Reader: Send + Sync {
    fn read(&self, path: &Path, opts: &ReadOptions) -> Result<Table>;

    /// Whether this reader handles the given (lowercased) file extension.
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory dispatching to a reader by extension, falling back to content
/// sniffing for files without a recognized extension.
pub struct ReaderFactory {
    readers: Vec<Box<dyn Reader>>,
}

impl Default for ReaderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderFactory {
    pub fn new() -> Self {
        Self {
            readers: vec![
                Box::new(CsvReader),
                Box::new(NdjsonReader),
                Box::new(JsonReader),
                Box::new(ParquetReader),
            ],
        }
    }

    /// Resolve the reader for a path, by extension first, sniffing second.
    pub fn get_reader(&self, path: &Path) -> Result<&dyn Reader> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        for reader in &self.readers {
            if reader.supports_extension(&ext) {
                return Ok(reader.as_ref());
            }
        }

        if let Some(sniffed) = sniff_format(path)? {
            for reader in &self.readers {
                if reader.supports_extension(sniffed) {
                    return Ok(reader.as_ref());
                }
            }
        }

        Err(DitError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    /// Read a source into a table with the appropriate reader.
    pub fn read(&self, path: &Path, opts: &ReadOptions) -> Result<Table> {
        let reader = self.get_reader(path)?;
        log::debug!("reading {}", path.display());
        let table = reader.read(path, opts)?;
        log::debug!(
            "read {}: {} columns, {} rows",
            path.display(),
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}

/// Detect the format of a file from its leading bytes, for sources whose
/// extension says nothing. Returns the canonical extension of the format.
fn sniff_format(path: &Path) -> Result<Option<&'static str>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    let n = reader.read(&mut magic)?;
    if n == 4 && &magic == b"PAR1" {
        return Ok(Some("parquet"));
    }

    reader.seek_relative(-(n as i64))?;
    let mut first = String::new();
    reader.read_line(&mut first)?;
    let trimmed = first.trim_start();

    if trimmed.starts_with('[') {
        return Ok(Some("json"));
    }
    if trimmed.starts_with('{') {
        // A complete object on the first line followed by more content is
        // NDJSON; anything else is a (possibly multi-line) JSON document.
        let complete = serde_json::from_str::<serde_json::Value>(first.trim()).is_ok();
        let mut rest = String::new();
        let more = reader.read_line(&mut rest)? > 0 && !rest.trim().is_empty();
        return Ok(Some(if complete && more { "ndjson" } else { "json" }));
    }

    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some("csv"))
}
