//! Newline-delimited JSON reader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{DitError, Result};
use crate::model::Table;

use super::json::table_from_objects;
use super::{ReadOptions, Reader};

/// Reader for NDJSON/JSONL: one JSON object per non-blank line. Columns are
/// the union of keys across records, so the whole source is buffered before
/// the table is built.
pub struct NdjsonReader;

impl Reader for NdjsonReader {
    fn read(&self, path: &Path, opts: &ReadOptions) -> Result<Table> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut objects: Vec<Map<String, Value>> = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            if opts.reached(objects.len()) {
                break;
            }
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(obj)) => objects.push(obj),
                Ok(other) => {
                    return Err(DitError::parse(
                        path,
                        Some(line_no + 1),
                        format!("expected a JSON object, got {other}"),
                    ))
                }
                Err(e) => {
                    return Err(DitError::parse(path, Some(line_no + 1), e.to_string()))
                }
            }
        }

        Ok(table_from_objects(&objects))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext, "ndjson" | "jsonl")
    }
}
