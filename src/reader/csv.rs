//! CSV/TSV reader

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{DitError, Result};
use crate::model::{CellValue, Table, TableBuilder};

use super::{ReadOptions, Reader};

/// Reader for delimiter-separated text files. The header row establishes
/// the column set; cell text stays raw until type inference runs at build.
pub struct CsvReader;

impl Reader for CsvReader {
    fn read(&self, path: &Path, opts: &ReadOptions) -> Result<Table> {
        let file = File::open(path)?;
        let delimiter = if path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("tsv"))
            .unwrap_or(false)
        {
            b'\t'
        } else {
            b','
        };

        let mut csv_reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(BufReader::new(file));

        let headers = csv_reader
            .headers()
            .map_err(|e| csv_error(path, e))?
            .clone();

        let mut builder = TableBuilder::new(headers.iter().map(str::to_string));

        for record in csv_reader.records() {
            if opts.reached(builder.row_count()) {
                break;
            }
            let record = record.map_err(|e| csv_error(path, e))?;
            builder.push_row(record.iter().map(parse_cell_text).collect());
        }

        Ok(builder.build())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext, "csv" | "tsv")
    }
}

/// Map raw cell text to a value, recognizing the usual null spellings.
fn parse_cell_text(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
        CellValue::Null
    } else {
        CellValue::Str(trimmed.to_string())
    }
}

fn csv_error(path: &Path, err: ::csv::Error) -> DitError {
    let line = err.position().map(|p| p.line() as usize);
    DitError::parse(path, line, err.to_string())
}
