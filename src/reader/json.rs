//! JSON document reader (single object or array of objects)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::error::{DitError, Result};
use crate::model::{CellValue, Table, TableBuilder};

use super::{ReadOptions, Reader};

/// Reader for JSON documents: a single object becomes one row, an array of
/// objects one row per element.
pub struct JsonReader;

impl Reader for JsonReader {
    fn read(&self, path: &Path, opts: &ReadOptions) -> Result<Table> {
        let file = File::open(path)?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DitError::parse(path, Some(e.line()), e.to_string()))?;

        let objects: Vec<Map<String, Value>> = match value {
            Value::Object(obj) => vec![obj],
            Value::Array(items) => {
                let mut objects = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    if opts.reached(objects.len()) {
                        break;
                    }
                    match item {
                        Value::Object(obj) => objects.push(obj),
                        other => {
                            return Err(DitError::parse(
                                path,
                                None,
                                format!("array element {i} is not an object: {other}"),
                            ))
                        }
                    }
                }
                objects
            }
            other => {
                return Err(DitError::parse(
                    path,
                    None,
                    format!("expected a JSON object or array of objects, got {other}"),
                ))
            }
        };

        Ok(table_from_objects(&objects))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        ext == "json"
    }
}

/// Build a table from parsed JSON objects: the column set is the union of
/// keys across records in first-seen order; a record missing a key yields
/// a null cell.
pub(super) fn table_from_objects(objects: &[Map<String, Value>]) -> Table {
    if objects.is_empty() {
        return Table::empty();
    }

    let mut column_names: IndexSet<&str> = IndexSet::new();
    for obj in objects {
        for key in obj.keys() {
            column_names.insert(key.as_str());
        }
    }

    let mut builder = TableBuilder::new(column_names.iter().copied());
    for obj in objects {
        builder.push_row(
            column_names
                .iter()
                .map(|key| json_value_to_cell(obj.get(*key)))
                .collect(),
        );
    }

    builder.build()
}

pub(super) fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Str(n.to_string())
            }
        }
        Some(Value::String(s)) => CellValue::Str(s.clone()),
        // Nested values are carried as their JSON text
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            CellValue::Str(nested.to_string())
        }
    }
}
