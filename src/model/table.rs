//! Table, Row, and cell value data structures

use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::infer::{coerce, infer_column};
use super::schema::Column;

/// A single cell value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Str(String),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // NaN compares equal to itself so Eq/Hash stay lawful
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::Timestamp(a), CellValue::Timestamp(b)) => a == b,
            (CellValue::Str(a), CellValue::Str(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Timestamp(t) => t.hash(state),
            CellValue::Str(s) => s.hash(state),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value, when it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Display form used for rendering and for composite key tuples.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Timestamp(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Str(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Str(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Str(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row: one cell per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// An in-memory dataset: ordered columns plus ordered rows.
///
/// Immutable once built. Construction goes through [`TableBuilder`], which
/// runs type inference and normalizes every cell to its column's type, so
/// every row's arity equals the column count and column types never change
/// after the fact.
#[derive(Debug)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// A table with no columns and no rows (e.g. an empty JSON array).
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |r| r.get(index))
    }
}

/// Builder that readers feed rows into before inference runs.
#[derive(Debug)]
pub struct TableBuilder {
    columns: Vec<Column>,
    rows: Vec<Row>,
    /// Types came from the source schema (columnar formats); skip inference.
    declared: bool,
}

impl TableBuilder {
    /// Builder for text formats: types are inferred at `build` time.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column::new(name, i))
            .collect();
        Self {
            columns,
            rows: Vec::new(),
            declared: false,
        }
    }

    /// Builder for sources that carry their own schema.
    pub fn with_types(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            declared: true,
        }
    }

    /// Append a row, padding or truncating to the column count.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Null);
        self.rows.push(Row { cells });
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Finish construction: infer column types (unless declared), mark
    /// nullability, and coerce every cell to its column's final type.
    pub fn build(mut self) -> Table {
        for (idx, col) in self.columns.iter_mut().enumerate() {
            if self.declared {
                col.nullable = self.rows.iter().any(|r| {
                    r.get(idx).map(CellValue::is_null).unwrap_or(true)
                });
            } else {
                let inferred = infer_column(self.rows.iter().filter_map(|r| r.get(idx)));
                col.ty = inferred.ty;
                col.nullable = inferred.nullable;
                for row in &mut self.rows {
                    if let Some(cell) = row.cells.get_mut(idx) {
                        let old = std::mem::replace(cell, CellValue::Null);
                        *cell = coerce(old, col.ty);
                    }
                }
            }
        }

        Table {
            columns: self.columns,
            rows: self.rows,
        }
    }
}
