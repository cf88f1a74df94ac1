//! Per-column statistics over a single table

use std::collections::HashMap;

use rustc_hash::FxHashSet;

use crate::model::{CellValue, ColumnType, Table};

/// Statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub ty: ColumnType,
    /// Non-null count
    pub count: usize,
    pub nulls: usize,
    /// Distinct non-null values
    pub distinct: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// Profiles keyed by column name. Deliberately a `HashMap`: iteration
/// order carries no meaning and callers must not depend on it.
pub type TableProfile = HashMap<String, ColumnProfile>;

/// Profile every column of a table. An empty table yields zero-valued
/// statistics, never an error.
pub fn profile(table: &Table) -> TableProfile {
    let mut profiles = TableProfile::with_capacity(table.column_count());

    for col in table.columns() {
        let mut count = 0usize;
        let mut nulls = 0usize;
        let mut distinct: FxHashSet<&CellValue> = FxHashSet::default();
        let mut sum = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut numeric_seen = 0usize;

        for cell in table.column_values(col.index) {
            if cell.is_null() {
                nulls += 1;
                continue;
            }
            count += 1;
            distinct.insert(cell);
            if let Some(n) = cell.as_f64() {
                numeric_seen += 1;
                sum += n;
                min = min.min(n);
                max = max.max(n);
            }
        }

        let (min, max, mean) = if col.ty.is_numeric() && numeric_seen > 0 {
            (Some(min), Some(max), Some(sum / numeric_seen as f64))
        } else {
            (None, None, None)
        };

        profiles.insert(
            col.name.clone(),
            ColumnProfile {
                name: col.name.clone(),
                ty: col.ty,
                count,
                nulls,
                distinct: distinct.len(),
                min,
                max,
                mean,
            },
        );
    }

    profiles
}
