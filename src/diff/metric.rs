//! Metric specs and whole-column aggregate evaluation

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{DitError, Result, Side};
use crate::model::{CellValue, ColumnType, Table};

/// Supported aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agg {
    Count,
    CountDistinct,
    Sum,
    Mean,
    Median,
    Min,
    Max,
}

impl Agg {
    /// Aggregations that only make sense over a numeric column.
    pub fn requires_numeric(self) -> bool {
        matches!(self, Agg::Sum | Agg::Mean | Agg::Median)
    }
}

impl std::fmt::Display for Agg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Agg::Count => write!(f, "count"),
            Agg::CountDistinct => write!(f, "count_distinct"),
            Agg::Sum => write!(f, "sum"),
            Agg::Mean => write!(f, "mean"),
            Agg::Median => write!(f, "median"),
            Agg::Min => write!(f, "min"),
            Agg::Max => write!(f, "max"),
        }
    }
}

/// One metric to compare: an aggregation over a left column and a right
/// column (defaulting to the left name).
#[derive(Debug, Clone, Deserialize)]
pub struct Metric {
    pub agg: Agg,
    pub left: String,
    #[serde(default)]
    pub right: Option<String>,
}

impl Metric {
    pub fn right_column(&self) -> &str {
        self.right.as_deref().unwrap_or(&self.left)
    }
}

#[derive(Deserialize)]
struct MetricWrapper {
    metrics: Vec<Metric>,
}

/// Parse a metric spec given either inline JSON or a path to a JSON file,
/// and either a bare array of `{agg, left, right}` objects or an object
/// wrapping that array under `"metrics"`. The file is probed first, so a
/// path and the equivalent inline string resolve identically.
pub fn parse_metric_spec(input: &str) -> Result<Vec<Metric>> {
    let text = match std::fs::read_to_string(input) {
        Ok(contents) => contents,
        Err(_) => input.to_string(),
    };

    if let Ok(metrics) = serde_json::from_str::<Vec<Metric>>(&text) {
        return Ok(metrics);
    }
    match serde_json::from_str::<MetricWrapper>(&text) {
        Ok(wrapper) => Ok(wrapper.metrics),
        Err(e) => Err(DitError::BadMetricSpec(e.to_string())),
    }
}

/// The outcome of evaluating one metric on both sides.
#[derive(Debug, Clone)]
pub struct MetricResult {
    pub agg: Agg,
    /// Reported under the left column name.
    pub column: String,
    pub left: CellValue,
    pub right: CellValue,
    /// `right - left`, when both sides evaluated to numbers.
    pub delta: Option<f64>,
}

impl MetricResult {
    pub fn is_equal(&self) -> bool {
        self.left == self.right
    }
}

/// Evaluate a metric over the entire left column and the entire right
/// column. Whole-dataset aggregates, not per matched group.
pub fn evaluate(metric: &Metric, left: &Table, right: &Table) -> Result<MetricResult> {
    let left_value = evaluate_side(metric.agg, left, &metric.left, Side::Left)?;
    let right_value = evaluate_side(metric.agg, right, metric.right_column(), Side::Right)?;

    let delta = match (left_value.as_f64(), right_value.as_f64()) {
        (Some(l), Some(r)) => Some(r - l),
        _ => None,
    };

    Ok(MetricResult {
        agg: metric.agg,
        column: metric.left.clone(),
        left: left_value,
        right: right_value,
        delta,
    })
}

fn evaluate_side(agg: Agg, table: &Table, column: &str, side: Side) -> Result<CellValue> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| DitError::MissingMetricColumn {
            column: column.to_string(),
            side,
        })?;
    let col = &table.columns()[idx];

    if agg.requires_numeric() && !col.ty.is_numeric() {
        return Err(DitError::TypeMismatch {
            agg: agg.to_string(),
            column: column.to_string(),
            ty: col.ty.to_string(),
        });
    }

    let values: Vec<&CellValue> = table
        .column_values(idx)
        .filter(|v| !v.is_null())
        .collect();

    Ok(aggregate(agg, &values, col.ty))
}

/// Aggregate non-null values of one column. Nulls are already filtered out,
/// matching SQL aggregate semantics.
fn aggregate(agg: Agg, values: &[&CellValue], ty: ColumnType) -> CellValue {
    match agg {
        Agg::Count => CellValue::Int(values.len() as i64),
        Agg::CountDistinct => {
            let distinct: FxHashSet<&CellValue> = values.iter().copied().collect();
            CellValue::Int(distinct.len() as i64)
        }
        Agg::Sum => {
            let sum: f64 = values.iter().filter_map(|v| v.as_f64()).sum();
            if ty == ColumnType::Integer {
                CellValue::Int(sum as i64)
            } else {
                CellValue::Float(sum)
            }
        }
        Agg::Mean => {
            if values.is_empty() {
                return CellValue::Null;
            }
            let sum: f64 = values.iter().filter_map(|v| v.as_f64()).sum();
            CellValue::Float(sum / values.len() as f64)
        }
        Agg::Median => {
            let mut nums: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
            if nums.is_empty() {
                return CellValue::Null;
            }
            nums.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let mid = nums.len() / 2;
            let median = if nums.len() % 2 == 0 {
                (nums[mid - 1] + nums[mid]) / 2.0
            } else {
                nums[mid]
            };
            CellValue::Float(median)
        }
        Agg::Min => values
            .iter()
            .copied()
            .min_by(|a, b| cmp_cells(a, b))
            .cloned()
            .unwrap_or(CellValue::Null),
        Agg::Max => values
            .iter()
            .copied()
            .max_by(|a, b| cmp_cells(a, b))
            .cloned()
            .unwrap_or(CellValue::Null),
    }
}

/// Ordering within one column (columns are homogeneous after coercion).
fn cmp_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => match (a, b) {
            (CellValue::Str(x), CellValue::Str(y)) => x.cmp(y),
            (CellValue::Timestamp(x), CellValue::Timestamp(y)) => x.cmp(y),
            (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}
