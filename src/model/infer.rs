//! Type inference: a monotone narrowing walk over an ordered candidate list.
//!
//! The candidate order is the lattice `Boolean ⊐ Integer ⊐ Float ⊐
//! Timestamp ⊐ Text`. Each column starts at the most specific candidate;
//! a value that fails the current candidate demotes the column to the next
//! broader one, and a demoted column never promotes back. Text accepts
//! everything. Nulls never move the cursor but mark the column nullable.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::schema::ColumnType;
use super::table::CellValue;

/// Candidates in demotion order. Kept as an explicit list so the ordering
/// contract stays visible and testable on its own.
const CANDIDATES: [ColumnType; 5] = [
    ColumnType::Boolean,
    ColumnType::Integer,
    ColumnType::Float,
    ColumnType::Timestamp,
    ColumnType::Text,
];

/// Result of inferring one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inferred {
    pub ty: ColumnType,
    pub nullable: bool,
}

/// Infer the type of one column from its ordered sample of values.
/// Deterministic for a fixed sample order.
pub fn infer_column<'a, I>(values: I) -> Inferred
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut cursor = 0usize;
    let mut nullable = false;
    let mut saw_value = false;

    for value in values {
        if value.is_null() {
            nullable = true;
            continue;
        }
        saw_value = true;
        while !accepts(CANDIDATES[cursor], value) {
            cursor += 1; // Text always accepts, so this terminates
        }
    }

    // A column with no non-null samples gives the fallback type.
    let ty = if saw_value { CANDIDATES[cursor] } else { ColumnType::Text };
    Inferred { ty, nullable }
}

/// Whether a non-null value parses under the given candidate.
fn accepts(candidate: ColumnType, value: &CellValue) -> bool {
    match candidate {
        ColumnType::Boolean => match value {
            CellValue::Bool(_) => true,
            CellValue::Str(s) => parse_bool(s).is_some(),
            _ => false,
        },
        ColumnType::Integer => match value {
            CellValue::Int(_) => true,
            CellValue::Str(s) => s.parse::<i64>().is_ok(),
            _ => false,
        },
        ColumnType::Float => match value {
            CellValue::Int(_) | CellValue::Float(_) => true,
            CellValue::Str(s) => s.parse::<f64>().is_ok(),
            _ => false,
        },
        ColumnType::Timestamp => match value {
            CellValue::Timestamp(_) => true,
            CellValue::Str(s) => parse_timestamp(s).is_some(),
            _ => false,
        },
        ColumnType::Text => true,
    }
}

/// Normalize a cell to its column's final type. Values that cannot be
/// represented under the target (a column demoted after they were read)
/// are kept as their display string.
pub fn coerce(value: CellValue, ty: ColumnType) -> CellValue {
    if value.is_null() {
        return CellValue::Null;
    }

    match ty {
        ColumnType::Boolean => match value {
            CellValue::Bool(_) => value,
            CellValue::Str(ref s) => match parse_bool(s) {
                Some(b) => CellValue::Bool(b),
                None => value,
            },
            other => CellValue::Str(other.display()),
        },
        ColumnType::Integer => match value {
            CellValue::Int(_) => value,
            CellValue::Str(ref s) => match s.parse::<i64>() {
                Ok(i) => CellValue::Int(i),
                Err(_) => value,
            },
            other => CellValue::Str(other.display()),
        },
        ColumnType::Float => match value {
            CellValue::Float(_) => value,
            CellValue::Int(i) => CellValue::Float(i as f64),
            CellValue::Str(ref s) => match s.parse::<f64>() {
                Ok(f) => CellValue::Float(f),
                Err(_) => value,
            },
            other => CellValue::Str(other.display()),
        },
        ColumnType::Timestamp => match value {
            CellValue::Timestamp(_) => value,
            CellValue::Str(ref s) => match parse_timestamp(s) {
                Some(t) => CellValue::Timestamp(t),
                None => value,
            },
            other => CellValue::Str(other.display()),
        },
        ColumnType::Text => match value {
            CellValue::Str(_) => value,
            other => CellValue::Str(other.display()),
        },
    }
}

pub fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    // Bare dates fold into timestamps at midnight
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}
