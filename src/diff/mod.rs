//! Key-based diff engine for two tables

mod key;
mod metric;

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{DitError, Result};
use crate::model::{CellValue, Row, Table};

pub use key::{KeyPair, KeySpec, ResolvedKeys};
pub use metric::{evaluate, parse_metric_spec, Agg, Metric, MetricResult};

/// How a report row relates the two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Key present only on the left side
    LeftOnly,
    /// Key present only on the right side
    RightOnly,
    /// Matched pair with at least one differing column
    Changed,
    /// Matched pair with every compared column equal
    Equal,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::LeftOnly => write!(f, "left_only"),
            Disposition::RightOnly => write!(f, "right_only"),
            Disposition::Changed => write!(f, "changed"),
            Disposition::Equal => write!(f, "equal"),
        }
    }
}

/// One compared column of one report row. A side is `None` when the row
/// only exists on the other side.
#[derive(Debug, Clone)]
pub struct ColumnDiff {
    pub left: Option<CellValue>,
    pub right: Option<CellValue>,
    pub equal: bool,
}

/// One row of the report: the key tuple's display values plus the compared
/// columns, in report column order.
#[derive(Debug, Clone)]
pub struct RowEntry {
    pub key: Vec<String>,
    pub disposition: Disposition,
    pub columns: Vec<ColumnDiff>,
}

/// Row-level tallies over the whole matching pass (before report-mode
/// filtering).
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffSummary {
    pub left_rows: usize,
    pub right_rows: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub changed: usize,
    pub equal: usize,
}

impl DiffSummary {
    pub fn differing_rows(&self) -> usize {
        self.left_only + self.right_only + self.changed
    }
}

/// Result of one diff invocation. Holds owned display data only, so both
/// source tables may be dropped once the report is built.
#[derive(Debug)]
pub struct DiffReport {
    /// Key pair aliases, in key spec order
    pub key_aliases: Vec<String>,
    /// Names of the compared (non-key, both-sides) columns
    pub columns: Vec<String>,
    /// Row comparisons: left-table ingestion order, then residual
    /// right-only rows in right-table ingestion order
    pub entries: Vec<RowEntry>,
    /// Metric results, in request order
    pub metrics: Vec<MetricResult>,
    pub summary: DiffSummary,
}

impl DiffReport {
    pub fn has_differences(&self) -> bool {
        self.summary.differing_rows() > 0 || self.metrics.iter().any(|m| !m.is_equal())
    }
}

/// The engine. `all_rows` keeps equal pairs in the report with an explicit
/// marker instead of dropping them.
pub struct DiffEngine {
    all_rows: bool,
}

impl DiffEngine {
    pub fn new(all_rows: bool) -> Self {
        Self { all_rows }
    }

    pub fn diff(
        &self,
        left: &Table,
        right: &Table,
        key_spec: &KeySpec,
        metrics: &[Metric],
    ) -> Result<DiffReport> {
        if left.row_count() == 0 || right.row_count() == 0 {
            return Err(DitError::EmptyInput);
        }

        let keys = key_spec.resolve(left, right)?;
        let compared = compared_columns(left, right, key_spec);

        // Left index: key tuple -> FIFO queue of row indices. Duplicates
        // are preserved so they pair up in ingestion order.
        let mut index: FxHashMap<String, VecDeque<usize>> = FxHashMap::default();
        for (i, row) in left.rows().iter().enumerate() {
            index
                .entry(key_of(row, &keys.left_indices))
                .or_default()
                .push_back(i);
        }

        let mut paired: Vec<Option<usize>> = vec![None; left.row_count()];
        let mut right_only: Vec<usize> = Vec::new();
        for (j, row) in right.rows().iter().enumerate() {
            let key = key_of(row, &keys.right_indices);
            match index.get_mut(&key).and_then(VecDeque::pop_front) {
                Some(i) => paired[i] = Some(j),
                None => right_only.push(j),
            }
        }

        let mut summary = DiffSummary {
            left_rows: left.row_count(),
            right_rows: right.row_count(),
            ..DiffSummary::default()
        };
        let mut entries = Vec::new();

        for (i, left_row) in left.rows().iter().enumerate() {
            let key = key_display(left_row, &keys.left_indices);
            match paired[i] {
                Some(j) => {
                    let right_row = &right.rows()[j];
                    let columns: Vec<ColumnDiff> = compared
                        .iter()
                        .map(|&(li, ri)| {
                            let l = left_row.get(li).cloned().unwrap_or(CellValue::Null);
                            let r = right_row.get(ri).cloned().unwrap_or(CellValue::Null);
                            // CellValue equality is numeric for numbers
                            // (Int(2) == Float(2.0)) and exact otherwise
                            let equal = l == r;
                            ColumnDiff {
                                left: Some(l),
                                right: Some(r),
                                equal,
                            }
                        })
                        .collect();

                    let all_equal = columns.iter().all(|c| c.equal);
                    if all_equal {
                        summary.equal += 1;
                    } else {
                        summary.changed += 1;
                    }
                    if self.all_rows || !all_equal {
                        entries.push(RowEntry {
                            key,
                            disposition: if all_equal {
                                Disposition::Equal
                            } else {
                                Disposition::Changed
                            },
                            columns,
                        });
                    }
                }
                None => {
                    summary.left_only += 1;
                    entries.push(RowEntry {
                        key,
                        disposition: Disposition::LeftOnly,
                        columns: compared
                            .iter()
                            .map(|&(li, _)| ColumnDiff {
                                left: Some(left_row.get(li).cloned().unwrap_or(CellValue::Null)),
                                right: None,
                                equal: false,
                            })
                            .collect(),
                    });
                }
            }
        }

        for j in right_only {
            let right_row = &right.rows()[j];
            summary.right_only += 1;
            entries.push(RowEntry {
                key: key_display(right_row, &keys.right_indices),
                disposition: Disposition::RightOnly,
                columns: compared
                    .iter()
                    .map(|&(_, ri)| ColumnDiff {
                        left: None,
                        right: Some(right_row.get(ri).cloned().unwrap_or(CellValue::Null)),
                        equal: false,
                    })
                    .collect(),
            });
        }

        let mut metric_results = Vec::with_capacity(metrics.len());
        for m in metrics {
            metric_results.push(evaluate(m, left, right)?);
        }

        Ok(DiffReport {
            key_aliases: keys.aliases,
            columns: compared
                .iter()
                .map(|&(li, _)| left.columns()[li].name.clone())
                .collect(),
            entries,
            metrics: metric_results,
            summary,
        })
    }
}

/// Columns compared for matched pairs, as (left index, right index)
/// pairs in left-table column order. Key names are excluded per side:
/// a left data column that shares its name with a right key column is
/// still compared.
fn compared_columns(left: &Table, right: &Table, key_spec: &KeySpec) -> Vec<(usize, usize)> {
    let left_keys: FxHashSet<&str> = key_spec.pairs.iter().map(|p| p.left.as_str()).collect();

    left.columns()
        .iter()
        .filter(|c| !left_keys.contains(c.name.as_str()))
        .filter_map(|c| right.column_index(&c.name).map(|ri| (c.index, ri)))
        .collect()
}

fn key_display(row: &Row, indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .map(|&i| row.get(i).map(CellValue::display).unwrap_or_default())
        .collect()
}

/// Hash key for one row's key tuple. Segments are length-prefixed so a
/// value containing any separator text cannot collide across segment
/// boundaries. Display text keeps numeric keys matching across cell
/// types (`Int(2)` and `Float(2.0)` both render as `2`).
fn key_of(row: &Row, indices: &[usize]) -> String {
    let mut key = String::new();
    for part in key_display(row, indices) {
        key.push_str(&part.len().to_string());
        key.push(':');
        key.push_str(&part);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableBuilder;

    fn table(names: &[&str], rows: &[&[&str]]) -> Table {
        let mut builder = TableBuilder::new(names.iter().copied());
        for row in rows {
            builder.push_row(
                row.iter()
                    .map(|s| {
                        if s.is_empty() {
                            CellValue::Null
                        } else {
                            CellValue::Str(s.to_string())
                        }
                    })
                    .collect(),
            );
        }
        builder.build()
    }

    fn diff(left: &Table, right: &Table, keys: &str) -> DiffReport {
        DiffEngine::new(false)
            .diff(left, right, &KeySpec::parse(keys).unwrap(), &[])
            .unwrap()
    }

    #[test]
    fn identical_tables_have_no_differences() {
        let a = table(&["id", "v"], &[&["1", "x"], &["2", "y"]]);
        let b = table(&["id", "v"], &[&["1", "x"], &["2", "y"]]);
        let report = diff(&a, &b, "id");
        assert_eq!(report.summary.differing_rows(), 0);
        assert!(report.entries.is_empty());
        assert!(!report.has_differences());
    }

    #[test]
    fn changed_and_one_sided_rows() {
        let a = table(&["id", "v"], &[&["1", "x"], &["2", "y"], &["3", "z"]]);
        let b = table(&["id", "v"], &[&["1", "x"], &["2", "Y"], &["4", "w"]]);
        let report = diff(&a, &b, "id");

        assert_eq!(report.summary.changed, 1);
        assert_eq!(report.summary.left_only, 1);
        assert_eq!(report.summary.right_only, 1);
        assert_eq!(report.summary.equal, 1);

        // left ingestion order first, right-only residue last
        let dispositions: Vec<Disposition> =
            report.entries.iter().map(|e| e.disposition).collect();
        assert_eq!(
            dispositions,
            [
                Disposition::Changed,
                Disposition::LeftOnly,
                Disposition::RightOnly
            ]
        );
        assert_eq!(report.entries[0].key, ["2"]);
        assert_eq!(report.entries[2].key, ["4"]);
    }

    #[test]
    fn renamed_key_matches_across_names() {
        let a = table(&["id", "v"], &[&["1", "x"]]);
        let b = table(&["code", "v"], &[&["1", "x"]]);
        let report = diff(&a, &b, "id=code");
        assert!(!report.has_differences());
        assert_eq!(report.key_aliases, ["id"]);
    }

    #[test]
    fn composite_key() {
        let a = table(&["a", "b", "v"], &[&["1", "p", "x"], &["1", "q", "y"]]);
        let b = table(&["a", "b", "v"], &[&["1", "q", "y"], &["1", "p", "x"]]);
        let report = diff(&a, &b, "a,b");
        assert!(!report.has_differences());
    }

    #[test]
    fn missing_key_column_fails_on_either_side() {
        let a = table(&["id", "v"], &[&["1", "x"]]);
        let b = table(&["id", "v"], &[&["1", "x"]]);
        let err = DiffEngine::new(false)
            .diff(&a, &b, &KeySpec::parse("nope").unwrap(), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            DitError::MissingKeyColumn { column, .. } if column == "nope"
        ));
    }

    #[test]
    fn empty_table_fails() {
        let a = table(&["id"], &[]);
        let b = table(&["id"], &[&["1"]]);
        let err = DiffEngine::new(false)
            .diff(&a, &b, &KeySpec::parse("id").unwrap(), &[])
            .unwrap_err();
        assert!(matches!(err, DitError::EmptyInput));
    }

    #[test]
    fn duplicate_keys_pair_in_ingestion_order() {
        let a = table(&["id", "v"], &[&["1", "first"], &["1", "second"]]);
        let b = table(&["id", "v"], &[&["1", "first"], &["1", "other"], &["1", "third"]]);
        let report = diff(&a, &b, "id");

        // first left dup pairs with first right dup (equal), second with
        // second (changed), third right dup is unmatched
        assert_eq!(report.summary.equal, 1);
        assert_eq!(report.summary.changed, 1);
        assert_eq!(report.summary.right_only, 1);
        assert_eq!(report.entries[0].disposition, Disposition::Changed);
        assert_eq!(
            report.entries[0].columns[0].left,
            Some(CellValue::Str("second".into()))
        );
        assert_eq!(report.entries[1].disposition, Disposition::RightOnly);
    }

    #[test]
    fn all_rows_mode_keeps_equal_pairs() {
        let a = table(&["id", "v"], &[&["1", "x"], &["2", "y"]]);
        let b = table(&["id", "v"], &[&["1", "x"], &["2", "z"]]);
        let report = DiffEngine::new(true)
            .diff(&a, &b, &KeySpec::parse("id").unwrap(), &[])
            .unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].disposition, Disposition::Equal);
    }

    #[test]
    fn composite_key_segments_do_not_bleed_into_each_other() {
        // ("x|y", "z") and ("x", "y|z") are distinct key tuples
        let a = table(&["a", "b", "v"], &[&["x|y", "z", "1"]]);
        let b = table(&["a", "b", "v"], &[&["x", "y|z", "1"]]);
        let report = diff(&a, &b, "a,b");
        assert_eq!(report.summary.left_only, 1);
        assert_eq!(report.summary.right_only, 1);
        assert_eq!(report.summary.changed, 0);
    }

    #[test]
    fn left_column_sharing_a_right_key_name_is_compared() {
        let a = table(&["id", "code", "v"], &[&["1", "x", "p"]]);
        let b = table(&["code", "v"], &[&["1", "q"]]);
        let report = diff(&a, &b, "id=code");
        assert_eq!(report.columns, ["code", "v"]);
        assert_eq!(report.entries[0].disposition, Disposition::Changed);
        assert!(!report.entries[0].columns[0].equal);
    }

    #[test]
    fn numeric_columns_compare_numerically() {
        // 2 as integer on the left, 2.0 as float on the right
        let a = table(&["id", "v"], &[&["1", "2"]]);
        let b = table(&["id", "v"], &[&["1", "2.0"]]);
        let report = diff(&a, &b, "id");
        assert!(!report.has_differences());
    }

    #[test]
    fn symmetry_of_one_sided_rows() {
        let a = table(&["id"], &[&["1"], &["2"]]);
        let b = table(&["id"], &[&["2"], &["3"]]);
        let ab = diff(&a, &b, "id");
        let ba = diff(&b, &a, "id");
        assert_eq!(ab.summary.left_only, ba.summary.right_only);
        assert_eq!(ab.summary.right_only, ba.summary.left_only);
    }
}
