//! Text rendering for tables, diff reports, and profiles

use std::io::Write;
use std::path::Path;

use crate::diff::DiffReport;
use crate::error::Result;
use crate::model::Table;
use crate::profile::TableProfile;

/// A small aligned-text table: headers plus string rows.
#[derive(Debug, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Render with box-drawing borders and per-column alignment.
    pub fn render(&self) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        border(&mut out, &widths, '┌', '┬', '┐');
        line(&mut out, &self.headers, &widths);
        border(&mut out, &widths, '├', '┼', '┤');
        for row in &self.rows {
            line(&mut out, row, &widths);
        }
        border(&mut out, &widths, '└', '┴', '┘');
        out
    }

    /// Render delimiter-separated (for `.csv`/`.tsv` output targets).
    pub fn to_delimited(&self, delimiter: char) -> String {
        let mut out = String::new();
        out.push_str(&delimited_line(&self.headers, delimiter));
        for row in &self.rows {
            out.push_str(&delimited_line(row, delimiter));
        }
        out
    }
}

fn border(out: &mut String, widths: &[usize], open: char, junction: char, close: char) {
    out.push(open);
    for (i, width) in widths.iter().enumerate() {
        out.push_str(&"─".repeat(width + 2));
        if i + 1 < widths.len() {
            out.push(junction);
        }
    }
    out.push(close);
    out.push('\n');
}

fn line(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('│');
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let pad = width.saturating_sub(cell.chars().count());
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(pad));
        out.push_str(" │");
    }
    out.push('\n');
}

fn delimited_line(cells: &[String], delimiter: char) -> String {
    let mut parts = Vec::with_capacity(cells.len());
    for cell in cells {
        if cell.contains(delimiter) || cell.contains('"') || cell.contains('\n') {
            parts.push(format!("\"{}\"", cell.replace('"', "\"\"")));
        } else {
            parts.push(cell.clone());
        }
    }
    let mut s = parts.join(&delimiter.to_string());
    s.push('\n');
    s
}

/// Delimiter implied by an output path's extension, when it has one.
pub fn delimiter_for_path(path: &Path) -> Option<char> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("csv") => Some(','),
        Some("tsv") => Some('\t'),
        _ => None,
    }
}

/// A table's contents as a text table. The human layout carries a type
/// row under the header; delimited output is data only.
pub fn table_view(table: &Table, with_types: bool) -> TextTable {
    let mut view = TextTable::new(table.columns().iter().map(|c| c.name.clone()));
    if with_types {
        view.push_row(table.columns().iter().map(|c| c.ty.to_string()).collect());
    }
    for row in table.rows() {
        view.push_row(row.cells.iter().map(|c| c.display()).collect());
    }
    view
}

pub fn render_peek(table: &Table, path: &Path, delimiter: Option<char>) -> String {
    match delimiter {
        Some(d) => table_view(table, false).to_delimited(d),
        None => format!(
            "-- PEEK: {} --\n{}",
            path.display(),
            table_view(table, true).render()
        ),
    }
}

/// Report rows as a text table: key columns, a status column, then paired
/// `l_`/`r_` value columns (the naming the aggregate SQL reports used).
pub fn diff_rows_view(report: &DiffReport) -> TextTable {
    let mut headers: Vec<String> = report.key_aliases.clone();
    headers.push("status".to_string());
    for name in &report.columns {
        headers.push(format!("l_{name}"));
        headers.push(format!("r_{name}"));
    }

    let mut view = TextTable::new(headers);
    for entry in &report.entries {
        let mut row = entry.key.clone();
        row.push(entry.disposition.to_string());
        for col in &entry.columns {
            row.push(col.left.as_ref().map(|v| v.display()).unwrap_or_default());
            row.push(col.right.as_ref().map(|v| v.display()).unwrap_or_default());
        }
        view.push_row(row);
    }
    view
}

pub fn diff_metrics_view(report: &DiffReport) -> TextTable {
    let mut view = TextTable::new(["metric", "column", "left", "right", "delta"]);
    for m in &report.metrics {
        view.push_row(vec![
            m.agg.to_string(),
            m.column.clone(),
            m.left.display(),
            m.right.display(),
            m.delta.map(|d| d.to_string()).unwrap_or_default(),
        ]);
    }
    view
}

pub fn render_diff(
    report: &DiffReport,
    left_path: &Path,
    right_path: &Path,
    delimiter: Option<char>,
) -> String {
    let rows = diff_rows_view(report);

    match delimiter {
        Some(d) => {
            let mut out = rows.to_delimited(d);
            if !report.metrics.is_empty() {
                out.push('\n');
                out.push_str(&diff_metrics_view(report).to_delimited(d));
            }
            out
        }
        None => {
            let mut out = format!(
                "-- DIFF: {} -> {} --\n",
                left_path.display(),
                right_path.display()
            );
            out.push_str(&rows.render());
            let s = report.summary;
            out.push_str(&format!(
                "rows: {} left, {} right | {} left_only, {} right_only, {} changed, {} equal\n",
                s.left_rows, s.right_rows, s.left_only, s.right_only, s.changed, s.equal
            ));
            if !report.metrics.is_empty() {
                out.push_str("-- METRICS --\n");
                out.push_str(&diff_metrics_view(report).render());
            }
            out
        }
    }
}

/// Profile rendering. Iterates the profile map directly; field order is
/// not part of the contract.
pub fn render_profile(profiles: &TableProfile) -> String {
    let mut out = String::from("-- PROFILE --\n");
    for p in profiles.values() {
        out.push_str(&format!("-- Field: `{}` ({}) --\n", p.name, p.ty));
        out.push_str(&format!("count: {}\n", p.count));
        out.push_str(&format!("nulls: {}\n", p.nulls));
        out.push_str(&format!("distinct: {}\n", p.distinct));
        if let (Some(min), Some(max), Some(mean)) = (p.min, p.max, p.mean) {
            out.push_str(&format!("min: {min} max: {max} mean: {mean}\n"));
        }
        out.push('\n');
    }
    out
}

/// Write fully-rendered text to stdout or a file. Output is composed in
/// memory first, so a failed operation never leaves a partial write.
pub fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_render() {
        let mut t = TextTable::new(["a", "long_header"]);
        t.push_row(vec!["1".into(), "x".into()]);
        let rendered = t.render();
        assert_eq!(
            rendered,
            "┌───┬─────────────┐\n\
             │ a │ long_header │\n\
             ├───┼─────────────┤\n\
             │ 1 │ x           │\n\
             └───┴─────────────┘\n"
        );
    }

    #[test]
    fn delimited_render_quotes_when_needed() {
        let mut t = TextTable::new(["a", "b"]);
        t.push_row(vec!["1,5".into(), "plain".into()]);
        assert_eq!(t.to_delimited(','), "a,b\n\"1,5\",plain\n");
    }

    #[test]
    fn delimiter_detection() {
        assert_eq!(delimiter_for_path(Path::new("out.csv")), Some(','));
        assert_eq!(delimiter_for_path(Path::new("out.tsv")), Some('\t'));
        assert_eq!(delimiter_for_path(Path::new("out.txt")), None);
    }
}
