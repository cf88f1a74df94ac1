//! Schema emission as SQL DDL

use crate::model::Table;

/// Render a table's inferred schema as a `CREATE TABLE` statement, columns
/// in table order. Pure function of the schema.
pub fn create_table(table: &Table, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("CREATE TABLE {name} ("));

    let count = table.column_count();
    for (i, col) in table.columns().iter().enumerate() {
        out.push_str("\n  ");
        out.push_str(&col.name);
        out.push(' ');
        out.push_str(col.ty.ddl_type());
        if i + 1 < count {
            out.push(',');
        }
    }

    if count > 0 {
        out.push('\n');
    }
    out.push_str(");");
    out
}
