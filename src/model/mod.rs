//! Typed tabular data model

mod infer;
mod schema;
mod table;

pub use infer::{coerce, infer_column, parse_bool, parse_timestamp, Inferred};
pub use schema::{Column, ColumnType};
pub use table::{CellValue, Row, Table, TableBuilder};
