//! Column metadata and the semantic type lattice

use serde::{Deserialize, Serialize};

/// Semantic type of a column, ordered most specific to least specific.
/// This ordering is the narrowing lattice used by type inference:
/// `Boolean ⊐ Integer ⊐ Float ⊐ Timestamp ⊐ Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Timestamp,
    Text,
}

impl ColumnType {
    /// Whether values of this type compare numerically.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// DDL type used by the schema emitter.
    pub fn ddl_type(self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "DOUBLE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Text => "VARCHAR",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Text => write!(f, "string"),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name (unique within its table)
    pub name: String,
    /// 0-based ordinal position
    pub index: usize,
    /// Inferred or schema-declared type
    pub ty: ColumnType,
    /// True iff a null/empty value was observed in this column
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            ty: ColumnType::Text,
            nullable: false,
        }
    }

    /// Column with a schema-declared type (columnar formats carry their own).
    pub fn with_type(name: impl Into<String>, index: usize, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            index,
            ty,
            nullable: false,
        }
    }
}
