//! Key spec parsing and resolution

use crate::error::{DitError, Result, Side};
use crate::model::Table;

/// One matching pair: a left column name and the right column it maps to.
/// `a` maps a column to itself, `a=b` renames it across sides. The pair is
/// reported under its left name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub left: String,
    pub right: String,
}

impl KeyPair {
    pub fn alias(&self) -> &str {
        &self.left
    }
}

/// An ordered list of key pairs parsed from `a`, `a,b`, `a=b` syntax
/// (comma-separated segments, each optionally carrying its own rename).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub pairs: Vec<KeyPair>,
}

impl KeySpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for (i, part) in spec.split(',').enumerate() {
            let segments: Vec<&str> = part.split('=').collect();
            let pair = match segments.as_slice() {
                [name] if !name.trim().is_empty() => KeyPair {
                    left: name.trim().to_string(),
                    right: name.trim().to_string(),
                },
                [left, right] if !left.trim().is_empty() && !right.trim().is_empty() => KeyPair {
                    left: left.trim().to_string(),
                    right: right.trim().to_string(),
                },
                _ => {
                    return Err(DitError::BadKeySpec {
                        spec: spec.to_string(),
                        segment: i,
                    })
                }
            };
            pairs.push(pair);
        }
        Ok(Self { pairs })
    }

    /// Resolve every pair to column indices in its respective table.
    pub fn resolve(&self, left: &Table, right: &Table) -> Result<ResolvedKeys> {
        let mut left_indices = Vec::with_capacity(self.pairs.len());
        let mut right_indices = Vec::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            left_indices.push(left.column_index(&pair.left).ok_or_else(|| {
                DitError::MissingKeyColumn {
                    column: pair.left.clone(),
                    side: Side::Left,
                }
            })?);
            right_indices.push(right.column_index(&pair.right).ok_or_else(|| {
                DitError::MissingKeyColumn {
                    column: pair.right.clone(),
                    side: Side::Right,
                }
            })?);
        }

        Ok(ResolvedKeys {
            aliases: self.pairs.iter().map(|p| p.alias().to_string()).collect(),
            left_indices,
            right_indices,
        })
    }
}

/// Key pairs resolved to per-table column indices, positionally aligned.
#[derive(Debug, Clone)]
pub struct ResolvedKeys {
    pub aliases: Vec<String>,
    pub left_indices: Vec<usize>,
    pub right_indices: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key() {
        let spec = KeySpec::parse("id").unwrap();
        assert_eq!(spec.pairs.len(), 1);
        assert_eq!(spec.pairs[0].left, "id");
        assert_eq!(spec.pairs[0].right, "id");
    }

    #[test]
    fn composite_key() {
        let spec = KeySpec::parse("a,b").unwrap();
        let names: Vec<&str> = spec.pairs.iter().map(|p| p.alias()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn renamed_key() {
        let spec = KeySpec::parse("a=b").unwrap();
        assert_eq!(spec.pairs[0].left, "a");
        assert_eq!(spec.pairs[0].right, "b");
    }

    #[test]
    fn composite_with_per_segment_rename() {
        let spec = KeySpec::parse("a=x,b").unwrap();
        assert_eq!(spec.pairs[0].right, "x");
        assert_eq!(spec.pairs[1].right, "b");
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(KeySpec::parse("a=b=c").is_err());
        assert!(KeySpec::parse("a,,b").is_err());
        assert!(KeySpec::parse("=b").is_err());
    }
}
