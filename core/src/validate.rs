//! Reflection validation.
//!
//! Catches schema mistakes such as empty or duplicate member keys before
//! they end up in a generated declaration. Validation is advisory: the
//! renderer passes every unit through unchanged, so callers decide whether
//! findings block generation or are only reported.
//!
//! # Examples
//!
//! ```
//! use schema_snapshot_core::*;
//!
//! let units = vec![UnitReflection::primitive("id", PrimitiveKind::Number)];
//! assert!(validate_units(&units).is_empty());
//!
//! // Duplicate key in the same scope
//! let units = vec![
//!     UnitReflection::primitive("id", PrimitiveKind::Number),
//!     UnitReflection::primitive("id", PrimitiveKind::String),
//! ];
//! assert_eq!(
//!     validate_units(&units),
//!     vec![ReflectionError::DuplicateKey("id".to_string())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{UnitReflection, UnitShape};

/// Reflection errors.
///
/// Covers both structural findings reported by [`validate_units`] and shape
/// invariant violations rejected while deserializing a [`UnitReflection`].
/// Paths are dot-separated member keys from the schema root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectionError {
    /// A member key is empty or whitespace-only.
    #[error("empty member key at path: {0}")]
    EmptyKey(String),
    /// Two members in the same scope share a key.
    #[error("duplicate member key: {0}")]
    DuplicateKey(String),
    /// A primitive unit lists no kinds at all.
    #[error("primitive unit has no kinds: {0}")]
    EmptyKindUnion(String),
    /// A custom unit carries an empty fragment.
    #[error("custom unit has an empty fragment: {0}")]
    EmptyFragment(String),
    /// A recursive unit was declared without `values`.
    #[error("missing nested values for recursive unit `{0}`")]
    MissingValues(String),
    /// A custom unit was declared without `fragment`.
    #[error("missing fragment for custom unit `{0}`")]
    MissingFragment(String),
    /// `values` was given for a unit that is not recursive.
    #[error("unexpected nested values on non-recursive unit `{0}`")]
    UnexpectedValues(String),
    /// `fragment` was given for a unit that is not custom.
    #[error("unexpected fragment on non-custom unit `{0}`")]
    UnexpectedFragment(String),
}

/// Validates a reflection tree.
///
/// Walks every scope and reports each problem found, in traversal order.
pub fn validate_units(units: &[UnitReflection]) -> Vec<ReflectionError> {
    let mut errors = Vec::new();
    let mut path = Vec::new();
    validate_scope(units, &mut path, &mut errors);
    errors
}

fn validate_scope(
    units: &[UnitReflection],
    path: &mut Vec<String>,
    errors: &mut Vec<ReflectionError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();

    for unit in units {
        let key = unit.key.trim();
        let member_path = join_path(path, key);

        if key.is_empty() {
            errors.push(ReflectionError::EmptyKey(join_path(path, "<empty>")));
        } else if !seen.insert(key) {
            errors.push(ReflectionError::DuplicateKey(member_path.clone()));
        }

        match &unit.shape {
            UnitShape::Primitive(kinds) if kinds.is_empty() => {
                errors.push(ReflectionError::EmptyKindUnion(member_path));
            }
            UnitShape::Primitive(_) => {}
            UnitShape::Custom(fragment) if fragment.trim().is_empty() => {
                errors.push(ReflectionError::EmptyFragment(member_path));
            }
            UnitShape::Custom(_) => {}
            UnitShape::Recursive(values) => {
                path.push(key.to_string());
                validate_scope(values, path, errors);
                path.pop();
            }
        }
    }
}

fn join_path(path: &[String], key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{key}", path.join("."))
    }
}

#[cfg(test)]
mod tests {
    use crate::PrimitiveKind;

    use super::*;

    #[test]
    fn test_validate_accepts_valid_tree() {
        let units = vec![
            UnitReflection::recursive(
                "root",
                vec![UnitReflection::primitive("id", PrimitiveKind::Number)],
            ),
            UnitReflection::primitive("id", PrimitiveKind::String),
        ];
        assert!(validate_units(&units).is_empty());
    }

    #[test]
    fn test_validate_reports_nested_duplicate_with_path() {
        let units = vec![UnitReflection::recursive(
            "root",
            vec![
                UnitReflection::primitive("a", PrimitiveKind::Number),
                UnitReflection::primitive("a", PrimitiveKind::Date),
            ],
        )];
        assert_eq!(
            validate_units(&units),
            vec![ReflectionError::DuplicateKey("root.a".to_string())]
        );
    }

    #[test]
    fn test_validate_reports_empty_key_and_empty_union() {
        let units = vec![
            UnitReflection::primitive(" ", PrimitiveKind::String),
            UnitReflection::union("choice", Vec::new()),
        ];
        assert_eq!(
            validate_units(&units),
            vec![
                ReflectionError::EmptyKey("<empty>".to_string()),
                ReflectionError::EmptyKindUnion("choice".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_reports_empty_fragment() {
        let units = vec![UnitReflection::custom("raw", "  ")];
        assert_eq!(
            validate_units(&units),
            vec![ReflectionError::EmptyFragment("raw".to_string())]
        );
    }
}
