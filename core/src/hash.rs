//! Content hashing for structural trees.
//!
//! The hash input is a compact canonical text of the tree: every key quoted,
//! no whitespace, custom fragments with whitespace runs collapsed. Two trees
//! that print differently only in layout therefore share a hash, while any
//! change in member order, key, optionality or kind produces a new one.

use sha2::{Digest, Sha256};

use crate::{StructuralTree, TypeNode, quote_literal};

/// Computes the SHA-256 hex digest of a tree's canonical form.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::*;
///
/// let a = render(&[UnitReflection::primitive("a", PrimitiveKind::String)]);
/// let b = render(&[UnitReflection::primitive("a", PrimitiveKind::String).optional()]);
///
/// assert_eq!(hash_tree(&a), hash_tree(&a.clone()));
/// assert_ne!(hash_tree(&a), hash_tree(&b));
/// assert_eq!(hash_tree(&a).len(), 64);
/// ```
pub fn hash_tree(tree: &StructuralTree) -> String {
    let digest = Sha256::digest(canonical_text(tree).as_bytes());
    format!("{:x}", digest)
}

/// Returns the canonical text hashed by [`hash_tree`].
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::*;
///
/// let tree = render(&[
///     UnitReflection::primitive("a", PrimitiveKind::String),
///     UnitReflection::union("b", vec![PrimitiveKind::Number, PrimitiveKind::Null]).optional(),
/// ]);
/// assert_eq!(canonical_text(&tree), r#"{"a":string;"b"?:number|null;}"#);
/// ```
pub fn canonical_text(tree: &StructuralTree) -> String {
    let mut out = String::new();
    write_canonical_tree(&mut out, tree);
    out
}

fn write_canonical_tree(out: &mut String, tree: &StructuralTree) {
    out.push('{');
    for member in &tree.members {
        out.push_str(&quote_literal(&member.key));
        if member.optional {
            out.push('?');
        }
        out.push(':');
        write_canonical_type(out, &member.ty);
        out.push(';');
    }
    out.push('}');
}

fn write_canonical_type(out: &mut String, node: &TypeNode) {
    match node {
        TypeNode::Keyword(keyword) => out.push_str(keyword.as_str()),
        TypeNode::Record(tree) => write_canonical_tree(out, tree),
        TypeNode::Union(alternatives) => {
            for (i, alternative) in alternatives.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                write_canonical_type(out, alternative);
            }
        }
        TypeNode::Custom(fragment) => {
            let collapsed: Vec<&str> = fragment.split_whitespace().collect();
            out.push_str(&collapsed.join(" "));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Keyword, Member, PrimitiveKind, UnitReflection, render};

    use super::*;

    fn tree(units: &[UnitReflection]) -> StructuralTree {
        render(units)
    }

    #[test]
    fn test_hash_is_stable_across_calls() {
        let units = [
            UnitReflection::primitive("a", PrimitiveKind::String),
            UnitReflection::recursive(
                "b",
                vec![UnitReflection::primitive("c", PrimitiveKind::Date)],
            ),
        ];
        assert_eq!(hash_tree(&tree(&units)), hash_tree(&tree(&units)));
    }

    #[test]
    fn test_hash_matches_sha256_of_canonical_text() {
        // SHA-256 of "{}"
        assert_eq!(
            hash_tree(&StructuralTree::new()),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        let ab = tree(&[
            UnitReflection::primitive("a", PrimitiveKind::String),
            UnitReflection::primitive("b", PrimitiveKind::String),
        ]);
        let ba = tree(&[
            UnitReflection::primitive("b", PrimitiveKind::String),
            UnitReflection::primitive("a", PrimitiveKind::String),
        ]);
        assert_ne!(hash_tree(&ab), hash_tree(&ba));
    }

    #[test]
    fn test_hash_is_key_and_kind_sensitive() {
        let base = tree(&[UnitReflection::primitive("a", PrimitiveKind::String)]);
        let renamed = tree(&[UnitReflection::primitive("b", PrimitiveKind::String)]);
        let retyped = tree(&[UnitReflection::primitive("a", PrimitiveKind::Number)]);
        assert_ne!(hash_tree(&base), hash_tree(&renamed));
        assert_ne!(hash_tree(&base), hash_tree(&retyped));
    }

    #[test]
    fn test_hash_ignores_custom_fragment_layout() {
        let compact = StructuralTree::new().with_member(Member::required(
            "f",
            TypeNode::Custom("Record<string, number>".to_string()),
        ));
        let spaced = StructuralTree::new().with_member(Member::required(
            "f",
            TypeNode::Custom("  Record<string,\n   number> ".to_string()),
        ));
        assert_eq!(hash_tree(&compact), hash_tree(&spaced));
    }

    #[test]
    fn test_nested_record_and_flat_keys_differ() {
        let nested = StructuralTree::new().with_member(Member::required(
            "a",
            TypeNode::Record(
                StructuralTree::new()
                    .with_member(Member::required("b", TypeNode::Keyword(Keyword::String))),
            ),
        ));
        let flat = StructuralTree::new()
            .with_member(Member::required("a", TypeNode::Keyword(Keyword::Object)))
            .with_member(Member::required("b", TypeNode::Keyword(Keyword::String)));
        assert_ne!(hash_tree(&nested), hash_tree(&flat));
    }
}
