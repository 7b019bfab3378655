//! Snapshot values.

use schema_snapshot_core::{Member, StructuralTree, hash_tree, write_type};

use crate::error::EncodeError;
use crate::parser::parse_member_text;

/// A titled, content-hashed capture of one structural tree.
///
/// The hash covers the tree only; the title is a label and never
/// participates in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub title: String,
    pub hash: String,
    pub tree: StructuralTree,
}

impl Snapshot {
    /// Assembles a snapshot from already known parts, as the decoder does.
    pub fn new(title: &str, hash: &str, tree: StructuralTree) -> Self {
        Self {
            title: title.to_string(),
            hash: hash.to_string(),
            tree,
        }
    }
}

/// Creates a snapshot of `tree`, computing its content hash.
///
/// Every member type is stored the way the decoder reads it back: a custom
/// fragment that spells a keyword union or a record becomes that structure,
/// and surrounding whitespace is dropped. The hash covers this normalized
/// tree, so `decode(encode(..))` returns equal snapshots with matching hashes.
///
/// # Errors
///
/// Returns [`EncodeError`] when a member type would not read back at all,
/// such as an empty fragment or one with unbalanced brackets or quotes.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::{PrimitiveKind, UnitReflection, render};
/// use schema_snapshot_store::create_snapshot;
///
/// let tree = render(&[UnitReflection::primitive("a", PrimitiveKind::String)]);
/// let first = create_snapshot("v1", tree.clone()).unwrap();
/// let second = create_snapshot("renamed", tree).unwrap();
///
/// assert_eq!(first.hash, second.hash);
/// assert_ne!(first.title, second.title);
///
/// let broken = render(&[UnitReflection::custom("a", "Array<string")]);
/// assert!(create_snapshot("v2", broken).is_err());
/// ```
pub fn create_snapshot(title: &str, tree: StructuralTree) -> Result<Snapshot, EncodeError> {
    let tree = normalize(tree)?;
    let hash = hash_tree(&tree);
    Ok(Snapshot {
        title: title.to_string(),
        hash,
        tree,
    })
}

fn normalize(tree: StructuralTree) -> Result<StructuralTree, EncodeError> {
    let mut normalized = StructuralTree::new();
    for member in tree.members {
        let mut text = String::new();
        write_type(&mut text, &member.ty, 1);
        let ty = parse_member_text(&text).map_err(|source| EncodeError {
            member: member.key.clone(),
            source,
        })?;
        normalized.members.push(Member {
            key: member.key,
            optional: member.optional,
            ty,
        });
    }
    Ok(normalized)
}
