//! Hash-keyed snapshot list operations.
//!
//! Lists are never edited in place: every operation takes the current list
//! by reference and returns a new one, so a failed operation leaves the
//! caller's list untouched.

use serde::{Deserialize, Serialize};

use crate::Snapshot;
use crate::error::NotFoundError;

/// What to do with the title of a candidate whose hash already exists.
///
/// # Examples
///
/// ```
/// use schema_snapshot_store::TitlePolicy;
///
/// assert_eq!(TitlePolicy::default(), TitlePolicy::KeepFirst);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitlePolicy {
    /// Discard the candidate entirely (the default).
    #[default]
    KeepFirst,
    /// Keep the existing position and hash, adopt the candidate's title.
    UpdateTitleOnMatch,
}

/// Result of [`insert_with_policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The candidate was appended.
    Inserted,
    /// A snapshot with the same hash exists; nothing changed.
    Duplicate,
    /// A snapshot with the same hash exists and took the candidate's title.
    Retitled,
}

/// Appends `candidate` unless a snapshot with the same hash exists.
///
/// On a hash match the existing list is returned unchanged and the
/// candidate, title included, is discarded.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::StructuralTree;
/// use schema_snapshot_store::{Snapshot, insert};
///
/// let a = Snapshot::new("v1", "h1", StructuralTree::new());
/// let list = insert(&[], a.clone());
/// assert_eq!(insert(&list, a).len(), 1);
/// ```
pub fn insert(existing: &[Snapshot], candidate: Snapshot) -> Vec<Snapshot> {
    insert_with_policy(existing, candidate, TitlePolicy::KeepFirst).0
}

/// Inserts `candidate` and reports what happened, honoring `policy` on a
/// hash match.
pub fn insert_with_policy(
    existing: &[Snapshot],
    candidate: Snapshot,
    policy: TitlePolicy,
) -> (Vec<Snapshot>, InsertOutcome) {
    let mut next = existing.to_vec();

    let Some(position) = existing.iter().position(|s| s.hash == candidate.hash) else {
        next.push(candidate);
        return (next, InsertOutcome::Inserted);
    };

    match policy {
        TitlePolicy::UpdateTitleOnMatch if next[position].title != candidate.title => {
            next[position].title = candidate.title;
            (next, InsertOutcome::Retitled)
        }
        _ => (next, InsertOutcome::Duplicate),
    }
}

/// Removes the snapshot carrying `hash`, preserving the order of the rest.
///
/// # Errors
///
/// Returns [`NotFoundError`] naming the hash when no snapshot matches.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::StructuralTree;
/// use schema_snapshot_store::{Snapshot, delete_by_hash};
///
/// let list = vec![Snapshot::new("v1", "h1", StructuralTree::new())];
/// assert!(delete_by_hash(&list, "h1").unwrap().is_empty());
/// assert_eq!(delete_by_hash(&list, "nope").unwrap_err().hash, "nope");
/// ```
pub fn delete_by_hash(existing: &[Snapshot], hash: &str) -> Result<Vec<Snapshot>, NotFoundError> {
    let index = existing
        .iter()
        .position(|s| s.hash == hash)
        .ok_or_else(|| NotFoundError {
            hash: hash.to_string(),
        })?;

    let mut next = Vec::with_capacity(existing.len() - 1);
    next.extend_from_slice(&existing[..index]);
    next.extend_from_slice(&existing[index + 1..]);
    Ok(next)
}

/// Returns `true` if any snapshot carries `hash`.
pub fn contains_hash(snapshots: &[Snapshot], hash: &str) -> bool {
    snapshots.iter().any(|s| s.hash == hash)
}
