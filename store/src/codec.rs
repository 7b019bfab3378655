//! Snapshot artifact encoding.
//!
//! An artifact holds zero or more snapshots as one exported type alias:
//!
//! ```text
//! export type Foo = {
//!     title: "v1";
//!     hash: "0f3a...";
//!     type: {
//!         a: string;
//!     };
//! } | {
//!     title: "v2";
//!     ...
//! };
//! ```
//!
//! No snapshots encode to an empty string and a single snapshot encodes
//! without a union separator. [`decode`] reads the same text back.

use schema_snapshot_core::{quote_literal, write_member_prefix, write_tree};
use tracing::{debug, warn};

use crate::Snapshot;
use crate::error::DecodeError;
use crate::parser::Parser;

/// Encodes `snapshots` as a type declaration named `name`.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::StructuralTree;
/// use schema_snapshot_store::{Snapshot, encode};
///
/// assert_eq!(encode("Foo", &[]), "");
///
/// let one = Snapshot::new("v1", "h1", StructuralTree::new());
/// assert_eq!(
///     encode("Foo", &[one]),
///     "export type Foo = {\n    title: \"v1\";\n    hash: \"h1\";\n    type: {};\n};\n"
/// );
/// ```
pub fn encode(name: &str, snapshots: &[Snapshot]) -> String {
    if snapshots.is_empty() {
        return String::new();
    }

    let mut out = format!("export type {name} = ");
    for (i, snapshot) in snapshots.iter().enumerate() {
        if i > 0 {
            out.push_str(" | ");
        }
        write_snapshot(&mut out, snapshot);
    }
    out.push_str(";\n");

    debug!(declaration = name, count = snapshots.len(), "encoded snapshots");
    out
}

fn write_snapshot(out: &mut String, snapshot: &Snapshot) {
    out.push_str("{\n");

    write_member_prefix(out, 1, "title", false);
    out.push_str(&quote_literal(&snapshot.title));
    out.push_str(";\n");

    write_member_prefix(out, 1, "hash", false);
    out.push_str(&quote_literal(&snapshot.hash));
    out.push_str(";\n");

    write_member_prefix(out, 1, "type", false);
    write_tree(out, &snapshot.tree, 1);
    out.push_str(";\n");

    out.push('}');
}

/// Decodes artifact text produced by [`encode`].
///
/// Empty or whitespace-only text means "no snapshots" and yields
/// `Ok(None)`. Otherwise the text must be exactly one exported type alias
/// whose body is a snapshot record or a union of them; a single malformed
/// record fails the whole decode.
///
/// # Errors
///
/// Returns a [`DecodeError`] describing the first grammar violation.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::StructuralTree;
/// use schema_snapshot_store::{Snapshot, decode, encode};
///
/// assert_eq!(decode("").unwrap(), None);
///
/// let list = vec![
///     Snapshot::new("v1", "h1", StructuralTree::new()),
///     Snapshot::new("v2", "h2", StructuralTree::new()),
/// ];
/// assert_eq!(decode(&encode("Foo", &list)).unwrap(), Some(list));
/// ```
pub fn decode(text: &str) -> Result<Option<Vec<Snapshot>>, DecodeError> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let declaration = Parser::new(text).parse_declaration()?;
    debug!(
        declaration = declaration.name.as_str(),
        count = declaration.snapshots.len(),
        "decoded snapshots"
    );
    Ok(Some(declaration.snapshots))
}

/// Decodes `text`, treating undecodable input as an empty list.
///
/// Corrupt artifacts are logged at `warn` level, since they are about to be
/// overwritten by the caller's next write.
pub fn decode_or_empty(text: &str) -> Vec<Snapshot> {
    match decode(text) {
        Ok(snapshots) => snapshots.unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "artifact is not a snapshot declaration, starting empty");
            Vec::new()
        }
    }
}
