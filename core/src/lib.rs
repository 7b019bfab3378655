//! Core reflection model, structural renderer and content hasher.
//!
//! This crate turns a caller-defined schema into a generated structural
//! type:
//!
//! - [`UnitReflection`]: one node of a schema tree, tagged by its
//!   [`UnitShape`] (primitive kinds, nested container, or custom fragment).
//! - [`render`]: reflection list → [`StructuralTree`], order preserving.
//! - [`print_tree`] / [`render_as_declaration`]: structural tree → text.
//! - [`hash_tree`]: structural tree → stable SHA-256 content hash.
//! - [`infer_units`]: sample JSON document → reflection list.
//!
//! Validation ([`validate_units`]) reports empty or duplicate keys and other
//! schema mistakes without blocking rendering.
//!
//! # Example
//!
//! ```
//! use schema_snapshot_core::*;
//!
//! let units = vec![
//!     UnitReflection::primitive("id", PrimitiveKind::Number),
//!     UnitReflection::recursive(
//!         "profile",
//!         vec![UnitReflection::primitive("bio", PrimitiveKind::String).optional()],
//!     ),
//! ];
//!
//! let tree = render(&units);
//! assert_eq!(tree.len(), 2);
//! assert!(validate_units(&units).is_empty());
//! assert_eq!(
//!     render_as_declaration(&units, "Profile"),
//!     "export interface Profile {\n    id: number;\n    profile: {\n        bio?: string;\n    };\n}\n"
//! );
//! assert_eq!(hash_tree(&tree), hash_tree(&render(&units)));
//! ```

mod hash;
mod infer;
mod printer;
mod structure;
mod types;
mod validate;

pub use hash::{canonical_text, hash_tree};
pub use infer::{InferError, infer_units};
pub use printer::{
    is_identifier, print_tree, quote_literal, render_as_declaration, write_member_prefix,
    write_tree, write_type,
};
pub use structure::{Keyword, Member, StructuralTree, TypeNode, render};
pub use types::*;
pub use validate::{ReflectionError, validate_units};
