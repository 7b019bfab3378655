//! Snapshot artifacts, store operations and the generator workflow.
//!
//! This crate turns rendered structural trees into titled, content-hashed
//! snapshots and keeps them in one artifact file per schema, encoded as a
//! union of snapshot records. It provides the codec for that text, the
//! hash-keyed list operations, file access and the command object driving
//! a whole create/delete/inspect run.
//!
//! # Quick start
//!
//! ```
//! use schema_snapshot_core::{PrimitiveKind, UnitReflection, render};
//! use schema_snapshot_store::{create_snapshot, decode, delete_by_hash, encode, insert};
//!
//! let units = vec![UnitReflection::primitive("a", PrimitiveKind::String)];
//! let snapshot = create_snapshot("v1", render(&units)).unwrap();
//! let hash = snapshot.hash.clone();
//!
//! let list = insert(&[], snapshot);
//! let text = encode("Foo", &list);
//! assert!(text.starts_with("export type Foo = {"));
//!
//! let decoded = decode(&text).unwrap().unwrap();
//! assert_eq!(decoded, list);
//! assert!(delete_by_hash(&decoded, &hash).unwrap().is_empty());
//! ```
//!
//! Configured runs go through [`Config`] and [`Workspace`]:
//!
//! ```no_run
//! use std::path::Path;
//! use schema_snapshot_store::{Action, Config, Workspace};
//!
//! let mut config = Config::load("snapshots.yml").unwrap();
//! config.resolve_dirs(Path::new("."));
//! let workspace = Workspace::from_config(&config);
//! workspace.ensure_dirs().unwrap();
//!
//! let schema = config.require_schema("ExampleSchema").unwrap();
//! let action = Action::CreateSnapshot { title: "v1".into() };
//! for status in workspace.execute(schema, action, None).unwrap() {
//!     println!("{status}");
//! }
//! ```

mod artifact;
mod codec;
mod config;
mod error;
mod ops;
mod parser;
mod snapshot;
mod workflow;

pub use artifact::{ARTIFACT_SUFFIX, SnapshotArtifact};
pub use codec::{decode, decode_or_empty, encode};
pub use config::{Config, SchemaDefinition, SchemaEntry};
pub use error::{
    ArtifactError, DecodeError, EncodeError, NotFoundError, Result, StoreError,
};
pub use ops::{
    InsertOutcome, TitlePolicy, contains_hash, delete_by_hash, insert, insert_with_policy,
};
pub use snapshot::{Snapshot, create_snapshot};
pub use workflow::{Action, BoxError, INSPECTED_TITLE, InspectSource, Status, Workspace};
