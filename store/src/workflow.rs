//! Snapshot workflow commands.
//!
//! A [`Workspace`] runs one [`Action`] against one schema: it reads the
//! schema's artifact, applies the store operation, writes the result and
//! reports what happened as a list of [`Status`] values. All inputs (titles,
//! hashes, inspect data) are plain parameters; prompting is the caller's
//! business.

use std::fmt;
use std::path::{Path, PathBuf};

use schema_snapshot_core::{UnitReflection, render, render_as_declaration, validate_units};
use tracing::{info, warn};

use crate::artifact::SnapshotArtifact;
use crate::config::{Config, SchemaDefinition};
use crate::error::{Result, StoreError};
use crate::ops::{InsertOutcome, TitlePolicy, delete_by_hash, insert, insert_with_policy};
use crate::snapshot::{Snapshot, create_snapshot};

/// Boxed error returned by [`InspectSource`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Default title given to snapshots created by [`Action::Inspect`].
pub const INSPECTED_TITLE: &str = "Inspected";

/// Supplies historical reflections for [`Action::Inspect`].
///
/// [`Workspace::execute`] calls [`load_data`](Self::load_data) and then
/// [`cleanup`](Self::cleanup), each exactly once, even when loading fails.
pub trait InspectSource {
    /// Returns one batch of units per historical item.
    fn load_data(&mut self) -> std::result::Result<Vec<Vec<UnitReflection>>, BoxError>;

    /// Releases whatever [`load_data`](Self::load_data) acquired.
    fn cleanup(&mut self) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

/// One workflow command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Snapshot the schema's current shape under `title`.
    CreateSnapshot { title: String },
    /// Remove the snapshot carrying `hash`.
    DeleteSnapshot { hash: String },
    /// Write the schema's current shape as a standalone declaration.
    CreateSingle,
    /// [`CreateSingle`](Self::CreateSingle) followed by
    /// [`CreateSnapshot`](Self::CreateSnapshot).
    CreateSingleAndSnapshot { title: String },
    /// Replace the artifact with snapshots built from an [`InspectSource`].
    Inspect { title: Option<String> },
}

/// Outcome reported by [`Workspace::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Created {
        schema: String,
        hash: String,
        title: String,
        dir: PathBuf,
    },
    Duplicate {
        hash: String,
    },
    Retitled {
        hash: String,
        title: String,
    },
    Deleted {
        hash: String,
    },
    NotFound {
        hash: String,
    },
    SingleTypeWritten {
        path: PathBuf,
    },
    Inspected {
        count: usize,
        path: PathBuf,
    },
}

impl Status {
    /// Returns `true` for outcomes the caller should treat as a failed
    /// command.
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::NotFound { .. })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Created {
                schema,
                hash,
                title,
                dir,
            } => write!(
                f,
                "Created a snapshot for schema \"{schema}\" with hash: {hash}, title: \"{title}\" at \"{}\"",
                dir.display()
            ),
            Status::Duplicate { hash } => write!(
                f,
                "Didn't create a snapshot because snapshot with hash {hash} already exists"
            ),
            Status::Retitled { hash, title } => {
                write!(f, "Snapshot with hash {hash} renamed to \"{title}\"")
            }
            Status::Deleted { hash } => write!(f, "Deleted snapshot with hash {hash}"),
            Status::NotFound { hash } => write!(f, "Snapshot with hash {hash} was not found"),
            Status::SingleTypeWritten { path } => {
                write!(f, "Created single type at \"{}\"", path.display())
            }
            Status::Inspected { count, path } => write!(
                f,
                "Created {count} snapshot(s) from inspected types at \"{}\"",
                path.display()
            ),
        }
    }
}

/// Output directories and policy shared by every command.
///
/// # Examples
///
/// ```no_run
/// use schema_snapshot_core::{PrimitiveKind, UnitReflection};
/// use schema_snapshot_store::{Action, SchemaEntry, Workspace};
///
/// let workspace = Workspace::new("generated", "generated");
/// workspace.ensure_dirs().unwrap();
///
/// let schema = SchemaEntry::new(
///     "Users",
///     vec![UnitReflection::primitive("id", PrimitiveKind::Number)],
/// );
/// let action = Action::CreateSnapshot { title: "v1".into() };
/// for status in workspace.execute(&schema, action, None).unwrap() {
///     println!("{status}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Workspace {
    snapshots_dir: PathBuf,
    single_dir: PathBuf,
    title_policy: TitlePolicy,
}

impl Workspace {
    pub fn new(snapshots_dir: impl Into<PathBuf>, single_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots_dir: snapshots_dir.into(),
            single_dir: single_dir.into(),
            title_policy: TitlePolicy::default(),
        }
    }

    /// Builds a workspace from a loaded configuration.
    ///
    /// Directories are taken as-is; call
    /// [`Config::resolve_dirs`](crate::Config::resolve_dirs) first to anchor
    /// relative paths.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.snapshots_dir, &config.single_dir)
            .with_title_policy(config.title_policy)
    }

    pub fn with_title_policy(mut self, policy: TitlePolicy) -> Self {
        self.title_policy = policy;
        self
    }

    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    pub fn single_dir(&self) -> &Path {
        &self.single_dir
    }

    /// Creates both output directories if missing.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if a directory cannot
    /// be created.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.snapshots_dir)?;
        std::fs::create_dir_all(&self.single_dir)?;
        Ok(())
    }

    /// Artifact holding `schema`'s snapshots.
    pub fn artifact<S: SchemaDefinition + ?Sized>(&self, schema: &S) -> SnapshotArtifact {
        SnapshotArtifact::for_schema(&self.snapshots_dir, schema.snapshot_name())
    }

    /// Path of `schema`'s single-type declaration.
    pub fn single_type_path<S: SchemaDefinition + ?Sized>(&self, schema: &S) -> PathBuf {
        self.single_dir.join(format!("{}.ts", schema.single_type_name()))
    }

    /// Returns the snapshots currently stored for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`Artifact`](crate::StoreError::Artifact) if the artifact
    /// exists but cannot be read.
    pub fn list<S: SchemaDefinition + ?Sized>(&self, schema: &S) -> Result<Vec<Snapshot>> {
        Ok(self.artifact(schema).load()?)
    }

    /// Runs `action` for `schema`.
    ///
    /// `source` is only consulted by [`Action::Inspect`].
    ///
    /// # Errors
    ///
    /// - [`Artifact`](crate::StoreError::Artifact) when an artifact cannot be
    ///   read or written.
    /// - [`IoError`](crate::StoreError::IoError) when the single-type file
    ///   cannot be written.
    /// - [`Encode`](crate::StoreError::Encode) when the rendered tree has a
    ///   member type that would not read back, such as an empty custom
    ///   fragment. Nothing is written.
    /// - [`InspectUnavailable`](crate::StoreError::InspectUnavailable) when
    ///   inspecting without a source.
    /// - [`Inspect`](crate::StoreError::Inspect) when the source fails to
    ///   load.
    pub fn execute<S: SchemaDefinition + ?Sized>(
        &self,
        schema: &S,
        action: Action,
        source: Option<&mut dyn InspectSource>,
    ) -> Result<Vec<Status>> {
        match action {
            Action::CreateSnapshot { title } => Ok(vec![self.create_snapshot(schema, &title)?]),
            Action::DeleteSnapshot { hash } => Ok(vec![self.delete_snapshot(schema, &hash)?]),
            Action::CreateSingle => Ok(vec![self.create_single(schema)?]),
            Action::CreateSingleAndSnapshot { title } => Ok(vec![
                self.create_single(schema)?,
                self.create_snapshot(schema, &title)?,
            ]),
            Action::Inspect { title } => {
                let source = source
                    .ok_or_else(|| StoreError::InspectUnavailable(schema.name().to_string()))?;
                let title = title.as_deref().unwrap_or(INSPECTED_TITLE);
                Ok(vec![self.inspect(schema, title, source)?])
            }
        }
    }

    fn reflect_checked<S: SchemaDefinition + ?Sized>(&self, schema: &S) -> Vec<UnitReflection> {
        let units = schema.reflect();
        for finding in validate_units(&units) {
            warn!(schema = schema.name(), "{finding}");
        }
        units
    }

    fn create_snapshot<S: SchemaDefinition + ?Sized>(
        &self,
        schema: &S,
        title: &str,
    ) -> Result<Status> {
        let artifact = self.artifact(schema);
        let existing = artifact.load()?;
        let candidate = create_snapshot(title, render(&self.reflect_checked(schema)))?;
        let hash = candidate.hash.clone();

        let (next, outcome) = insert_with_policy(&existing, candidate, self.title_policy);
        let status = match outcome {
            InsertOutcome::Inserted => Status::Created {
                schema: schema.name().to_string(),
                hash,
                title: title.to_string(),
                dir: self.snapshots_dir.clone(),
            },
            InsertOutcome::Retitled => Status::Retitled {
                hash,
                title: title.to_string(),
            },
            InsertOutcome::Duplicate => {
                info!(schema = schema.name(), hash = %hash, "snapshot already stored");
                return Ok(Status::Duplicate { hash });
            }
        };

        artifact.save(schema.snapshot_name(), &next)?;
        info!(schema = schema.name(), ?outcome, count = next.len(), "snapshot insert");
        Ok(status)
    }

    fn delete_snapshot<S: SchemaDefinition + ?Sized>(
        &self,
        schema: &S,
        hash: &str,
    ) -> Result<Status> {
        let artifact = self.artifact(schema);
        let existing = artifact.load()?;

        match delete_by_hash(&existing, hash) {
            Ok(next) => {
                artifact.save(schema.snapshot_name(), &next)?;
                info!(schema = schema.name(), hash, count = next.len(), "snapshot deleted");
                Ok(Status::Deleted {
                    hash: hash.to_string(),
                })
            }
            Err(err) => {
                info!(schema = schema.name(), "{err}");
                Ok(Status::NotFound { hash: err.hash })
            }
        }
    }

    fn create_single<S: SchemaDefinition + ?Sized>(&self, schema: &S) -> Result<Status> {
        let path = self.single_type_path(schema);
        let text = render_as_declaration(&self.reflect_checked(schema), schema.single_type_name());
        std::fs::write(&path, text)?;
        info!(schema = schema.name(), path = %path.display(), "wrote single type");
        Ok(Status::SingleTypeWritten { path })
    }

    fn inspect<S: SchemaDefinition + ?Sized>(
        &self,
        schema: &S,
        title: &str,
        source: &mut dyn InspectSource,
    ) -> Result<Status> {
        let loaded = source.load_data();
        if let Err(err) = source.cleanup() {
            warn!(schema = schema.name(), error = %err, "inspect cleanup failed");
        }
        let batches = loaded.map_err(StoreError::Inspect)?;

        let mut snapshots = Vec::new();
        for units in &batches {
            for finding in validate_units(units) {
                warn!(schema = schema.name(), "{finding}");
            }
            snapshots = insert(&snapshots, create_snapshot(title, render(units))?);
        }

        let artifact = self.artifact(schema);
        artifact.save(schema.snapshot_name(), &snapshots)?;
        info!(
            schema = schema.name(),
            batches = batches.len(),
            count = snapshots.len(),
            "replaced artifact from inspected data"
        );
        Ok(Status::Inspected {
            count: snapshots.len(),
            path: artifact.path().to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use schema_snapshot_core::PrimitiveKind;

    use super::*;
    use crate::SchemaEntry;

    struct FakeSource {
        batches: Option<Vec<Vec<UnitReflection>>>,
        loads: usize,
        cleanups: usize,
    }

    impl FakeSource {
        fn new(batches: Option<Vec<Vec<UnitReflection>>>) -> Self {
            Self {
                batches,
                loads: 0,
                cleanups: 0,
            }
        }
    }

    impl InspectSource for FakeSource {
        fn load_data(&mut self) -> std::result::Result<Vec<Vec<UnitReflection>>, BoxError> {
            self.loads += 1;
            self.batches.clone().ok_or_else(|| "connection refused".into())
        }

        fn cleanup(&mut self) -> std::result::Result<(), BoxError> {
            self.cleanups += 1;
            Ok(())
        }
    }

    fn schema(kind: PrimitiveKind) -> SchemaEntry {
        SchemaEntry::new("Foo", vec![UnitReflection::primitive("a", kind)])
    }

    fn workspace(dir: &Path) -> Workspace {
        let ws = Workspace::new(dir.join("snapshots"), dir.join("single"));
        ws.ensure_dirs().unwrap();
        ws
    }

    fn create(ws: &Workspace, schema: &SchemaEntry, title: &str) -> Status {
        let action = Action::CreateSnapshot {
            title: title.to_string(),
        };
        ws.execute(schema, action, None).unwrap().remove(0)
    }

    #[test]
    fn test_create_then_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let foo = schema(PrimitiveKind::String);

        let first = create(&ws, &foo, "v1");
        assert!(matches!(first, Status::Created { ref title, .. } if title == "v1"));
        assert!(first.to_string().starts_with("Created a snapshot for schema \"Foo\""));

        let second = create(&ws, &foo, "v1 again");
        assert!(matches!(second, Status::Duplicate { .. }));

        let list = ws.list(&foo).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "v1");
    }

    #[test]
    fn test_duplicate_does_not_rewrite_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let foo = schema(PrimitiveKind::String);
        create(&ws, &foo, "v1");

        let path = ws.artifact(&foo).path().to_path_buf();
        let padded = format!("{}\n\n", std::fs::read_to_string(&path).unwrap());
        std::fs::write(&path, &padded).unwrap();

        assert!(matches!(create(&ws, &foo, "v1 again"), Status::Duplicate { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), padded);
    }

    #[test]
    fn test_unencodable_fragment_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        create(&ws, &schema(PrimitiveKind::String), "v1");

        for fragment in ["", "Array<string"] {
            let broken = SchemaEntry::new("Foo", vec![UnitReflection::custom("a", fragment)]);
            let action = Action::CreateSnapshot { title: "v2".into() };
            let err = ws.execute(&broken, action, None).unwrap_err();
            assert!(matches!(err, StoreError::Encode(ref e) if e.member == "a"), "{err}");
        }

        create(&ws, &schema(PrimitiveKind::Number), "v3");
        let titles: Vec<String> = ws
            .list(&schema(PrimitiveKind::String))
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["v1", "v3"]);
    }

    #[test]
    fn test_update_title_policy_retitles() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path()).with_title_policy(TitlePolicy::UpdateTitleOnMatch);
        let foo = schema(PrimitiveKind::String);

        create(&ws, &foo, "v1");
        assert!(matches!(create(&ws, &foo, "renamed"), Status::Retitled { .. }));
        assert_eq!(ws.list(&foo).unwrap()[0].title, "renamed");
    }

    #[test]
    fn test_delete_then_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let foo = schema(PrimitiveKind::String);

        let Status::Created { hash, .. } = create(&ws, &foo, "v1") else {
            panic!("expected a created snapshot");
        };

        let deleted = ws
            .execute(&foo, Action::DeleteSnapshot { hash: hash.clone() }, None)
            .unwrap();
        assert_eq!(deleted, vec![Status::Deleted { hash: hash.clone() }]);
        assert_eq!(ws.artifact(&foo).read().unwrap().as_deref(), Some(""));

        let missing = ws
            .execute(&foo, Action::DeleteSnapshot { hash: hash.clone() }, None)
            .unwrap();
        assert!(missing[0].is_failure());
        assert_eq!(
            missing[0].to_string(),
            format!("Snapshot with hash {hash} was not found")
        );
    }

    #[test]
    fn test_delete_miss_leaves_artifact_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let foo = schema(PrimitiveKind::String);

        let miss = ws
            .execute(&foo, Action::DeleteSnapshot { hash: "nope".into() }, None)
            .unwrap();
        assert_eq!(miss, vec![Status::NotFound { hash: "nope".into() }]);
        assert!(ws.artifact(&foo).read().unwrap().is_none());
    }

    #[test]
    fn test_create_single_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let foo = SchemaEntry {
            single_type_alias: Some("FooTree".into()),
            snapshot_alias: Some("FooSnapshot".into()),
            ..schema(PrimitiveKind::Number)
        };

        let statuses = ws
            .execute(&foo, Action::CreateSingleAndSnapshot { title: "init".into() }, None)
            .unwrap();
        assert_eq!(statuses.len(), 2);

        let single = std::fs::read_to_string(dir.path().join("single/FooTree.ts")).unwrap();
        assert_eq!(single, "export interface FooTree {\n    a: number;\n}\n");

        let artifact =
            std::fs::read_to_string(dir.path().join("snapshots/FooSnapshot_snapshot.ts")).unwrap();
        assert!(artifact.starts_with("export type FooSnapshot = {"));
    }

    #[test]
    fn test_inspect_replaces_artifact_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let foo = schema(PrimitiveKind::String);
        create(&ws, &foo, "existing");

        let a = vec![UnitReflection::primitive("a", PrimitiveKind::Number)];
        let b = vec![UnitReflection::primitive("b", PrimitiveKind::Boolean)];
        let mut source = FakeSource::new(Some(vec![a.clone(), b, a]));

        let statuses = ws
            .execute(&foo, Action::Inspect { title: None }, Some(&mut source))
            .unwrap();
        assert!(matches!(statuses[0], Status::Inspected { count: 2, .. }));
        assert_eq!((source.loads, source.cleanups), (1, 1));

        let list = ws.list(&foo).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|s| s.title == INSPECTED_TITLE));
    }

    #[test]
    fn test_inspect_failure_still_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let foo = schema(PrimitiveKind::String);
        let mut source = FakeSource::new(None);

        let err = ws
            .execute(&foo, Action::Inspect { title: None }, Some(&mut source))
            .unwrap_err();
        assert!(matches!(err, StoreError::Inspect(_)));
        assert_eq!(source.cleanups, 1);
        assert!(ws.artifact(&foo).read().unwrap().is_none());
    }

    #[test]
    fn test_inspect_without_source() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let err = ws
            .execute(&schema(PrimitiveKind::String), Action::Inspect { title: None }, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::InspectUnavailable(name) if name == "Foo"));
    }

    #[test]
    fn test_missing_snapshots_dir_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().join("absent"), dir.path());
        let err = ws
            .execute(
                &schema(PrimitiveKind::String),
                Action::CreateSnapshot { title: "v1".into() },
                None,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Artifact(_)));
    }
}
