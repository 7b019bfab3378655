//! Snapshot artifact persistence.
//!
//! One artifact file per schema, named `<name>_snapshot.ts` inside the
//! snapshots directory. A missing file is the normal "no snapshots yet"
//! state and is kept distinct from a file that exists but cannot be read.
//!
//! ```no_run
//! use schema_snapshot_store::SnapshotArtifact;
//!
//! let artifact = SnapshotArtifact::for_schema("generated", "ExampleSchema");
//! let snapshots = artifact.load().unwrap();
//! println!("{} snapshot(s) in {}", snapshots.len(), artifact.path().display());
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::Snapshot;
use crate::codec::{decode_or_empty, encode};
use crate::error::ArtifactError;

/// Suffix appended to the schema name to form the artifact file name.
pub const ARTIFACT_SUFFIX: &str = "_snapshot.ts";

/// Handle on one schema's snapshot artifact.
#[derive(Debug, Clone)]
pub struct SnapshotArtifact {
    path: PathBuf,
}

impl SnapshotArtifact {
    /// Points at an explicit artifact path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Points at `<dir>/<name>_snapshot.ts`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use schema_snapshot_store::SnapshotArtifact;
    ///
    /// let artifact = SnapshotArtifact::for_schema("generated", "Users");
    /// assert_eq!(artifact.path(), Path::new("generated/Users_snapshot.ts"));
    /// ```
    pub fn for_schema(dir: impl AsRef<Path>, name: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{name}{ARTIFACT_SUFFIX}")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the artifact text; `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Unreadable`] for any other I/O failure
    /// (permissions, a directory in place of the file, invalid UTF-8).
    pub fn read(&self) -> Result<Option<String>, ArtifactError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "artifact not found");
                Ok(None)
            }
            Err(source) => Err(ArtifactError::Unreadable {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Reads and decodes the artifact.
    ///
    /// Missing, empty and undecodable artifacts all yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Unreadable`] when the file exists but cannot
    /// be read.
    pub fn load(&self) -> Result<Vec<Snapshot>, ArtifactError> {
        Ok(self
            .read()?
            .map(|text| decode_or_empty(&text))
            .unwrap_or_default())
    }

    /// Replaces the artifact text.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Unwritable`] if the file cannot be written.
    pub fn write(&self, text: &str) -> Result<(), ArtifactError> {
        std::fs::write(&self.path, text).map_err(|source| ArtifactError::Unwritable {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), bytes = text.len(), "wrote artifact");
        Ok(())
    }

    /// Encodes `snapshots` under `name` and writes them.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Unwritable`] if the file cannot be written.
    pub fn save(&self, name: &str, snapshots: &[Snapshot]) -> Result<(), ArtifactError> {
        self.write(&encode(name, snapshots))
    }
}
