//! Snapshot generator configuration.
//!
//! Defines the YAML-serializable configuration listing the schemas to
//! generate types for, where artifacts go, and how duplicate snapshots are
//! titled.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! snapshots_dir: ./generated
//! single_dir: ./generated
//! title_policy: keep-first
//! schemas:
//!   - name: ExampleSchema
//!     snapshot_alias: ExampleSnapshot
//!     single_type_alias: ExampleTree
//!     units:
//!       - key: root
//!         kind: recursive
//!         values:
//!           - { key: first, required: false, kind: string }
//!       - { key: number3, kind: number }
//! ```

use std::collections::HashSet;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use schema_snapshot_core::{ReflectUnits, UnitReflection, is_identifier};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::ops::TitlePolicy;

/// Identity and reflection source of one schema.
///
/// Implemented by [`SchemaEntry`] for configured schemas; library callers
/// implement it for their own schema types to drive a
/// [`Workspace`](crate::Workspace) directly.
pub trait SchemaDefinition: ReflectUnits {
    /// Unique schema name, used for lookup.
    fn name(&self) -> &str;

    /// Declaration name of the snapshot artifact.
    fn snapshot_name(&self) -> &str {
        self.name()
    }

    /// Declaration name of the single-type output.
    fn single_type_name(&self) -> &str {
        self.name()
    }
}

/// One configured schema.
///
/// # Examples
///
/// ```
/// use schema_snapshot_store::{SchemaDefinition, SchemaEntry};
///
/// let entry = SchemaEntry::new("Users", Vec::new());
/// assert_eq!(entry.snapshot_name(), "Users");
///
/// let aliased = SchemaEntry {
///     snapshot_alias: Some("UserSnapshot".into()),
///     ..SchemaEntry::new("Users", Vec::new())
/// };
/// assert_eq!(aliased.snapshot_name(), "UserSnapshot");
/// assert_eq!(aliased.single_type_name(), "Users");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Unique schema name; default declaration name for both outputs.
    pub name: String,
    /// Declaration and file name of the snapshot artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_alias: Option<String>,
    /// Declaration and file name of the single-type output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_type_alias: Option<String>,
    /// Reflection of the schema.
    #[serde(default)]
    pub units: Vec<UnitReflection>,
}

impl SchemaEntry {
    pub fn new(name: &str, units: Vec<UnitReflection>) -> Self {
        Self {
            name: name.to_string(),
            snapshot_alias: None,
            single_type_alias: None,
            units,
        }
    }
}

impl ReflectUnits for SchemaEntry {
    fn reflect(&self) -> Vec<UnitReflection> {
        self.units.clone()
    }
}

impl SchemaDefinition for SchemaEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot_name(&self) -> &str {
        self.snapshot_alias.as_deref().unwrap_or(&self.name)
    }

    fn single_type_name(&self) -> &str {
        self.single_type_alias.as_deref().unwrap_or(&self.name)
    }
}

/// Top-level generator configuration.
///
/// Relative directories are resolved against the directory holding the
/// configuration file by [`Config::resolve_dirs`].
///
/// # Examples
///
/// ```no_run
/// use schema_snapshot_store::Config;
///
/// let config = Config::load("snapshots.yml").unwrap();
/// if let Some(schema) = config.find_schema("ExampleSchema") {
///     println!("{} has {} top-level units", schema.name, schema.units.len());
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Directory receiving `<name>_snapshot.ts` artifacts.
    pub snapshots_dir: PathBuf,
    /// Directory receiving single-type declarations.
    pub single_dir: PathBuf,
    /// Title handling when a snapshot's hash already exists.
    #[serde(default)]
    pub title_policy: TitlePolicy,
    /// Configured schemas.
    pub schemas: Vec<SchemaEntry>,
}

impl Config {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::StoreError::YamlError) if parsing fails
    /// (including reflection shape errors such as a recursive unit without
    /// `values`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be
    /// written, or [`YamlError`](crate::StoreError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Makes relative output directories relative to `base`.
    pub fn resolve_dirs(&mut self, base: &Path) {
        if self.snapshots_dir.is_relative() {
            self.snapshots_dir = base.join(&self.snapshots_dir);
        }
        if self.single_dir.is_relative() {
            self.single_dir = base.join(&self.single_dir);
        }
    }

    /// Looks up a schema by name.
    pub fn find_schema(&self, name: &str) -> Option<&SchemaEntry> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// Like [`find_schema`](Self::find_schema) but fails on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSchema`](crate::StoreError::UnknownSchema).
    pub fn require_schema(&self, name: &str) -> Result<&SchemaEntry> {
        self.find_schema(name)
            .ok_or_else(|| StoreError::UnknownSchema(name.to_string()))
    }

    /// Returns configured schema names in declaration order.
    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name.as_str()).collect()
    }

    /// Checks that schema names are unique and that every declaration name
    /// is a plain identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](crate::StoreError::InvalidConfig) describing
    /// the first problem.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for schema in &self.schemas {
            if !seen.insert(schema.name.as_str()) {
                return Err(StoreError::InvalidConfig(format!(
                    "duplicate schema name: {}",
                    schema.name
                )));
            }
            for declaration in [schema.snapshot_name(), schema.single_type_name()] {
                if !is_identifier(declaration) {
                    return Err(StoreError::InvalidConfig(format!(
                        "declaration name is not an identifier: {declaration:?}"
                    )));
                }
            }
        }
        Ok(())
    }
}
