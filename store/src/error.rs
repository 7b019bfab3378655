//! Error types for snapshot store operations.
//!
//! Provides a unified error type covering all failure modes: configuration
//! I/O and parsing, artifact access, unknown schemas and inspect sources,
//! plus the narrower errors returned by the codec and store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding artifact text.
///
/// Offsets are byte positions into the decoded text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended while more tokens were required.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// A character that does not fit the grammar at this position.
    #[error("unexpected `{found}` at offset {offset}, expected {expected}")]
    Unexpected {
        found: char,
        offset: usize,
        expected: &'static str,
    },

    /// A required keyword such as `export` or `type` is missing.
    #[error("expected keyword `{keyword}` at offset {offset}")]
    ExpectedKeyword {
        keyword: &'static str,
        offset: usize,
    },

    /// A string literal with invalid escapes or no closing quote.
    #[error("invalid string literal at offset {offset}")]
    InvalidLiteral { offset: usize },

    /// A snapshot record lacks one of `title`, `hash` or `type`.
    #[error("snapshot #{index} is missing member `{member}`")]
    MissingMember { index: usize, member: &'static str },

    /// A snapshot member has the wrong kind of value.
    #[error("snapshot #{index} member `{member}` must be {expected}")]
    WrongShape {
        index: usize,
        member: &'static str,
        expected: &'static str,
    },

    /// Text remains after the declaration.
    #[error("trailing content at offset {offset}")]
    TrailingContent { offset: usize },
}

/// A tree member whose type would not read back from the encoded text.
///
/// Returned by [`create_snapshot`](crate::create_snapshot), typically for an
/// empty or unbalanced custom fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("member `{member}` cannot be encoded: {source}")]
pub struct EncodeError {
    pub member: String,
    #[source]
    pub source: DecodeError,
}

/// Returned by [`delete_by_hash`](crate::delete_by_hash) when no snapshot
/// carries the requested hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("snapshot with hash {hash} was not found")]
pub struct NotFoundError {
    pub hash: String,
}

/// Failures reading or writing a snapshot artifact.
///
/// A missing artifact is not an error; see
/// [`SnapshotArtifact::read`](crate::SnapshotArtifact::read).
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact exists but could not be read.
    #[error("cannot read artifact {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be written.
    #[error("cannot write artifact {}: {source}", .path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failure outside artifact access (config files, directories).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Snapshot artifact access failure.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The rendered tree cannot be stored as a snapshot.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Configuration validation failure.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No schema with this name is configured.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// Inspect was requested for a schema without an inspect source.
    #[error("schema {0} has no inspect source")]
    InspectUnavailable(String),

    /// The inspect source failed to load data.
    #[error("inspect source failed: {0}")]
    Inspect(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
