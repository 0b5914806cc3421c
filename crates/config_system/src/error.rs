//! Error types for the configuration engine.
//!
//! Two disjoint classes exist by design: user/data problems are never
//! errors here (they are collected into a [`ValidationReport`](crate::ValidationReport)
//! and handed back as values), while the enums below cover I/O and parse
//! failures (`ConfigError`) and schema declaration bugs (`SchemaError`).

use std::io::Error as IoError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, writing, or parsing a configuration document.
///
/// None of these represent an out-of-range or mistyped value; those are
/// reported through a `ValidationReport` so that the operator sees every
/// problem in one pass instead of the first one the parser trips over.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the backing document from disk
    #[error("Failed to read config file {}: {}", .0.display(), .1)]
    FileRead(PathBuf, IoError),

    /// Failed to write a generated default document to disk
    #[error("Failed to write config file {}: {}", .0.display(), .1)]
    FileWrite(PathBuf, IoError),

    /// The document text is not parseable at all
    #[error("Failed to parse config document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The document parsed, but its shape cannot be flattened into
    /// dotted-path keys (e.g. a non-string key or a nested list element)
    #[error("Invalid document structure: {0}")]
    Structure(String),
}

/// Errors raised while declaring a schema.
///
/// Every variant is a bug in the declaring module, not a runtime
/// condition: schemas are built once at module construction from values
/// known at compile time, so a failure here must surface loudly and
/// never be retried.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields resolved to the same path
    #[error("Duplicate field '{0}' in schema. This is a bug in the declaring module.")]
    DuplicateField(String),

    /// A field claimed the reserved top-level version key
    #[error("Field path '{0}' is reserved for the schema version. This is a bug in the declaring module.")]
    ReservedPath(String),

    /// A field's declared default does not satisfy its own constraints
    #[error("Default value for '{path}' fails its own constraints: {reason}. This is a bug in the declaring module.")]
    InvalidDefault { path: String, reason: String },

    /// Fields under one nested section are interleaved with fields of
    /// another, which would render the section twice
    #[error("Fields under section '{0}' are not declared contiguously. This is a bug in the declaring module.")]
    SplitSection(String),
}
