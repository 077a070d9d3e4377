//! Library error type

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the fallible library APIs (config I/O, report I/O,
/// tree walking). Validation itself never returns these; it folds them into
/// `ValidationError`s.
#[derive(Error, Debug)]
pub enum TrinityError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("Invalid JSON in {path}: {message}")]
    JsonParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Unknown template '{0}'. Available: react, node, nextjs, python, rust, library")]
    UnknownTemplate(String),

    #[error("Serialization failed: {0}")]
    Serialize(String),
}

pub type TrinityResult<T> = Result<T, TrinityError>;
