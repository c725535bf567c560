//! Error types for configuration loading and mirroring

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no config file given")]
    MissingPath,

    #[error("config path {path} has no usable parent directory or file name")]
    InvalidPath { path: PathBuf },

    #[error("config file name `{name}` too long (max {max} bytes)")]
    NameTooLong { name: String, max: usize },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised by a [`crate::Mirror`] when copying a source to its destination.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("mirror source {0} no longer exists")]
    SourceMissing(PathBuf),

    #[error("failed to copy {source_path} to {destination}: {error}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },
}
