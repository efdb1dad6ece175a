//! Error types for elixirloclib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while counting Elixir sources
#[derive(Error, Debug)]
pub enum ElixirlocError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Configuration could not be parsed
    #[error("invalid configuration in {origin}: {message}")]
    Config { origin: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
