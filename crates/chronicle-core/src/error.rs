//! Error types for Chronicle

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChronicleError
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Main error type for Chronicle operations
#[derive(Debug, Error)]
pub enum ChronicleError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Structural inconsistency in the markup
    #[error("Malformed document at line {line}: {message}")]
    MalformedDocument { line: usize, message: String },

    /// A reference label used in body text has no target definition
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// A `|name|` substitution has no replacement text
    #[error("Unresolved substitution: |{0}|")]
    UnresolvedSubstitution(String),

    /// Requested output format has no renderer
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Requested version is not in the changelog
    #[error("Version not found: {0}")]
    VersionNotFound(String),

    /// Date pattern cannot format a calendar date
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    /// Changelog file not found
    #[error("Changelog file not found at {0}")]
    FileNotFound(PathBuf),

    /// Failed to serialize rendered output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChangelogError {
    /// Create a malformed document error for the given 1-based line
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            line,
            message: message.into(),
        }
    }
}
