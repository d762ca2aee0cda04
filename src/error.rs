//! Error types shared by expressions, generators and processors.

use std::path::PathBuf;

/// Errors raised while validating, reversing, generating or executing
/// migration expressions.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Validation messages collected from one or more expressions.
    #[error("Invalid expression:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<String>),

    /// The dialect cannot express the requested operation and the
    /// compatibility mode is strict.
    #[error("{operation} is not supported by {dialect}")]
    Unsupported {
        dialect: &'static str,
        operation: String,
    },

    /// No type-map entry covers the requested type.
    #[error("No type mapping for {db_type} (size {size:?}) in {dialect}")]
    MissingTypeMap {
        dialect: &'static str,
        db_type: String,
        size: Option<u32>,
    },

    /// An identifier exceeds the dialect's maximum length and shortening
    /// is disabled.
    #[error("Name too long for {dialect} (max {max_length}): {name}")]
    NameTooLong {
        dialect: &'static str,
        name: String,
        max_length: usize,
    },

    /// The expression has no inverse.
    #[error("{0} expressions cannot be reversed")]
    Irreversible(&'static str),

    /// The expression can only be executed by a processor.
    #[error("{0} expressions must be executed by a processor")]
    ProcessorOnly(&'static str),

    /// No script resource matched the requested name.
    #[error("Script resource '{name}' not found (searched: {})", .searched.join(", "))]
    ScriptNotFound { name: String, searched: Vec<String> },

    /// More than one script resource matched the requested name.
    #[error("Script resource '{name}' is ambiguous (candidates: {})", .candidates.join(", "))]
    AmbiguousScript {
        name: String,
        candidates: Vec<String>,
    },

    /// Reading a script from disk failed.
    #[error("Failed to read script '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid generator configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// TOML parse failure while loading a configuration.
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Processor-reported failure.
    #[error("Processor error: {0}")]
    Processor(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] postgres::Error),

    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql::Error),
}

impl MigrationError {
    pub fn unsupported(dialect: &'static str, operation: impl Into<String>) -> Self {
        MigrationError::Unsupported {
            dialect,
            operation: operation.into(),
        }
    }
}

/// Result type for everything in this crate.
pub type Result<T> = std::result::Result<T, MigrationError>;
