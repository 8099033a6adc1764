//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Catalog loading failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Hint concurrency cap must be at least 1")]
    InvalidConcurrencyCap,

    #[error("Notification auto-dismiss must be between 1 and 60000 ms")]
    InvalidAutoDismiss,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}

/// Errors raised while reading a catalog override file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{kind} '{id}' references unknown predicate '{predicate}'")]
    UnknownPredicate {
        kind: &'static str,
        id: String,
        predicate: String,
    },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
}
