//! The unified error type every Document Space crate propagates.
//!
//! Lower-level failures (sqlx, the S3 SDK, config parsing) are wrapped
//! into [`AppError`] at the point they occur, so callers match on one
//! [`ErrorKind`] instead of per-crate error enums.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested space, entry, or collection was not found.
    NotFound,
    /// A conflict occurred (sibling name collision, duplicate collection,
    /// concurrent modification).
    Conflict,
    /// Creating or moving an entry would exceed the configured tree depth.
    DepthExceeded,
    /// A path segment that must be a folder resolved to a file.
    NotAFolder,
    /// An operation that requires a file was given a folder.
    NotAFile,
    /// The capability checker denied the operation.
    Forbidden,
    /// The object store and the metadata store disagree. Reported during
    /// materialization, never auto-healed.
    InconsistentState,
    /// Input validation failed.
    Validation,
    /// A metadata-store error occurred.
    Database,
    /// An object-storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::DepthExceeded => "DEPTH_EXCEEDED",
            Self::NotAFolder => "NOT_A_FOLDER",
            Self::NotAFile => "NOT_A_FILE",
            Self::Forbidden => "FORBIDDEN",
            Self::InconsistentState => "INCONSISTENT_STATE",
            Self::Validation => "VALIDATION",
            Self::Database => "DATABASE",
            Self::Storage => "STORAGE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout Document Space.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. Messages carry enough context (path,
/// parent id, offending name) for a user-facing message; nothing is
/// retried internally.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Generate one shorthand constructor per error kind.
macro_rules! kind_constructors {
    ($($(#[$doc:meta])* $name:ident => $kind:ident),* $(,)?) => {
        impl AppError {
            $(
                $(#[$doc])*
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorKind::$kind, message)
                }
            )*
        }
    };
}

kind_constructors! {
    /// A missing space, entry, collection, or object.
    not_found => NotFound,
    /// A sibling-name or unique-key collision.
    conflict => Conflict,
    /// The configured tree depth limit would be exceeded.
    depth_exceeded => DepthExceeded,
    /// A folder was required but a file was given.
    not_a_folder => NotAFolder,
    /// A file was required but a folder was given.
    not_a_file => NotAFile,
    /// The capability checker denied the operation.
    forbidden => Forbidden,
    /// The object store and the metadata store disagree.
    inconsistent_state => InconsistentState,
    /// Invalid caller input.
    validation => Validation,
    /// A metadata-store failure without a useful source error.
    database => Database,
    /// An object-storage failure without a useful source error.
    storage => Storage,
    /// Bad or missing configuration.
    configuration => Configuration,
    /// A bug surfaced at runtime.
    internal => Internal,
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::conflict("item 'q1.csv' already exists under parent");
        assert_eq!(
            err.to_string(),
            "CONFLICT: item 'q1.csv' already exists under parent"
        );
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Storage, "write failed", io);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Storage);
        assert!(cloned.source.is_none());
    }
}
