//! Unified error types for the face registry.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for service startup and CLI commands.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Profile store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Metrics recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Profile store errors.
///
/// HTTP callers see one generic failure for every variant; the variant
/// only shows up in logs and metrics.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage medium could not be read.
    #[error("failed to read store {}: {source}", path.display())]
    Read {
        /// Store location.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The stored content is not a list of profiles.
    #[error("malformed store content: {0}")]
    Format(#[source] serde_json::Error),

    /// The collection could not be written back.
    #[error("failed to write store {}: {source}", path.display())]
    Write {
        /// Store location.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Read { .. } => "read",
            StoreError::Format(_) => "format",
            StoreError::Write { .. } => "write",
        }
    }
}

/// Landmark comparison errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// The two landmark sets do not have the same number of coordinates.
    #[error("landmark count mismatch: stored {stored}, submitted {submitted}")]
    DimensionMismatch {
        /// Coordinates in the enrolled profile.
        stored: usize,
        /// Coordinates in the request.
        submitted: usize,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_kinds() {
        let read = StoreError::Read {
            path: PathBuf::from("data.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(read.kind(), "read");
        assert!(read.to_string().contains("data.json"));

        let format = StoreError::Format(serde_json::from_str::<u8>("{").unwrap_err());
        assert_eq!(format.kind(), "format");
    }

    #[test]
    fn dimension_mismatch_message_names_both_counts() {
        let err = MatchError::DimensionMismatch {
            stored: 3,
            submitted: 2,
        };
        assert_eq!(
            err.to_string(),
            "landmark count mismatch: stored 3, submitted 2"
        );
    }
}
