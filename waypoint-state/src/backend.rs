//! State backend trait and error types

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::state::StateFile;

/// Errors that can occur when interacting with a state backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// State file is corrupted or invalid
    #[error("Invalid state file: {0}")]
    InvalidState(String),

    /// Written by a newer release with a format this one cannot read
    #[error("State file version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The stored state belongs to a different lineage
    #[error("State lineage mismatch: expected {expected}, got {actual}")]
    LineageMismatch { expected: String, actual: String },

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Trait for state storage backends
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Read the current state from the backend
    ///
    /// Returns `None` if no state exists (first-time use)
    async fn read_state(&self) -> BackendResult<Option<StateFile>>;

    /// Write the state to the backend
    ///
    /// The state's serial number should be incremented before calling this
    async fn write_state(&self, state: &StateFile) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineage_mismatch_display() {
        let error = BackendError::LineageMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        };
        assert_eq!(error.to_string(), "State lineage mismatch: expected a, got b");
    }

    #[test]
    fn io_error_names_the_file() {
        let error = BackendError::Io {
            path: PathBuf::from("/tmp/waypoint.tfstate.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(
            error
                .to_string()
                .starts_with("Failed to access /tmp/waypoint.tfstate.json: ")
        );
    }
}
