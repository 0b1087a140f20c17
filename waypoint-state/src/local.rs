//! Local file backend for state storage
//!
//! Stores state in a local JSON file (default: waypoint.tfstate.json).

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::backend::{BackendError, BackendResult, StateBackend};
use crate::state::StateFile;

/// Local file backend
pub struct LocalBackend {
    state_path: PathBuf,
}

impl LocalBackend {
    /// Default state file name
    pub const DEFAULT_STATE_FILE: &'static str = "waypoint.tfstate.json";

    /// Create a new LocalBackend using the default file in the current directory
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(Self::DEFAULT_STATE_FILE))
    }

    pub fn with_path(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    fn read_file(&self) -> BackendResult<Option<StateFile>> {
        if !self.state_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.state_path).map_err(|e| self.io_error(e))?;

        let state: StateFile = serde_json::from_str(&content).map_err(|e| {
            BackendError::InvalidState(format!("{}: {}", self.state_path.display(), e))
        })?;
        if state.version > StateFile::CURRENT_VERSION {
            return Err(BackendError::UnsupportedVersion {
                found: state.version,
                supported: StateFile::CURRENT_VERSION,
            });
        }

        Ok(Some(state))
    }

    fn io_error(&self, source: std::io::Error) -> BackendError {
        BackendError::Io {
            path: self.state_path.clone(),
            source,
        }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        self.read_file()
    }

    /// Refuses to overwrite a state file from a different lineage
    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        if let Some(existing) = self.read_file()?
            && existing.lineage != state.lineage
        {
            return Err(BackendError::LineageMismatch {
                expected: existing.lineage,
                actual: state.lineage.clone(),
            });
        }

        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.state_path, content).map_err(|e| self.io_error(e))?;

        Ok(())
    }
}
