use crate::config::Settings;
use crate::conversation::ConversationWindow;
use crate::error::{ChatError, Result};
use anyhow::Context;
use directories::BaseDirs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub mod types;
pub use types::{AbsentReason, LoadOutcome, PersistedState, RecordSchema, StateRecord};

/// File name of the state record inside the home directory
pub const STATE_FILE_NAME: &str = ".chat";

/// Single-record store for settings plus the retained conversation window
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store at the default location, `~/.chat`
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| ChatError::Storage("Could not determine home directory".into()))?;

        Ok(Self::new_with_path(base_dirs.home_dir().join(STATE_FILE_NAME)))
    }

    /// Create a store that uses the specified file path.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::storage::StateStore;
    ///
    /// let store = StateStore::new_with_path("/tmp/chat-state.json");
    /// assert!(store.path().ends_with("chat-state.json"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted record
    ///
    /// Never fails: a missing, unreadable or invalid file yields
    /// [`LoadOutcome::Absent`] and the caller continues with defaults.
    pub fn load(&self) -> LoadOutcome {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}", self.path.display());
                return LoadOutcome::Absent(AbsentReason::Missing);
            }
            Err(e) => {
                tracing::debug!("Failed to read {}: {}", self.path.display(), e);
                return LoadOutcome::Absent(AbsentReason::Unreadable(e.to_string()));
            }
        };

        match types::parse_record(&bytes) {
            Ok(state) => {
                tracing::debug!(
                    "Loaded {:?} state record from {} with {} turns",
                    state.schema,
                    self.path.display(),
                    state.window.len()
                );
                LoadOutcome::Loaded(state)
            }
            Err(reason) => {
                tracing::debug!(
                    "Ignoring invalid state file {}: {}",
                    self.path.display(),
                    reason
                );
                LoadOutcome::Absent(AbsentReason::Corrupt(reason))
            }
        }
    }

    /// Overwrite the record with the given settings and window
    ///
    /// The window is trimmed to `settings.retain` pairs before it is written.
    /// The bytes go to a temporary file next to the target which is then
    /// renamed over it, so readers see either the old or the new record.
    pub fn save(&self, settings: &Settings, window: &ConversationWindow) -> Result<()> {
        let record = StateRecord::new(settings, &window.trimmed(settings.retain));
        let bytes = serde_json::to_vec(&record)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .context("Failed to create state directory")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(dir)
            .context("Failed to create temporary state file")
            .map_err(|e| ChatError::Storage(e.to_string()))?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| {
            ChatError::Storage(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e.error
            ))
        })?;

        tracing::debug!(
            "Saved state to {} ({} turns)",
            self.path.display(),
            record.messages.len()
        );

        Ok(())
    }
}
