//! Test utilities for chat
//!
//! Shared fixtures for state files and conversation windows.

use crate::conversation::{ConversationWindow, Turn};
use crate::storage::StateStore;
use tempfile::TempDir;

/// Create a state store backed by a fresh temporary directory
///
/// Returns the `TempDir` as well so the caller keeps it alive for the
/// duration of the test.
pub fn temp_store() -> (StateStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temporary directory");
    let store = StateStore::new_with_path(dir.path().join("state.json"));
    (store, dir)
}

/// Window of `pairs` user/assistant pairs: `q0`/`a0`, `q1`/`a1`, ...
pub fn window_of_pairs(pairs: usize) -> ConversationWindow {
    ConversationWindow::from_turns(
        (0..pairs)
            .flat_map(|i| [Turn::user(format!("q{}", i)), Turn::assistant(format!("a{}", i))])
            .collect(),
    )
}

/// Write raw contents to the store's file
///
/// # Panics
///
/// Panics if the file cannot be written
pub fn write_raw(store: &StateStore, contents: &str) {
    std::fs::write(store.path(), contents).expect("Failed to write state file");
}
