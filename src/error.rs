//! Error types surfaced to callers of the catalog and launch APIs.
//!
//! Scan errors never appear here: an unreadable directory is logged and
//! skipped inside the walker.

use std::path::PathBuf;

use thiserror::Error;

use crate::launch::SessionState;

/// Errors returned synchronously by the launch API.
///
/// The first three variants are precondition failures: when one of them is
/// returned no process has been spawned and no session is registered.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),
    #[error("Wine prefix not found: {}", .0.display())]
    PrefixNotFound(PathBuf),
    #[error("Proton runner not found: {}. Reselect the Proton version for this game.", .0.display())]
    ProtonRunnerNotFound(PathBuf),
    #[error("'{0}' is already running")]
    AlreadyRunning(String),
    #[error("No active launch for '{0}'")]
    NotFound(String),
    #[error("Launch of '{name}' is {state}, it can only be aborted while running")]
    InvalidState { name: String, state: SessionState },
    #[error("No output log recorded for '{0}'")]
    NoLog(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LaunchError {
    /// True for errors raised before any process was spawned.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LaunchError::ExecutableNotFound(_)
                | LaunchError::PrefixNotFound(_)
                | LaunchError::ProtonRunnerNotFound(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Game name cannot be empty")]
    EmptyName,
    #[error("A game named '{0}' already exists")]
    DuplicateName(String),
    #[error("No game named '{0}' in the catalog")]
    UnknownGame(String),
    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings could not be serialized: {0}")]
    Json(#[from] serde_json::Error),
}
