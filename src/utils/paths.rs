//! Cross-Platform Path Utilities
//!
//! Resolves the application directory (~/.agent-blueprint/) and the files
//! kept in it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Agent Blueprint directory (~/.agent-blueprint/)
pub fn agent_blueprint_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".agent-blueprint"))
}

/// Get the config file path (~/.agent-blueprint/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(agent_blueprint_dir()?.join("config.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Agent Blueprint directory, creating it if it doesn't exist
pub fn ensure_agent_blueprint_dir() -> AppResult<PathBuf> {
    let path = agent_blueprint_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
