//! Where the reference data and progress live.
//!
//! Settings come from three layers, later ones winning: an optional TOML
//! file in the user config directory, environment variables (a `.env` file
//! is loaded first), and command-line flags.

use anyhow::{Context, Result};
use dinn_core::SessionConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the data directory.
pub const DATA_DIR_VAR: &str = "DINN_DATA_DIR";

/// Overrides the progress file.
pub const PROGRESS_VAR: &str = "DINN_PROGRESS";

/// Contents of `config.toml`.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub progress_file: Option<PathBuf>,
}

impl FileConfig {
    /// Load the user's config file, if there is one.
    pub fn load() -> Result<Option<Self>> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(Some(config))
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dinn").join("config.toml"))
}

/// Paths supplied by the environment or the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub progress: Option<PathBuf>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var_os(DATA_DIR_VAR).map(PathBuf::from),
            progress: env::var_os(PROGRESS_VAR).map(PathBuf::from),
        }
    }
}

/// Combine every layer into a session config.
///
/// Without any data directory the current directory is used, and progress
/// is kept next to the reference files.
pub fn resolve(file: Option<FileConfig>, env: Overrides, flags: Overrides) -> SessionConfig {
    let file = file.unwrap_or_default();

    let data_dir = flags
        .data_dir
        .or(env.data_dir)
        .or(file.data_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let progress = flags.progress.or(env.progress).or(file.progress_file);

    let config = SessionConfig::new(data_dir);
    match progress {
        Some(path) => config.with_progress_path(path),
        None => config,
    }
}
