//! Application settings persisted as a TOML file under the app root.
//!
//! Settings cover the drawing-surface brush and an optional override for
//! where project corpora are stored. Writes go through the shared atomic
//! write helper so a crash never leaves a truncated settings file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{app_dirs, fsio};

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Errors raised while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No suitable base config directory could be resolved.
    #[error("No suitable base config directory available for settings")]
    NoBaseDir,
    /// Failed to create the settings directory.
    #[error("Failed to create settings directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to read the settings file.
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the settings file as TOML.
    #[error("Failed to parse settings file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to serialize settings to TOML.
    #[error("Failed to serialize settings for {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// Failed to write the settings file.
    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// User-tunable settings for the trainer shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Brush stroke width in canvas pixels.
    pub brush_width: u32,
    /// Brush color as RGB bytes.
    pub brush_color: [u8; 3],
    /// Optional override for the directory holding project corpora.
    pub projects_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            brush_width: 12,
            brush_color: [0, 0, 0],
            projects_dir: None,
        }
    }
}

impl AppSettings {
    /// Resolve the projects directory, falling back to the app default.
    pub fn projects_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.projects_dir {
            Some(path) => Ok(path.clone()),
            None => app_dirs::projects_dir().map_err(map_app_dir_error),
        }
    }
}

/// Resolve the settings file path under the app root.
pub fn settings_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(SETTINGS_FILE_NAME))
}

/// Load settings from disk, returning defaults if the file is missing.
pub fn load_or_default() -> Result<AppSettings, ConfigError> {
    load_from_path(&settings_path()?)
}

/// Load settings from a specific path, returning defaults if missing.
pub fn load_from_path(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist settings to disk, overwriting any previous contents.
pub fn save(settings: &AppSettings) -> Result<(), ConfigError> {
    save_to_path(settings, &settings_path()?)
}

/// Save settings to a specific path, creating parent directories as needed.
pub fn save_to_path(settings: &AppSettings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let data = toml::to_string_pretty(settings).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    fsio::atomic_write(path, data.as_bytes()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoBaseDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}
