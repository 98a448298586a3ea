//! VMFlow configuration
//!
//! Settings are read from an optional YAML file in which every field may be
//! omitted. [`Settings::resolve`] merges them with the built-in defaults into
//! the concrete [`RunOptions`] handed to the orchestration driver.

pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;

use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a settings file
pub const CONFIG_PATH_ENV: &str = "VMFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["vmflow.yaml", ".vmflow.yaml"];

/// Get the VMFlow configuration directory (`<config_dir>/vmflow`)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("vmflow");
    Ok(config_dir)
}

/// Find the settings file
///
/// Search order:
/// 1. `VMFLOW_CONFIG_PATH` environment variable
/// 2. Current directory: vmflow.yaml, .vmflow.yaml
/// 3. `./.vmflow/` directory: vmflow.yaml
/// 4. `~/.config/vmflow/vmflow.yaml` (global)
///
/// Returns `None` when no file exists; running on defaults is fine.
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!(
            "{} points at {}, which does not exist",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let local_dir = current_dir.join(".vmflow");
    if local_dir.is_dir() {
        let path = local_dir.join("vmflow.yaml");
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join("vmflow.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Load settings from an explicit path
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::SettingsFileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let settings = Settings::from_yaml(&content)?;
    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings from `path` if given, otherwise from the discovered file,
/// otherwise fall back to empty settings.
pub fn load_or_default(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(p) => load_settings(p),
        None => match find_settings_file()? {
            Some(found) => load_settings(found),
            None => {
                tracing::debug!("No settings file found, using defaults");
                Ok(Settings::default())
            }
        },
    }
}
