//! Configuration module for Compass Search
//!
//! Settings come from an optional YAML file and are then overridden by
//! environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Load settings from the first settings file found, then merge the environment
pub fn load() -> Result<Settings> {
    let mut settings = match settings_path() {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };
    settings.merge_env();
    Ok(settings)
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("COMPASS_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut candidates = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("compass-search/settings.yml"));
    }

    candidates.into_iter().find(|p| p.exists())
}
