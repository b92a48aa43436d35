use crate::config::types::Settings;
use crate::error::ConfigError;
use crate::paths::PATH_SETTINGS;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load_settings() -> Settings {
    load_settings_from(&PATH_SETTINGS)
}

/// Load settings from `path`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_settings_from(path: &Path) -> Settings {
    if let Ok(file) = File::open(path) {
        match serde_json::from_reader::<_, Settings>(BufReader::new(file)) {
            Ok(settings) => return settings,
            Err(e) => {
                tracing::warn!(
                    "config: ignoring unreadable settings at {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Settings::default()
}

pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    save_settings_to(settings, &PATH_SETTINGS)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;
    Ok(())
}
