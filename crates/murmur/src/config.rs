use std::path::{Path, PathBuf};

use murmur_core::Settings;
use tracing::{info, warn};

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("murmur")
        .join("config.toml")
}

/// Settings from `path`, or defaults when the file is absent or unusable
pub fn load_settings(path: &Path) -> Settings {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No config file, using defaults");
            return Settings::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
            return Settings::default();
        }
    };

    match toml::from_str(&text) {
        Ok(settings) => {
            info!(path = %path.display(), "Loaded config");
            settings
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
            Settings::default()
        }
    }
}
