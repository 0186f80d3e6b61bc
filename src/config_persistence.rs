//! Loading and first-run creation of `config.toml`.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::{sanitize_config, Config};

const CONFIG_DIR_NAME: &str = "vinylshelf";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default location: `<platform config dir>/vinylshelf/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn write_default_config(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create {}: {}", parent.display(), err))?;
    }
    let serialized = toml::to_string(&Config::default())
        .map_err(|err| format!("Failed to serialize default config: {}", err))?;
    std::fs::write(path, serialized)
        .map_err(|err| format!("Failed to write {}: {}", path.display(), err))
}

/// Reads the config at `path`, creating it with defaults when missing.
/// Unreadable or invalid files fall back to defaults.
pub fn load_or_create_config(path: &Path) -> Config {
    if !path.exists() {
        info!(
            "Config file not found. Creating default config. path={}",
            path.display()
        );
        if let Err(err) = write_default_config(path) {
            warn!("{}", err);
        }
        return Config::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("Failed to read config {}: {}", path.display(), err);
            return Config::default();
        }
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => sanitize_config(config),
        Err(err) => {
            warn!(
                "Invalid config {}; using defaults: {}",
                path.display(),
                err
            );
            Config::default()
        }
    }
}
