use crate::kernel::services::ports::settings::Settings;
use std::path::{Path, PathBuf};

use super::paths::get_config_dir;

const SETTINGS_FILE: &str = "settings.json";

pub fn get_settings_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

pub fn ensure_settings_file() -> std::io::Result<PathBuf> {
    let path = get_settings_path().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine settings directory",
        )
    })?;
    write_default_settings(&path)?;
    Ok(path)
}

fn write_default_settings(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content =
            serde_json::to_string_pretty(&Settings::default()).unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub fn load_settings() -> Option<Settings> {
    load_settings_from(&get_settings_path()?)
}

pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "invalid settings file ignored");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/settings.rs"]
mod tests;
