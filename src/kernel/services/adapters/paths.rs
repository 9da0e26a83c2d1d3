//! Per-platform application directories:
//! - data: `~/.local/share/forgedeck` (Linux),
//!   `~/Library/Application Support/forgedeck` (macOS), `%APPDATA%\forgedeck` (Windows)
//! - config: `$XDG_CONFIG_HOME/forgedeck` or `~/.config/forgedeck` on Linux,
//!   same as data elsewhere

use std::path::PathBuf;

const APP_NAME: &str = "forgedeck";
const STATE_DIR: &str = "state";
const LOG_DIR: &str = "logs";

fn get_app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        })
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg).join(APP_NAME))
        } else {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share").join(APP_NAME))
        }
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(APP_NAME));
        }
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config").join(APP_NAME))
    }

    #[cfg(not(target_os = "linux"))]
    {
        get_app_data_dir()
    }
}

pub fn get_state_dir() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(STATE_DIR))
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_app_data_dir().map(|p| p.join(LOG_DIR))
}

fn ensure_dir(dir: Option<PathBuf>, what: &str) -> std::io::Result<PathBuf> {
    let dir = dir.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Cannot determine {what} directory"),
        )
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

pub fn ensure_state_dir() -> std::io::Result<PathBuf> {
    ensure_dir(get_state_dir(), "state")
}

pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    ensure_dir(get_log_dir(), "log")
}
