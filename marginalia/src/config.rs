//! Optional user configuration for the marginalia CLI.
//!
//! A single small TOML file; every failure is a soft failure. Config can
//! never prevent the annotation store from opening — a missing or broken
//! file just means defaults.

use std::path::PathBuf;

use marginalia_core::location::DEFAULT_FILE_NAME;
use serde::Deserialize;

/// Resolved configuration with defaults applied.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File name of the annotation document inside the storage directory.
    pub notes_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_file: DEFAULT_FILE_NAME.to_owned(),
        }
    }
}

/// Returns the path to the marginalia config file.
///
/// Prefers `$XDG_CONFIG_HOME/marginalia/config.toml`; falls back to
/// `~/.config/marginalia/config.toml` when the env var is absent.
fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("marginalia").join("config.toml")
}

/// Loads configuration from `~/.config/marginalia/config.toml`.
///
/// Returns defaults if the file does not exist, cannot be parsed, or has no
/// recognized keys. Never panics — parse errors are printed to stderr and
/// otherwise ignored.
pub fn load() -> Config {
    let path = config_path();
    let raw = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(_) => return Config::default(),
    };
    match toml::from_str(&raw) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("marginalia: config parse error in {:?}: {}", path, e);
            Config::default()
        }
    }
}
