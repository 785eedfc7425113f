//! # Settings Loader
//!
//! Centralized configuration loading for the finscope client. Settings live
//! in a JSON file (by default `finscope.json` in the current directory) and
//! cover the backend base URL, the local data directory, the log file and
//! the request timeout. Environment variables override file values so a
//! shell session can point the client at another backend without editing
//! anything:
//!
//! - `FINSCOPE_BASE_URL`
//! - `FINSCOPE_DATA_DIR`
//! - `FINSCOPE_LOG_FILE`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::Settings;

const DEFAULT_SETTINGS_FILE: &str = "finscope.json";

/// Loads settings from a JSON file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from the default location (`finscope.json` in the current directory).
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Tries the provided path first, then the default location, then built-in
/// defaults. Never fails: a missing settings file is a normal first run.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Settings {
    if let Some(settings_path) = path {
        if let Ok(settings) = load_settings(settings_path) {
            return apply_env_overrides(settings);
        }
    }

    match load_default_settings() {
        Ok(settings) => apply_env_overrides(settings),
        Err(_) => apply_env_overrides(Settings::default()),
    }
}

/// Checks if a settings file exists at the given path.
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

/// Checks if the default settings file exists.
pub fn default_settings_exist() -> bool {
    settings_file_exists(DEFAULT_SETTINGS_FILE)
}

fn apply_env_overrides(mut settings: Settings) -> Settings {
    if let Ok(url) = std::env::var("FINSCOPE_BASE_URL") {
        if !url.is_empty() {
            settings.base_url = url;
        }
    }
    if let Ok(dir) = std::env::var("FINSCOPE_DATA_DIR") {
        if !dir.is_empty() {
            settings.data_dir = Some(PathBuf::from(dir));
        }
    }
    if let Ok(file) = std::env::var("FINSCOPE_LOG_FILE") {
        if !file.is_empty() {
            settings.log_file = Some(PathBuf::from(file));
        }
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_settings_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("finscope.json");
        fs::write(
            &path,
            r#"{ "base_url": "http://10.0.0.5:8000", "timeout_secs": 60 }"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.base_url, "http://10.0.0.5:8000");
        assert_eq!(settings.timeout_secs, Some(60));
        assert!(settings.data_dir.is_none());
    }

    #[test]
    fn test_load_settings_rejects_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("finscope.json");
        fs::write(&path, "{ base_url: nope }").unwrap();
        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn test_fallback_uses_defaults_when_nothing_exists() {
        let missing = PathBuf::from("/definitely/not/here/finscope.json");
        let settings = load_settings_with_fallback(Some(&missing));
        assert_eq!(settings.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_settings_file_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("finscope.json");
        assert!(!settings_file_exists(&path));
        fs::write(&path, "{}").unwrap();
        assert!(settings_file_exists(&path));
    }
}
