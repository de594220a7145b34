use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_CURRENCY: &str = "\u{20b9}";

/// Overrides the config directory (settings and session).
pub const HOME_ENV: &str = "TALLY_HOME";
/// Overrides the configured backend URL.
pub const API_URL_ENV: &str = "TALLY_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            currency: default_currency(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Read settings from `path`. A missing or unreadable file gives defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring unreadable {}: {e}", path.display());
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Backend base URL: command-line flag, then environment, then settings file.
/// Trailing slashes are dropped so paths can be appended directly.
pub fn resolve_api_url(settings: &Settings, flag: Option<&str>) -> String {
    let env = std::env::var(API_URL_ENV).ok();
    let url = flag
        .map(str::to_string)
        .or(env)
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| settings.api_url.clone());
    url.trim().trim_end_matches('/').to_string()
}

pub fn validate_api_url(url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(TallyError::Settings(format!(
            "API URL must start with http:// or https:// (got '{url}')"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            api_url: "https://expenses.example.com".to_string(),
            currency: "$".to_string(),
        };
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_missing_or_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_settings_from(&path), Settings::default());
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.api_url, "http://localhost:8000");
        assert_eq!(s.currency, "\u{20b9}");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"currency": "EUR "}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.api_url, DEFAULT_API_URL);
        assert_eq!(s.currency, "EUR ");
    }

    #[test]
    fn test_flag_wins_and_trailing_slash_dropped() {
        let s = Settings::default();
        assert_eq!(resolve_api_url(&s, Some("http://api.test/")), "http://api.test");
    }

    #[test]
    fn test_validate_api_url() {
        assert!(validate_api_url("https://x.test").is_ok());
        assert!(validate_api_url("ftp://x.test").is_err());
    }
}
