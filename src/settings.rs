use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShelfError};

pub const DEFAULT_API_BASE_URL: &str = "https://dummyjson.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Empty means `<config dir>/shelf.log`.
    #[serde(default)]
    pub log_file: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("shelf/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            log_file: String::new(),
        }
    }
}

impl Settings {
    pub fn log_path(&self) -> PathBuf {
        if self.log_file.is_empty() {
            config_dir().join("shelf.log")
        } else {
            PathBuf::from(&self.log_file)
        }
    }

    /// Apply a one-run `--api-url` override. Trailing slashes are dropped so
    /// endpoint paths can be appended verbatim.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_base_url = url;
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("shelf")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
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
        .map_err(|e| ShelfError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            api_base_url: "http://localhost:8080".to_string(),
            user_agent: "test-agent".to_string(),
            log_file: "/tmp/shelf-test.log".to_string(),
        };
        save_settings_to(&path, &settings).unwrap();
        let loaded = load_settings_from(&path);
        assert_eq!(loaded.api_base_url, "http://localhost:8080");
        assert_eq!(loaded.user_agent, "test-agent");
        assert_eq!(loaded.log_path(), PathBuf::from("/tmp/shelf-test.log"));
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
        assert!(s.user_agent.starts_with("shelf/"));
        assert!(s.log_file.is_empty());
        assert!(s.log_path().ends_with("shelf.log"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"api_base_url": "http://example.test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.api_base_url, "http://example.test");
        assert!(s.user_agent.starts_with("shelf/"));
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let s = load_settings_from(&path);
        assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&path, &Settings::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_api_url_override_trims_trailing_slash() {
        let s = Settings::default().with_api_url(Some("http://127.0.0.1:9/".to_string()));
        assert_eq!(s.api_base_url, "http://127.0.0.1:9");
        let s = Settings::default().with_api_url(None);
        assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
    }
}
