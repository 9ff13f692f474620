//! Configuration management for the CLI

use crate::output::{print_info, OutputFormat};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Default output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            // No home directory: nothing to read
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Update the stored defaults; `None` leaves a setting unchanged
    pub fn set(&mut self, api_url: Option<String>, format: Option<OutputFormat>) {
        if let Some(url) = api_url {
            self.api_url = Some(url);
        }
        if let Some(format) = format {
            self.default_format = format
                .to_possible_value()
                .map(|v| v.get_name().to_string());
        }
    }

    /// Stored output format; unknown values are ignored
    pub fn format(&self) -> Option<OutputFormat> {
        self.default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("hive").join("config.json"))
    }
}

/// Flag or `HIVE_API_URL` first, then the config file, then the default
pub fn resolve_api_url(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Print the effective settings
pub fn show(config: &Config, api_url: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let effective = serde_json::json!({
                "api_url": api_url,
                "stored": config,
            });
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        OutputFormat::Table => {
            if let Ok(path) = Config::config_path() {
                print_info(&format!("Config file: {}", path.display()));
            }
            println!("API URL: {}", api_url);
            println!(
                "Default format: {}",
                config.default_format.as_deref().unwrap_or("table")
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_precedence() {
        let stored = Config {
            api_url: Some("http://gateway:8080".to_string()),
            default_format: None,
        };

        assert_eq!(
            resolve_api_url(Some("http://flag:1".to_string()), &stored),
            "http://flag:1"
        );
        assert_eq!(resolve_api_url(None, &stored), "http://gateway:8080");
        assert_eq!(resolve_api_url(None, &Config::default()), DEFAULT_API_URL);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive").join("config.json");

        let mut config = Config::default();
        config.set(Some("http://gateway:8080".to_string()), Some(OutputFormat::Json));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url.as_deref(), Some("http://gateway:8080"));
        assert!(matches!(loaded.format(), Some(OutputFormat::Json)));
    }

    #[test]
    fn test_set_keeps_unspecified_values() {
        let mut config = Config {
            api_url: Some("http://a:1".to_string()),
            default_format: Some("json".to_string()),
        };
        config.set(None, None);
        assert_eq!(config.api_url.as_deref(), Some("http://a:1"));
        assert_eq!(config.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
