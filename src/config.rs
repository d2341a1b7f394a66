use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub sample_images: SampleImageConfig,
}

/// Remote fetch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds for remote fetches
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

/// Source of the sample images offered by the `fetch-image` command.
/// Images are numbered `1..=max_index` at the source, stored as
/// `{base_url}/{n}.jpg`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleImageConfig {
    #[serde(default = "default_image_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_max_index")]
    pub max_index: u32,
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_image_base_url() -> String {
    "https://kxcodingblob.blob.core.windows.net/mastering-ios".to_string()
}

fn default_image_max_index() -> u32 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Default for SampleImageConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_base_url(),
            max_index: default_image_max_index(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.sample_images.max_index == 0 {
            return Err(ConfigError::ValidationError(
                "sample_images.max_index must be at least 1".to_string(),
            ));
        }
        if !self.sample_images.base_url.starts_with("http") {
            return Err(ConfigError::ValidationError(
                "sample_images.base_url must be an http(s) URL".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.sample_images.max_index, 30);
        assert!(config.sample_images.base_url.starts_with("https://"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sample_images.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let config = Config::default();
        config.save_to_file(&config_path).unwrap();

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.fetch.timeout_secs, loaded.fetch.timeout_secs);
        assert_eq!(config.sample_images.base_url, loaded.sample_images.base_url);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "fetch": { "timeout_secs": 5 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.sample_images.max_index, 30);
    }
}
