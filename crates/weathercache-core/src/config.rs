//! Application configuration management.
//!
//! This module handles loading the application configuration, which covers
//! the provider location and credentials, the poll interval, the HTTP listen
//! address, the data directory and the sensor change thresholds.
//!
//! Configuration is stored at `~/.config/weathercache/config.json`. Missing
//! fields take their defaults; environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::sensor::DEFAULT_CHANGE_THRESHOLD;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "weathercache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// OpenWeatherMap current weather endpoint.
pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// HTTP request timeout in seconds.
/// Bounds how long a hung request can occupy the in-flight fetch slot.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Poll every 2.5 minutes.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 150;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

pub const ENV_API_KEY: &str = "WEATHERCACHE_API_KEY";
pub const ENV_LATITUDE: &str = "WEATHERCACHE_LATITUDE";
pub const ENV_LONGITUDE: &str = "WEATHERCACHE_LONGITUDE";
pub const ENV_LISTEN: &str = "WEATHERCACHE_LISTEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub api_key: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            api_key: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub provider: ProviderConfig,
    pub poll_interval_secs: u64,
    pub listen_addr: String,
    pub data_dir: Option<PathBuf>,
    pub temperature_threshold: f64,
    pub humidity_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            data_dir: None,
            temperature_threshold: DEFAULT_CHANGE_THRESHOLD,
            humidity_threshold: DEFAULT_CHANGE_THRESHOLD,
        }
    }
}

impl Config {
    /// Load from the default config location, falling back to defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.provider.api_key = key;
        }
        if let Some(lat) = lookup(ENV_LATITUDE) {
            self.provider.latitude = lat
                .parse()
                .with_context(|| format!("{} is not a number: {}", ENV_LATITUDE, lat))?;
        }
        if let Some(lon) = lookup(ENV_LONGITUDE) {
            self.provider.longitude = lon
                .parse()
                .with_context(|| format!("{} is not a number: {}", ENV_LONGITUDE, lon))?;
        }
        if let Some(addr) = lookup(ENV_LISTEN) {
            self.listen_addr = addr;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            bail!("API key is not configured (set {} or api_key)", ENV_API_KEY);
        }
        if !(-90.0..=90.0).contains(&self.provider.latitude) {
            bail!("Latitude out of range: {}", self.provider.latitude);
        }
        if !(-180.0..=180.0).contains(&self.provider.longitude) {
            bail!("Longitude out of range: {}", self.provider.longitude);
        }
        if self.poll_interval_secs == 0 {
            bail!("Poll interval must be greater than zero");
        }
        if self.provider.request_timeout_secs == 0 {
            bail!("Request timeout must be greater than zero");
        }
        if !(self.temperature_threshold >= 0.0 && self.humidity_threshold >= 0.0) {
            bail!("Change thresholds must be non-negative");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Directory holding the persisted payload.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find local data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid() -> Config {
        let mut config = Config::default();
        config.provider.api_key = "key".to_string();
        config.provider.latitude = 50.11;
        config.provider.longitude = 8.68;
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(150));
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.temperature_threshold, 0.15);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "api_key": "abc", "latitude": 48.1, "poll_interval_secs": 60 }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider.api_key, "abc");
        assert_eq!(config.provider.latitude, 48.1);
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "from-env"),
            (ENV_LATITUDE, "-33.9"),
            (ENV_LISTEN, "127.0.0.1:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.provider.api_key, "from-env");
        assert_eq!(config.provider.latitude, -33.9);
        assert_eq!(config.listen_addr, "127.0.0.1:9000");

        let bad = |key: &str| (key == ENV_LONGITUDE).then(|| "east".to_string());
        assert!(config.apply_overrides(bad).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());
        assert!(Config::default().validate().is_err());

        let mut config = valid();
        config.provider.latitude = 91.0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.humidity_threshold = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let mut config = valid();
        config.data_dir = Some(PathBuf::from("/tmp/weather"));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/weather"));
    }
}
