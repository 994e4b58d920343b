use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::Coordinate;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "binwatch";

pub const TOKEN_ENV_VAR: &str = "BINWATCH_API_TOKEN";
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_PROFILE: &str = "driving";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_COLLECT_AT: f64 = 75.0;
pub const DEFAULT_BATTERY_LOW: f64 = 20.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token. If not set, falls back to BINWATCH_API_TOKEN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Project used when a command does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    /// Resolve API token from config or environment variable.
    pub fn resolve_api_token(&self) -> Option<String> {
        if let Some(token) = &self.api_token {
            if !token.is_empty() {
                return Some(token.clone());
            }
        }
        std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty())
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osrm_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Start and end of every collection route, as `lat,lon`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl RoutingConfig {
    pub fn osrm_url(&self) -> &str {
        self.osrm_url.as_deref().unwrap_or(DEFAULT_OSRM_URL)
    }

    pub fn profile(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn depot(&self) -> Result<Option<Coordinate>> {
        self.depot.as_deref().map(str::parse::<Coordinate>).transpose()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Fill level (percent) at which a bin is due for collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_at: Option<f64>,

    /// Battery level (percent) below which a sensor is flagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_low: Option<f64>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `binwatch config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields defaults.
    ///
    /// Read and parse errors are returned, so a broken file is never
    /// silently replaced by defaults and then saved over.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from_or_default(&path)
    }

    pub fn load_from_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read config {}", path.display())),
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# binwatch configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn backend(&self) -> BackendConfig {
        self.backend.clone().unwrap_or_default()
    }

    pub fn routing(&self) -> RoutingConfig {
        self.routing.clone().unwrap_or_default()
    }

    pub fn collect_at(&self) -> f64 {
        self.thresholds
            .as_ref()
            .and_then(|t| t.collect_at)
            .unwrap_or(DEFAULT_COLLECT_AT)
    }

    pub fn battery_low(&self) -> f64 {
        self.thresholds
            .as_ref()
            .and_then(|t| t.battery_low)
            .unwrap_or(DEFAULT_BATTERY_LOW)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backend.base_url" => {
                validate_url(value)?;
                self.backend
                    .get_or_insert_with(BackendConfig::default)
                    .base_url = Some(value.trim_end_matches('/').to_string());
            }
            "backend.api_token" => {
                self.backend
                    .get_or_insert_with(BackendConfig::default)
                    .api_token = Some(value.to_string());
            }
            "backend.project" => {
                if value.is_empty() {
                    anyhow::bail!("Project must not be empty.");
                }
                self.backend
                    .get_or_insert_with(BackendConfig::default)
                    .project = Some(value.to_string());
            }
            "backend.timeout_secs" => {
                let secs = parse_timeout(value)?;
                self.backend
                    .get_or_insert_with(BackendConfig::default)
                    .timeout_secs = Some(secs);
            }
            "routing.osrm_url" => {
                validate_url(value)?;
                self.routing
                    .get_or_insert_with(RoutingConfig::default)
                    .osrm_url = Some(value.trim_end_matches('/').to_string());
            }
            "routing.profile" => {
                match value {
                    "driving" | "car" | "bike" | "foot" => {}
                    _ => anyhow::bail!(
                        "Invalid profile: {value}. Must be 'driving', 'car', 'bike', or 'foot'."
                    ),
                }
                self.routing
                    .get_or_insert_with(RoutingConfig::default)
                    .profile = Some(value.to_string());
            }
            "routing.depot" => {
                let depot: Coordinate = value.parse()?;
                self.routing
                    .get_or_insert_with(RoutingConfig::default)
                    .depot = Some(format!("{},{}", depot.lat, depot.lon));
            }
            "routing.timeout_secs" => {
                let secs = parse_timeout(value)?;
                self.routing
                    .get_or_insert_with(RoutingConfig::default)
                    .timeout_secs = Some(secs);
            }
            "thresholds.collect_at" => {
                let pct = parse_percent(value)?;
                self.thresholds
                    .get_or_insert_with(ThresholdsConfig::default)
                    .collect_at = Some(pct);
            }
            "thresholds.battery_low" => {
                let pct = parse_percent(value)?;
                self.thresholds
                    .get_or_insert_with(ThresholdsConfig::default)
                    .battery_low = Some(pct);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: backend.base_url, backend.api_token, \
                 backend.project, backend.timeout_secs, routing.osrm_url, routing.profile, \
                 routing.depot, routing.timeout_secs, thresholds.collect_at, thresholds.battery_low"
            ),
        }
        Ok(())
    }
}

fn validate_url(value: &str) -> Result<()> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        anyhow::bail!("Invalid URL: {value}. Must start with 'http://' or 'https://'.");
    }
    Ok(())
}

fn parse_timeout(value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => anyhow::bail!("Invalid timeout: {value}. Must be a positive number of seconds."),
    }
}

fn parse_percent(value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(pct) if (0.0..=100.0).contains(&pct) => Ok(pct),
        _ => anyhow::bail!("Invalid percentage: {value}. Must be between 0 and 100."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.routing().osrm_url(), DEFAULT_OSRM_URL);
        assert_eq!(config.routing().profile(), "driving");
        assert_eq!(config.collect_at(), 75.0);
        assert_eq!(config.battery_low(), 20.0);
        assert!(config.routing().depot().unwrap().is_none());
    }

    #[test]
    fn test_set_valid_keys() {
        let mut config = Config::default();
        config.set("backend.base_url", "https://api.example.org/v1/").unwrap();
        config.set("backend.project", "hamburg-north").unwrap();
        config.set("routing.depot", "53.55, 9.99").unwrap();
        config.set("routing.profile", "car").unwrap();
        config.set("thresholds.collect_at", "80").unwrap();

        let backend = config.backend();
        assert_eq!(backend.base_url.as_deref(), Some("https://api.example.org/v1"));
        assert_eq!(backend.project.as_deref(), Some("hamburg-north"));
        assert_eq!(
            config.routing().depot().unwrap(),
            Some(Coordinate::new(53.55, 9.99))
        );
        assert_eq!(config.routing().profile(), "car");
        assert_eq!(config.collect_at(), 80.0);
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("backend.base_url", "ftp://x").is_err());
        assert!(config.set("routing.profile", "boat").is_err());
        assert!(config.set("routing.depot", "north pole").is_err());
        assert!(config.set("thresholds.collect_at", "120").is_err());
        assert!(config.set("routing.timeout_secs", "0").is_err());
        assert!(config.set("unknown.key", "x").is_err());
        assert!(config.backend.is_none());
        assert!(config.routing.is_none());
    }

    #[test]
    fn test_resolve_api_token_prefers_config() {
        let backend = BackendConfig {
            api_token: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(backend.resolve_api_token().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("binwatch-config-{}", std::process::id()));
        let path = dir.join(FILENAME);

        let mut config = Config::default();
        config.set("routing.osrm_url", "http://localhost:5000").unwrap();
        config.set("thresholds.battery_low", "15").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.routing().osrm_url(), "http://localhost:5000");
        assert_eq!(loaded.battery_low(), 15.0);
        assert!(loaded.backend.is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let path = std::env::temp_dir().join("binwatch-does-not-exist/config.yaml");
        let config = Config::load_from_or_default(&path).unwrap();
        assert!(config.backend.is_none());
        assert_eq!(config.collect_at(), DEFAULT_COLLECT_AT);
    }

    #[test]
    fn test_load_or_default_keeps_malformed_file() {
        let dir = std::env::temp_dir().join(format!("binwatch-malformed-{}", std::process::id()));
        let path = dir.join(FILENAME);
        std::fs::create_dir_all(&dir).unwrap();
        let original = "backend: {base_url: https://api.city.example, api_token: secret, \
                        project: oslo, timeout_secs: ten}\n";
        std::fs::write(&path, original).unwrap();

        // The edit-and-save flow must stop at the load step.
        let result = Config::load_from_or_default(&path).and_then(|mut config| {
            config.set("thresholds.collect_at", "80")?;
            config.save_to(&path)
        });

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("binwatch-does-not-exist/config.yaml");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }
}
