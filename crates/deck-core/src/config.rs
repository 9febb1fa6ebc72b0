//! Console configuration
//!
//! Layered, later layers win:
//! 1. built-in defaults
//! 2. TOML file (`--config`, or `AGENTDECK_CONFIG`)
//! 3. `AGENTDECK_*` environment variables
//! 4. command line flags (applied by the binary through `with_*`)

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "AGENTDECK_CONFIG";

const ENV_API_URL: &str = "AGENTDECK_API_URL";
const ENV_POLL_INTERVAL: &str = "AGENTDECK_POLL_INTERVAL_SECS";
const ENV_TIMEOUT: &str = "AGENTDECK_TIMEOUT_SECS";
const ENV_PAGE_SIZE: &str = "AGENTDECK_PAGE_SIZE";
const ENV_OPERATOR: &str = "AGENTDECK_OPERATOR";

/// Agent Deck configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    /// Backend base URL, e.g. `http://localhost:8000/api`
    pub api_base_url: String,
    /// Dashboard poll interval in seconds
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Tasks per page
    pub page_size: u32,
    /// Operator identity recorded on MCC selections
    pub operator: Option<String>,
    /// Maximum cached reports
    pub report_cache_capacity: u64,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            poll_interval_secs: 5,
            request_timeout_secs: 30,
            page_size: 10,
            operator: None,
            report_cache_capacity: 256,
        }
    }
}

impl DeckConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load file and environment layers
    ///
    /// `path` overrides `AGENTDECK_CONFIG`. With neither set, only the
    /// environment is applied over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let base = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Read a TOML file over the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply `AGENTDECK_*` variables read through `lookup`
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            self.poll_interval_secs = parse_number("poll_interval_secs", &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            self.request_timeout_secs = parse_number("request_timeout_secs", &raw)?;
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            self.page_size = parse_number("page_size", &raw)?;
        }
        if let Some(operator) = lookup(ENV_OPERATOR) {
            self.operator = Some(operator);
        }
        Ok(self)
    }

    /// With backend base URL
    #[inline]
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// With operator identity
    #[inline]
    #[must_use]
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Check values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(invalid("poll_interval_secs", "must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be at least 1"));
        }
        let url = reqwest::Url::parse(&self.api_base_url)
            .map_err(|e| invalid("api_base_url", &e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("api_base_url", "scheme must be http or https"));
        }
        Ok(())
    }

    /// Poll interval as a duration
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, &format!("`{raw}` is not a number")))
}

fn invalid(key: &'static str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = DeckConfig::new();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.page_size, 10);
        config.validate().unwrap();
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_base_url = \"https://deck.example/api\"\npoll_interval_secs = 15\noperator = \"ops\""
        )
        .unwrap();

        let config = DeckConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_base_url, "https://deck.example/api");
        assert_eq!(config.poll_interval_secs, 15);
        assert_eq!(config.operator.as_deref(), Some("ops"));
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval = 3").unwrap();

        let err = DeckConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeckConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn env_overrides_file() {
        let config = DeckConfig::new()
            .with_poll_interval_secs(15)
            .with_env(env(&[
                ("AGENTDECK_POLL_INTERVAL_SECS", "2"),
                ("AGENTDECK_OPERATOR", "night-shift"),
            ]))
            .unwrap();
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.operator.as_deref(), Some("night-shift"));
    }

    #[test]
    fn bad_env_number_is_rejected() {
        let err = DeckConfig::new()
            .with_env(env(&[("AGENTDECK_PAGE_SIZE", "ten")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "page_size", .. }));
    }

    #[test]
    fn validate_rejects_zero_and_bad_url() {
        assert!(DeckConfig::new().with_poll_interval_secs(0).validate().is_err());
        assert!(DeckConfig::new().with_page_size(0).validate().is_err());
        assert!(DeckConfig::new().with_api_base_url("not a url").validate().is_err());
        assert!(DeckConfig::new().with_api_base_url("ftp://x").validate().is_err());
    }
}
