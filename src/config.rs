use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::policy::DEFAULT_LATENCY_THRESHOLD_MS;
use crate::adapters::store::DEFAULT_MAX_SPACE_USAGE_BYTES;
use crate::adapters::{DefaultStatusPolicy, LatencyStatusPolicy};
use crate::application::MissingParameterPolicy;
use crate::ports::StatusPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "apiwatch.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Status classification settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub latency_threshold_ms: u64,
    pub degraded_latency_ms: Option<u64>,
    pub degraded_status_codes: Vec<u16>,
    pub path_latency_ms: HashMap<String, u64>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            latency_threshold_ms: DEFAULT_LATENCY_THRESHOLD_MS,
            degraded_latency_ms: None,
            degraded_status_codes: Vec::new(),
            path_latency_ms: HashMap::new(),
        }
    }
}

impl StatusConfig {
    pub fn policy(&self) -> LatencyStatusPolicy {
        LatencyStatusPolicy {
            latency_threshold_ms: self.latency_threshold_ms,
            degraded_latency_ms: self.degraded_latency_ms,
            degraded_status_codes: self.degraded_status_codes.clone(),
            path_latency_ms: self.path_latency_ms.clone(),
        }
    }
}

/// One alert sink entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlertConfig {
    Console,
    Webhook {
        url: String,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or URL of the OpenAPI document
    pub spec_source: String,
    pub storage_path: PathBuf,
    pub concurrency: usize,
    pub samples: usize,
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub max_space_usage_bytes: u64,
    pub missing_parameter: MissingParameterPolicy,
    pub log_level: String,
    pub examples: HashMap<String, String>,
    pub path_examples: HashMap<String, HashMap<String, String>>,
    /// Custom classification; the 2xx-under-300ms default applies when absent
    pub status: Option<StatusConfig>,
    pub alerts: Vec<AlertConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec_source: String::new(),
            storage_path: PathBuf::new(),
            concurrency: 5,
            samples: 5,
            base_url: None,
            timeout_ms: 5000,
            max_space_usage_bytes: DEFAULT_MAX_SPACE_USAGE_BYTES,
            missing_parameter: MissingParameterPolicy::default(),
            log_level: "info".to_string(),
            examples: HashMap::new(),
            path_examples: HashMap::new(),
            status: None,
            alerts: vec![AlertConfig::Console],
        }
    }
}

impl Config {
    /// Config file location: the `--config` value, else `apiwatch.toml` in
    /// the working directory
    pub fn locate(explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Read the TOML file (if present), apply environment overrides, validate.
    ///
    /// A missing file is allowed when the default location is used, so the
    /// tool can be driven by environment variables alone.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let config = config.with_env_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply `APIWATCH_*` overrides read through `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(spec) = lookup("APIWATCH_SPEC") {
            self.spec_source = spec;
        }
        if let Some(storage) = lookup("APIWATCH_STORAGE") {
            self.storage_path = PathBuf::from(storage);
        }
        if let Some(base_url) = lookup("APIWATCH_BASE_URL") {
            self.base_url = Some(base_url);
        }
        if let Some(concurrency) = lookup("APIWATCH_CONCURRENCY").and_then(|s| s.parse().ok()) {
            self.concurrency = concurrency;
        }
        if let Some(samples) = lookup("APIWATCH_SAMPLES").and_then(|s| s.parse().ok()) {
            self.samples = samples;
        }
        if let Some(timeout_ms) = lookup("APIWATCH_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.timeout_ms = timeout_ms;
        }
        if let Some(log_level) = lookup("APIWATCH_LOG_LEVEL") {
            self.log_level = log_level;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spec_source.trim().is_empty() {
            return Err(ConfigError::Invalid("spec_source is required".to_string()));
        }
        if self.storage_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage_path is required".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if self.samples == 0 {
            return Err(ConfigError::Invalid("samples must be at least 1".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be at least 1".to_string()));
        }
        if self.max_space_usage_bytes == 0 {
            return Err(ConfigError::Invalid("max_space_usage_bytes must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn status_policy(&self) -> Arc<dyn StatusPolicy> {
        match &self.status {
            Some(status) => Arc::new(status.policy()),
            None => Arc::new(DefaultStatusPolicy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;

    const FULL: &str = r#"
spec_source = "https://example.com/openapi.json"
storage_path = "./storage.json"
concurrency = 10
samples = 3
timeout_ms = 2500
max_space_usage_bytes = 26214
missing_parameter = "exclude"

[examples]
chainId = "1"

[path_examples."/l2/{chainId}"]
chainId = "10"

[status]
latency_threshold_ms = 500
degraded_latency_ms = 2000
degraded_status_codes = [429]

[status.path_latency_ms]
"/reports" = 1500

[[alerts]]
type = "console"

[[alerts]]
type = "webhook"
url = "https://hooks.example.com/apiwatch"
headers = { Authorization = "Bearer t" }
"#;

    #[test]
    fn parses_full_file() {
        let config = Config::from_toml(FULL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.concurrency, 10);
        assert_eq!(config.samples, 3);
        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.missing_parameter, MissingParameterPolicy::Exclude);
        assert_eq!(config.examples["chainId"], "1");
        assert_eq!(config.path_examples["/l2/{chainId}"]["chainId"], "10");
        let status = config.status.as_ref().unwrap();
        assert_eq!(status.degraded_status_codes, vec![429]);
        assert_eq!(status.path_latency_ms["/reports"], 1500);
        assert_eq!(config.status_policy().classify(429, "/a", 10), Status::Degraded);
        assert_eq!(config.status_policy().classify(200, "/reports", 1000), Status::Up);
        assert_eq!(config.alerts.len(), 2);
        assert!(matches!(
            &config.alerts[1],
            AlertConfig::Webhook { url, headers } if url.ends_with("/apiwatch") && headers.len() == 1
        ));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_toml("spec_source = \"spec.yaml\"\nstorage_path = \"s.json\"").unwrap();
        config.validate().unwrap();

        assert_eq!(config.concurrency, 5);
        assert_eq!(config.samples, 5);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.max_space_usage_bytes, 249_036);
        assert_eq!(config.missing_parameter, MissingParameterPolicy::BestEffort);
        assert!(config.status.is_none());
        let policy = config.status_policy();
        assert_eq!(policy.classify(204, "/a", 299), Status::Up);
        assert_eq!(policy.classify(200, "/a", 300), Status::Down);
        assert_eq!(policy.classify(429, "/a", 10), Status::Down);
        assert_eq!(config.alerts, vec![AlertConfig::Console]);
    }

    #[test]
    fn env_overrides_file_values() {
        let env = HashMap::from([
            ("APIWATCH_SPEC", "other.json"),
            ("APIWATCH_CONCURRENCY", "2"),
            ("APIWATCH_SAMPLES", "not-a-number"),
            ("APIWATCH_BASE_URL", "http://localhost:3000"),
        ]);
        let config = Config::from_toml(FULL)
            .unwrap()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.spec_source, "other.json");
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.samples, 3);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn rejects_invalid_values() {
        let config = Config::from_toml("spec_source = \"s\"\nstorage_path = \"p\"\nconcurrency = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(Config::default().validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(Config::load(&path, true), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn default_location_when_no_flag() {
        assert_eq!(Config::locate(None), PathBuf::from("apiwatch.toml"));
        assert_eq!(Config::locate(Some(PathBuf::from("ops/a.toml"))), PathBuf::from("ops/a.toml"));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "concurrency = [").unwrap();

        assert!(matches!(Config::load(&path, true), Err(ConfigError::Parse { .. })));
    }
}
