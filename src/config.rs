//! Configuration management for ddns-sync.
//!
//! Values come from a TOML file, then `DDNS_*` environment variables, then
//! command-line overrides, in that order. No file at all is fine as long as
//! the environment supplies the required record settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Environment variable names recognized by [`Config::apply_env`].
pub mod env_key {
    pub const IP_URL: &str = "DDNS_IP_URL";
    pub const CACHE_FILE: &str = "DDNS_CACHE_FILE";
    pub const LOG_FILE: &str = "DDNS_LOG_FILE";
    pub const API_TOKEN: &str = "DDNS_API_TOKEN";
    pub const ZONE_ID: &str = "DDNS_ZONE_ID";
    pub const RECORD_ID: &str = "DDNS_RECORD_ID";
    pub const RECORD_NAME: &str = "DDNS_RECORD_NAME";
    pub const RECORD_TYPE: &str = "DDNS_RECORD_TYPE";
    pub const PROXIED: &str = "DDNS_PROXIED";
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IP-report service URL; must answer GET with the caller's IP as the body.
    #[serde(default = "default_ip_url")]
    pub ip_url: String,

    /// Location of the last-known-IP cache file.
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Log file; logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// The DNS record being kept in sync.
    #[serde(default)]
    pub record: RecordConfig,
}

fn default_ip_url() -> String {
    "https://api.ipify.org".to_string()
}

fn default_cache_file() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("ddns-sync").join("last-ip"))
        .unwrap_or_else(|| PathBuf::from("ddns-sync-cache"))
}

/// Identity and credentials of the managed DNS record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordConfig {
    /// API token (or environment variable name if prefixed with $).
    #[serde(default)]
    pub api_token: String,

    /// Zone ID.
    #[serde(default)]
    pub zone_id: String,

    /// Record ID within the zone.
    #[serde(default)]
    pub record_id: String,

    /// DNS record name (e.g., "home.example.com").
    #[serde(default)]
    pub name: String,

    /// Record type (default: "A").
    #[serde(rename = "type", default = "default_record_type")]
    pub record_type: String,

    /// Whether to proxy through Cloudflare (default: false).
    #[serde(default)]
    pub proxied: bool,
}

fn default_record_type() -> String {
    "A".to_string()
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            zone_id: String::new(),
            record_id: String::new(),
            name: String::new(),
            record_type: default_record_type(),
            proxied: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip_url: default_ip_url(),
            cache_file: default_cache_file(),
            log_file: None,
            record: RecordConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not find config directory".to_string()))?;

        Ok(config_dir.join("ddns-sync").join("config.toml"))
    }

    /// Build the effective configuration.
    ///
    /// Loads `file` if given (it must exist), otherwise the first existing
    /// default location, otherwise plain defaults; then applies environment
    /// overrides, then the CLI overrides, then resolves a `$VAR` token
    /// reference, and finally validates.
    pub fn resolve(
        file: Option<&Path>,
        cache_override: Option<&Path>,
        log_override: Option<&Path>,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load_from(path)?,
            None => match Self::find_default_file() {
                Some(path) => Self::load_from(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env()?;

        if let Some(path) = cache_override {
            config.cache_file = path.to_path_buf();
        }
        if let Some(path) = log_override {
            config.log_file = Some(path.to_path_buf());
        }

        config.record.api_token = resolve_env(&config.record.api_token)?;
        config.validate()?;
        Ok(config)
    }

    /// First existing config file among the default locations.
    fn find_default_file() -> Option<PathBuf> {
        let candidates = [
            Self::default_path().ok(),
            Some(PathBuf::from("/etc/ddns-sync/config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `DDNS_*` environment variable overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        let take = |key: &str| get(key).filter(|v| !v.is_empty());

        if let Some(v) = take(env_key::IP_URL) {
            self.ip_url = v;
        }
        if let Some(v) = take(env_key::CACHE_FILE) {
            self.cache_file = PathBuf::from(v);
        }
        if let Some(v) = take(env_key::LOG_FILE) {
            self.log_file = Some(PathBuf::from(v));
        }
        if let Some(v) = take(env_key::API_TOKEN) {
            self.record.api_token = v;
        }
        if let Some(v) = take(env_key::ZONE_ID) {
            self.record.zone_id = v;
        }
        if let Some(v) = take(env_key::RECORD_ID) {
            self.record.record_id = v;
        }
        if let Some(v) = take(env_key::RECORD_NAME) {
            self.record.name = v;
        }
        if let Some(v) = take(env_key::RECORD_TYPE) {
            self.record.record_type = v;
        }
        if let Some(v) = take(env_key::PROXIED) {
            self.record.proxied = parse_bool_flag(env_key::PROXIED, &v)?;
        }

        Ok(())
    }

    /// Check that every required value is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("record.api_token", env_key::API_TOKEN, &self.record.api_token),
            ("record.zone_id", env_key::ZONE_ID, &self.record.zone_id),
            ("record.record_id", env_key::RECORD_ID, &self.record.record_id),
            ("record.name", env_key::RECORD_NAME, &self.record.name),
            ("record.type", env_key::RECORD_TYPE, &self.record.record_type),
            ("ip_url", env_key::IP_URL, &self.ip_url),
        ];

        for (toml_key, env, value) in required {
            if value.trim().is_empty() {
                return Err(SyncError::Config(format!(
                    "{toml_key} is not set (use the config file or {env})"
                )));
            }
        }

        Ok(())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate example configuration.
    pub fn example() -> Self {
        Self {
            ip_url: default_ip_url(),
            cache_file: default_cache_file(),
            log_file: Some(PathBuf::from("/var/log/ddns-sync.log")),
            record: RecordConfig {
                api_token: "$CF_API_TOKEN".to_string(),
                zone_id: "your-zone-id".to_string(),
                record_id: "your-record-id".to_string(),
                name: "home.example.com".to_string(),
                record_type: "A".to_string(),
                proxied: false,
            },
        }
    }
}

/// Resolve environment variable references (values starting with $).
///
/// A value of `$NAME` is replaced by the content of the environment
/// variable `NAME`; an unset variable is a [`SyncError::Config`] error
/// naming it.
pub fn resolve_env(value: &str) -> Result<String> {
    match value.strip_prefix('$') {
        Some(var_name) => std::env::var(var_name).map_err(|_| {
            SyncError::Config(format!("environment variable {var_name} is not set"))
        }),
        None => Ok(value.to_string()),
    }
}

fn parse_bool_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SyncError::Config(format!(
            "{key} must be a boolean, got {raw:?}"
        ))),
    }
}
