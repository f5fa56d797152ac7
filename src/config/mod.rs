//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/placefinder/config.toml

pub mod defaults;

use crate::constants::{api, search, storage};
use crate::error::{Error, Result};
use crate::place::{Place, PostalCode};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// External provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Text-search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Place used when nothing better can be resolved
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Durable storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// External provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Postal-code database base URL
    #[serde(default = "default_postal_url")]
    pub postal_url: String,

    /// Reverse/forward geocoding base URL
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    /// Base URL of the first-party search proxy
    #[serde(default = "default_search_proxy_url")]
    pub search_proxy_url: String,

    /// IP geolocation endpoint
    #[serde(default = "default_ip_location_url")]
    pub ip_location_url: String,

    /// Client identifier sent on every outbound request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header for geocoding requests
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Country filter for forward geocoding
    #[serde(default = "default_country_codes")]
    pub country_codes: String,

    /// Maximum forward-geocoding results
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Text-search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum query length before any lookup
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

/// Fallback place settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_city")]
    pub city: String,

    #[serde(default = "default_fallback_state")]
    pub state: String,

    #[serde(default = "default_fallback_postal_code")]
    pub postal_code: String,
}

/// Durable storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Namespace directory for stored entries
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Override for the base storage directory (defaults to the XDG cache dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_postal_url() -> String {
    api::VIACEP_URL.to_string()
}
fn default_geocoder_url() -> String {
    api::NOMINATIM_URL.to_string()
}
fn default_search_proxy_url() -> String {
    format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT)
}
fn default_ip_location_url() -> String {
    api::IP_API_URL.to_string()
}
fn default_user_agent() -> String {
    api::USER_AGENT.to_string()
}
fn default_accept_language() -> String {
    api::ACCEPT_LANGUAGE.to_string()
}
fn default_country_codes() -> String {
    DEFAULT_COUNTRY_CODES.to_string()
}
fn default_search_limit() -> usize {
    search::RESULT_LIMIT
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_debounce_ms() -> u64 {
    search::DEBOUNCE_MS
}
fn default_min_query_len() -> usize {
    search::MIN_QUERY_LEN
}
fn default_fallback_city() -> String {
    DEFAULT_FALLBACK_CITY.to_string()
}
fn default_fallback_state() -> String {
    DEFAULT_FALLBACK_STATE.to_string()
}
fn default_fallback_postal_code() -> String {
    DEFAULT_FALLBACK_POSTAL_CODE.to_string()
}
fn default_namespace() -> String {
    storage::NAMESPACE.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            postal_url: default_postal_url(),
            geocoder_url: default_geocoder_url(),
            search_proxy_url: default_search_proxy_url(),
            ip_location_url: default_ip_location_url(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            country_codes: default_country_codes(),
            search_limit: default_search_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            city: default_fallback_city(),
            state: default_fallback_state(),
            postal_code: default_fallback_postal_code(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            dir: None,
        }
    }
}

impl ProvidersConfig {
    /// Outbound request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SearchConfig {
    /// Debounce delay
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl FallbackConfig {
    /// The configured fallback as a place record
    ///
    /// An unusable configured postal code degrades to the region sentinel so
    /// the fallback never carries a partial code.
    pub fn place(&self) -> Place {
        let postal_code = PostalCode::parse(&self.postal_code)
            .map(|code| code.to_string())
            .unwrap_or_else(|| crate::constants::place::REGION_SENTINEL.to_string());

        Place {
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code,
            neighborhood: None,
        }
    }
}

impl StorageConfig {
    /// Directory holding the namespaced storage entries
    pub fn storage_dir(&self) -> Option<PathBuf> {
        let base = match &self.dir {
            Some(dir) => Some(dir.clone()),
            None => dirs::cache_dir(),
        };
        base.map(|p| p.join(&self.namespace))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["providers", "postal_url"] => Some(self.providers.postal_url.clone()),
            ["providers", "geocoder_url"] => Some(self.providers.geocoder_url.clone()),
            ["providers", "search_proxy_url"] => Some(self.providers.search_proxy_url.clone()),
            ["providers", "ip_location_url"] => Some(self.providers.ip_location_url.clone()),
            ["providers", "user_agent"] => Some(self.providers.user_agent.clone()),
            ["providers", "accept_language"] => Some(self.providers.accept_language.clone()),
            ["providers", "country_codes"] => Some(self.providers.country_codes.clone()),
            ["providers", "search_limit"] => Some(self.providers.search_limit.to_string()),
            ["providers", "timeout_secs"] => Some(self.providers.timeout_secs.to_string()),

            ["search", "debounce_ms"] => Some(self.search.debounce_ms.to_string()),
            ["search", "min_query_len"] => Some(self.search.min_query_len.to_string()),

            ["fallback", "city"] => Some(self.fallback.city.clone()),
            ["fallback", "state"] => Some(self.fallback.state.clone()),
            ["fallback", "postal_code"] => Some(self.fallback.postal_code.clone()),

            ["storage", "namespace"] => Some(self.storage.namespace.clone()),
            ["storage", "dir"] => Some(
                self.storage
                    .dir
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default(),
            ),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["providers", "postal_url"] => {
                self.providers.postal_url = value.to_string();
            }
            ["providers", "geocoder_url"] => {
                self.providers.geocoder_url = value.to_string();
            }
            ["providers", "search_proxy_url"] => {
                self.providers.search_proxy_url = value.to_string();
            }
            ["providers", "ip_location_url"] => {
                self.providers.ip_location_url = value.to_string();
            }
            ["providers", "user_agent"] => {
                if value.trim().is_empty() {
                    return Err(Error::Config("User agent must not be empty".to_string()));
                }
                self.providers.user_agent = value.to_string();
            }
            ["providers", "accept_language"] => {
                self.providers.accept_language = value.to_string();
            }
            ["providers", "country_codes"] => {
                self.providers.country_codes = value.to_string();
            }
            ["providers", "search_limit"] => {
                self.providers.search_limit = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid search limit: {}", value))
                })?;
            }
            ["providers", "timeout_secs"] => {
                self.providers.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["search", "debounce_ms"] => {
                self.search.debounce_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid debounce value: {}", value))
                })?;
            }
            ["search", "min_query_len"] => {
                self.search.min_query_len = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid minimum query length: {}", value))
                })?;
            }

            ["fallback", "city"] => {
                if value.trim().is_empty() {
                    return Err(Error::Config("Fallback city must not be empty".to_string()));
                }
                self.fallback.city = value.to_string();
            }
            ["fallback", "state"] => {
                if value.trim().is_empty() {
                    return Err(Error::Config("Fallback state must not be empty".to_string()));
                }
                self.fallback.state = value.to_uppercase();
            }
            ["fallback", "postal_code"] => {
                let code = PostalCode::parse(value).ok_or_else(|| {
                    Error::Config(format!("Invalid postal code: {}", value))
                })?;
                self.fallback.postal_code = code.to_string();
            }

            ["storage", "namespace"] => {
                self.storage.namespace = value.to_string();
            }
            ["storage", "dir"] => {
                self.storage.dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "providers.postal_url",
            "providers.geocoder_url",
            "providers.search_proxy_url",
            "providers.ip_location_url",
            "providers.user_agent",
            "providers.accept_language",
            "providers.country_codes",
            "providers.search_limit",
            "providers.timeout_secs",
            "search.debounce_ms",
            "search.min_query_len",
            "fallback.city",
            "fallback.state",
            "fallback.postal_code",
            "storage.namespace",
            "storage.dir",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
