use crate::models::{Query, SortKey};
use crate::paths::AppDirs;
use crate::query::QueryState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            gateway: GatewayConfig::default(),
            browse: BrowseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where the track service lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefix for `audioFile` references. Defaults to `<base_url>/uploads/`.
    #[serde(default)]
    pub audio_base_url: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            audio_base_url: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    pub fn resolved_audio_base_url(&self) -> String {
        match &self.audio_base_url {
            Some(url) => url.clone(),
            None => format!("{}/uploads/", self.base_url.trim_end_matches('/')),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default)]
    pub default_sort: SortKey,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            default_sort: SortKey::default(),
        }
    }
}

impl BrowseConfig {
    /// Initial query state for the collection browser.
    pub fn query_state(&self) -> QueryState {
        let query = Query::first_page(self.page_size).with_sort(self.default_sort);
        QueryState::from_query(query, Duration::from_millis(self.search_debounce_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    #[serde(default = "default_stdout_enabled")]
    pub stdout: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            stdout: default_stdout_enabled(),
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("browse.page_size must be at least 1")]
    PageSize,
    #[error("{field} is not a valid URL ({value}): {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    /// Loads `config.toml` from the platform config directory, or defaults when absent.
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = Self::config_path(dirs);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads an explicit config file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_file()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        if self.browse.page_size == 0 {
            return Err(ValidationError::PageSize);
        }
        check_url("gateway.base_url", &self.gateway.base_url)?;
        if let Some(audio) = &self.gateway.audio_base_url {
            check_url("gateway.audio_base_url", audio)?;
        }
        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|err| ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: err.to_string(),
        })
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_page_size() -> u32 {
    10
}

fn default_search_debounce_ms() -> u64 {
    400
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

fn default_stdout_enabled() -> bool {
    true
}
