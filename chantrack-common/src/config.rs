//! Service configuration
//!
//! Two sources feed [`ServiceConfig`], highest priority first:
//!
//! 1. Environment variables (`CHANTRACK_*`)
//! 2. TOML bootstrap file (`CHANTRACK_CONFIG`, or `~/.config/chantrack/config.toml`)
//! 3. Built-in defaults
//!
//! A missing TOML file is not an error. A malformed one is. The identity
//! provider client id and the YouTube Data API key have no default and must
//! come from one of the two sources.
//!
//! Configuration is static: the service must restart to pick up changes.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming an explicit TOML config file
pub const CONFIG_FILE_ENV: &str = "CHANTRACK_CONFIG";

pub const HOST_ENV: &str = "CHANTRACK_HOST";
pub const PORT_ENV: &str = "CHANTRACK_PORT";
pub const DATABASE_PATH_ENV: &str = "CHANTRACK_DATABASE_PATH";
pub const DB_MAX_CONNECTIONS_ENV: &str = "CHANTRACK_DB_MAX_CONNECTIONS";
pub const GOOGLE_CLIENT_ID_ENV: &str = "CHANTRACK_GOOGLE_CLIENT_ID";
pub const YOUTUBE_API_KEY_ENV: &str = "CHANTRACK_YOUTUBE_API_KEY";
pub const YOUTUBE_API_BASE_URL_ENV: &str = "CHANTRACK_YOUTUBE_API_BASE_URL";
pub const TOKENINFO_URL_ENV: &str = "CHANTRACK_TOKENINFO_URL";
pub const RATE_LIMIT_MAX_REQUESTS_ENV: &str = "CHANTRACK_RATE_LIMIT_MAX_REQUESTS";
pub const RATE_LIMIT_WINDOW_SECS_ENV: &str = "CHANTRACK_RATE_LIMIT_WINDOW_SECS";
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CHANTRACK_CORS_ALLOWED_ORIGINS";
pub const HTTP_TIMEOUT_SECS_ENV: &str = "CHANTRACK_HTTP_TIMEOUT_SECS";
pub const LOG_LEVEL_ENV: &str = "CHANTRACK_LOG_LEVEL";
pub const LOG_FILE_ENV: &str = "CHANTRACK_LOG_FILE";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Bootstrap configuration as it appears in the TOML file
///
/// Every field is optional; anything left out falls through to the
/// built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub db_max_connections: Option<u32>,
    pub google_client_id: Option<String>,
    pub youtube_api_key: Option<String>,
    pub youtube_api_base_url: Option<String>,
    pub tokeninfo_url: Option<String>,
    pub rate_limit_max_requests: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub http_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: TomlLoggingConfig,
}

/// `[logging]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlLoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log file path (logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Interface the HTTP server binds to
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Upper bound on pooled database connections
    pub db_max_connections: u32,
    /// Expected audience of caller ID tokens
    pub google_client_id: String,
    /// YouTube Data API key
    pub youtube_api_key: String,
    pub youtube_api_base_url: String,
    pub tokeninfo_url: String,
    /// Requests accepted per client address within one window
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    /// Origins allowed by CORS; empty means any origin
    pub cors_allowed_origins: Vec<String>,
    /// Timeout applied to outbound calls (identity provider, YouTube)
    pub http_timeout_secs: u64,
    pub logging: LoggingConfig,
    /// TOML file the configuration was read from, if any
    pub config_file: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration from the process environment and the TOML file
    pub fn load() -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let config_file = match env(CONFIG_FILE_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => default_config_file().filter(|path| path.exists()),
        };

        let toml_config = match &config_file {
            Some(path) => read_toml_config(path)?,
            None => TomlConfig::default(),
        };

        let mut config = Self::resolve(toml_config, env)?;
        config.config_file = config_file;
        Ok(config)
    }

    /// Merge a TOML config with environment values and built-in defaults
    ///
    /// `env` looks up a variable by name; [`ServiceConfig::load`] passes the
    /// process environment, tests pass a map.
    pub fn resolve<F>(toml: TomlConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = env(HOST_ENV)
            .or(toml.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_env(&env, PORT_ENV)?
            .or(toml.port)
            .unwrap_or(DEFAULT_PORT);
        let database_path = env(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .or(toml.database_path)
            .unwrap_or_else(default_database_path);
        let db_max_connections = parse_env(&env, DB_MAX_CONNECTIONS_ENV)?
            .or(toml.db_max_connections)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);

        let google_client_id = required_credential(
            env(GOOGLE_CLIENT_ID_ENV).or(toml.google_client_id),
            GOOGLE_CLIENT_ID_ENV,
            "google_client_id",
        )?;
        let youtube_api_key = required_credential(
            env(YOUTUBE_API_KEY_ENV).or(toml.youtube_api_key),
            YOUTUBE_API_KEY_ENV,
            "youtube_api_key",
        )?;

        let youtube_api_base_url = env(YOUTUBE_API_BASE_URL_ENV)
            .or(toml.youtube_api_base_url)
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string());
        let tokeninfo_url = env(TOKENINFO_URL_ENV)
            .or(toml.tokeninfo_url)
            .unwrap_or_else(|| DEFAULT_TOKENINFO_URL.to_string());

        let rate_limit_max_requests = parse_env(&env, RATE_LIMIT_MAX_REQUESTS_ENV)?
            .or(toml.rate_limit_max_requests)
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS);
        let rate_limit_window_secs = parse_env(&env, RATE_LIMIT_WINDOW_SECS_ENV)?
            .or(toml.rate_limit_window_secs)
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
        if rate_limit_max_requests == 0 || rate_limit_window_secs == 0 {
            return Err(Error::Config(
                "Rate limit max requests and window must both be greater than zero".to_string(),
            ));
        }

        let cors_allowed_origins = env(CORS_ALLOWED_ORIGINS_ENV)
            .map(|value| split_list(&value))
            .or(toml.cors_allowed_origins)
            .unwrap_or_default();

        let http_timeout_secs = parse_env(&env, HTTP_TIMEOUT_SECS_ENV)?
            .or(toml.http_timeout_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if http_timeout_secs == 0 {
            return Err(Error::Config(
                "HTTP timeout must be greater than zero".to_string(),
            ));
        }

        let logging = LoggingConfig {
            level: env(LOG_LEVEL_ENV)
                .or(toml.logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            file: env(LOG_FILE_ENV).map(PathBuf::from).or(toml.logging.file),
        };

        Ok(Self {
            host,
            port,
            database_path,
            db_max_connections,
            google_client_id,
            youtube_api_key,
            youtube_api_base_url,
            tokeninfo_url,
            rate_limit_max_requests,
            rate_limit_window_secs,
            cors_allowed_origins,
            http_timeout_secs,
            logging,
            config_file: None,
        })
    }

    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Platform config file location (`~/.config/chantrack/config.toml` on Linux)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chantrack").join("config.toml"))
}

/// Platform default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("chantrack"))
        .unwrap_or_else(|| PathBuf::from("./chantrack_data"))
        .join("chantrack.db")
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn required_credential(value: Option<String>, env_name: &str, toml_key: &str) -> Result<String> {
    match value {
        Some(key) if is_valid_key(&key) => Ok(key.trim().to_string()),
        _ => Err(Error::Config(format!(
            "{} not configured. Set the {} environment variable or `{}` in the TOML config",
            toml_key, env_name, toml_key
        ))),
    }
}

fn parse_env<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {:?} ({})", key, raw, e))),
        None => Ok(None),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
