use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::WikiError;
use crate::services::DEFAULT_CATALOG_LIMIT;

/// Page backend selected at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// One `<title>.txt` file per page under `pages_dir`
    Files,
    /// SQLite database at `url`
    Database { url: String },
}

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub pages_dir: PathBuf,
    pub static_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub catalog_limit: usize,
    pub access_log: bool,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            backend: Backend::Files,
            pages_dir: PathBuf::from("pages"),
            static_dir: PathBuf::from("static"),
            templates_dir: PathBuf::from("templates"),
            host: "0.0.0.0".to_string(),
            port: 8080,
            catalog_limit: DEFAULT_CATALOG_LIMIT,
            access_log: true,
        }
    }

    /// Build the configuration from `QUILL_*` environment variables
    pub fn from_env() -> Result<Self, WikiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, starting from the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WikiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(dir) = lookup("QUILL_PAGES_DIR") {
            config.pages_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("QUILL_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("QUILL_TEMPLATES_DIR") {
            config.templates_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("QUILL_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("QUILL_PORT") {
            config.port = parse_value("QUILL_PORT", &port)?;
        }
        if let Some(limit) = lookup("QUILL_CATALOG_LIMIT") {
            config.catalog_limit = parse_value("QUILL_CATALOG_LIMIT", &limit)?;
        }
        if let Some(flag) = lookup("QUILL_ACCESS_LOG") {
            config.access_log = parse_flag("QUILL_ACCESS_LOG", &flag)?;
        }

        let backend = lookup("QUILL_BACKEND").unwrap_or_else(|| "files".to_string());
        config.backend = match backend.to_ascii_lowercase().as_str() {
            "files" | "file" => Backend::Files,
            "database" | "db" => Backend::Database {
                url: lookup("QUILL_DATABASE_URL").unwrap_or_else(|| "sqlite://wiki.db".to_string()),
            },
            other => {
                return Err(WikiError::Config(format!("unknown backend '{}'", other)));
            }
        };

        Ok(config)
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> Result<SocketAddr, WikiError> {
        let ip = IpAddr::from_str(&self.host)
            .map_err(|e| WikiError::Config(format!("invalid host '{}': {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, WikiError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| WikiError::Config(format!("{}='{}': {}", key, raw, e)))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, WikiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(WikiError::Config(format!("{}='{}' is not a boolean", key, raw))),
    }
}
