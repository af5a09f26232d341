//! Configuration sources: TOML config files, environment variables, and
//! client tuning options.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Section holding the credential keys.
pub const CREDENTIALS_SECTION: &str = "Credentials";

/// Recognized keys in the credentials section.
pub const ACCESS_KEY: &str = "aws_access_key_id";
pub const SECRET_KEY: &str = "aws_secret_access_key";
pub const LOCALE_KEY: &str = "aws_product_locale";
pub const ASSOCIATE_TAG_KEY: &str = "aws_associate_tag";

/// API version used unless overridden.
pub const DEFAULT_API_VERSION: &str = "2011-08-01";

/// Key-value lookup consulted when resolving credentials.
pub trait ConfigSource: Send + Sync {
    /// Returns the value stored under `section`/`key`, if any.
    fn get(&self, section: &str, key: &str) -> Option<String>;
}

/// Reads credential keys from upper-cased environment variables
/// (`aws_access_key_id` -> `AWS_ACCESS_KEY_ID`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        if section != CREDENTIALS_SECTION {
            return None;
        }
        std::env::var(key.to_uppercase()).ok()
    }
}

/// A parsed config file.
///
/// ```toml
/// [Credentials]
/// aws_access_key_id = "ABCDEFGH12345"
/// aws_secret_access_key = "abcdegf43"
/// aws_product_locale = "de"
///
/// [Settings]
/// requests_per_second = 1.0
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    table: toml::Table,
    path: Option<PathBuf>,
}

impl ConfigFile {
    /// Parses config file content.
    pub fn parse(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).context("Failed to parse config")?;
        Ok(Self { table, path: None })
    }

    /// Loads a config file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut file = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        file.path = Some(path.to_path_buf());
        Ok(file)
    }

    /// Loads configuration from the explicit path or the first default
    /// location that exists. Returns an empty config when none is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        for candidate in Self::default_locations() {
            if candidate.exists() {
                debug!("Found config at {}", candidate.display());
                return Self::from_file(candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Default config locations, most specific first.
    pub fn default_locations() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".amazon-product-api"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("amazon-product-api").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/amazon-product-api.cfg"));
        paths
    }

    /// Path the config was loaded from, if it came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Client options from the `[Settings]` table, or defaults.
    pub fn options(&self) -> Result<ClientOptions> {
        match self.table.get("Settings") {
            Some(settings) => settings
                .clone()
                .try_into::<ClientOptions>()
                .context("Failed to parse [Settings] section"),
            None => Ok(ClientOptions::default()),
        }
    }
}

impl ConfigSource for ConfigFile {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        let value = self.table.get(section)?.as_table()?.get(key)?;
        match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Tuning options for the HTTP layer and throttling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// API version sent with every request
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Maximum calls per second issued by one client
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_requests_per_second() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            proxy: None,
        }
    }
}
