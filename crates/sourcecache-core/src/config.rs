//! Configuration for the source cache and its default collaborators.
//!
//! Configuration is stored in TOML format. [`Config::load`] reads the
//! platform config file when it exists and falls back to defaults otherwise;
//! a few fields can be overridden through `SOURCECACHE_*` environment
//! variables.
//!
//! ## File Location
//!
//! - Linux: `~/.config/sourcecache/config.toml`
//! - macOS: `~/Library/Application Support/dev.sourcecache.sourcecache/config.toml`
//! - Windows: `%APPDATA%\sourcecache\sourcecache\config\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [fetch]
//! timeout_secs = 10
//! prefer_cache = true
//! max_cached_responses = 256
//!
//! [filter]
//! filter_system_urls = false
//!
//! [local]
//! cache_local_files = true
//! volatile_suffixes = [".properties", ".dtd"]
//!
//! [aliases.resource]
//! gre = "/usr/lib/firefox"
//!
//! [aliases.chrome]
//! myext = "/home/me/src/myext/chrome"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`FetchConfig::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "SOURCECACHE_TIMEOUT_SECS";
/// Environment variable overriding [`FilterConfig::filter_system_urls`].
pub const ENV_FILTER_SYSTEM_URLS: &str = "SOURCECACHE_FILTER_SYSTEM_URLS";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transport settings for remote fetches
    pub fetch: FetchConfig,
    /// Which identifiers are hidden from the debugger
    pub filter: FilterConfig,
    /// Local read caching policy
    pub local: LocalConfig,
    /// `resource://` and `chrome://` alias tables
    pub aliases: AliasConfig,
}

/// Settings for [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Client-wide request timeout. The cache itself never times out a fetch.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Serve previously fetched responses from the transport's response cache.
    pub prefer_cache: bool,
    /// Responses kept in the transport's response cache before the oldest
    /// are evicted. Zero disables it.
    pub max_cached_responses: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("sourcecache/", env!("CARGO_PKG_VERSION")).to_string(),
            prefer_cache: true,
            max_cached_responses: 512,
        }
    }
}

/// Filtering of system (browser-internal) identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Replace `chrome://` content with a one-line "filtered" notice.
    pub filter_system_urls: bool,
}

/// Caching policy for locally read resources.
///
/// Local reads are not cached by default: the files can change between
/// lookups and re-reading them is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Cache local reads that are not volatile.
    pub cache_local_files: bool,
    /// Suffixes of resources that are never cached (localized strings and the like).
    pub volatile_suffixes: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            cache_local_files: false,
            volatile_suffixes: vec![
                ".properties".to_string(),
                ".dtd".to_string(),
                ".ftl".to_string(),
            ],
        }
    }
}

impl LocalConfig {
    /// Whether a local read of `id` may be written into the store.
    pub fn should_cache(&self, id: &str) -> bool {
        self.cache_local_files && !self.is_volatile(id)
    }

    /// Localized resources change across sessions and are always re-read.
    pub fn is_volatile(&self, id: &str) -> bool {
        id.contains("/locale/")
            || self
                .volatile_suffixes
                .iter()
                .any(|suffix| id.ends_with(suffix.as_str()))
    }
}

/// Alias tables used by [`AliasTable`](crate::AliasTable).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// `resource://<name>/...` → local directory.
    pub resource: BTreeMap<String, PathBuf>,
    /// `chrome://<package>/...` → local directory.
    pub chrome: BTreeMap<String, PathBuf>,
}

impl Config {
    /// Load configuration from the default location, or defaults if absent.
    ///
    /// Environment overrides are applied in both cases.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// an override variable holds an invalid value.
    pub fn load() -> Result<Self> {
        let config = match Self::config_path() {
            Some(path) if path.exists() => Self::read(&path)?,
            _ => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Load configuration from an explicit file, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::read(path)?.with_env_overrides()
    }

    /// Write this configuration to `path` as pretty TOML.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Platform config file path, when a home directory can be determined.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "sourcecache", "sourcecache")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(ENV_TIMEOUT_SECS).ok().as_deref(),
            std::env::var(ENV_FILTER_SYSTEM_URLS).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, timeout: Option<&str>, filter: Option<&str>) -> Result<Self> {
        if let Some(raw) = timeout {
            self.fetch.timeout_secs = raw.trim().parse().map_err(|e| {
                Error::Config(format!("{ENV_TIMEOUT_SECS} must be a number of seconds: {e}"))
            })?;
        }
        if let Some(raw) = filter {
            self.filter.filter_system_urls = parse_flag(raw).ok_or_else(|| {
                Error::Config(format!("{ENV_FILTER_SYSTEM_URLS} must be true/false, got '{raw}'"))
            })?;
        }
        Ok(self)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
