//! Configuration discovery for the CLI.

use anyhow::{Context, Result};
use sourcecache_core::Config;
use std::path::Path;
use tracing::debug;

/// Load configuration from `path` when given, otherwise from the platform
/// config directory (or defaults).
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        },
        None => Config::load().context("Failed to load config"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[local]\ncache_local_files = true\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.local.cache_local_files);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
