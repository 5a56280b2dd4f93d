use super::Acquired;
use crate::types::Lines;
use crate::utils::split_lines;
use crate::SourceCache;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

impl SourceCache {
    /// Read a local resource at `location` on behalf of `key`.
    ///
    /// Empty or unreadable files yield `None`. The result only enters the
    /// store when local caching is enabled and `key` is not volatile.
    pub(crate) fn load_from_local(&mut self, key: &str, location: &str) -> Option<Lines> {
        let text = match self.collaborators.reader.read_local_resource(location) {
            Ok(text) if text.is_empty() => {
                debug!("Local resource {location} is empty");
                return None;
            },
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to read local resource {location}");
                return None;
            },
        };

        if self.local.should_cache(key) {
            return Some(self.store(key, &text, None));
        }
        debug!("Not caching local read of {key}");
        Some(Arc::from(split_lines(&text)))
    }

    /// `resource://` aliases read the mapped file, or the identifier itself
    /// when the alias is unknown.
    pub(crate) fn load_resource_alias(&mut self, key: &str) -> Option<Lines> {
        let location = Url::parse(key)
            .ok()
            .and_then(|alias| self.collaborators.aliases.resolve_alias_to_local_path(&alias))
            .map_or_else(|| key.to_string(), String::from);
        self.load_from_local(key, &location)
    }

    /// `chrome://` aliases are mapped to a local file first. Problems come
    /// back as single-line content that is shown but never stored.
    pub(crate) fn load_chrome_alias(&mut self, key: &str, target: &str) -> Acquired {
        if self.filter.filter_system_urls {
            debug!("Filtering system URL {key}");
            return Ok(Some(one_line(format!("Filtered chrome url {key}"))));
        }

        let Ok(alias) = Url::parse(target) else {
            return Ok(Some(one_line(format!("failed to make URI from {target}"))));
        };
        let Some(local) = self.collaborators.aliases.resolve_alias_to_local_path(&alias) else {
            return Ok(Some(one_line(format!(
                "failed to convert chrome URL to a local path: {target}"
            ))));
        };

        debug!("Resolved {target} to {local}");
        Ok(self.load_from_local(key, local.as_str()))
    }
}

fn one_line(message: String) -> Lines {
    Arc::from(vec![message])
}
