//! Capabilities the cache borrows from its host environment.
//!
//! The cache never touches the page, the filesystem or the alias registry
//! directly. It goes through these traits, so a debugger can plug in its own
//! page model and tests can substitute fakes. Default implementations cover the
//! standalone case: [`FsReader`] reads real files, [`AliasTable`] maps aliases
//! from configuration, and [`DetachedPage`] is a context with no live page.

use crate::config::AliasConfig;
use crate::{Error, Result, SessionEntry};
use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// The debugged page a [`SourceCache`](crate::SourceCache) belongs to.
///
/// Everything here is read-only from the cache's point of view. Lookups that
/// fail return `Err`; the cache logs and treats them as absent.
pub trait PageContext: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> String;

    /// URL of the document currently displayed, without re-navigation.
    fn active_document_url(&self) -> Option<String>;

    /// Character set of the displayed document, used to decode fetched text.
    fn document_charset(&self) -> Option<String> {
        None
    }

    /// Session-history entry of the displayed document.
    fn active_session_entry(&self) -> Result<Option<SessionEntry>> {
        Ok(None)
    }

    /// Recover the form body that was submitted to `href` from page state.
    fn post_text_from_page(&self, _href: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// Recover a request body from a recorded or in-flight request.
    fn post_text_from_request(&self, _request_id: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Reads the full text of a local resource.
pub trait LocalReader: Send + Sync {
    /// Read `location`, a `file://` URL or a plain path.
    fn read_local_resource(&self, location: &str) -> Result<String>;
}

/// Maps `chrome://` and `resource://` aliases to local file URLs.
pub trait AliasResolver: Send + Sync {
    /// Local URL for `alias`, or `None` if the alias is unknown.
    fn resolve_alias_to_local_path(&self, alias: &Url) -> Option<Url>;
}

/// A page context for use outside a live page (CLI, tests).
#[derive(Debug, Clone, Default)]
pub struct DetachedPage {
    document_url: Option<String>,
}

impl DetachedPage {
    /// A context with no active document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that reports `url` as its active document.
    #[must_use]
    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }
}

impl PageContext for DetachedPage {
    fn name(&self) -> String {
        self.document_url
            .clone()
            .unwrap_or_else(|| "detached".to_string())
    }

    fn active_document_url(&self) -> Option<String> {
        self.document_url.clone()
    }
}

/// [`LocalReader`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FsReader {
    fn to_path(location: &str) -> Result<PathBuf> {
        if location.starts_with("file:") {
            let url = Url::parse(location)?;
            return url
                .to_file_path()
                .map_err(|()| Error::InvalidUrl(format!("not a local file URL: {location}")));
        }
        Ok(PathBuf::from(location))
    }
}

impl LocalReader for FsReader {
    fn read_local_resource(&self, location: &str) -> Result<String> {
        let path = Self::to_path(location)?;
        let bytes = std::fs::read(&path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// [`AliasResolver`] driven by the `[aliases]` config tables.
///
/// `chrome://pkg/content/a.js` with `pkg = "/ext/chrome"` resolves to
/// `file:///ext/chrome/content/a.js`.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    resource: BTreeMap<String, PathBuf>,
    chrome: BTreeMap<String, PathBuf>,
}

impl AliasTable {
    /// Build from configuration.
    pub fn from_config(config: &AliasConfig) -> Self {
        Self {
            resource: config.resource.clone(),
            chrome: config.chrome.clone(),
        }
    }

    /// Register a `resource://name/` root.
    #[must_use]
    pub fn with_resource(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.resource.insert(name.into(), root.into());
        self
    }

    /// Register a `chrome://package/` root.
    #[must_use]
    pub fn with_chrome(mut self, package: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.chrome.insert(package.into(), root.into());
        self
    }

    fn join(root: &Path, url_path: &str) -> PathBuf {
        let decoded = percent_decode_str(url_path).decode_utf8_lossy();
        root.join(decoded.trim_start_matches('/'))
    }
}

impl AliasResolver for AliasTable {
    fn resolve_alias_to_local_path(&self, alias: &Url) -> Option<Url> {
        let table = match alias.scheme() {
            "chrome" => &self.chrome,
            "resource" => &self.resource,
            _ => return None,
        };
        let root = table.get(alias.host_str()?)?;
        Url::from_file_path(Self::join(root, alias.path())).ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_reader_reads_file_url_and_plain_path() -> Result<()> {
        // Given: A file on disk
        let dir = TempDir::new()?;
        let path = dir.path().join("a.js");
        std::fs::write(&path, "var a = 1;\n")?;
        let url = Url::from_file_path(&path).unwrap();

        // When/Then: Both spellings read the same content
        assert_eq!(FsReader.read_local_resource(url.as_str())?, "var a = 1;\n");
        assert_eq!(
            FsReader.read_local_resource(path.to_str().unwrap())?,
            "var a = 1;\n"
        );
        Ok(())
    }

    #[test]
    fn test_fs_reader_missing_file_is_io_error() {
        let err = FsReader
            .read_local_resource("/definitely/does/not/exist.js")
            .unwrap_err();
        assert_eq!(err.category(), "io");
    }

    #[cfg(unix)]
    #[test]
    fn test_alias_table_resolves_chrome_and_resource() {
        let table = AliasTable::default()
            .with_chrome("pkg", "/ext/chrome")
            .with_resource("gre", "/opt/gre");

        let chrome = Url::parse("chrome://pkg/content/my%20file.js").unwrap();
        assert_eq!(
            table.resolve_alias_to_local_path(&chrome).unwrap().as_str(),
            "file:///ext/chrome/content/my%20file.js"
        );

        let resource = Url::parse("resource://gre/modules/x.jsm").unwrap();
        assert_eq!(
            table.resolve_alias_to_local_path(&resource).unwrap().as_str(),
            "file:///opt/gre/modules/x.jsm"
        );
    }

    #[test]
    fn test_alias_table_unknown_alias() {
        let table = AliasTable::default().with_chrome("pkg", "/ext");
        let unknown = Url::parse("chrome://other/content/a.js").unwrap();
        assert!(table.resolve_alias_to_local_path(&unknown).is_none());

        let http = Url::parse("http://pkg/content/a.js").unwrap();
        assert!(table.resolve_alias_to_local_path(&http).is_none());
    }

    #[test]
    fn test_detached_page_defaults() {
        let page = DetachedPage::new();
        assert_eq!(page.name(), "detached");
        assert!(page.active_document_url().is_none());
        assert!(page.active_session_entry().unwrap().is_none());
        assert!(page.post_text_from_page("http://x").unwrap().is_none());
    }
}
