//! The per-page source store.
//!
//! [`SourceCache`] maps normalized resource identifiers to their text, split
//! into lines, plus an optional raw buffer. Content is acquired on first use
//! through the strategy [`classify`] picks, and stays until it is invalidated
//! or the cache is dropped.

use crate::acquire::Acquired;
use crate::classify::{Strategy, classify};
use crate::config::{Config, FilterConfig, LocalConfig};
use crate::host::{AliasResolver, AliasTable, FsReader, LocalReader, PageContext};
use crate::transport::{HttpTransport, Transport};
use crate::types::{Lines, RequestContext};
use crate::utils::{remove_anchor, safe_truncate, split_lines};
use crate::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Services the cache uses to reach content outside memory.
#[derive(Clone)]
pub struct Collaborators {
    /// Opens remote requests.
    pub transport: Arc<dyn Transport>,
    /// Reads local files.
    pub reader: Arc<dyn LocalReader>,
    /// Maps `chrome://` and `resource://` aliases to local paths.
    pub aliases: Arc<dyn AliasResolver>,
}

impl Collaborators {
    /// Default collaborators: HTTP transport, filesystem reader and the
    /// configured alias tables.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(HttpTransport::new(&config.fetch)?),
            reader: Arc::new(FsReader),
            aliases: Arc::new(AliasTable::from_config(&config.aliases)),
        })
    }
}

/// Source text for one debugged page.
///
/// Every operation strips the `#anchor` from its identifier to find the
/// entry, so `a.js#L3` and `a.js` share one. Acquisition still sees the full
/// identifier: the text of `javascript:` and `data:` ids may contain `#`.
///
/// ```no_run
/// # async fn demo() -> sourcecache_core::Result<()> {
/// use sourcecache_core::{Config, DetachedPage, SourceCache};
/// use std::sync::Arc;
///
/// let mut cache = SourceCache::from_config(Arc::new(DetachedPage::new()), &Config::default())?;
/// let line = cache.get_line("https://example.com/app.js", 12).await;
/// println!("{line}");
/// # Ok(())
/// # }
/// ```
pub struct SourceCache {
    pub(crate) page: Arc<dyn PageContext>,
    pub(crate) collaborators: Collaborators,
    pub(crate) filter: FilterConfig,
    pub(crate) local: LocalConfig,
    lines: BTreeMap<String, Lines>,
    raw: BTreeMap<String, String>,
}

impl SourceCache {
    /// Create an empty cache for `page`.
    pub fn new(page: Arc<dyn PageContext>, collaborators: Collaborators, config: &Config) -> Self {
        debug!("Creating source cache for {}", page.name());
        Self {
            page,
            collaborators,
            filter: config.filter.clone(),
            local: config.local.clone(),
            lines: BTreeMap::new(),
            raw: BTreeMap::new(),
        }
    }

    /// Create an empty cache using the default collaborators.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn from_config(page: Arc<dyn PageContext>, config: &Config) -> Result<Self> {
        let collaborators = Collaborators::from_config(config)?;
        Ok(Self::new(page, collaborators, config))
    }

    /// Whether lines are stored for `id`.
    pub fn is_cached(&self, id: &str) -> bool {
        self.lines.contains_key(remove_anchor(id))
    }

    /// Lines of `id`, acquiring them if they are not stored yet.
    ///
    /// A failed remote fetch yields two diagnostic lines instead of content;
    /// see [`Diagnostic::into_lines`](crate::Diagnostic::into_lines). `None`
    /// means nothing could be found and there is nothing to report.
    pub async fn load(
        &mut self,
        id: &str,
        method: Option<&str>,
        ctx: Option<&mut RequestContext>,
    ) -> Option<Lines> {
        match self.try_load(id, method, ctx).await {
            Ok(lines) => lines,
            Err(diagnostic) => Some(diagnostic.into_lines()),
        }
    }

    /// Text of `id`. Lines keep their terminators, so this is the original text.
    pub async fn load_text(
        &mut self,
        id: &str,
        method: Option<&str>,
        ctx: Option<&mut RequestContext>,
    ) -> Option<String> {
        self.load(id, method, ctx).await.map(|lines| lines.concat())
    }

    /// Raw text of `id`.
    ///
    /// Returns the raw buffer when there is one. Remote identifiers are
    /// otherwise fetched, stored as lines and raw text, and the body returned;
    /// other identifiers are loaded normally and their raw buffer (or text)
    /// returned.
    pub async fn load_raw(&mut self, id: &str) -> Option<String> {
        let key = remove_anchor(id);
        if let Some(raw) = self.raw.get(key) {
            debug!("Raw cache hit for {key}");
            return Some(raw.clone());
        }

        if matches!(classify(id), Strategy::Remote) {
            let data = self.fetch_remote(key, None, None).await.ok()?;
            self.store(key, &data, Some(&data));
            return Some(data);
        }

        let lines = self.load(id, None, None).await?;
        Some(
            self.raw
                .get(key)
                .cloned()
                .unwrap_or_else(|| lines.concat()),
        )
    }

    /// Split `text` into lines and store them for `id`, replacing any earlier
    /// lines. A non-empty `raw` is appended to the raw buffer.
    pub fn store(&mut self, id: &str, text: &str, raw: Option<&str>) -> Lines {
        let key = remove_anchor(id);
        trace!("Storing {key}: {:?}", safe_truncate(text, 80));
        if let Some(raw) = raw.filter(|r| !r.is_empty()) {
            self.store_raw(key, raw);
        }
        self.store_split_lines(key, split_lines(text))
    }

    /// Store lines that are already split.
    pub fn store_split_lines(&mut self, id: &str, lines: Vec<String>) -> Lines {
        let lines: Lines = Arc::from(lines);
        self.lines
            .insert(remove_anchor(id).to_string(), Arc::clone(&lines));
        lines
    }

    /// Append `raw` to the raw buffer of `id` and return the whole buffer.
    pub fn store_raw(&mut self, id: &str, raw: &str) -> String {
        let buffer = self.raw.entry(remove_anchor(id).to_string()).or_default();
        buffer.push_str(raw);
        buffer.clone()
    }

    /// Drop everything stored for `id`, including responses the transport
    /// remembers for it. Unknown identifiers are ignored.
    pub fn invalidate(&mut self, id: &str) {
        let key = remove_anchor(id);
        let had_lines = self.lines.remove(key).is_some();
        let had_raw = self.raw.remove(key).is_some();
        self.collaborators.transport.invalidate(key);
        if had_lines || had_raw {
            debug!("Invalidated {key}");
        }
    }

    /// Line `line_no` (1-based) of `id`, or a placeholder in parentheses.
    ///
    /// Never fails. A resource with a single line returns that line for any
    /// line number, since minified scripts often report positions past it.
    pub async fn get_line(&mut self, id: &str, line_no: usize) -> String {
        let lines = match self.try_load(id, None, None).await {
            Ok(Some(lines)) if !lines.is_empty() => lines,
            _ => return format!("(no source for {id})"),
        };

        if let Some(line) = line_no.checked_sub(1).and_then(|i| lines.get(i)) {
            return line.clone();
        }
        if lines.len() == 1 {
            return lines[0].clone();
        }
        format!("({line_no} out of range {})", lines.len())
    }

    /// Number of identifiers with stored lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines are stored.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Identifiers with stored lines, in order.
    pub fn cached_ids(&self) -> impl Iterator<Item = &str> {
        self.lines.keys().map(String::as_str)
    }

    /// Drop all lines and raw buffers, e.g. when the page navigates away.
    pub fn clear(&mut self) {
        debug!("Clearing {} cached sources", self.lines.len());
        let transport = &self.collaborators.transport;
        for key in self.lines.keys().chain(self.raw.keys()) {
            transport.invalidate(key);
        }
        self.lines.clear();
        self.raw.clear();
    }

    pub(crate) fn replace_raw(&mut self, key: &str, raw: String) {
        self.raw.insert(key.to_string(), raw);
    }

    async fn try_load(
        &mut self,
        id: &str,
        method: Option<&str>,
        ctx: Option<&mut RequestContext>,
    ) -> Acquired {
        let key = remove_anchor(id);
        if let Some(lines) = self.lines.get(key) {
            debug!("Cache hit for {key}");
            return Ok(Some(Arc::clone(lines)));
        }

        let strategy = classify(id);
        debug!(strategy = strategy.name(), "Cache miss for {key}");

        match strategy {
            Strategy::DataUri(data) => self.load_data_uri(key, &data).map(Some),
            Strategy::InlineScript { source } => Ok(Some(self.load_inline_script(key, &source))),
            Strategy::ChromeAlias { target } => {
                self.load_chrome_alias(key, remove_anchor(&target))
            },
            Strategy::LocalFile => Ok(self.load_from_local(key, key)),
            Strategy::ResourceAlias => Ok(self.load_resource_alias(key)),
            Strategy::Remote => self.load_from_cache(key, method, ctx).await,
        }
    }
}
