//! Resource identifier classification.
//!
//! [`classify`] decides which acquisition path serves an identifier. It looks
//! only at the string, never at the network or the filesystem, and always
//! returns a strategy: anything it doesn't recognize is fetched remotely.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Platform rewrite of chrome URLs loaded without native wrappers: `A -> B`.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static WRAPPER_MUNGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S*)\s*->\s*(\S*)").unwrap());

const JAVASCRIPT_PREFIX: &str = "javascript:";
const CHROME_PREFIX: &str = "chrome://";
const FILE_PREFIX: &str = "file://";
const RESOURCE_PREFIX: &str = "resource://";

/// How the content of an identifier is acquired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    /// Decode the payload of a `data:` URI.
    DataUri(DataUrl),
    /// Use the text after `javascript:` as the source.
    InlineScript {
        /// Script source following the scheme prefix.
        source: String,
    },
    /// Map a `chrome://` alias to a local path, then read it.
    ChromeAlias {
        /// Alias to resolve, after undoing any wrapper munge.
        target: String,
    },
    /// Read a `file://` URL.
    LocalFile,
    /// Map a `resource://` alias to a local path, then read it.
    ResourceAlias,
    /// Fetch through the cache-preferring transport.
    Remote,
}

impl Strategy {
    /// Short stable name, used in logs and CLI output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DataUri(_) => "data_uri",
            Self::InlineScript { .. } => "inline_script",
            Self::ChromeAlias { .. } => "chrome_alias",
            Self::LocalFile => "local_file",
            Self::ResourceAlias => "resource_alias",
            Self::Remote => "remote",
        }
    }
}

/// The parts of a `data:[<media type>][;charset=..][;base64],<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataUrl {
    /// Declared media type, `text/plain` when omitted.
    pub media_type: String,
    /// `charset` parameter, if present.
    pub charset: Option<String>,
    /// Whether the payload is base64 rather than percent-encoded.
    pub base64: bool,
    /// Payload exactly as it appears after the comma.
    pub encoded_content: String,
}

impl DataUrl {
    /// Split a data URI into its header fields and payload.
    ///
    /// Returns `None` for anything that isn't a `data:` URI with a `,`.
    ///
    /// ```
    /// use sourcecache_core::classify::DataUrl;
    ///
    /// let d = DataUrl::parse("data:text/javascript;base64,YWxlcnQoMSk=").unwrap();
    /// assert_eq!(d.media_type, "text/javascript");
    /// assert!(d.base64);
    /// assert_eq!(d.encoded_content, "YWxlcnQoMSk=");
    /// ```
    pub fn parse(id: &str) -> Option<Self> {
        let rest = strip_prefix_ignore_case(id.trim_start(), "data:")?;
        let (header, payload) = rest.split_once(',')?;

        let mut params = header.split(';').map(str::trim);
        let media_type = params
            .next()
            .filter(|m| !m.is_empty())
            .unwrap_or("text/plain")
            .to_ascii_lowercase();

        let mut charset = None;
        let mut base64 = false;
        for param in params {
            if param.eq_ignore_ascii_case("base64") {
                base64 = true;
            } else if let Some((key, value)) = param.split_once('=') {
                if key.trim().eq_ignore_ascii_case("charset") {
                    charset = Some(value.trim().to_string());
                }
            }
        }

        Some(Self {
            media_type,
            charset,
            base64,
            encoded_content: payload.to_string(),
        })
    }
}

/// Pick the acquisition strategy for `id`.
///
/// Precedence is fixed: data URI, inline script, chrome alias, local file or
/// resource alias, then remote.
///
/// ```
/// use sourcecache_core::{classify, Strategy};
///
/// assert_eq!(classify("javascript:1+1"), Strategy::InlineScript { source: "1+1".into() });
/// assert_eq!(classify("file:///tmp/a.js"), Strategy::LocalFile);
/// assert_eq!(classify("https://example.com/a.js"), Strategy::Remote);
/// ```
pub fn classify(id: &str) -> Strategy {
    if let Some(data) = DataUrl::parse(id) {
        return Strategy::DataUri(data);
    }

    if let Some(source) = strip_prefix_ignore_case(id.trim_start(), JAVASCRIPT_PREFIX) {
        return Strategy::InlineScript {
            source: source.to_string(),
        };
    }

    if id.starts_with(CHROME_PREFIX) {
        return Strategy::ChromeAlias {
            target: unmunge(id).to_string(),
        };
    }

    if id.starts_with(FILE_PREFIX) {
        return Strategy::LocalFile;
    }

    if id.starts_with(RESOURCE_PREFIX) {
        return Strategy::ResourceAlias;
    }

    Strategy::Remote
}

/// Undo the `A -> B` rewrite, keeping the right-hand side as the real path.
pub fn unmunge(id: &str) -> &str {
    WRAPPER_MUNGE_RE
        .captures(id)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .filter(|target| !target.is_empty())
        .unwrap_or(id)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}
