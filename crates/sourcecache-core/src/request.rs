//! Request descriptions handed to a [`Transport`](crate::Transport).

use crate::{Error, Result};
use url::Url;

/// Content type used when replaying a captured form body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// How the transport should treat its response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadFlags {
    /// Prefer a cached response over the network.
    pub from_cache: bool,
    /// If the cache is busy, go to the network instead of waiting for it.
    pub bypass_cache_if_busy: bool,
}

impl LoadFlags {
    /// Flags used for every remote source fetch.
    pub const fn prefer_cache() -> Self {
        Self {
            from_cache: true,
            bypass_cache_if_busy: true,
        }
    }
}

/// What kind of request to issue, decided once when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Plain cache-preferring load with the default method.
    CacheOnly,
    /// Bodiless request with an explicit method.
    Get {
        /// Method override, e.g. `HEAD` or `DELETE`.
        method: String,
    },
    /// Repeat a request together with its original body.
    BodyReplay {
        /// `POST`, `PUT` or `PATCH`.
        method: String,
        /// Body to send.
        body: Vec<u8>,
        /// Content type header; `None` sends the body as-is.
        content_type: Option<String>,
    },
}

impl RequestKind {
    /// Method the transport should use.
    pub fn method(&self) -> &str {
        match self {
            Self::CacheOnly => "GET",
            Self::Get { method } | Self::BodyReplay { method, .. } => method,
        }
    }

    /// Body to attach, if any.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::BodyReplay { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Whether `method` carries a request body worth replaying.
pub fn is_body_method(method: &str) -> bool {
    ["POST", "PUT", "PATCH"]
        .iter()
        .any(|m| m.eq_ignore_ascii_case(method))
}

/// A fully configured request for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRequest {
    /// Target URL.
    pub url: Url,
    /// Method/body configuration.
    pub kind: RequestKind,
    /// Cache behavior.
    pub flags: LoadFlags,
    /// Session-history cache key of the response to look up, if known.
    pub cache_key: Option<String>,
    /// Charset used to decode the response text.
    pub charset: Option<String>,
}

impl CachedRequest {
    /// Build a cache-preferring request for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] when `id` is not an absolute URL.
    pub fn new(id: &str) -> Result<Self> {
        let url = Url::parse(id).map_err(|e| Error::InvalidUrl(format!("{id}: {e}")))?;
        Ok(Self {
            url,
            kind: RequestKind::CacheOnly,
            flags: LoadFlags::prefer_cache(),
            cache_key: None,
            charset: None,
        })
    }

    /// Replace the request kind.
    #[must_use]
    pub fn with_kind(mut self, kind: RequestKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the session-history cache key.
    #[must_use]
    pub fn with_cache_key(mut self, cache_key: Option<String>) -> Self {
        self.cache_key = cache_key;
        self
    }

    /// Set the decoding charset.
    #[must_use]
    pub fn with_charset(mut self, charset: Option<String>) -> Self {
        self.charset = charset;
        self
    }

    /// Set the cache flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: LoadFlags) -> Self {
        self.flags = flags;
        self
    }
}
