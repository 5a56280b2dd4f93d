//! Transport abstraction for remote fetches, and its reqwest implementation.
//!
//! The cache only needs to open a request and read the body once as text.
//! A [`ResponseStream`] is owned by whoever opened it and released when it is
//! dropped, whether the read succeeded or not.

use crate::config::FetchConfig;
use crate::request::{CachedRequest, RequestKind};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, TryLockError};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Opens cache-preferring requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open `request` and return its body stream.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be sent or the server rejects it.
    async fn open(&self, request: &CachedRequest) -> Result<Box<dyn ResponseStream>>;

    /// Forget anything remembered about `url`, so the next open refetches it.
    fn invalidate(&self, _url: &str) {}
}

/// Body of an opened request. Dropping it releases the underlying connection.
#[async_trait]
pub trait ResponseStream: Send {
    /// Read the whole body as text, decoded with the request's charset.
    async fn read_text(&mut self) -> Result<String>;
}

/// Response bodies by response key, evicted oldest first.
#[derive(Debug, Default)]
struct ResponseCache {
    entries: HashMap<String, CachedResponse>,
    order: VecDeque<String>,
    max_entries: usize,
}

#[derive(Debug)]
struct CachedResponse {
    url: String,
    text: String,
}

impl ResponseCache {
    fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.text.clone())
    }

    fn insert(&mut self, key: String, url: String, text: String) {
        if self.max_entries == 0 {
            return;
        }
        if self
            .entries
            .insert(key.clone(), CachedResponse { url, text })
            .is_none()
        {
            self.order.push_back(key);
        }
        while self.entries.len() > self.max_entries {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    /// Drop every response fetched from `url`, whatever its method or body.
    fn forget(&mut self, url: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.url != url);
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));
        before - self.entries.len()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

type SharedResponses = Arc<RwLock<ResponseCache>>;

/// HTTP transport with a bounded in-memory response cache.
///
/// Responses are cached by URL, method, body, session cache key and charset,
/// so a replayed form post never returns the page fetched with a plain GET.
/// [`Transport::invalidate`] drops every variant cached for a URL.
pub struct HttpTransport {
    client: Client,
    prefer_cache: bool,
    responses: SharedResponses,
}

impl HttpTransport {
    /// Creates a transport from fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            prefer_cache: config.prefer_cache,
            responses: Arc::new(RwLock::new(ResponseCache::new(
                config.max_cached_responses,
            ))),
        })
    }

    /// Creates a transport with a custom request timeout (primarily for tests)
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let config = FetchConfig {
            timeout_secs: timeout.as_secs().max(1),
            ..FetchConfig::default()
        };
        Self::new(&config)
    }

    /// Number of responses held in the response cache.
    pub fn cached_responses(&self) -> usize {
        self.responses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lookup(&self, key: &str, bypass_if_busy: bool) -> Option<String> {
        match self.responses.try_read() {
            Ok(guard) => guard.get(key),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().get(key),
            Err(TryLockError::WouldBlock) if bypass_if_busy => {
                debug!("Response cache busy, bypassing");
                None
            },
            Err(TryLockError::WouldBlock) => self
                .responses
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: &CachedRequest) -> Result<Box<dyn ResponseStream>> {
        let key = response_key(request);

        if request.flags.from_cache && self.prefer_cache {
            if let Some(text) = self.lookup(&key, request.flags.bypass_cache_if_busy) {
                debug!("Serving {} from response cache", request.url);
                return Ok(Box::new(CachedStream { text: Some(text) }));
            }
        }

        let method = Method::from_bytes(request.kind.method().as_bytes())
            .map_err(|e| Error::Transport(format!("invalid method: {e}")))?;
        let mut builder = self.client.request(method, request.url.clone());

        if request.flags.from_cache {
            builder = builder.header(CACHE_CONTROL, "max-stale");
        }

        if let RequestKind::BodyReplay {
            body, content_type, ..
        } = &request.kind
        {
            if let Some(content_type) = content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            debug!("Replaying {} byte body to {}", body.len(), request.url);
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!(
                "Resource not found at '{}'",
                request.url
            )));
        }
        if !status.is_success() {
            return Err(Error::Transport(format!("HTTP {status} for {}", request.url)));
        }

        Ok(Box::new(HttpStream {
            response: Some(response),
            charset: request.charset.clone(),
            key,
            url: request.url.to_string(),
            responses: Arc::clone(&self.responses),
        }))
    }

    fn invalidate(&self, url: &str) {
        let url = Url::parse(url).map_or_else(|_| url.to_string(), String::from);
        let dropped = self
            .responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .forget(&url);
        if dropped > 0 {
            debug!("Dropped {dropped} cached responses for {url}");
        }
    }
}

struct HttpStream {
    response: Option<Response>,
    charset: Option<String>,
    key: String,
    url: String,
    responses: SharedResponses,
}

#[async_trait]
impl ResponseStream for HttpStream {
    async fn read_text(&mut self) -> Result<String> {
        let response = self
            .response
            .take()
            .ok_or_else(|| Error::Transport("response body already consumed".to_string()))?;
        let final_url = response.url().clone();

        let text = match self.charset.as_deref() {
            Some(charset) => response.text_with_charset(charset).await?,
            None => response.text().await?,
        };

        info!("Fetched {} bytes from {}", text.len(), final_url);
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.key.clone(), self.url.clone(), text.clone());
        Ok(text)
    }
}

struct CachedStream {
    text: Option<String>,
}

#[async_trait]
impl ResponseStream for CachedStream {
    async fn read_text(&mut self) -> Result<String> {
        self.text
            .take()
            .ok_or_else(|| Error::Transport("response body already consumed".to_string()))
    }
}

fn response_key(request: &CachedRequest) -> String {
    let mut hasher = Sha256::new();
    for part in [
        request.url.as_str(),
        request.kind.method(),
        request.cache_key.as_deref().unwrap_or(""),
        request.charset.as_deref().unwrap_or(""),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0]);
    }
    if let Some(body) = request.kind.body() {
        hasher.update(body);
    }
    STANDARD.encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(url: &str) -> CachedRequest {
        CachedRequest::new(url).unwrap()
    }

    #[test]
    fn test_transport_creation() {
        assert!(HttpTransport::new(&FetchConfig::default()).is_ok());
        assert!(HttpTransport::with_timeout(Duration::from_millis(200)).is_ok());
    }

    #[test]
    fn test_response_key_distinguishes_replayed_bodies() {
        let get = request("http://x/form");
        let post = request("http://x/form").with_kind(RequestKind::BodyReplay {
            method: "POST".to_string(),
            body: b"a=1".to_vec(),
            content_type: None,
        });
        let other_post = request("http://x/form").with_kind(RequestKind::BodyReplay {
            method: "POST".to_string(),
            body: b"a=2".to_vec(),
            content_type: None,
        });

        let keys = [response_key(&get), response_key(&post), response_key(&other_post)];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_eq!(keys[0], response_key(&request("http://x/form")));
    }

    #[test]
    fn test_response_key_includes_cache_key() {
        let plain = request("http://x/page");
        let keyed = request("http://x/page").with_cache_key(Some("42".to_string()));
        assert_ne!(response_key(&plain), response_key(&keyed));
    }

    #[tokio::test]
    async fn test_cached_stream_reads_once() {
        let mut stream = CachedStream {
            text: Some("body".to_string()),
        };
        assert_eq!(stream.read_text().await.unwrap(), "body");
        assert!(stream.read_text().await.is_err());
    }

    #[test]
    fn test_lookup_bypasses_busy_cache() {
        let transport = HttpTransport::new(&FetchConfig::default()).unwrap();
        transport.responses.write().unwrap().insert(
            "k".to_string(),
            "http://x/a.js".to_string(),
            "v".to_string(),
        );

        assert_eq!(transport.lookup("k", true).as_deref(), Some("v"));

        let _writer = transport.responses.write().unwrap();
        assert!(transport.lookup("k", true).is_none());
    }

    #[test]
    fn test_response_cache_evicts_oldest_first() {
        let mut cache = ResponseCache::new(2);
        cache.insert("a".into(), "http://x/a".into(), "1".into());
        cache.insert("b".into(), "http://x/b".into(), "2".into());
        // Replacing an entry keeps its place in line
        cache.insert("a".into(), "http://x/a".into(), "1'".into());
        cache.insert("c".into(), "http://x/c".into(), "3".into());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").as_deref(), Some("2"));
        assert_eq!(cache.get("c").as_deref(), Some("3"));
    }

    #[test]
    fn test_zero_capacity_caches_nothing() {
        let mut cache = ResponseCache::new(0);
        cache.insert("a".into(), "http://x/a".into(), "1".into());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_invalidate_drops_every_variant_of_url() {
        // Given: A GET and a replayed POST of one URL, plus another URL
        let transport = HttpTransport::new(&FetchConfig::default()).unwrap();
        {
            let mut responses = transport.responses.write().unwrap();
            responses.insert("get".into(), "http://x/form".into(), "empty".into());
            responses.insert("post".into(), "http://x/form".into(), "sent".into());
            responses.insert("other".into(), "http://x/other".into(), "o".into());
        }

        // When: The URL is invalidated
        transport.invalidate("http://x/form");

        // Then: Only the other URL survives
        assert_eq!(transport.cached_responses(), 1);
        assert!(transport.lookup("get", false).is_none());
        assert!(transport.lookup("post", false).is_none());
        assert_eq!(transport.lookup("other", false).as_deref(), Some("o"));
    }

    #[test]
    fn test_invalidate_normalizes_url() {
        let transport = HttpTransport::new(&FetchConfig::default()).unwrap();
        let url = request("http://X/app.js").url.to_string();
        transport
            .responses
            .write()
            .unwrap()
            .insert("k".into(), url, "v".into());

        transport.invalidate("http://x/app.js");
        assert_eq!(transport.cached_responses(), 0);
    }
}
