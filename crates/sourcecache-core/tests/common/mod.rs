#![allow(clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use sourcecache_core::{
    AliasTable, CachedRequest, Collaborators, Config, Error, FsReader, PageContext, Result,
    ResponseStream, SessionEntry, SourceCache, Transport,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the scripted transport does for one URL.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Script {
    Body(String),
    OpenFails(String),
    ReadFails(String),
}

/// Transport that answers from a fixed script and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    requests: Mutex<Vec<CachedRequest>>,
    released: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    pub fn requests(&self) -> Vec<CachedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CachedRequest {
        self.requests().pop().expect("no request was made")
    }

    /// Streams dropped so far.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self, request: &CachedRequest) -> Result<Box<dyn ResponseStream>> {
        self.requests.lock().unwrap().push(request.clone());
        let outcome = match self.scripts.get(request.url.as_str()) {
            Some(Script::Body(body)) => Ok(body.clone()),
            Some(Script::ReadFails(msg)) => Err(msg.clone()),
            Some(Script::OpenFails(msg)) => return Err(Error::Transport(msg.clone())),
            None => return Err(Error::NotFound(request.url.to_string())),
        };
        Ok(Box::new(ScriptedStream {
            outcome: Some(outcome),
            released: Arc::clone(&self.released),
        }))
    }
}

struct ScriptedStream {
    outcome: Option<std::result::Result<String, String>>,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl ResponseStream for ScriptedStream {
    async fn read_text(&mut self) -> Result<String> {
        match self.outcome.take() {
            Some(Ok(body)) => Ok(body),
            Some(Err(msg)) => Err(Error::Transport(msg)),
            None => Err(Error::Transport("already read".to_string())),
        }
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Page double with a configurable active document and replay sources.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FakePage {
    pub document_url: Option<String>,
    pub charset: Option<String>,
    pub entry: Option<SessionEntry>,
    pub page_body: Option<String>,
    pub request_body: Option<String>,
}

impl PageContext for FakePage {
    fn name(&self) -> String {
        "fake page".to_string()
    }

    fn active_document_url(&self) -> Option<String> {
        self.document_url.clone()
    }

    fn document_charset(&self) -> Option<String> {
        self.charset.clone()
    }

    fn active_session_entry(&self) -> Result<Option<SessionEntry>> {
        Ok(self.entry.clone())
    }

    fn post_text_from_page(&self, _href: &str) -> Result<Option<String>> {
        Ok(self.page_body.clone())
    }

    fn post_text_from_request(&self, _request_id: &str) -> Result<Option<String>> {
        Ok(self.request_body.clone())
    }
}

/// A cache wired to `transport` and `page`, reading real files.
#[allow(dead_code)]
pub fn cache_with(
    page: FakePage,
    transport: Arc<ScriptedTransport>,
    aliases: AliasTable,
    config: &Config,
) -> SourceCache {
    let collaborators = Collaborators {
        transport,
        reader: Arc::new(FsReader),
        aliases: Arc::new(aliases),
    };
    SourceCache::new(Arc::new(page), collaborators, config)
}

/// A cache with a detached page and no aliases.
#[allow(dead_code)]
pub fn cache(transport: Arc<ScriptedTransport>) -> SourceCache {
    cache_with(
        FakePage::default(),
        transport,
        AliasTable::default(),
        &Config::default(),
    )
}
