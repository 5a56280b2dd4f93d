//! Core data types shared across the store, the strategies and the host traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Line-split content of one resource.
///
/// Each element keeps its terminator, so `lines.concat()` is the original text.
/// Shared so repeated lookups of the same resource don't copy it.
pub type Lines = Arc<[String]>;

/// A failed acquisition, carried as displayable text.
///
/// Remote fetch failures are turned into this instead of an error so callers
/// always get something to render. [`Diagnostic::into_lines`] gives the
/// two-line form returned by `load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Identifier whose acquisition failed.
    pub id: String,
    /// Human-readable cause.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic for `id`.
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }

    /// First line of the placeholder content.
    pub fn headline(&self) -> String {
        format!("sourceCache.load FAILS for id={}", self.id)
    }

    /// Two-line placeholder content: the headline, then the cause.
    pub fn into_lines(self) -> Lines {
        let headline = self.headline();
        Arc::from(vec![headline, self.message])
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.headline(), self.message)
    }
}

/// Session-history entry of the document currently shown in the page.
///
/// Read-only input from the host, used to replay the request that produced
/// the active document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// Method the document was requested with, when known.
    pub method: Option<String>,
    /// Request body submitted with the document (form posts).
    pub cached_body: Option<Vec<u8>>,
    /// Key identifying this entry's response in the HTTP cache.
    pub cache_key: Option<String>,
}

/// A previously observed network request that a fetch may need to repeat.
///
/// Carries what the network monitor captured: the URL, an id to look the
/// request up again, and the post text once it has been recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// URL the request was sent to.
    pub href: String,
    /// Host-assigned id of the recorded request.
    pub request_id: Option<String>,
    /// Request body, filled in once recovered.
    pub post_text: Option<String>,
}

impl RequestContext {
    /// Context for `href` with nothing recovered yet.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    /// Attach the host's id for the recorded request.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach an already known body.
    #[must_use]
    pub fn with_post_text(mut self, post_text: impl Into<String>) -> Self {
        self.post_text = Some(post_text.into());
        self
    }
}
