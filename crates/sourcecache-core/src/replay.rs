//! Post-data replay: recovering request bodies so a re-fetch repeats the
//! original non-GET request instead of silently turning it into a GET.
//!
//! Every lookup here is best effort. A host error is logged and treated as
//! "nothing to replay", and the fetch goes ahead without a body.

use crate::host::PageContext;
use crate::types::{RequestContext, SessionEntry};
use tracing::debug;

/// Recover the body of the request described by `ctx`.
///
/// Lookup order: the body already stored on `ctx`, then the page's in-memory
/// form state, then the recorded request. A recovered body is remembered on
/// `ctx` so later fetches skip the lookups.
pub fn reconstruct_post_body(ctx: &mut RequestContext, page: &dyn PageContext) -> Option<String> {
    if ctx.post_text.is_none() {
        ctx.post_text = swallow(page.post_text_from_page(&ctx.href), "page state");
    }

    if ctx.post_text.is_none() {
        if let Some(request_id) = ctx.request_id.as_deref() {
            ctx.post_text = swallow(page.post_text_from_request(request_id), "recorded request");
        }
    }

    ctx.post_text.clone()
}

/// Body submitted with the document currently displayed, if any.
pub fn active_document_post_body(page: &dyn PageContext) -> Option<Vec<u8>> {
    active_entry(page).and_then(|entry| entry.cached_body)
}

/// Session-history cache key of the document currently displayed.
pub fn cache_key_for_active_document(page: &dyn PageContext) -> Option<String> {
    active_entry(page).and_then(|entry| entry.cache_key)
}

fn active_entry(page: &dyn PageContext) -> Option<SessionEntry> {
    swallow(page.active_session_entry(), "session history")
}

fn swallow<T>(result: crate::Result<Option<T>>, source: &str) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "No replay data from {source}");
            None
        },
    }
}
