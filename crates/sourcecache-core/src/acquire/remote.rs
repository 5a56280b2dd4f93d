use super::Acquired;
use crate::replay::{active_document_post_body, cache_key_for_active_document, reconstruct_post_body};
use crate::request::{CachedRequest, FORM_CONTENT_TYPE, RequestKind, is_body_method};
use crate::types::{Diagnostic, RequestContext};
use crate::utils::remove_anchor;
use crate::{Error, Result, SourceCache};
use tracing::{debug, warn};

impl SourceCache {
    /// Fetch `key` through the transport and store it as both lines and raw text.
    pub(crate) async fn load_from_cache(
        &mut self,
        key: &str,
        method: Option<&str>,
        ctx: Option<&mut RequestContext>,
    ) -> Acquired {
        let data = self.fetch_remote(key, method, ctx).await?;
        Ok(Some(self.store(key, &data, Some(&data))))
    }

    /// Fetch `key` and return the body text as-is, without storing it.
    ///
    /// The response stream is dropped before this returns, whether or not the
    /// read succeeded.
    pub(crate) async fn fetch_remote(
        &self,
        key: &str,
        method: Option<&str>,
        ctx: Option<&mut RequestContext>,
    ) -> std::result::Result<String, Diagnostic> {
        let request = self
            .build_request(key, method, ctx)
            .map_err(|e| fetch_failed(key, "build request", &e))?;

        debug!(
            method = request.kind.method(),
            cache_key = ?request.cache_key,
            "Opening {}",
            request.url
        );
        let mut stream = self
            .collaborators
            .transport
            .open(&request)
            .await
            .map_err(|e| fetch_failed(key, "open", &e))?;

        stream
            .read_text()
            .await
            .map_err(|e| fetch_failed(key, "read", &e))
    }

    fn build_request(
        &self,
        key: &str,
        method: Option<&str>,
        ctx: Option<&mut RequestContext>,
    ) -> Result<CachedRequest> {
        let request = CachedRequest::new(key)?.with_charset(self.page.document_charset());
        let page = self.page.as_ref();

        let is_active_document = self
            .page
            .active_document_url()
            .is_some_and(|url| remove_anchor(&url) == key);

        if is_active_document {
            let kind = match active_document_post_body(page) {
                Some(body) => RequestKind::BodyReplay {
                    method: method
                        .filter(|m| is_body_method(m))
                        .unwrap_or("POST")
                        .to_string(),
                    body,
                    content_type: None,
                },
                None => plain_kind(method),
            };
            return Ok(request
                .with_kind(kind)
                .with_cache_key(cache_key_for_active_document(page)));
        }

        if let (Some(m), Some(ctx)) = (method, ctx) {
            if is_body_method(m) {
                if let Some(body) = reconstruct_post_body(ctx, page) {
                    return Ok(request.with_kind(RequestKind::BodyReplay {
                        method: m.to_string(),
                        body: body.into_bytes(),
                        content_type: Some(FORM_CONTENT_TYPE.to_string()),
                    }));
                }
            }
        }

        Ok(request.with_kind(plain_kind(method)))
    }
}

fn plain_kind(method: Option<&str>) -> RequestKind {
    method.map_or(RequestKind::CacheOnly, |m| RequestKind::Get {
        method: m.to_string(),
    })
}

fn fetch_failed(key: &str, stage: &str, error: &Error) -> Diagnostic {
    warn!(error = %error, category = error.category(), "Failed to {stage} {key}");
    Diagnostic::new(key, error.to_string())
}
