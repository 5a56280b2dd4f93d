//! Print the whole text of a resource

use anyhow::Result;
use serde::Serialize;
use sourcecache_core::{Config, RequestContext};
use tracing::debug;

use super::{open_cache, print_json, print_text};
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOutput<'a> {
    id: &'a str,
    method: Option<&'a str>,
    line_count: usize,
    text: &'a str,
}

/// Execute the text command
///
/// `post_data` stands in for a previously captured request body, so a
/// `--method POST` fetch replays it.
pub async fn execute_text(
    id: &str,
    method: Option<&str>,
    post_data: Option<&str>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let mut cache = open_cache(config)?;
    let mut ctx = post_data.map(|body| {
        debug!("Replaying {} byte body", body.len());
        RequestContext::new(id).with_post_text(body)
    });

    let Some(lines) = cache.load(id, method, ctx.as_mut()).await else {
        anyhow::bail!("No source for '{id}'");
    };
    let text = lines.concat();

    match format {
        OutputFormat::Text => print_text(&text),
        OutputFormat::Json => print_json(&TextOutput {
            id,
            method,
            line_count: lines.len(),
            text: &text,
        })?,
    }
    Ok(())
}
