//! Print the raw text of a resource

use anyhow::Result;
use serde::Serialize;
use sourcecache_core::Config;

use super::{open_cache, print_json, print_text};
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct RawOutput<'a> {
    id: &'a str,
    raw: &'a str,
}

/// Execute the raw command
pub async fn execute_raw(id: &str, config: &Config, format: OutputFormat) -> Result<()> {
    let mut cache = open_cache(config)?;
    let Some(raw) = cache.load_raw(id).await else {
        anyhow::bail!("No raw source for '{id}'");
    };

    match format {
        OutputFormat::Text => print_text(&raw),
        OutputFormat::Json => print_json(&RawOutput { id, raw: &raw })?,
    }
    Ok(())
}
