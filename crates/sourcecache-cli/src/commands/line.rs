//! Print a single line of a resource

use anyhow::Result;
use serde::Serialize;
use sourcecache_core::Config;

use super::{open_cache, print_json, print_text};
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct LineOutput<'a> {
    id: &'a str,
    line: usize,
    text: &'a str,
}

/// Execute the line command
///
/// Placeholders like `(no source for ...)` are printed like any other line.
pub async fn execute_line(id: &str, line: usize, config: &Config, format: OutputFormat) -> Result<()> {
    let mut cache = open_cache(config)?;
    let text = cache.get_line(id, line).await;

    match format {
        OutputFormat::Text => print_text(&text),
        OutputFormat::Json => print_json(&LineOutput {
            id,
            line,
            text: &text,
        })?,
    }
    Ok(())
}
