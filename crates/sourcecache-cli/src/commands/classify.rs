//! Show how a resource identifier would be acquired

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use sourcecache_core::{Strategy, classify, utils::remove_anchor};

use super::print_json;
use crate::cli::OutputFormat;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyOutput<'a> {
    id: &'a str,
    cache_key: &'a str,
    classification: &'a Strategy,
}

/// Execute the classify command
///
/// Classification looks at the identifier only; nothing is fetched.
pub fn execute_classify(id: &str, format: OutputFormat) -> Result<()> {
    let key = remove_anchor(id);
    let strategy = classify(id);

    match format {
        OutputFormat::Text => {
            println!("{} {}", strategy.name().green().bold(), key);
            match &strategy {
                Strategy::ChromeAlias { target } if target != key => {
                    println!("  {} {}", "target:".dimmed(), target);
                },
                Strategy::DataUri(data) => {
                    println!("  {} {}", "media type:".dimmed(), data.media_type);
                    if data.base64 {
                        println!("  {} base64", "encoding:".dimmed());
                    }
                },
                _ => {},
            }
        },
        OutputFormat::Json => print_json(&ClassifyOutput {
            id,
            cache_key: key,
            classification: &strategy,
        })?,
    }
    Ok(())
}
