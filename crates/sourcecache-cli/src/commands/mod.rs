//! Command implementations for the sourcecache CLI.
//!
//! Each command builds a fresh [`SourceCache`] for a detached page, performs
//! one lookup, and prints the result in the requested format.

mod classify;
mod line;
mod raw;
mod text;

pub use classify::execute_classify;
pub use line::execute_line;
pub use raw::execute_raw;
pub use text::execute_text;

use anyhow::{Context, Result};
use serde::Serialize;
use sourcecache_core::{Config, DetachedPage, SourceCache};
use std::sync::Arc;

fn open_cache(config: &Config) -> Result<SourceCache> {
    SourceCache::from_config(Arc::new(DetachedPage::new()), config)
        .context("Failed to initialize source cache")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `text` as-is, adding a newline only if it doesn't end with one.
fn print_text(text: &str) {
    if text.ends_with('\n') || text.ends_with('\r') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}
