//! # CLI Structure and Argument Parsing
//!
//! `sourcecache` exposes the read operations of a [`SourceCache`] on the
//! command line, one identifier per invocation:
//!
//! ```bash
//! # Line 12 of a remote script
//! sourcecache line https://example.com/app.js 12
//!
//! # Whole text of a data URI, as JSON
//! sourcecache --format json text 'data:text/plain,hello%20world'
//!
//! # Re-fetch a form post
//! sourcecache text https://example.com/search --method POST --post-data 'q=rust'
//!
//! # Which strategy would serve an identifier
//! sourcecache classify 'chrome://ext/content/a.js -> chrome://ext/content/b.js'
//! ```
//!
//! [`SourceCache`]: sourcecache_core::SourceCache

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level arguments.
#[derive(Parser, Clone, Debug)]
#[command(name = "sourcecache")]
#[command(version)]
#[command(about = "Resolve debugger source identifiers to their text", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Show debug logging, including cache hits and request setup
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to configuration file (overrides autodiscovery). Also via `SOURCECACHE_CONFIG`.
    #[arg(long, global = true, value_name = "FILE", env = "SOURCECACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output formats shared by all commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    Text,
    /// A single JSON object
    Json,
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Print one line (1-based) of a resource
    Line {
        /// Resource identifier
        id: String,
        /// Line number, starting at 1
        #[arg(value_name = "N")]
        line: usize,
    },

    /// Print the whole text of a resource
    Text {
        /// Resource identifier
        id: String,
        /// Request method to use for remote resources
        #[arg(long, short = 'm', value_name = "METHOD")]
        method: Option<String>,
        /// Body to replay with POST/PUT/PATCH
        #[arg(long, value_name = "BODY", requires = "method")]
        post_data: Option<String>,
    },

    /// Print the raw (undecoded) text of a resource
    Raw {
        /// Resource identifier
        id: String,
    },

    /// Show which strategy would acquire a resource
    Classify {
        /// Resource identifier
        id: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["sourcecache", "line", "javascript:1", "1", "--format", "json", "-v"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Line { line: 1, .. }));
    }

    #[test]
    fn test_post_data_requires_method() {
        let result = Cli::try_parse_from(["sourcecache", "text", "http://x/", "--post-data", "a=1"]);
        assert!(result.is_err());
    }
}
