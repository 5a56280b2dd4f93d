//! # sourcecache-core
//!
//! Source text cache for a script debugger: resolves resource identifiers to
//! their text and serves "line N of resource R" lookups from memory.
//!
//! Identifiers can be network URLs, `data:` URIs, inline `javascript:`
//! pseudo-URLs, local `file://` paths, or `chrome://` and `resource://`
//! aliases. Each kind has its own acquisition strategy; the first successful
//! acquisition is kept until it is invalidated.
//!
//! ## Architecture
//!
//! - **Classification**: [`classify`] maps an identifier to a [`Strategy`]
//! - **Store**: [`SourceCache`] holds lines and raw text per identifier
//! - **Transport**: [`Transport`] opens cache-preferring requests; [`HttpTransport`] uses reqwest
//! - **Host**: [`PageContext`], [`LocalReader`] and [`AliasResolver`] are supplied by the embedding debugger
//! - **Replay**: body recovery so re-fetching a form post repeats the post
//!
//! ## Quick Start
//!
//! ```rust
//! use sourcecache_core::{Config, DetachedPage, SourceCache};
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let mut cache = SourceCache::from_config(Arc::new(DetachedPage::new()), &Config::default())?;
//!
//! let line = cache.get_line("javascript:var a = 1;", 1).await;
//! assert_eq!(line, "var a = 1;");
//! # Ok::<(), sourcecache_core::Error>(())
//! # })?;
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! # Ok::<(), sourcecache_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Read operations never fail. Missing content comes back as `None` or as a
//! placeholder line, and failed remote fetches as [`Diagnostic`] lines.
//! Construction and configuration return [`Result<T, Error>`]:
//!
//! ```rust
//! use sourcecache_core::{Config, Error};
//!
//! match Config::load() {
//!     Ok(config) => println!("timeout: {}s", config.fetch.timeout_secs),
//!     Err(Error::Config(msg)) => eprintln!("Bad config: {}", msg),
//!     Err(e) => eprintln!("Error ({}): {}", e.category(), e),
//! }
//! ```

mod acquire;
/// Identifier classification
pub mod classify;
/// Configuration loading and defaults
pub mod config;
/// Error types and result aliases
pub mod error;
/// Host capability traits and their standalone implementations
pub mod host;
/// Request body recovery for replayed fetches
pub mod replay;
/// Request descriptions passed to transports
pub mod request;
/// The per-page source store
pub mod store;
/// Transport traits and the HTTP implementation
pub mod transport;
/// Core data types
pub mod types;
/// Identifier and text helpers
pub mod utils;

// Re-export commonly used types
pub use classify::{DataUrl, Strategy, classify};
pub use config::{AliasConfig, Config, FetchConfig, FilterConfig, LocalConfig};
pub use error::{Error, Result};
pub use host::{AliasResolver, AliasTable, DetachedPage, FsReader, LocalReader, PageContext};
pub use request::{CachedRequest, LoadFlags, RequestKind};
pub use store::{Collaborators, SourceCache};
pub use transport::{HttpTransport, ResponseStream, Transport};
pub use types::*;
