//! Error types and handling for sourcecache-core operations.
//!
//! Most public read operations on [`SourceCache`](crate::SourceCache) never
//! return an error: acquisition failures are recovered into placeholder text
//! so the debugger always has something to show. [`Error`] is what the
//! collaborators (transport, local reader, page context) report back, and what
//! configuration loading returns.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: local resource reads, config file access
//! - **Network Errors**: HTTP requests made by [`HttpTransport`](crate::HttpTransport)
//! - **Transport Errors**: request construction/open/read failures reported by any transport
//! - **Decode Errors**: malformed data URI payloads, undecodable bodies
//! - **Configuration Errors**: invalid settings or config files
//!
//! ```rust
//! use sourcecache_core::Error;
//!
//! let err = Error::Transport("connection refused".to_string());
//! assert_eq!(err.category(), "transport");
//! assert!(err.is_recoverable());
//! ```

use thiserror::Error;

/// The main error type for sourcecache-core operations.
///
/// `Display` provides the message that ends up as the second line of a
/// [`Diagnostic`](crate::Diagnostic) when a remote fetch fails.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading local resources and configuration files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// The underlying `reqwest::Error` is preserved for detailed connection
    /// information.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A transport could not build, open or read a request.
    ///
    /// Used by transports that are not backed by reqwest, and for non-success
    /// HTTP statuses.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Identifier could not be parsed as a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content could not be decoded (bad base64, unknown charset).
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away if the same lookup is retried.
    ///
    /// Failed remote fetches are not cached, so a recoverable error means the
    /// next `load` of the same identifier will try the network again.
    ///
    /// ```rust
    /// use sourcecache_core::Error;
    /// use std::io;
    ///
    /// assert!(Error::Io(io::Error::new(io::ErrorKind::TimedOut, "timeout")).is_recoverable());
    /// assert!(!Error::InvalidUrl("nope".to_string()).is_recoverable());
    /// ```
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Transport(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier, for structured logs.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Transport(_) => "transport",
            Self::InvalidUrl(_) => "invalid_url",
            Self::NotFound(_) => "not_found",
            Self::Decode(_) => "decode",
            Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unwrap_used,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        // Given: Different error variants
        let cases = vec![
            (Error::Transport("refused".to_string()), "Transport error"),
            (Error::InvalidUrl("not a url".to_string()), "Invalid URL"),
            (Error::NotFound("x.js".to_string()), "Not found"),
            (Error::Decode("bad base64".to_string()), "Decode error"),
            (Error::Config("missing field".to_string()), "Configuration error"),
        ];

        for (error, prefix) in cases {
            // When: Converting to string
            let rendered = error.to_string();

            // Then: Should carry the category prefix
            assert!(rendered.starts_with(prefix), "{rendered} should start with {prefix}");
        }

        assert_eq!(Error::Other("plain".to_string()).to_string(), "plain");
    }

    #[test]
    fn test_error_from_io_error() {
        let error: Error = io::Error::new(io::ErrorKind::NotFound, "file not found").into();
        match error {
            Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected IO error variant, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_url_parse_error() {
        let parse_err = url::Url::parse("::not a url").unwrap_err();
        let error: Error = parse_err.into();
        assert_eq!(error.category(), "invalid_url");
    }

    #[test]
    fn test_error_categories() {
        let error_categories = vec![
            (Error::Io(io::Error::other("test")), "io"),
            (Error::Transport("test".to_string()), "transport"),
            (Error::InvalidUrl("test".to_string()), "invalid_url"),
            (Error::NotFound("test".to_string()), "not_found"),
            (Error::Decode("test".to_string()), "decode"),
            (Error::Config("test".to_string()), "config"),
            (Error::Other("test".to_string()), "other"),
        ];

        for (error, expected) in error_categories {
            assert_eq!(error.category(), expected);
        }
    }

    #[test]
    fn test_recoverability() {
        assert!(Error::Transport("busy".to_string()).is_recoverable());
        assert!(Error::Io(io::Error::new(io::ErrorKind::Interrupted, "intr")).is_recoverable());
        assert!(!Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone")).is_recoverable());
        assert!(!Error::Decode("bad".to_string()).is_recoverable());
        assert!(!Error::Config("bad".to_string()).is_recoverable());
    }
}
