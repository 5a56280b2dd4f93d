//! Acquisition strategies, one per [`Strategy`](crate::Strategy).
//!
//! Each strategy is an `impl SourceCache` block. It produces the text for a
//! normalized identifier and writes it through the store when the result may
//! be cached. Failures that should reach the caller as placeholder content are
//! returned as [`Diagnostic`](crate::Diagnostic).

mod data;
mod inline;
mod local;
mod remote;

use crate::types::{Diagnostic, Lines};

/// Result of running a strategy: content, no content, or a displayable failure.
pub(crate) type Acquired = Result<Option<Lines>, Diagnostic>;
