//! Error types for accessibility metadata generation.
//!
//! This module defines the error types returned by the pipeline workflows.

use crate::classify::{FetchErrorInfo, ModelErrorInfo};

/// Error type for metadata generation operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching the page failed.
    #[error("fetch failed for {url}: {info}")]
    Fetch {
        /// URL that could not be retrieved.
        url: String,
        /// Classified failure details.
        info: FetchErrorInfo,
    },

    /// A model invocation failed.
    #[error("model call failed: {info}")]
    Model {
        /// Classified failure details.
        info: ModelErrorInfo,
    },

    /// No image candidate survived filtering and fetching.
    #[error("no usable image found on page")]
    NoUsableImage,

    /// The resource budget for this run was exhausted.
    ///
    /// Fatal: propagates uncaught through every workflow, including the
    /// otherwise failure-absorbing combined workflow.
    #[error("resource budget exhausted after {used} units")]
    ResourceExhausted {
        /// Units consumed when the budget ran out.
        used: u64,
    },
}

/// Result type alias for metadata generation operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error must propagate even through failure-absorbing paths.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ResourceExhausted { .. })
    }
}
