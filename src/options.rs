//! Configuration options for metadata generation.
//!
//! The `Options` struct controls pipeline behavior. All values have
//! sensible defaults; use struct-update syntax to customize specific
//! fields.

use std::time::Duration;

/// Configuration options for metadata generation.
///
/// # Example
///
/// ```rust
/// use pagealt::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     max_candidates: 5,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of image candidates kept after filtering.
    ///
    /// Default: `3`
    pub max_candidates: usize,

    /// How much of the extracted text is embedded in the summary prompt
    /// (characters).
    ///
    /// Default: `3000`
    pub summary_text_len: usize,

    /// Ceiling for heuristic fallback scores when the vision model is
    /// unavailable.
    ///
    /// The cap guarantees an estimated score can never outrank a genuine
    /// high vision score.
    ///
    /// Default: `50.0`
    pub fallback_score_cap: f64,

    /// Timeout for text-generation calls (shortest of the three).
    ///
    /// Default: 30 seconds
    pub text_timeout: Duration,

    /// Timeout for vision calls.
    ///
    /// Default: 60 seconds
    pub vision_timeout: Duration,

    /// Timeout for raw page and image fetches (longest of the three).
    ///
    /// Default: 90 seconds
    pub fetch_timeout: Duration,

    /// Model endpoint label used when classifying model failures.
    ///
    /// The host owns the actual connection; this is only surfaced in
    /// error messages and suggestions.
    ///
    /// Default: `"http://localhost:1234/v1"`
    pub model_endpoint: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_candidates: 3,
            summary_text_len: 3000,
            fallback_score_cap: 50.0,
            text_timeout: Duration::from_secs(30),
            vision_timeout: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(90),
            model_endpoint: "http://localhost:1234/v1".to_string(),
        }
    }
}
