//! # pagealt
//!
//! Accessibility metadata generation for web pages.
//!
//! Turns a page URL into a short description of the page and, optionally,
//! a short description of the page's most visually informative image. The
//! pipeline recovers readable text and image candidates from raw markup
//! without a full parser, filters and concurrently scores candidates
//! against a vision model with a heuristic fallback, and composes the
//! result with a text-generation call into one partial-failure-tolerant
//! record.
//!
//! Network access, model inference, and resource accounting are injected
//! as [`capability`] traits by the surrounding execution host; the core
//! never opens a socket itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagealt::{Capabilities, Options, Pipeline};
//!
//! # async fn run(caps: Capabilities) -> pagealt::Result<()> {
//! let pipeline = Pipeline::new(caps, Options::default());
//! let record = pipeline.generate_combined("https://example.com/article").await?;
//! println!("{}", record.page_alt_text);
//! if let Some(image_alt) = &record.image_alt_text {
//!     println!("image: {image_alt}");
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod options;
mod patterns;

/// Capability traits consumed from the execution host.
pub mod capability;

/// Classification of raw network/model failures into a closed taxonomy.
pub mod classify;

/// Image description via the vision capability.
pub mod describe;

/// Candidate filtering and ranking.
pub mod filter;

/// Image candidate harvesting from raw markup.
pub mod harvest;

/// Workflow orchestration (page, image, and combined generation).
pub mod pipeline;

/// Concurrent candidate fetching and vision scoring.
pub mod score;

/// Page-level summarization via the text-generation capability.
pub mod summarize;

/// Plain-text recovery from raw HTML.
pub mod text;

/// URL resolution utilities.
pub mod url_utils;

// Public API - re-exports
pub use capability::{Capabilities, Network, ResourceMeter, TextModel, VisionModel};
pub use error::{Error, Result};
pub use harvest::{harvest, ImageCandidate, SourceKind};
pub use options::Options;
pub use pipeline::{ImageRecord, PageRecord, Pipeline, ResultRecord};
pub use score::{Score, ScoredCandidate};
pub use summarize::PageContext;
pub use text::extract;
