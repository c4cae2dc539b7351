//! Workflow orchestration: page-only, image-only, and combined generation.
//!
//! The pipeline composes extraction, summarization, harvesting, scoring,
//! and description over an injected capability bundle. Each request owns
//! its state exclusively; nothing is shared across runs. The combined
//! workflow aggregates through explicit page/image outcome values rather
//! than shared mutable locals, and absorbs every failure except resource
//! exhaustion.

use serde::Serialize;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::capability::{Capabilities, CapabilityFailure, OperationKind};
use crate::classify::{classify_fetch, classify_http_status, classify_model, FetchErrorInfo, ModelErrorInfo};
use crate::describe::describe;
use crate::error::{Error, Result};
use crate::filter::filter;
use crate::harvest::harvest;
use crate::options::Options;
use crate::score::{score_all, select_winner};
use crate::summarize::{summarize, PageContext};
use crate::text;

/// Substituted when generation produced no usable page description.
pub const PLACEHOLDER_ALT_TEXT: &str = "No description available for this page.";

/// Substituted when generation produced no usable topic.
pub const PLACEHOLDER_TOPIC: &str = "General";

/// Topic substituted when the page could not be analyzed at all.
const FAILED_TOPIC: &str = "Unavailable";

/// Result of the page-only workflow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// The analyzed URL.
    pub url: String,
    /// Page description; never empty.
    pub alt_text: String,
    /// Page topic; never empty.
    pub topic: String,
    /// Resource units consumed by this run.
    pub resource_used: u64,
}

/// Result of the image-only workflow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// The analyzed page URL.
    pub url: String,
    /// The winning image's URL.
    pub image_url: String,
    /// Generated alt text for the image.
    pub image_alt_text: String,
    /// Longer description, when produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_description: Option<String>,
    /// Width from markup, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    /// Height from markup, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    /// Byte size recorded during fetching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size_bytes: Option<u64>,
    /// Resource units consumed by this run.
    pub resource_used: u64,
}

/// Combined workflow result handed back to the surrounding service.
///
/// Page fields are always present, substituting placeholders when
/// generation failed; image fields are present only when every stage of
/// the image path succeeded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// The analyzed URL.
    pub url: String,
    /// Page description; never empty.
    pub page_alt_text: String,
    /// Page topic; never empty.
    pub page_topic: String,
    /// Resource units consumed across every sub-invocation that ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_used: Option<u64>,
    /// The winning image's URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Generated alt text for the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt_text: Option<String>,
    /// Longer image description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_description: Option<String>,
    /// Image width from markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    /// Image height from markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    /// Image byte size recorded during fetching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size_bytes: Option<u64>,
    /// Classified fetch failure, when the page could not be retrieved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<FetchErrorInfo>,
    /// Classified model failure, when summarization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<ModelErrorInfo>,
}

/// Image fields gathered by a successful image sub-path.
#[derive(Debug, Clone)]
struct ImageFields {
    url: String,
    alt_text: String,
    description: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    size_bytes: Option<u64>,
}

/// Outcome of the page half of the combined workflow.
#[derive(Debug)]
enum PageOutcome {
    /// Summarization produced usable context.
    Summarized(PageContext),
    /// The page path failed; placeholders carry the classified reason.
    Failed {
        alt_text: String,
        fetch_error: Option<FetchErrorInfo>,
        model_error: Option<ModelErrorInfo>,
    },
}

/// Outcome of the image half of the combined workflow.
#[derive(Debug)]
enum ImageOutcome {
    /// Every stage of the image path succeeded.
    Described(ImageFields),
    /// No usable image, or a stage failed; the result simply omits
    /// image fields.
    Absent,
}

/// The orchestrator composing all workflow stages over injected
/// capabilities.
pub struct Pipeline {
    caps: Capabilities,
    options: Options,
}

impl Pipeline {
    /// Create a pipeline over a capability bundle.
    #[must_use]
    pub fn new(caps: Capabilities, options: Options) -> Self {
        Pipeline { caps, options }
    }

    /// Generate page-level metadata only.
    ///
    /// # Errors
    /// Fetch and summarization failures propagate unmodified, already
    /// classified.
    pub async fn generate_page(&self, url: &str) -> Result<PageRecord> {
        let html = self.fetch_page(url).await?;
        let page_text = text::extract(&html);
        let ctx = self.summarize_page(url, &page_text).await?;
        Ok(PageRecord {
            url: url.to_string(),
            alt_text: ctx.alt_text,
            topic: ctx.topic.unwrap_or_else(|| PLACEHOLDER_TOPIC.to_string()),
            resource_used: self.caps.meter.used(),
        })
    }

    /// Generate image metadata only.
    ///
    /// # Errors
    /// Returns [`Error::NoUsableImage`] when scoring yields zero
    /// survivors; fetch and model failures propagate.
    pub async fn generate_image(
        &self,
        url: &str,
        page_ctx: Option<&PageContext>,
    ) -> Result<ImageRecord> {
        let html = self.fetch_page(url).await?;
        let fields = self
            .image_path(url, &html, page_ctx)
            .await?
            .ok_or(Error::NoUsableImage)?;
        Ok(ImageRecord {
            url: url.to_string(),
            image_url: fields.url,
            image_alt_text: fields.alt_text,
            image_description: fields.description,
            image_width: fields.width,
            image_height: fields.height,
            image_size_bytes: fields.size_bytes,
            resource_used: self.caps.meter.used(),
        })
    }

    /// Generate the combined page-plus-image result.
    ///
    /// Never fails outright: page failures are classified into
    /// explanatory placeholder fields, image failures are absorbed into
    /// absent fields. The single exception is resource exhaustion, which
    /// always propagates.
    pub async fn generate_combined(&self, url: &str) -> Result<ResultRecord> {
        let (page, html) = match self.page_path(url).await {
            Ok((ctx, html)) => (PageOutcome::Summarized(ctx), Some(html)),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => (Self::failed_page_outcome(err), None),
        };

        let image = match (&page, html) {
            (PageOutcome::Summarized(ctx), Some(html)) => {
                match self.image_path(url, &html, Some(ctx)).await {
                    Ok(Some(fields)) => ImageOutcome::Described(fields),
                    Ok(None) => ImageOutcome::Absent,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        warn!(url, error = %err, "image path failed, omitting image fields");
                        ImageOutcome::Absent
                    }
                }
            }
            _ => ImageOutcome::Absent,
        };

        info!(url, used = self.caps.meter.used(), "combined generation finished");
        Ok(Self::assemble(url, page, image, self.caps.meter.used()))
    }

    /// Charge the meter, converting exhaustion to the fatal error.
    fn charge(&self, op: OperationKind) -> Result<()> {
        self.caps.meter.charge(op).map_err(|_| Error::ResourceExhausted {
            used: self.caps.meter.used(),
        })
    }

    /// Fetch the page HTML, classifying any failure.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.charge(OperationKind::PageFetch)?;
        let response = match timeout(self.options.fetch_timeout, self.caps.network.fetch(url)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(failure)) => {
                return Err(Error::Fetch {
                    url: url.to_string(),
                    info: classify_fetch(&failure, url),
                })
            }
            Err(_elapsed) => {
                let failure = CapabilityFailure::code("ETIMEDOUT", "page fetch timed out");
                return Err(Error::Fetch {
                    url: url.to_string(),
                    info: classify_fetch(&failure, url),
                })
            }
        };
        if !response.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                info: classify_http_status(response.status, url),
            });
        }
        Ok(String::from_utf8_lossy(&response.bytes).into_owned())
    }

    /// Summarize extracted text, substituting placeholders so the page
    /// fields are never empty.
    async fn summarize_page(&self, url: &str, page_text: &str) -> Result<PageContext> {
        self.charge(OperationKind::TextPredict)?;
        let mut ctx = summarize(url, page_text, &self.caps, &self.options)
            .await
            .map_err(|failure| Error::Model {
                info: classify_model(&failure, &self.options.model_endpoint),
            })?;
        if ctx.alt_text.trim().is_empty() {
            ctx.alt_text = PLACEHOLDER_ALT_TEXT.to_string();
        }
        if ctx.topic.as_deref().is_none_or(|topic| topic.trim().is_empty()) {
            ctx.topic = Some(PLACEHOLDER_TOPIC.to_string());
        }
        Ok(ctx)
    }

    /// The page half: fetch, extract, summarize. Returns the context and
    /// the HTML for downstream harvesting.
    async fn page_path(&self, url: &str) -> Result<(PageContext, String)> {
        let html = self.fetch_page(url).await?;
        let page_text = text::extract(&html);
        let ctx = self.summarize_page(url, &page_text).await?;
        Ok((ctx, html))
    }

    /// The image half: harvest, filter, score, describe the winner.
    ///
    /// Returns `Ok(None)` when no usable image exists; only fatal errors
    /// and description-stage model failures surface as `Err`.
    async fn image_path(
        &self,
        url: &str,
        html: &str,
        page_ctx: Option<&PageContext>,
    ) -> Result<Option<ImageFields>> {
        let candidates = filter(harvest(html, url), self.options.max_candidates);
        if candidates.is_empty() {
            return Ok(None);
        }

        let scored = score_all(candidates, page_ctx, &self.caps, &self.options).await?;
        let Some(winner) = select_winner(&scored) else {
            return Ok(None);
        };

        self.charge(OperationKind::VisionPredict)?;
        let described = describe(url, winner, page_ctx, &self.caps, &self.options)
            .await
            .map_err(|failure| Error::Model {
                info: classify_model(&failure, &self.options.model_endpoint),
            })?;

        Ok(Some(ImageFields {
            url: winner.candidate.url.clone(),
            alt_text: described.alt_text,
            description: described.description,
            width: winner.candidate.width,
            height: winner.candidate.height,
            size_bytes: winner.candidate.size_bytes,
        }))
    }

    /// Turn a classified page-path error into explanatory placeholders.
    fn failed_page_outcome(err: Error) -> PageOutcome {
        let (message, fetch_error, model_error) = match err {
            Error::Fetch { info, .. } => (info.message.clone(), Some(info), None),
            Error::Model { info } => (info.message.clone(), None, Some(info)),
            other => (other.to_string(), None, None),
        };
        PageOutcome::Failed {
            alt_text: format!("This site could not be analyzed: {message}"),
            fetch_error,
            model_error,
        }
    }

    /// Assemble the final record from the two independent outcomes.
    fn assemble(url: &str, page: PageOutcome, image: ImageOutcome, used: u64) -> ResultRecord {
        let (page_alt_text, page_topic, fetch_error, model_error) = match page {
            PageOutcome::Summarized(ctx) => (
                ctx.alt_text,
                ctx.topic.unwrap_or_else(|| PLACEHOLDER_TOPIC.to_string()),
                None,
                None,
            ),
            PageOutcome::Failed {
                alt_text,
                fetch_error,
                model_error,
            } => (alt_text, FAILED_TOPIC.to_string(), fetch_error, model_error),
        };

        let mut record = ResultRecord {
            url: url.to_string(),
            page_alt_text,
            page_topic,
            resource_used: Some(used),
            image_url: None,
            image_alt_text: None,
            image_description: None,
            image_width: None,
            image_height: None,
            image_size_bytes: None,
            fetch_error,
            model_error,
        };

        if let ImageOutcome::Described(fields) = image {
            record.image_url = Some(fields.url);
            record.image_alt_text = Some(fields.alt_text);
            record.image_description = fields.description;
            record.image_width = fields.width;
            record.image_height = fields.height;
            record.image_size_bytes = fields.size_bytes;
        }

        record
    }
}
