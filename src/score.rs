//! Concurrent candidate fetching and vision scoring.
//!
//! Two fan-out points run here: retrieving bytes for every filtered
//! candidate, then scoring every survivor against the vision model. Each
//! task's failure is caught and converted to a per-candidate drop or a
//! heuristic fallback, so one bad image never cancels its siblings.
//! Resource-budget exhaustion is the one exception: it aborts the batch.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tokio::time::timeout;
use tracing::debug;

use crate::capability::{Capabilities, OperationKind};
use crate::error::{Error, Result};
use crate::harvest::ImageCandidate;
use crate::options::Options;
use crate::summarize::PageContext;

/// A candidate score, tagged by how it was produced.
///
/// Vision scores and heuristic estimates are kept distinguishable so
/// downstream consumers can tell confidence apart; both carry a value in
/// [0, 100] and compare on that value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Produced by the vision model against the rubric.
    Scored(f64),
    /// Heuristic fallback from area or byte size, capped so it can never
    /// outrank a genuine high vision score.
    Estimated(f64),
}

impl Score {
    /// The comparable numeric value.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Score::Scored(value) | Score::Estimated(value) => value,
        }
    }

    /// Whether this score is a heuristic estimate.
    #[must_use]
    pub fn is_estimated(self) -> bool {
        matches!(self, Score::Estimated(_))
    }
}

/// A candidate that survived fetching, with its bytes and score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// The harvested candidate, with `size_bytes` now attached.
    pub candidate: ImageCandidate,
    /// The fetched image bytes, later embedded in the description call.
    pub image_bytes: Vec<u8>,
    /// Informativeness score in [0, 100].
    pub score: Score,
}

const RUBRIC_PROMPT: &str = "You rate how visually informative an image is for someone who \
cannot see it, on a 0-100 scale: 0-20 decorative or icon, 21-40 simple graphic, 41-60 \
standard photo, 61-80 rich photo or diagram, 81-100 highly informative (charts, maps, \
detailed diagrams). Respond with JSON containing a numeric \"score\" field.";

/// Fetch and score all filtered candidates.
///
/// Returns an empty list when no candidate survives the fetch stage;
/// callers must treat that as "no winner".
///
/// # Errors
/// Only resource-budget exhaustion aborts; per-candidate failures are
/// absorbed.
pub async fn score_all(
    candidates: Vec<ImageCandidate>,
    page_ctx: Option<&PageContext>,
    caps: &Capabilities,
    options: &Options,
) -> Result<Vec<ScoredCandidate>> {
    let fetched = fetch_all(candidates, caps, options).await?;
    if fetched.is_empty() {
        return Ok(Vec::new());
    }

    let scoring = fetched.into_iter().map(|(candidate, image_bytes)| {
        let vision = Arc::clone(&caps.vision_model);
        let meter = Arc::clone(&caps.meter);
        let cap = options.fallback_score_cap;
        let vision_timeout = options.vision_timeout;
        let hint = context_hint(page_ctx, &candidate);
        async move {
            if meter.charge(OperationKind::VisionPredict).is_err() {
                return Err(Error::ResourceExhausted { used: meter.used() });
            }
            let schema = serde_json::json!({
                "type": "object",
                "properties": { "score": { "type": "number" } },
                "required": ["score"],
            });
            let outcome = timeout(
                vision_timeout,
                vision.predict_with_vision(RUBRIC_PROMPT, &hint, &image_bytes, &schema),
            )
            .await;
            let score = match outcome {
                Ok(Ok(prediction)) => match parse_score(&prediction.content) {
                    Some(value) => Score::Scored(value),
                    None => {
                        debug!(url = %candidate.url, "unparseable vision score, estimating");
                        Score::Estimated(estimate(&candidate, cap))
                    }
                },
                Ok(Err(failure)) => {
                    debug!(url = %candidate.url, error = %failure, "vision scoring failed, estimating");
                    Score::Estimated(estimate(&candidate, cap))
                }
                Err(_elapsed) => {
                    debug!(url = %candidate.url, "vision scoring timed out, estimating");
                    Score::Estimated(estimate(&candidate, cap))
                }
            };
            Ok(ScoredCandidate {
                candidate,
                image_bytes,
                score,
            })
        }
    });

    join_all(scoring).await.into_iter().collect()
}

/// Fan-out fetch stage: one task per candidate, failures drop the
/// candidate without aborting the batch.
async fn fetch_all(
    candidates: Vec<ImageCandidate>,
    caps: &Capabilities,
    options: &Options,
) -> Result<Vec<(ImageCandidate, Vec<u8>)>> {
    let fetches = candidates.into_iter().map(|mut candidate| {
        let network = Arc::clone(&caps.network);
        let meter = Arc::clone(&caps.meter);
        let fetch_timeout = options.fetch_timeout;
        async move {
            if meter.charge(OperationKind::ImageFetch).is_err() {
                return Err(Error::ResourceExhausted { used: meter.used() });
            }
            match timeout(fetch_timeout, network.fetch(&candidate.url)).await {
                Ok(Ok(response)) if response.is_success() => {
                    candidate.size_bytes = Some(response.bytes.len() as u64);
                    Ok(Some((candidate, response.bytes)))
                }
                Ok(Ok(response)) => {
                    debug!(url = %candidate.url, status = response.status, "image fetch rejected, dropping candidate");
                    Ok(None)
                }
                Ok(Err(failure)) => {
                    debug!(url = %candidate.url, error = %failure, "image fetch failed, dropping candidate");
                    Ok(None)
                }
                Err(_elapsed) => {
                    debug!(url = %candidate.url, "image fetch timed out, dropping candidate");
                    Ok(None)
                }
            }
        }
    });

    let outcomes: Vec<Result<Option<(ImageCandidate, Vec<u8>)>>> = join_all(fetches).await;
    let mut survivors = Vec::new();
    for outcome in outcomes {
        if let Some(fetched) = outcome? {
            survivors.push(fetched);
        }
    }
    Ok(survivors)
}

/// User text for the vision call: candidate alt plus optional page context.
fn context_hint(page_ctx: Option<&PageContext>, candidate: &ImageCandidate) -> String {
    let mut hint = String::from("Rate this image.");
    if let Some(alt) = &candidate.alt {
        hint.push_str(&format!(" Its markup alt text is: \"{alt}\"."));
    }
    if let Some(ctx) = page_ctx {
        hint.push_str(&format!(" It appears on a page about: {}.", ctx.alt_text));
        if let Some(topic) = &ctx.topic {
            hint.push_str(&format!(" Topic: {topic}."));
        }
    }
    hint
}

/// Parse the numeric score out of a structured response, accepting either
/// an object with a `score` field or a bare number. Values outside [0, 100]
/// are clamped.
fn parse_score(content: &str) -> Option<f64> {
    let value: Value = serde_json::from_str(content).ok()?;
    let raw = match &value {
        Value::Number(number) => number.as_f64()?,
        Value::Object(_) => value.get("score")?.as_f64()?,
        _ => return None,
    };
    Some(raw.clamp(0.0, 100.0))
}

/// Deterministic fallback score when the vision model is unavailable.
///
/// `min(cap, area / 10000)` when the area is known, else
/// `min(cap, size_bytes / 100000)`, else zero.
fn estimate(candidate: &ImageCandidate, cap: f64) -> f64 {
    if let Some(area) = candidate.area() {
        (area as f64 / 10_000.0).min(cap)
    } else if let Some(size) = candidate.size_bytes {
        (size as f64 / 100_000.0).min(cap)
    } else {
        0.0
    }
}

/// Select the winning candidate: scan in original order keeping the
/// running maximum under a strictly-greater comparison, so the earliest
/// candidate wins exact ties.
#[must_use]
pub fn select_winner(scored: &[ScoredCandidate]) -> Option<&ScoredCandidate> {
    let mut winner: Option<&ScoredCandidate> = None;
    for entry in scored {
        match winner {
            Some(best) if entry.score.value() > best.score.value() => winner = Some(entry),
            None => winner = Some(entry),
            Some(_) => {}
        }
    }
    winner
}
