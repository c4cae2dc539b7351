//! Image description via the vision capability.
//!
//! Runs against the winning candidate only, embedding its already-fetched
//! bytes, its markup alt text when present, and optional page context to
//! bias relevance. Shares the structured-output parse fallback with page
//! summarization: unparseable content becomes the alt text.

use serde_json::Value;
use tracing::debug;

use crate::capability::{string_schema, Capabilities, CapabilityFailure, Prediction};
use crate::options::Options;
use crate::score::ScoredCandidate;
use crate::summarize::PageContext;

/// Description metadata for the winning image.
#[derive(Debug, Clone)]
pub struct ImageDescription {
    /// Short alt text. Guideline 50-200 characters, not enforced.
    pub alt_text: String,
    /// Longer description, when the model produced one.
    pub description: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are an accessibility assistant. You write alt text for \
images on web pages. Respond with JSON containing an \"altText\" field (50-200 characters) \
and an optional \"description\" field with a longer explanation of what the image shows. \
Describe only what is visible.";

/// Describe the winning candidate.
///
/// # Errors
/// Returns the raw capability failure for the caller to classify or
/// absorb.
pub async fn describe(
    url: &str,
    winner: &ScoredCandidate,
    page_ctx: Option<&PageContext>,
    caps: &Capabilities,
    options: &Options,
) -> Result<ImageDescription, CapabilityFailure> {
    let user_prompt = build_prompt(url, winner, page_ctx);
    let schema = string_schema(
        &[
            ("altText", "Short alt text for the image"),
            ("description", "A longer description of the image"),
        ],
        &["altText"],
    );

    let prediction = tokio::time::timeout(
        options.vision_timeout,
        caps.vision_model.predict_with_vision(
            SYSTEM_PROMPT,
            &user_prompt,
            &winner.image_bytes,
            &schema,
        ),
    )
    .await
    .map_err(|_| CapabilityFailure::message("vision description timed out"))??;

    Ok(parse_description(&prediction))
}

fn build_prompt(url: &str, winner: &ScoredCandidate, page_ctx: Option<&PageContext>) -> String {
    let mut prompt = format!("Write alt text for this image from {url}.");
    if let Some(alt) = &winner.candidate.alt {
        prompt.push_str(&format!(" The page author's alt text was: \"{alt}\"."));
    }
    if let Some(ctx) = page_ctx {
        prompt.push_str(&format!(" The page is about: {}.", ctx.alt_text));
        if let Some(topic) = &ctx.topic {
            prompt.push_str(&format!(" Topic: {topic}."));
        }
    }
    prompt
}

fn parse_description(prediction: &Prediction) -> ImageDescription {
    match serde_json::from_str::<Value>(&prediction.content) {
        Ok(value) => {
            let alt_text = value
                .get("altText")
                .and_then(Value::as_str)
                .unwrap_or(&prediction.content)
                .to_string();
            let description = value
                .get("description")
                .and_then(Value::as_str)
                .map(std::string::ToString::to_string)
                .filter(|text| !text.trim().is_empty());
            ImageDescription {
                alt_text,
                description,
            }
        }
        Err(parse_err) => {
            debug!(error = %parse_err, "description response was not JSON, using raw content");
            ImageDescription {
                alt_text: prediction.content.clone(),
                description: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::{ImageCandidate, SourceKind};
    use crate::score::Score;

    fn winner(alt: Option<&str>) -> ScoredCandidate {
        ScoredCandidate {
            candidate: ImageCandidate {
                url: "https://x.test/hero.jpg".to_string(),
                width: Some(800),
                height: Some(400),
                alt: alt.map(str::to_string),
                size_bytes: Some(120_000),
                source: SourceKind::Img,
            },
            image_bytes: vec![0xFF, 0xD8],
            score: Score::Scored(75.0),
        }
    }

    #[test]
    fn build_prompt_includes_existing_alt_and_context() {
        let ctx = PageContext {
            alt_text: "A travel blog".to_string(),
            topic: Some("Travel".to_string()),
        };
        let prompt = build_prompt("https://x.test/", &winner(Some("old alt")), Some(&ctx));
        assert!(prompt.contains("old alt"));
        assert!(prompt.contains("A travel blog"));
        assert!(prompt.contains("Travel"));
    }

    #[test]
    fn build_prompt_without_context_stays_minimal() {
        let prompt = build_prompt("https://x.test/", &winner(None), None);
        assert!(!prompt.contains("page is about"));
    }

    #[test]
    fn parse_description_reads_structured_fields() {
        let prediction = Prediction {
            content: r#"{"altText":"A sunset over hills","description":"Golden light."}"#
                .to_string(),
        };
        let parsed = parse_description(&prediction);
        assert_eq!(parsed.alt_text, "A sunset over hills");
        assert_eq!(parsed.description.as_deref(), Some("Golden light."));
    }

    #[test]
    fn parse_description_falls_back_to_raw_content() {
        let prediction = Prediction {
            content: "A sunset over hills.".to_string(),
        };
        let parsed = parse_description(&prediction);
        assert_eq!(parsed.alt_text, "A sunset over hills.");
        assert_eq!(parsed.description, None);
    }
}
