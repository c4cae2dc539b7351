//! Page-level summarization via the text-generation capability.
//!
//! Builds a grounded prompt from the page URL and extracted text, requests
//! a structured response, and parses it with a defined fallback: when the
//! model returns something that is not JSON, the raw content becomes the
//! alt text rather than failing the workflow.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::capability::{string_schema, Capabilities, CapabilityFailure, Prediction};
use crate::options::Options;
use crate::text::truncate_chars;

/// Page-level context produced by summarization and optionally consumed by
/// image scoring and description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    /// Short description of the page. Guideline 50-150 characters,
    /// not enforced.
    pub alt_text: String,
    /// One-line topic classification, when the model produced one.
    pub topic: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are an accessibility assistant. You write short, factual \
descriptions of web pages for screen reader users. Respond with JSON containing an \
\"altText\" field (50-150 characters describing the page) and a \"topic\" field \
(a few words naming the subject). Ground every statement in the provided content; \
never invent specifics.";

/// Summarize a page into accessibility context.
///
/// Embeds the first `options.summary_text_len` characters of `page_text`
/// in the prompt. Empty or whitespace-only text switches to a prompt that
/// states no content was retrieved and asks for a generic guess based on
/// the domain alone.
///
/// # Errors
/// Returns the raw capability failure; the caller decides whether to
/// classify or absorb it.
pub async fn summarize(
    url: &str,
    page_text: &str,
    caps: &Capabilities,
    options: &Options,
) -> Result<PageContext, CapabilityFailure> {
    let user_prompt = build_prompt(url, page_text, options.summary_text_len);
    let schema = string_schema(
        &[
            ("altText", "A short description of the page"),
            ("topic", "The page's subject in a few words"),
        ],
        &["altText", "topic"],
    );

    let prediction = tokio::time::timeout(
        options.text_timeout,
        caps.text_model.predict(SYSTEM_PROMPT, &user_prompt, &schema),
    )
    .await
    .map_err(|_| CapabilityFailure::code("ETIMEDOUT", "text generation timed out"))??;

    Ok(parse_context(&prediction))
}

/// Build the user prompt, with the explicit no-content variant.
fn build_prompt(url: &str, page_text: &str, text_limit: usize) -> String {
    let trimmed = page_text.trim();
    if trimmed.is_empty() {
        format!(
            "No content could be retrieved from {url}. Based only on the URL and its \
             domain, produce a generic description of what this page is likely about. \
             Do not invent specific facts."
        )
    } else {
        format!(
            "Describe the web page at {url} based on this extracted content:\n\n{}",
            truncate_chars(trimmed, text_limit)
        )
    }
}

/// Parse the structured response, treating unparseable content as the alt
/// text itself.
fn parse_context(prediction: &Prediction) -> PageContext {
    match serde_json::from_str::<Value>(&prediction.content) {
        Ok(value) => {
            let alt_text = value
                .get("altText")
                .and_then(Value::as_str)
                .unwrap_or(&prediction.content)
                .to_string();
            let topic = value
                .get("topic")
                .and_then(Value::as_str)
                .map(std::string::ToString::to_string)
                .filter(|topic| !topic.trim().is_empty());
            PageContext { alt_text, topic }
        }
        Err(parse_err) => {
            debug!(error = %parse_err, "summary response was not JSON, using raw content");
            PageContext {
                alt_text: prediction.content.clone(),
                topic: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_prompt_embeds_truncated_content() {
        let text = "word ".repeat(2000);
        let prompt = build_prompt("https://x.test/a", &text, 3000);
        assert!(prompt.contains("https://x.test/a"));
        // 3000 chars of content plus the prompt preamble.
        assert!(prompt.len() < 3200);
    }

    #[test]
    fn build_prompt_switches_to_no_content_variant() {
        let prompt = build_prompt("https://x.test/a", "   \n ", 3000);
        assert!(prompt.contains("No content could be retrieved"));
        assert!(prompt.contains("Do not invent"));
    }

    #[test]
    fn parse_context_reads_structured_fields() {
        let prediction = Prediction {
            content: r#"{"altText":"A cooking blog about bread","topic":"Baking"}"#.to_string(),
        };
        let ctx = parse_context(&prediction);
        assert_eq!(ctx.alt_text, "A cooking blog about bread");
        assert_eq!(ctx.topic.as_deref(), Some("Baking"));
    }

    #[test]
    fn parse_context_falls_back_to_raw_content() {
        let prediction = Prediction {
            content: "A page about bread baking.".to_string(),
        };
        let ctx = parse_context(&prediction);
        assert_eq!(ctx.alt_text, "A page about bread baking.");
        assert_eq!(ctx.topic, None);
    }

    #[test]
    fn parse_context_ignores_empty_topic() {
        let prediction = Prediction {
            content: r#"{"altText":"Something","topic":"  "}"#.to_string(),
        };
        assert_eq!(parse_context(&prediction).topic, None);
    }
}
