//! Capability traits consumed from the execution host.
//!
//! The core never opens sockets or calls models itself: network access,
//! text generation, vision inference, and resource accounting are
//! explicitly granted functions injected by the surrounding runtime. Each
//! trait here mirrors one host capability, and `Capabilities` bundles them
//! for threading through a workflow run.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// Raw failure shape produced by a capability call before classification.
///
/// `code` carries OS-level tags such as `ECONNREFUSED` when the host
/// surfaces them; `status` and `body` are present for HTTP-level failures.
#[derive(Debug, Clone, Default)]
pub struct CapabilityFailure {
    /// Low-level error code, e.g. `ECONNREFUSED`, `ENOTFOUND`, `ETIMEDOUT`.
    pub code: Option<String>,
    /// HTTP status when the failure came from a completed response.
    pub status: Option<u16>,
    /// Response body text, when available.
    pub body: Option<String>,
    /// Human-readable failure description.
    pub message: String,
}

impl CapabilityFailure {
    /// A failure carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        CapabilityFailure {
            message: message.into(),
            ..CapabilityFailure::default()
        }
    }

    /// A failure carrying an OS-level code.
    #[must_use]
    pub fn code(code: impl Into<String>, message: impl Into<String>) -> Self {
        CapabilityFailure {
            code: Some(code.into()),
            message: message.into(),
            ..CapabilityFailure::default()
        }
    }
}

impl std::fmt::Display for CapabilityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result type for capability invocations.
pub type CapabilityResult<T> = std::result::Result<T, CapabilityFailure>;

/// Response from a network fetch.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub bytes: Vec<u8>,
}

impl FetchResponse {
    /// Whether the status code indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A model response constrained to a JSON schema.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// JSON-encoded content satisfying the requested schema's required
    /// fields. Callers always parse it and fall back to treating it as a
    /// plain string on parse failure.
    pub content: String,
}

/// Network access granted by the host, for page and image retrieval.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a URL, returning status, headers, and body bytes.
    async fn fetch(&self, url: &str) -> CapabilityResult<FetchResponse>;
}

/// Text-generation inference granted by the host.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Run a prediction with a system prompt, user prompt, and response
    /// schema the content must satisfy.
    async fn predict(
        &self,
        system: &str,
        user: &str,
        response_schema: &Value,
    ) -> CapabilityResult<Prediction>;
}

/// Vision inference granted by the host.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Run a prediction over an image plus accompanying text.
    async fn predict_with_vision(
        &self,
        system: &str,
        user: &str,
        image_bytes: &[u8],
        response_schema: &Value,
    ) -> CapabilityResult<Prediction>;
}

/// Kinds of metered operations, each with its own cost on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Fetching the page HTML.
    PageFetch,
    /// Fetching one image candidate's bytes.
    ImageFetch,
    /// One text-generation call.
    TextPredict,
    /// One vision call.
    VisionPredict,
}

/// Resource accounting granted by the host.
///
/// Meters a cost per operation against a budget; exhaustion aborts the
/// whole run.
pub trait ResourceMeter: Send + Sync {
    /// Charge one operation against the budget.
    ///
    /// # Errors
    /// Returns a failure when the budget is exhausted.
    fn charge(&self, op: OperationKind) -> CapabilityResult<()>;

    /// Units consumed so far in this run.
    fn used(&self) -> u64;
}

/// The full capability bundle threaded through a workflow run.
#[derive(Clone)]
pub struct Capabilities {
    /// Network access.
    pub network: Arc<dyn Network>,
    /// Text-generation model.
    pub text_model: Arc<dyn TextModel>,
    /// Vision model.
    pub vision_model: Arc<dyn VisionModel>,
    /// Resource accounting.
    pub meter: Arc<dyn ResourceMeter>,
}

/// Build a response schema with the given required string fields.
///
/// The object-with-required-properties shape is the structured-output
/// contract every model capability accepts.
#[must_use]
pub fn string_schema(fields: &[(&str, &str)], required: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, description)| {
            (
                (*name).to_string(),
                serde_json::json!({ "type": "string", "description": description }),
            )
        })
        .collect();
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
