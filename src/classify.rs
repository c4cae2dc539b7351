//! Classification of raw network and model failures.
//!
//! Maps capability failures into a closed taxonomy with user-facing
//! guidance. The decision tables are ordered: the first matching row wins,
//! and anything unmatched falls through to `Unknown` carrying the
//! truncated raw message.

use serde::Serialize;

use crate::capability::CapabilityFailure;
use crate::text::truncate_chars;
use crate::url_utils::get_domain_url;

/// Longest raw message fragment carried into an `Unknown` classification.
const MAX_RAW_MESSAGE: usize = 200;

/// Closed kind set for page and image fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The domain name did not resolve.
    DnsError,
    /// The server refused the connection.
    ConnectionRefused,
    /// The request timed out.
    Timeout,
    /// TLS negotiation or certificate validation failed.
    SslError,
    /// The site rejected the request (403, 451, or bot detection).
    Blocked,
    /// The resource does not exist (404, 410).
    NotFound,
    /// Any other non-success HTTP status.
    HttpError,
    /// Unmatched failure.
    Unknown,
}

/// Closed kind set for model-capability failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelErrorKind {
    /// Nothing is listening at the model endpoint.
    NotRunning,
    /// The server is up but has no model loaded.
    NoModel,
    /// The connection was refused mid-exchange.
    ConnectionRefused,
    /// The model call timed out.
    Timeout,
    /// Authentication was rejected.
    AuthFailed,
    /// The endpoint path does not exist.
    EndpointNotFound,
    /// The server is rate limiting requests.
    RateLimited,
    /// The model server failed internally.
    ServerError,
    /// Unmatched failure.
    Unknown,
}

/// Classified fetch failure with user-facing guidance.
#[derive(Debug, Clone, Serialize)]
pub struct FetchErrorInfo {
    /// Classified kind.
    pub kind: FetchErrorKind,
    /// Raw error code, when one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Actionable next step for the user.
    pub suggestion: String,
    /// The URL or host the failure concerned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl std::fmt::Display for FetchErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Classified model failure with user-facing guidance.
#[derive(Debug, Clone, Serialize)]
pub struct ModelErrorInfo {
    /// Classified kind.
    pub kind: ModelErrorKind,
    /// Raw error code, when one was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Actionable next step for the user.
    pub suggestion: String,
    /// The model endpoint the failure concerned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl std::fmt::Display for ModelErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

fn matches_code(failure: &CapabilityFailure, codes: &[&str]) -> bool {
    failure
        .code
        .as_deref()
        .is_some_and(|code| codes.iter().any(|c| code.eq_ignore_ascii_case(c)))
}

fn message_contains(failure: &CapabilityFailure, needles: &[&str]) -> bool {
    let lowered = failure.message.to_lowercase();
    needles.iter().any(|needle| lowered.contains(needle))
}

/// Classify a page or image fetch failure.
#[must_use]
pub fn classify_fetch(failure: &CapabilityFailure, url: &str) -> FetchErrorInfo {
    let host = get_domain_url(url);
    let target = if host.is_empty() {
        Some(url.to_string())
    } else {
        Some(host.clone())
    };

    let (kind, message, suggestion) = if matches_code(failure, &["ENOTFOUND", "EAI_AGAIN"])
        || message_contains(failure, &["dns", "name or service not known", "failed to lookup"])
    {
        (
            FetchErrorKind::DnsError,
            format!("The domain {host} could not be resolved."),
            "Check that the URL is spelled correctly and the domain exists.".to_string(),
        )
    } else if matches_code(failure, &["ECONNREFUSED"])
        || message_contains(failure, &["connection refused"])
    {
        (
            FetchErrorKind::ConnectionRefused,
            format!("The server at {host} refused the connection."),
            "The site may be down - verify the URL and try again later.".to_string(),
        )
    } else if matches_code(failure, &["ETIMEDOUT", "ESOCKETTIMEDOUT"])
        || message_contains(failure, &["timed out", "timeout"])
    {
        (
            FetchErrorKind::Timeout,
            format!("The request to {host} timed out."),
            "The site is slow or unreachable - try again later.".to_string(),
        )
    } else if message_contains(failure, &["ssl", "tls", "certificate"]) {
        (
            FetchErrorKind::SslError,
            format!("A secure connection to {host} could not be established."),
            "The site's TLS certificate may be invalid or expired.".to_string(),
        )
    } else if let Some(status) = failure.status {
        return classify_http_status(status, url);
    } else {
        (
            FetchErrorKind::Unknown,
            truncate_chars(&failure.message, MAX_RAW_MESSAGE).to_string(),
            "An unexpected network error occurred - try again.".to_string(),
        )
    };

    FetchErrorInfo {
        kind,
        code: failure.code.clone(),
        message,
        suggestion,
        target,
    }
}

/// Classify a non-success HTTP status from a completed fetch.
#[must_use]
pub fn classify_http_status(status: u16, url: &str) -> FetchErrorInfo {
    let host = get_domain_url(url);
    let (kind, message, suggestion) = match status {
        401 | 403 | 451 => (
            FetchErrorKind::Blocked,
            format!("The site {host} blocked the request (HTTP {status})."),
            "The page may require login or reject automated access.".to_string(),
        ),
        404 | 410 => (
            FetchErrorKind::NotFound,
            format!("The page was not found (HTTP {status})."),
            "Check the URL for typos - the page may have moved.".to_string(),
        ),
        408 | 504 => (
            FetchErrorKind::Timeout,
            format!("The server timed out handling the request (HTTP {status})."),
            "The site is overloaded - try again later.".to_string(),
        ),
        _ => (
            FetchErrorKind::HttpError,
            format!("The server returned HTTP {status}."),
            "The site returned an error - try again later.".to_string(),
        ),
    };
    FetchErrorInfo {
        kind,
        code: Some(status.to_string()),
        message,
        suggestion,
        target: Some(if host.is_empty() { url.to_string() } else { host }),
    }
}

/// Classify a model-capability failure against the endpoint `target`.
///
/// The no-model body check runs first: a "No models loaded" body is more
/// specific than whatever status code wrapped it.
#[must_use]
pub fn classify_model(failure: &CapabilityFailure, target: &str) -> ModelErrorInfo {
    let body_lowered = failure.body.as_deref().unwrap_or("").to_lowercase();

    let (kind, message, suggestion) = if body_lowered.contains("no models loaded")
        || body_lowered.contains("model not found")
        || message_contains(failure, &["no models loaded", "model not found"])
    {
        (
            ModelErrorKind::NoModel,
            "The model server is running but has no model loaded.".to_string(),
            "Load a model in your model server and try again.".to_string(),
        )
    } else if matches_code(failure, &["ECONNREFUSED"]) {
        (
            ModelErrorKind::NotRunning,
            format!("No model server is listening at {target}."),
            "Start your model server (e.g. LM Studio or Ollama) and try again.".to_string(),
        )
    } else if message_contains(failure, &["connection refused"]) {
        (
            ModelErrorKind::ConnectionRefused,
            format!("The model server at {target} refused the connection."),
            "Check the model endpoint address and port.".to_string(),
        )
    } else if matches_code(failure, &["ETIMEDOUT"])
        || message_contains(failure, &["timed out", "timeout"])
    {
        (
            ModelErrorKind::Timeout,
            "The model call timed out.".to_string(),
            "The model may be loading or overloaded - try again shortly.".to_string(),
        )
    } else if matches!(failure.status, Some(401 | 403)) {
        (
            ModelErrorKind::AuthFailed,
            "The model server rejected the request's credentials.".to_string(),
            "Check your API key or authentication configuration.".to_string(),
        )
    } else if failure.status == Some(404) {
        (
            ModelErrorKind::EndpointNotFound,
            format!("The model endpoint {target} does not exist."),
            "Check the endpoint path - it may differ between model servers.".to_string(),
        )
    } else if failure.status == Some(429) {
        (
            ModelErrorKind::RateLimited,
            "The model server is rate limiting requests.".to_string(),
            "Wait a moment before retrying.".to_string(),
        )
    } else if failure.status.is_some_and(|status| status >= 500) {
        (
            ModelErrorKind::ServerError,
            format!(
                "The model server failed internally (HTTP {}).",
                failure.status.unwrap_or(500)
            ),
            "Check the model server's logs for details.".to_string(),
        )
    } else {
        (
            ModelErrorKind::Unknown,
            truncate_chars(&failure.message, MAX_RAW_MESSAGE).to_string(),
            "An unexpected model error occurred - try again.".to_string(),
        )
    };

    ModelErrorInfo {
        kind,
        code: failure.code.clone(),
        message,
        suggestion,
        target: Some(target.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_404_classifies_as_not_found() {
        let info = classify_http_status(404, "https://x.test/missing");
        assert_eq!(info.kind, FetchErrorKind::NotFound);
        assert_eq!(info.target.as_deref(), Some("x.test"));
    }

    #[test]
    fn econnrefused_classifies_as_connection_refused() {
        let failure = CapabilityFailure::code("ECONNREFUSED", "connect ECONNREFUSED 1.2.3.4:443");
        let info = classify_fetch(&failure, "https://x.test/");
        assert_eq!(info.kind, FetchErrorKind::ConnectionRefused);
        assert_eq!(info.code.as_deref(), Some("ECONNREFUSED"));
    }

    #[test]
    fn dns_failure_classifies_from_code_or_message() {
        let by_code = CapabilityFailure::code("ENOTFOUND", "getaddrinfo failed");
        assert_eq!(
            classify_fetch(&by_code, "https://nosuch.test/").kind,
            FetchErrorKind::DnsError
        );
        let by_message = CapabilityFailure::message("dns lookup failed for host");
        assert_eq!(
            classify_fetch(&by_message, "https://nosuch.test/").kind,
            FetchErrorKind::DnsError
        );
    }

    #[test]
    fn http_403_classifies_as_blocked() {
        assert_eq!(
            classify_http_status(403, "https://x.test/").kind,
            FetchErrorKind::Blocked
        );
        assert_eq!(
            classify_http_status(451, "https://x.test/").kind,
            FetchErrorKind::Blocked
        );
    }

    #[test]
    fn http_5xx_classifies_as_http_error() {
        assert_eq!(
            classify_http_status(503, "https://x.test/").kind,
            FetchErrorKind::HttpError
        );
    }

    #[test]
    fn unknown_fetch_failure_carries_truncated_message() {
        let long = "x".repeat(500);
        let info = classify_fetch(&CapabilityFailure::message(&long), "https://x.test/");
        assert_eq!(info.kind, FetchErrorKind::Unknown);
        assert_eq!(info.message.len(), 200);
    }

    #[test]
    fn no_models_loaded_body_classifies_as_no_model() {
        let failure = CapabilityFailure {
            status: Some(400),
            body: Some("{\"error\":\"No models loaded\"}".to_string()),
            message: "bad request".to_string(),
            ..CapabilityFailure::default()
        };
        let info = classify_model(&failure, "http://localhost:1234/v1");
        assert_eq!(info.kind, ModelErrorKind::NoModel);
    }

    #[test]
    fn model_econnrefused_classifies_as_not_running() {
        let failure = CapabilityFailure::code("ECONNREFUSED", "connect ECONNREFUSED");
        let info = classify_model(&failure, "http://localhost:1234/v1");
        assert_eq!(info.kind, ModelErrorKind::NotRunning);
        assert!(info.suggestion.contains("Start"));
    }

    #[test]
    fn model_status_codes_follow_decision_table() {
        let status = |code: u16| CapabilityFailure {
            status: Some(code),
            message: format!("HTTP {code}"),
            ..CapabilityFailure::default()
        };
        let target = "http://localhost:1234/v1";
        assert_eq!(classify_model(&status(401), target).kind, ModelErrorKind::AuthFailed);
        assert_eq!(
            classify_model(&status(404), target).kind,
            ModelErrorKind::EndpointNotFound
        );
        assert_eq!(
            classify_model(&status(429), target).kind,
            ModelErrorKind::RateLimited
        );
        assert_eq!(
            classify_model(&status(500), target).kind,
            ModelErrorKind::ServerError
        );
    }

    #[test]
    fn model_unknown_falls_through_with_message() {
        let info = classify_model(
            &CapabilityFailure::message("something odd"),
            "http://localhost:1234/v1",
        );
        assert_eq!(info.kind, ModelErrorKind::Unknown);
        assert_eq!(info.message, "something odd");
    }
}
