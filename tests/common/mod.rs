//! Shared mock capabilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pagealt::capability::{
    CapabilityFailure, CapabilityResult, FetchResponse, Network, OperationKind, Prediction,
    ResourceMeter, TextModel, VisionModel,
};
use pagealt::Capabilities;

/// Network mock with per-URL scripted responses.
pub struct MockNetwork {
    routes: HashMap<String, CapabilityResult<FetchResponse>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        MockNetwork {
            routes: HashMap::new(),
        }
    }

    pub fn ok(mut self, url: &str, bytes: &[u8]) -> Self {
        self.routes.insert(
            url.to_string(),
            Ok(FetchResponse {
                status: 200,
                headers: vec![("content-type".to_string(), "text/html".to_string())],
                bytes: bytes.to_vec(),
            }),
        );
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(
            url.to_string(),
            Ok(FetchResponse {
                status,
                headers: vec![],
                bytes: vec![],
            }),
        );
        self
    }

    pub fn fail(mut self, url: &str, failure: CapabilityFailure) -> Self {
        self.routes.insert(url.to_string(), Err(failure));
        self
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, url: &str) -> CapabilityResult<FetchResponse> {
        self.routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(CapabilityFailure::message(format!("no route for {url}"))))
    }
}

/// Text model returning one scripted outcome for every call.
pub struct ScriptedText {
    outcome: CapabilityResult<String>,
}

impl ScriptedText {
    pub fn ok(content: &str) -> Self {
        ScriptedText {
            outcome: Ok(content.to_string()),
        }
    }

    pub fn fail(failure: CapabilityFailure) -> Self {
        ScriptedText {
            outcome: Err(failure),
        }
    }
}

#[async_trait]
impl TextModel for ScriptedText {
    async fn predict(
        &self,
        _system: &str,
        _user: &str,
        _response_schema: &serde_json::Value,
    ) -> CapabilityResult<Prediction> {
        self.outcome
            .clone()
            .map(|content| Prediction { content })
    }
}

/// Vision model with separate scripted outcomes for scoring calls
/// (schema requires `score`) and description calls.
pub struct ScriptedVision {
    score_outcome: CapabilityResult<String>,
    describe_outcome: CapabilityResult<String>,
}

impl ScriptedVision {
    pub fn ok(score_content: &str, describe_content: &str) -> Self {
        ScriptedVision {
            score_outcome: Ok(score_content.to_string()),
            describe_outcome: Ok(describe_content.to_string()),
        }
    }

    pub fn fail(failure: CapabilityFailure) -> Self {
        ScriptedVision {
            score_outcome: Err(failure.clone()),
            describe_outcome: Err(failure),
        }
    }
}

#[async_trait]
impl VisionModel for ScriptedVision {
    async fn predict_with_vision(
        &self,
        _system: &str,
        _user: &str,
        _image_bytes: &[u8],
        response_schema: &serde_json::Value,
    ) -> CapabilityResult<Prediction> {
        let wants_score = response_schema["required"]
            .as_array()
            .is_some_and(|required| required.iter().any(|field| field == "score"));
        let outcome = if wants_score {
            &self.score_outcome
        } else {
            &self.describe_outcome
        };
        outcome.clone().map(|content| Prediction { content })
    }
}

/// Meter charging one unit per operation against a fixed budget.
pub struct TestMeter {
    used: AtomicU64,
    budget: u64,
}

impl TestMeter {
    pub fn unlimited() -> Self {
        TestMeter {
            used: AtomicU64::new(0),
            budget: u64::MAX,
        }
    }

    pub fn with_budget(budget: u64) -> Self {
        TestMeter {
            used: AtomicU64::new(0),
            budget,
        }
    }
}

impl ResourceMeter for TestMeter {
    fn charge(&self, _op: OperationKind) -> CapabilityResult<()> {
        let next = self.used.load(Ordering::SeqCst) + 1;
        if next > self.budget {
            return Err(CapabilityFailure::message("resource budget exhausted"));
        }
        self.used.store(next, Ordering::SeqCst);
        Ok(())
    }

    fn used(&self) -> u64 {
        self.used.load(Ordering::SeqCst)
    }
}

/// Bundle mocks into a capability set.
pub fn caps(
    network: MockNetwork,
    text: ScriptedText,
    vision: ScriptedVision,
    meter: TestMeter,
) -> Capabilities {
    Capabilities {
        network: Arc::new(network),
        text_model: Arc::new(text),
        vision_model: Arc::new(vision),
        meter: Arc::new(meter),
    }
}
