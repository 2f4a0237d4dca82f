//! Reasoning-engine seam.
//!
//! Every stage that needs the engine goes through [`ReasoningEngine`], a
//! single-shot prompt-in, text-out exchange. Production uses
//! [`openai::OpenAiEngine`]; tests use `crate::fakes::ScriptedEngine`.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiEngine;

/// Shape the engine is asked to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// A single JSON object.
    Json,
    /// Free text.
    Text,
}

/// Which stage issued a request. Used for logging and by test fakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePurpose {
    Classify,
    Synthesize,
    Summarize,
}

impl EnginePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnginePurpose::Classify => "classify",
            EnginePurpose::Synthesize => "synthesize",
            EnginePurpose::Summarize => "summarize",
        }
    }
}

/// One request to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub purpose: EnginePurpose,
    pub prompt: String,
    pub format: ResponseFormat,
}

impl EngineRequest {
    pub fn json(purpose: EnginePurpose, prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            prompt: prompt.into(),
            format: ResponseFormat::Json,
        }
    }

    pub fn text(purpose: EnginePurpose, prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }
}

/// Errors from the engine transport.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine request failed: {0}")]
    Transport(String),

    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine returned no content")]
    EmptyResponse,

    #[error("cannot decode engine response: {0}")]
    Decode(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Transport(err.to_string())
    }
}

/// Black-box reasoning engine.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Send one prompt and return the response text.
    async fn complete(&self, request: &EngineRequest) -> Result<String, EngineError>;
}
