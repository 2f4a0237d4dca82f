//! Deterministic fakes for the reasoning engine and reference fetching
//! (testing only).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ResearchItem;
use crate::engine::{EngineError, EnginePurpose, EngineRequest, ReasoningEngine};
use crate::research::ResearchFetcher;

// ---------------------------------------------------------------------------
// ScriptedEngine
// ---------------------------------------------------------------------------

/// Engine that answers each purpose with a canned response and records
/// every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    responses: Mutex<HashMap<EnginePurpose, Result<String, String>>>,
    requests: Mutex<Vec<EngineRequest>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, purpose: EnginePurpose, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(purpose, Ok(body.into()));
        self
    }

    /// Make requests for `purpose` fail with a transport error.
    pub fn fail(self, purpose: EnginePurpose, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(purpose, Err(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<EngineRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompt_for(&self, purpose: EnginePurpose) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.purpose == purpose)
            .map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn complete(&self, request: &EngineRequest) -> Result<String, EngineError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.responses.lock().unwrap().get(&request.purpose) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(EngineError::Transport(message.clone())),
            None => Err(EngineError::EmptyResponse),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticFetcher
// ---------------------------------------------------------------------------

/// Fetcher with per-URL canned bodies and optional delays.
///
/// URLs without an entry resolve to a failed item.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, (Duration, Result<String, String>)>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str, delay: Duration) -> Self {
        self.pages
            .insert(url.to_string(), (delay, Ok(body.to_string())));
        self
    }

    pub fn failing(mut self, url: &str, error: &str, delay: Duration) -> Self {
        self.pages
            .insert(url.to_string(), (delay, Err(error.to_string())));
        self
    }
}

#[async_trait]
impl ResearchFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> ResearchItem {
        match self.pages.get(url) {
            Some((delay, outcome)) => {
                tokio::time::sleep(*delay).await;
                match outcome {
                    Ok(body) => ResearchItem::fetched(url, body.clone()),
                    Err(error) => ResearchItem::failed(url, error),
                }
            }
            None => ResearchItem::failed(url, "no such page"),
        }
    }
}
