//! Vulnerability classification returned by the analyzer stage.

use serde::{Deserialize, Deserializer, Serialize};

/// Structured classification of the primary weakness in the target artifact.
///
/// Produced once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityAnalysis {
    /// Short label or identifier, e.g. `CWE-22` or `path traversal`.
    pub vulnerability_type: String,

    /// Free-text description of the weakness in this artifact.
    pub description: String,

    /// Authoritative reference URLs to research, in the engine's order.
    /// A missing or `null` list means no research.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub research_urls: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl VulnerabilityAnalysis {
    pub fn new(vulnerability_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            vulnerability_type: vulnerability_type.into(),
            description: description.into(),
            research_urls: Vec::new(),
        }
    }

    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.research_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Pretty JSON rendering embedded in engine prompts.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            format!(
                "{{\"vulnerability_type\": {:?}, \"description\": {:?}}}",
                self.vulnerability_type, self.description
            )
        })
    }
}
