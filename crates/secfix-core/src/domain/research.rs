//! Research items gathered from reference URLs.

use serde::{Deserialize, Serialize};

/// One fetched reference, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchItem {
    pub source_url: String,

    /// Markup-stripped, length-bounded page text, or the error description
    /// when `ok` is false.
    pub body_text: String,

    pub ok: bool,
}

impl ResearchItem {
    pub fn fetched(source_url: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            body_text: body_text.into(),
            ok: true,
        }
    }

    pub fn failed(source_url: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            source_url: source_url.into(),
            body_text: error.to_string(),
            ok: false,
        }
    }

    /// Length of the body in characters, the unit the per-source cap uses.
    pub fn char_count(&self) -> usize {
        self.body_text.chars().count()
    }

    /// Self-labelled text block for the corpus.
    ///
    /// Successful items carry a `--- Source: <url> ---` header; failures are an
    /// inline marker naming the URL.
    pub fn render(&self) -> String {
        if self.ok {
            format!("--- Source: {} ---\n{}\n", self.source_url, self.body_text)
        } else {
            format!(
                "Error fetching content from {}: {}",
                self.source_url, self.body_text
            )
        }
    }
}

/// Research items in the order the URLs were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchCorpus {
    pub items: Vec<ResearchItem>,
}

impl ResearchCorpus {
    pub fn new(items: Vec<ResearchItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Concatenated corpus text; empty when no URLs were requested.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(ResearchItem::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
