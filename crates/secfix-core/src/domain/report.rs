//! Report template loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Minimal two-section template used when no template file is available.
pub const FALLBACK_TEMPLATE: &str =
    "# Security Report\n\n## Vulnerability\n[Desc]\n\n## Fix\n[Fix]\n";

/// Where the template text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    File,
    BuiltIn,
}

/// Report document with bracketed placeholders to be filled by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTemplate {
    pub text: String,
    pub source: TemplateSource,
}

impl ReportTemplate {
    /// Read the template at `path`, falling back to [`FALLBACK_TEMPLATE`] when
    /// the file is missing, unreadable or blank.
    pub fn load_or_fallback(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => Self {
                text,
                source: TemplateSource::File,
            },
            Ok(_) => {
                warn!(path = %path.display(), "report template is empty; using built-in template");
                Self::fallback()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "report template unavailable; using built-in template");
                Self::fallback()
            }
        }
    }

    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEMPLATE.to_string(),
            source: TemplateSource::BuiltIn,
        }
    }

    /// Bracketed placeholders such as `[Desc]`, in document order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut found = Vec::new();
        let mut rest = self.text.as_str();
        while let Some(open) = rest.find('[') {
            let after = &rest[open + 1..];
            match after.find(']') {
                Some(close) if !after[..close].contains('\n') => {
                    found.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                _ => rest = after,
            }
        }
        found
    }
}
