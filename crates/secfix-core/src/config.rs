//! Run configuration.
//!
//! Defaults mirror the conventional layout: a `file_reader.py` target next to
//! `test_file_reader.py`, validated with `pytest`, reported into `REPORT.md`
//! from `REPORT_TEMPLATE.md`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{RemediationError, Result};

pub const DEFAULT_TARGET_FILE: &str = "file_reader.py";
pub const DEFAULT_TEST_FILE: &str = "test_file_reader.py";
pub const DEFAULT_TEST_PROGRAM: &str = "pytest";
pub const DEFAULT_REPORT_FILE: &str = "REPORT.md";
pub const DEFAULT_TEMPLATE_FILE: &str = "REPORT_TEMPLATE.md";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Browser identity sent with reference page requests.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Limits applied to fetched reference pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Maximum characters of cleaned page text kept per URL.
    pub max_chars: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_chars: 5000,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The external test command and its budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationConfig {
    /// Executable, e.g. `pytest`.
    pub program: String,
    /// Arguments; the test file name by default.
    pub args: Vec<String>,
    /// Working directory for the child process (`None` = inherit).
    pub work_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_TEST_PROGRAM.to_string(),
            args: vec![DEFAULT_TEST_FILE.to_string()],
            work_dir: None,
            timeout_secs: 30,
        }
    }
}

impl ValidationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Command line as a single display string.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Prompt-size bounds for the report stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    pub report_path: PathBuf,
    pub template_path: PathBuf,
    /// Characters of research corpus included in the report prompt.
    pub research_prefix_chars: usize,
    /// Characters of validation output (from the end) included.
    pub output_tail_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
            template_path: PathBuf::from(DEFAULT_TEMPLATE_FILE),
            research_prefix_chars: 1000,
            output_tail_chars: 500,
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub target_path: PathBuf,
    pub fetch: FetchConfig,
    pub validation: ValidationConfig,
    pub report: ReportConfig,
    /// Reject engine patch responses that carry no fenced code block.
    pub strict_patch: bool,
    /// Optional machine-readable run summary.
    pub summary_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_path: PathBuf::from(DEFAULT_TARGET_FILE),
            fetch: FetchConfig::default(),
            validation: ValidationConfig::default(),
            report: ReportConfig::default(),
            strict_patch: false,
            summary_path: None,
        }
    }
}

/// Reasoning-engine access.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl EngineConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }

    /// Read the credential from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the credential through `lookup`; a missing or blank key is a
    /// startup error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(API_KEY_ENV) {
            Some(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(RemediationError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            }),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
