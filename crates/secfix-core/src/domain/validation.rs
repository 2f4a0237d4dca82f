//! Outcome of running the artifact's test suite.

use serde::{Deserialize, Serialize};

/// Produced exactly once per run. Every failure path of the validator
/// resolves to one of these with `success = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,

    /// Merged stdout and stderr, or an explanatory string when no process
    /// output exists (timeout, launch error, patch not applied).
    pub combined_output: String,

    pub duration_seconds: f64,

    /// Process exit code, when the process exited on its own.
    #[serde(default)]
    pub exit_code: Option<i32>,

    #[serde(default)]
    pub timed_out: bool,
}

impl ValidationResult {
    pub fn passed(combined_output: String, duration_seconds: f64) -> Self {
        Self {
            success: true,
            combined_output,
            duration_seconds,
            exit_code: Some(0),
            timed_out: false,
        }
    }

    pub fn failed(combined_output: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            success: false,
            combined_output: combined_output.into(),
            duration_seconds,
            exit_code: None,
            timed_out: false,
        }
    }

    /// Placeholder result when the patched artifact never reached its live path.
    pub fn not_run(reason: impl std::fmt::Display) -> Self {
        Self::failed(format!("validation not run: {}", reason), 0.0)
    }

    /// Last `max_chars` characters of the combined output.
    pub fn output_tail(&self, max_chars: usize) -> &str {
        let count = self.combined_output.chars().count();
        if count <= max_chars {
            return &self.combined_output;
        }
        let skip = count - max_chars;
        match self.combined_output.char_indices().nth(skip) {
            Some((idx, _)) => &self.combined_output[idx..],
            None => "",
        }
    }

    pub fn status_label(&self) -> &'static str {
        match (self.success, self.timed_out) {
            (true, _) => "tests passed",
            (false, true) => "tests timed out",
            (false, false) => "tests failed",
        }
    }
}
