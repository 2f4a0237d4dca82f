//! Machine-readable run summary (`--summary-json`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use secfix_core::{MetricsSnapshot, RemediationError, Result, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::RunOutcome;

/// Current layout of the summary document.
pub const SUMMARY_SCHEMA_VERSION: &str = "1";

/// Tail of the test output kept in the summary.
const SUMMARY_OUTPUT_TAIL: usize = 2000;

/// Research stage counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchSummary {
    pub requested: usize,
    pub fetched: usize,
    pub failed: usize,
}

/// Persisted run summary written next to the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub target_path: PathBuf,
    pub backup_path: PathBuf,
    pub vulnerability_type: String,
    pub research: ResearchSummary,
    pub patch_applied: bool,
    pub original_digest: String,
    pub patched_digest: Option<String>,
    pub validation: ValidationResult,
    pub report_path: Option<PathBuf>,
    pub metrics: MetricsSnapshot,
    pub persistence_errors: Vec<String>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let mut validation = outcome.validation.clone();
        validation.combined_output = validation.output_tail(SUMMARY_OUTPUT_TAIL).to_string();

        Self {
            schema_version: SUMMARY_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            run_id: outcome.run_id,
            target_path: outcome.target_path.clone(),
            backup_path: outcome.backup_path.clone(),
            vulnerability_type: outcome.analysis.vulnerability_type.clone(),
            research: ResearchSummary {
                requested: outcome.research.len(),
                fetched: outcome.research.succeeded(),
                failed: outcome.research.failed(),
            },
            patch_applied: outcome.patch_applied,
            original_digest: outcome.original_digest.to_string(),
            patched_digest: outcome.patched_digest.as_ref().map(|d| d.to_string()),
            validation,
            report_path: outcome.report_path.clone(),
            metrics: outcome.metrics,
            persistence_errors: outcome.persistence_errors.clone(),
        }
    }
}

/// Write the summary in pretty JSON format.
pub fn write_run_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, content).map_err(|source| RemediationError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secfix_core::{ContentDigest, ResearchCorpus, ResearchItem, VulnerabilityAnalysis};

    fn outcome() -> RunOutcome {
        RunOutcome {
            run_id: Uuid::new_v4(),
            target_path: PathBuf::from("file_reader.py"),
            backup_path: PathBuf::from("file_reader.py.bak"),
            analysis: VulnerabilityAnalysis::new("path traversal", "unsanitized join"),
            research: ResearchCorpus::new(vec![
                ResearchItem::fetched("https://a.example", "body"),
                ResearchItem::failed("https://b.example", "timeout"),
            ]),
            validation: ValidationResult::passed("x".repeat(5000), 1.5),
            patch_applied: true,
            original_digest: ContentDigest::from_bytes(b"old"),
            patched_digest: Some(ContentDigest::from_bytes(b"new")),
            report_path: Some(PathBuf::from("REPORT.md")),
            summary_path: None,
            metrics: MetricsSnapshot {
                engine_calls: 3,
                elapsed_seconds: 4.0,
            },
            persistence_errors: vec![],
        }
    }

    #[test]
    fn summary_counts_research_and_trims_output() {
        let summary = RunSummary::from_outcome(&outcome());
        assert_eq!(summary.research.requested, 2);
        assert_eq!(summary.research.fetched, 1);
        assert_eq!(summary.research.failed, 1);
        assert_eq!(summary.validation.combined_output.len(), SUMMARY_OUTPUT_TAIL);
        assert_eq!(summary.metrics.engine_calls, 3);
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let summary = RunSummary::from_outcome(&outcome());

        write_run_summary_json(&path, &summary).unwrap();

        let loaded: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, summary);
    }

    #[test]
    fn write_into_missing_dir_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary.json");
        let err = write_run_summary_json(&path, &RunSummary::from_outcome(&outcome())).unwrap_err();
        assert!(err.is_persistence());
    }
}
