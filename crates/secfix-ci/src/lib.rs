//! secfix validation and orchestration
//!
//! Runs the test suite against a patched artifact and sequences the full
//! remediation pipeline on top of `secfix-core`.

pub mod fakes;
pub mod pipeline;
pub mod runner;
pub mod summary;

pub use pipeline::{RemediationPipeline, RunOutcome};
pub use runner::{CommandTestRunner, TestRunner, TARGET_ENV};
pub use summary::{write_run_summary_json, ResearchSummary, RunSummary, SUMMARY_SCHEMA_VERSION};
