//! Domain models for secfix.
//!
//! Canonical definitions for the entities a remediation run produces:
//! - `VulnerabilityAnalysis`: classification plus candidate reference URLs
//! - `ResearchItem` / `ResearchCorpus`: fetched reference text, in request order
//! - `RemediationArtifact`: original and patched content of the target file
//! - `ValidationResult`: outcome of the external test suite
//! - `RunMetrics`: engine call count and elapsed time
//! - `ReportTemplate`: the document the report stage fills in

pub mod analysis;
pub mod artifact;
pub mod error;
pub mod metrics;
pub mod report;
pub mod research;
pub mod validation;

pub use analysis::VulnerabilityAnalysis;
pub use artifact::{BackupReceipt, ContentDigest, RemediationArtifact};
pub use error::{RemediationError, Result};
pub use metrics::{MetricsSnapshot, RunMetrics};
pub use report::{ReportTemplate, TemplateSource};
pub use research::{ResearchCorpus, ResearchItem};
pub use validation::ValidationResult;
