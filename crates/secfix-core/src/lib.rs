//! secfix Core Library
//!
//! Domain model and the engine-backed stages of the remediation pipeline:
//! analyze, research, synthesize a patch, and fill the report. Process-based
//! validation and stage sequencing live in `secfix-ci`.

pub mod analyzer;
pub mod config;
pub mod domain;
pub mod engine;
pub mod fakes;
pub mod fence;
pub mod obs;
pub mod reporter;
pub mod research;
pub mod synthesizer;
pub mod telemetry;

pub use analyzer::{analyze, parse_analysis};
pub use config::{EngineConfig, FetchConfig, PipelineConfig, ReportConfig, ValidationConfig};
pub use domain::{
    BackupReceipt, ContentDigest, MetricsSnapshot, RemediationArtifact, RemediationError,
    ReportTemplate, ResearchCorpus, ResearchItem, Result, RunMetrics, TemplateSource,
    ValidationResult, VulnerabilityAnalysis,
};
pub use engine::{
    EngineError, EnginePurpose, EngineRequest, OpenAiEngine, ReasoningEngine, ResponseFormat,
};
pub use obs::run_span;
pub use reporter::{synthesize_report, ReportInput};
pub use research::{gather_research, FetchError, HttpFetcher, ResearchFetcher};
pub use synthesizer::{extract_patch, synthesize_patch};
pub use telemetry::{init_tracing, level_for, LogFormat};

/// secfix version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
