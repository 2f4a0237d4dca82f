//! Remediation pipeline orchestration.
//!
//! Stages run strictly in sequence: analyze, research, synthesize, persist,
//! validate, report. Analysis, synthesis and report-engine failures abort
//! the run; fetch, validation and write failures are recorded in-band.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use secfix_core::obs::{self, StageTimer};
use secfix_core::{
    analyze, gather_research, synthesize_patch, synthesize_report, ContentDigest, EngineConfig,
    HttpFetcher, MetricsSnapshot, OpenAiEngine, PipelineConfig, ReasoningEngine,
    RemediationArtifact, RemediationError, ReportInput, ReportTemplate, ResearchCorpus,
    ResearchFetcher, Result, RunMetrics, ValidationResult, VulnerabilityAnalysis,
};
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use crate::runner::{CommandTestRunner, TestRunner};
use crate::summary::{write_run_summary_json, RunSummary};

/// Result of a remediation run that reached the report stage.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub target_path: PathBuf,
    pub backup_path: PathBuf,
    pub analysis: VulnerabilityAnalysis,
    pub research: ResearchCorpus,
    pub validation: ValidationResult,

    /// Whether the patched content reached the live path.
    pub patch_applied: bool,

    pub original_digest: ContentDigest,
    pub patched_digest: Option<ContentDigest>,

    /// Set only when the report was written.
    pub report_path: Option<PathBuf>,

    /// Set only when the run summary was written.
    pub summary_path: Option<PathBuf>,

    pub metrics: MetricsSnapshot,

    /// Write failures absorbed during the run, in order of occurrence.
    pub persistence_errors: Vec<String>,
}

impl RunOutcome {
    pub fn tests_passed(&self) -> bool {
        self.validation.success
    }

    /// Patch applied, report written, and no write failed along the way.
    pub fn is_complete(&self) -> bool {
        self.patch_applied && self.report_path.is_some() && self.persistence_errors.is_empty()
    }
}

/// Sequences the remediation stages over one target artifact.
pub struct RemediationPipeline {
    engine: Arc<dyn ReasoningEngine>,
    fetcher: Arc<dyn ResearchFetcher>,
    runner: Arc<dyn TestRunner>,
    config: PipelineConfig,
}

impl RemediationPipeline {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        fetcher: Arc<dyn ResearchFetcher>,
        runner: Arc<dyn TestRunner>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            engine,
            fetcher,
            runner,
            config,
        }
    }

    /// Wire the production backends: OpenAI-compatible engine, HTTP fetcher,
    /// child-process test runner.
    pub fn from_config(engine_config: EngineConfig, config: PipelineConfig) -> Result<Self> {
        let engine =
            OpenAiEngine::new(engine_config).map_err(|e| RemediationError::Setup(e.to_string()))?;
        let fetcher = HttpFetcher::new(config.fetch.clone())
            .map_err(|e| RemediationError::Setup(e.to_string()))?;
        let runner = CommandTestRunner::new(config.validation.clone());

        Ok(Self::new(
            Arc::new(engine),
            Arc::new(fetcher),
            Arc::new(runner),
            config,
        ))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute one run under a fresh run id.
    pub async fn run(&self) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4();
        let span = obs::run_span(&run_id.to_string());
        self.execute(run_id).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid) -> Result<RunOutcome> {
        let started = Instant::now();
        let mut metrics = RunMetrics::new();
        obs::emit_run_started(&run_id.to_string(), &self.config.target_path);

        let mut artifact = RemediationArtifact::load(&self.config.target_path)?;

        let stage = StageTimer::start("analyze");
        let analysis = analyze(self.engine.as_ref(), &artifact, &mut metrics).await?;
        stage.finish();

        let stage = StageTimer::start("research");
        let research = gather_research(Arc::clone(&self.fetcher), &analysis.research_urls).await;
        info!(
            fetched = research.succeeded(),
            failed = research.failed(),
            "Research gathered"
        );
        stage.finish();

        let stage = StageTimer::start("synthesize");
        let patch = synthesize_patch(
            self.engine.as_ref(),
            &artifact,
            &analysis,
            &research,
            self.config.strict_patch,
            &mut metrics,
        )
        .await?;
        stage.finish();

        let mut persistence_errors = Vec::new();

        let stage = StageTimer::start("persist");
        let patch_lines = patch.lines().count();
        let patch_applied = match persist_patch(&mut artifact, patch) {
            Ok(()) => true,
            Err(e) => {
                obs::emit_persistence_error("patch", &e);
                persistence_errors.push(e.to_string());
                false
            }
        };
        stage.finish();

        let stage = StageTimer::start("validate");
        let validation = if patch_applied {
            self.runner
                .run_tests(artifact.target_path(), self.config.validation.timeout())
                .await
        } else {
            ValidationResult::not_run(format!(
                "patched artifact was not written to {}",
                artifact.target_path().display()
            ))
        };
        info!(
            success = validation.success,
            duration_seconds = validation.duration_seconds,
            "{}",
            validation.status_label()
        );
        stage.finish();

        let stage = StageTimer::start("report");
        let template = ReportTemplate::load_or_fallback(&self.config.report.template_path);
        debug!(
            source = ?template.source,
            placeholders = template.placeholders().len(),
            "report template loaded"
        );
        let fix_summary = fix_summary(&artifact, patch_applied, patch_lines);
        let input = ReportInput {
            analysis: &analysis,
            research: &research,
            validation: &validation,
            fix_summary: &fix_summary,
            template: &template,
        };
        let report = synthesize_report(
            self.engine.as_ref(),
            &input,
            &self.config.report,
            &mut metrics,
        )
        .await
        .map_err(|e| match (e, patch_applied) {
            (RemediationError::Report(msg), true) => RemediationError::Report(format!(
                "{}; original content preserved at {}",
                msg,
                artifact.backup_path().display()
            )),
            (e, _) => e,
        })?;

        let report_path = match write_text(&self.config.report.report_path, &report) {
            Ok(()) => {
                obs::emit_artifact_persisted("report", &self.config.report.report_path);
                Some(self.config.report.report_path.clone())
            }
            Err(e) => {
                obs::emit_persistence_error("report", &e);
                persistence_errors.push(e.to_string());
                None
            }
        };
        stage.finish();

        metrics.flush();
        let mut outcome = RunOutcome {
            run_id,
            target_path: artifact.target_path().to_path_buf(),
            backup_path: artifact.backup_path().to_path_buf(),
            original_digest: artifact.original_digest(),
            patched_digest: artifact.patched_digest(),
            analysis,
            research,
            validation,
            patch_applied,
            report_path,
            summary_path: None,
            metrics: metrics.snapshot(),
            persistence_errors,
        };

        if let Some(path) = &self.config.summary_path {
            match write_run_summary_json(path, &RunSummary::from_outcome(&outcome)) {
                Ok(()) => {
                    obs::emit_artifact_persisted("summary", path);
                    outcome.summary_path = Some(path.clone());
                }
                Err(e) => {
                    obs::emit_persistence_error("summary", &e);
                    outcome.persistence_errors.push(e.to_string());
                }
            }
        }

        obs::emit_run_finished(
            &run_id.to_string(),
            started.elapsed().as_millis() as u64,
            outcome.metrics.engine_calls,
            outcome.tests_passed(),
        );
        Ok(outcome)
    }
}

/// Back up the original, then overwrite the live path.
fn persist_patch(artifact: &mut RemediationArtifact, patch: String) -> Result<()> {
    let receipt = artifact.write_backup()?;
    obs::emit_artifact_persisted("backup", receipt.path());
    artifact.apply_patch(&receipt, patch)?;
    obs::emit_artifact_persisted("patch", artifact.target_path());
    Ok(())
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| RemediationError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

fn fix_summary(artifact: &RemediationArtifact, applied: bool, patch_lines: usize) -> String {
    let (original_lines, _) = artifact.line_counts();
    if applied {
        format!(
            "Replaced {} ({} lines) with a patched version ({} lines); original preserved at {}",
            artifact.target_path().display(),
            original_lines,
            patch_lines,
            artifact.backup_path().display()
        )
    } else {
        format!(
            "A patched version ({} lines) was generated but could not be written; {} was left unchanged ({} lines)",
            patch_lines,
            artifact.target_path().display(),
            original_lines
        )
    }
}
