//! Structured observability hooks for remediation run lifecycle events.
//!
//! This module provides:
//! - A run-scoped tracing span via [`run_span`]
//! - Emission functions for key lifecycle events: start, stage boundaries,
//!   reference fetches, artifact writes, finish
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).
//! For JSON output, pass `--json-logs` to the CLI.

use std::path::Path;
use std::time::Instant;

use tracing::info;

/// Run-scoped span carrying `run_id`.
///
/// Attach it to the run future with `tracing::Instrument` so every event
/// emitted by the stages (including per-URL fetch results)
/// carries the run identifier.
///
/// # Example
///
/// ```ignore
/// pipeline.execute(run_id).instrument(obs::run_span(&run_id)).await
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("secfix.run", run_id = %run_id)
}

pub fn emit_run_started(run_id: &str, target: &Path) {
    info!(event = "run.started", run_id = %run_id, artifact = %target.display());
}

pub fn emit_stage_started(stage: &str) {
    info!(event = "stage.started", stage = %stage);
}

pub fn emit_stage_finished(stage: &str, duration_ms: u64) {
    info!(event = "stage.finished", stage = %stage, duration_ms = duration_ms);
}

/// Emits `stage.started` on creation and `stage.finished` on [`StageTimer::finish`].
pub struct StageTimer {
    stage: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        emit_stage_started(stage);
        Self {
            stage,
            started: Instant::now(),
        }
    }

    pub fn finish(self) {
        emit_stage_finished(self.stage, self.started.elapsed().as_millis() as u64);
    }
}

/// Emit event: one reference URL resolved (successfully or not).
pub fn emit_research_fetched(url: &str, ok: bool, chars: usize) {
    info!(event = "research.fetched", url = %url, ok = ok, chars = chars);
}

pub fn emit_artifact_persisted(kind: &str, path: &Path) {
    info!(event = "artifact.persisted", kind = %kind, path = %path.display());
}

/// Emit event: a write failed; recorded in-band, the run continues.
pub fn emit_persistence_error(kind: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "artifact.persist_error", kind = %kind, error = %error);
}

pub fn emit_run_finished(run_id: &str, duration_ms: u64, engine_calls: u32, tests_passed: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        engine_calls = engine_calls,
        tests_passed = tests_passed,
    );
}
