//! Run-scoped counters.
//!
//! `RunMetrics` is owned by the pipeline controller and passed by `&mut` to
//! each stage that talks to the reasoning engine. Call [`RunMetrics::flush`]
//! to emit the current values as a single `tracing::info!` event.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct RunMetrics {
    engine_calls: u32,
    started_at: Instant,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            engine_calls: 0,
            started_at: Instant::now(),
        }
    }

    /// Record one reasoning-engine invocation.
    pub fn record_engine_call(&mut self) {
        self.engine_calls += 1;
        tracing::trace!(metric = "engine_calls", value = self.engine_calls, "counter incremented");
    }

    pub fn engine_calls(&self) -> u32 {
        self.engine_calls
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Read-only copy for reports and summaries.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            engine_calls: self.engine_calls,
            elapsed_seconds: self.elapsed().as_secs_f64(),
        }
    }

    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            engine_calls = self.engine_calls,
            elapsed_ms = self.elapsed().as_millis() as u64,
        );
    }
}

/// Point-in-time view of [`RunMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub engine_calls: u32,
    pub elapsed_seconds: f64,
}
