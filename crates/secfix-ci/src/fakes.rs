//! Test runner fake (testing only).

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use secfix_core::ValidationResult;

use crate::runner::TestRunner;

/// One observed `run_tests` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRun {
    pub artifact_path: PathBuf,
    pub timeout: Duration,
    /// Live artifact content at the moment the runner was invoked.
    pub content_at_call: Option<String>,
}

/// Runner that returns a fixed result and records each invocation.
#[derive(Debug)]
pub struct FakeTestRunner {
    result: ValidationResult,
    calls: Mutex<Vec<RecordedRun>>,
}

impl FakeTestRunner {
    pub fn returning(result: ValidationResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn passing() -> Self {
        Self::returning(ValidationResult::passed("1 passed".to_string(), 0.1))
    }

    pub fn failing(output: &str) -> Self {
        Self::returning(ValidationResult::failed(output, 0.1))
    }

    pub fn calls(&self) -> Vec<RecordedRun> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TestRunner for FakeTestRunner {
    async fn run_tests(&self, artifact_path: &Path, timeout: Duration) -> ValidationResult {
        self.calls.lock().unwrap().push(RecordedRun {
            artifact_path: artifact_path.to_path_buf(),
            timeout,
            content_at_call: std::fs::read_to_string(artifact_path).ok(),
        });
        self.result.clone()
    }
}
