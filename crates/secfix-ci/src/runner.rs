//! Test-suite execution for the patched artifact.
//!
//! The `TestRunner` trait is the validator seam: it never fails, every
//! outcome (non-zero exit, timeout, launch error) resolves to a
//! [`ValidationResult`].

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use secfix_core::{ValidationConfig, ValidationResult};
use tokio::process::Command;
use tracing::{info, warn};

/// Environment variable carrying the live artifact path to the test command.
pub const TARGET_ENV: &str = "SECFIX_TARGET";

/// Validator backend.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Run the suite against the artifact already written at `artifact_path`.
    async fn run_tests(&self, artifact_path: &Path, timeout: Duration) -> ValidationResult;
}

/// Runs the configured test command as a child process.
///
/// The child is killed if the wall-clock budget expires.
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    config: ValidationConfig,
}

impl CommandTestRunner {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

#[async_trait]
impl TestRunner for CommandTestRunner {
    async fn run_tests(&self, artifact_path: &Path, timeout: Duration) -> ValidationResult {
        let command_line = self.config.command_line();
        info!(command = %command_line, timeout_secs = timeout.as_secs_f64(), "Running tests");
        let start = Instant::now();

        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .env(TARGET_ENV, artifact_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.work_dir {
            command.current_dir(dir);
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %command_line, error = %e, "test command failed to launch");
                return ValidationResult::failed(
                    format!("failed to launch `{}`: {}", command_line, e),
                    start.elapsed().as_secs_f64(),
                );
            }
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return ValidationResult::failed(
                    format!("error waiting for `{}`: {}", command_line, e),
                    start.elapsed().as_secs_f64(),
                );
            }
            Err(_elapsed) => {
                warn!(command = %command_line, "test command timed out");
                return ValidationResult {
                    success: false,
                    combined_output: format!(
                        "`{}` timed out after {:.1} seconds; the process was terminated and no output is available",
                        command_line,
                        timeout.as_secs_f64()
                    ),
                    duration_seconds: start.elapsed().as_secs_f64(),
                    exit_code: None,
                    timed_out: true,
                };
            }
        };

        let duration_seconds = start.elapsed().as_secs_f64();
        let mut combined_output = String::from_utf8_lossy(&output.stdout).into_owned();
        combined_output.push_str(&String::from_utf8_lossy(&output.stderr));

        let exit_code = output.status.code();
        let success = output.status.success();
        info!(success, exit_code = ?exit_code, duration_seconds, "tests finished");

        ValidationResult {
            success,
            combined_output,
            duration_seconds,
            exit_code,
            timed_out: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandTestRunner {
        CommandTestRunner::new(ValidationConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            work_dir: None,
            timeout_secs: 30,
        })
    }

    #[tokio::test]
    async fn test_zero_exit_is_success_with_combined_output() {
        let result = shell("echo out; echo err >&2")
            .run_tests(Path::new("x.py"), Duration::from_secs(10))
            .await;
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.combined_output.contains("out"));
        assert!(result.combined_output.contains("err"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let result = shell("echo '1 failed'; exit 3")
            .run_tests(Path::new("x.py"), Duration::from_secs(10))
            .await;
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert!(result.combined_output.contains("1 failed"));
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn test_target_path_is_exported() {
        let result = shell("test \"$SECFIX_TARGET\" = /tmp/target.py")
            .run_tests(Path::new("/tmp/target.py"), Duration::from_secs(10))
            .await;
        assert!(result.success, "{}", result.combined_output);
    }

    #[tokio::test]
    async fn test_timeout_is_failure_near_budget() {
        let runner = CommandTestRunner::new(ValidationConfig {
            program: "sleep".to_string(),
            args: vec!["5".to_string()],
            work_dir: None,
            timeout_secs: 30,
        });
        let result = runner
            .run_tests(Path::new("x.py"), Duration::from_millis(300))
            .await;
        assert!(!result.success);
        assert!(result.timed_out);
        assert!(result.combined_output.contains("timed out"));
        assert!(result.duration_seconds >= 0.3);
        assert!(result.duration_seconds < 1.5);
    }

    #[tokio::test]
    async fn test_launch_error_is_failure() {
        let runner = CommandTestRunner::new(ValidationConfig {
            program: "secfix-no-such-test-binary".to_string(),
            args: vec![],
            work_dir: None,
            timeout_secs: 30,
        });
        let result = runner
            .run_tests(Path::new("x.py"), Duration::from_secs(5))
            .await;
        assert!(!result.success);
        assert!(result.combined_output.contains("failed to launch"));
        assert_eq!(result.exit_code, None);
    }
}
