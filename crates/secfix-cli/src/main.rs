//! secfix - autonomous vulnerability remediation
//!
//! Analyzes a source file for its primary weakness, gathers reference
//! material, writes a patched version (keeping `<target>.bak`), runs the
//! test suite against it and fills a markdown report.
//!
//! ## Exit status
//!
//! - `0`: the run finished and the report was written
//! - `1`: startup failure, fatal stage failure, or the report could not be written

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use secfix_ci::{RemediationPipeline, RunOutcome};
use secfix_core::config::{
    DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_REPORT_FILE, DEFAULT_TARGET_FILE,
    DEFAULT_TEMPLATE_FILE, DEFAULT_TEST_FILE, DEFAULT_TEST_PROGRAM,
};
use secfix_core::{
    level_for, EngineConfig, FetchConfig, LogFormat, PipelineConfig, ReportConfig,
    ValidationConfig,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "secfix")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Autonomous vulnerability remediation: analyze, research, patch, validate, report", long_about = None)]
struct Cli {
    /// Source file to remediate
    #[arg(default_value = DEFAULT_TARGET_FILE)]
    target: PathBuf,

    /// Test file passed to the test program
    #[arg(long, default_value = DEFAULT_TEST_FILE)]
    test_file: String,

    /// Test program used to validate the patched file
    #[arg(long, default_value = DEFAULT_TEST_PROGRAM)]
    test_program: String,

    /// Working directory for the test program (default: current directory)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Report output path
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    report: PathBuf,

    /// Report template path (a built-in template is used if absent)
    #[arg(long, default_value = DEFAULT_TEMPLATE_FILE)]
    template: PathBuf,

    /// Also write a machine-readable run summary here
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Reasoning model
    #[arg(long, env = "SECFIX_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Reject patch responses without a fenced code block
    #[arg(long)]
    strict_patch: bool,

    /// Wall-clock budget for the test run, in seconds
    #[arg(long, default_value_t = 30)]
    validation_timeout_secs: u64,

    /// Per-reference fetch timeout, in seconds
    #[arg(long, default_value_t = 10)]
    fetch_timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            target_path: self.target.clone(),
            fetch: FetchConfig {
                timeout_secs: self.fetch_timeout_secs,
                ..FetchConfig::default()
            },
            validation: ValidationConfig {
                program: self.test_program.clone(),
                args: vec![self.test_file.clone()],
                work_dir: self.work_dir.clone(),
                timeout_secs: self.validation_timeout_secs,
            },
            report: ReportConfig {
                report_path: self.report.clone(),
                template_path: self.template.clone(),
                ..ReportConfig::default()
            },
            strict_patch: self.strict_patch,
            summary_path: self.summary_json.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    secfix_core::init_tracing(
        LogFormat::from_json_flag(cli.json_logs),
        level_for(cli.verbose),
    );

    // Checked before the target is read so a misconfigured run touches nothing.
    let engine_config = EngineConfig::from_env()
        .context("set OPENAI_API_KEY in the environment or in a .env file")?
        .with_base_url(cli.api_base.clone())
        .with_model(cli.model.clone());

    let config = cli.pipeline_config();
    info!(artifact = %config.target_path.display(), model = %engine_config.model, "Starting remediation");
    println!("Starting remediation of {}", config.target_path.display());

    let pipeline = RemediationPipeline::from_config(engine_config, config)
        .context("Failed to initialize pipeline")?;
    let outcome = pipeline.run().await.context("Remediation aborted")?;

    print_outcome(&outcome);

    match &outcome.report_path {
        Some(path) => {
            println!("Report generated at {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No report was written.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    println!(
        "Identified vulnerability: {}",
        outcome.analysis.vulnerability_type
    );
    println!(
        "Research: {} of {} references fetched",
        outcome.research.succeeded(),
        outcome.research.len()
    );

    if outcome.patch_applied {
        println!(
            "Patched {} (original saved to {})",
            outcome.target_path.display(),
            outcome.backup_path.display()
        );
    } else {
        println!(
            "Patch NOT applied; {} left unchanged",
            outcome.target_path.display()
        );
    }
    for error in &outcome.persistence_errors {
        eprintln!("warning: {}", error);
    }

    let status = if outcome.tests_passed() {
        "PASSED"
    } else {
        "FAILED"
    };
    println!(
        "Validation {} in {:.2}s ({})",
        status,
        outcome.validation.duration_seconds,
        outcome.validation.status_label()
    );
    println!("Total LLM API calls: {}", outcome.metrics.engine_calls);
    println!(
        "Process completed in {:.2} seconds.",
        outcome.metrics.elapsed_seconds
    );
}
