//! Report synthesizer stage: have the engine fill the report template.
//!
//! The filled document is returned verbatim. Placeholder completeness is not
//! checked.

use chrono::Local;
use tracing::{info, instrument};

use crate::config::ReportConfig;
use crate::domain::{
    RemediationError, ReportTemplate, ResearchCorpus, Result, RunMetrics, ValidationResult,
    VulnerabilityAnalysis,
};
use crate::engine::{EnginePurpose, EngineRequest, ReasoningEngine};
use crate::research::truncate_chars;

/// Everything the report prompt is built from.
pub struct ReportInput<'a> {
    pub analysis: &'a VulnerabilityAnalysis,
    pub research: &'a ResearchCorpus,
    pub validation: &'a ValidationResult,
    /// Short description of the applied change.
    pub fix_summary: &'a str,
    pub template: &'a ReportTemplate,
}

fn report_prompt(input: &ReportInput<'_>, config: &ReportConfig, metrics: &RunMetrics) -> String {
    let corpus = input.research.text();
    let prefix = truncate_chars(&corpus, config.research_prefix_chars);
    let research_summary = if prefix.len() < corpus.len() {
        format!("{}... (truncated)", prefix)
    } else if corpus.is_empty() {
        "(no reference material was requested)".to_string()
    } else {
        corpus.clone()
    };

    format!(
        r#"You are a security analyst. Fill out the following report template based on the provided information.

Current Date: {date}

Analysis:
{analysis}

Research Summary:
{research_summary}

Test Results:
Success: {success}
Duration: {duration:.2}s
Output: {output} (last {tail} chars)

Metrics:
Total LLM API Calls: {calls} (including this one)
Elapsed Time: {elapsed:.2}s
References fetched: {fetched} ok, {failed} failed

Fix Details:
{fix}

Template:
{template}

Instructions:
1. Replace every bracketed placeholder [ ] with relevant details.
2. Keep the markdown structure of the template.
3. Keep the content professional and accurate.
"#,
        date = Local::now().format("%Y-%m-%d %H:%M:%S"),
        analysis = input.analysis.to_prompt_json(),
        research_summary = research_summary,
        success = input.validation.success,
        duration = input.validation.duration_seconds,
        output = input.validation.output_tail(config.output_tail_chars),
        tail = config.output_tail_chars,
        calls = metrics.engine_calls() + 1,
        elapsed = metrics.elapsed().as_secs_f64(),
        fetched = input.research.succeeded(),
        failed = input.research.failed(),
        fix = input.fix_summary,
        template = input.template.text,
    )
}

/// Ask the engine to fill the template and return the document as-is.
#[instrument(skip_all)]
pub async fn synthesize_report(
    engine: &dyn ReasoningEngine,
    input: &ReportInput<'_>,
    config: &ReportConfig,
    metrics: &mut RunMetrics,
) -> Result<String> {
    info!("Generating report");
    let request = EngineRequest::text(
        EnginePurpose::Summarize,
        report_prompt(input, config, metrics),
    );

    metrics.record_engine_call();
    engine
        .complete(&request)
        .await
        .map_err(|e| RemediationError::Report(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResearchItem;
    use crate::fakes::ScriptedEngine;

    #[tokio::test]
    async fn prompt_carries_counts_and_bounded_research() {
        let engine = ScriptedEngine::new().respond(EnginePurpose::Summarize, "# Filled\n");
        let analysis = VulnerabilityAnalysis::new("path traversal", "unsanitized join");
        let research = ResearchCorpus::new(vec![ResearchItem::fetched(
            "https://example.org",
            "r".repeat(3000),
        )]);
        let validation = ValidationResult::passed("1 passed".to_string(), 0.42);
        let template = ReportTemplate::fallback();
        let input = ReportInput {
            analysis: &analysis,
            research: &research,
            validation: &validation,
            fix_summary: "12 lines -> 18 lines",
            template: &template,
        };

        let mut metrics = RunMetrics::new();
        metrics.record_engine_call();
        metrics.record_engine_call();

        let report = synthesize_report(&engine, &input, &ReportConfig::default(), &mut metrics)
            .await
            .unwrap();
        assert_eq!(report, "# Filled\n");
        assert_eq!(metrics.engine_calls(), 3);

        let prompt = engine.prompt_for(EnginePurpose::Summarize).unwrap();
        assert!(prompt.contains("Total LLM API Calls: 3 (including this one)"));
        assert!(prompt.contains("Success: true"));
        assert!(prompt.contains("Duration: 0.42s"));
        assert!(prompt.contains("... (truncated)"));
        assert!(!prompt.contains(&"r".repeat(1000)));
        assert!(prompt.contains("[Desc]"));
        assert!(prompt.contains("12 lines -> 18 lines"));
    }

    #[tokio::test]
    async fn engine_failure_is_report_error() {
        let engine = ScriptedEngine::new().fail(EnginePurpose::Summarize, "rate limited");
        let analysis = VulnerabilityAnalysis::new("CWE-22", "d");
        let research = ResearchCorpus::default();
        let validation = ValidationResult::failed("boom", 1.0);
        let template = ReportTemplate::fallback();
        let input = ReportInput {
            analysis: &analysis,
            research: &research,
            validation: &validation,
            fix_summary: "",
            template: &template,
        };

        let err = synthesize_report(
            &engine,
            &input,
            &ReportConfig::default(),
            &mut RunMetrics::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RemediationError::Report(_)));
    }
}
