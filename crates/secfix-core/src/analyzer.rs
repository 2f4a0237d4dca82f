//! Analyzer stage: classify the artifact's primary weakness.

use tracing::{info, instrument};

use crate::domain::{RemediationArtifact, RemediationError, Result, RunMetrics, VulnerabilityAnalysis};
use crate::engine::{EnginePurpose, EngineRequest, ReasoningEngine};
use crate::fence::{extract_fenced_block, language_for};

fn classification_prompt(artifact: &RemediationArtifact) -> String {
    let lang = language_for(artifact.target_path());
    format!(
        r#"You are an expert security researcher. Analyze the following code for security vulnerabilities.

Code to analyze:
```{lang}
{code}
```

Identify the primary security vulnerability (for example CWE-22 or SQL injection).
Respond with a single JSON object with these keys:
- "vulnerability_type": the name or identifier of the vulnerability.
- "description": a brief description of the vulnerability in this code.
- "research_urls": a list of 2-3 authoritative, relevant URLs (CWE, OWASP, vendor advisories) for researching this specific vulnerability.
"#,
        lang = lang,
        code = artifact.original_content(),
    )
}

/// Parse the engine's structured reply.
///
/// A reply wrapped in a code fence is unwrapped first. `vulnerability_type`
/// and `description` are required; `research_urls` defaults to empty.
pub fn parse_analysis(response: &str) -> Result<VulnerabilityAnalysis> {
    let body = extract_fenced_block(response).unwrap_or(response).trim();
    let analysis: VulnerabilityAnalysis = serde_json::from_str(body)
        .map_err(|e| RemediationError::Analysis(format!("malformed classification: {}", e)))?;

    if analysis.vulnerability_type.trim().is_empty() {
        return Err(RemediationError::Analysis(
            "classification has an empty vulnerability_type".to_string(),
        ));
    }
    Ok(analysis)
}

/// Send the artifact to the engine and parse its classification.
///
/// Counts one engine call whether or not it succeeds. Any failure is fatal.
#[instrument(skip_all, fields(artifact = %artifact.target_path().display()))]
pub async fn analyze(
    engine: &dyn ReasoningEngine,
    artifact: &RemediationArtifact,
    metrics: &mut RunMetrics,
) -> Result<VulnerabilityAnalysis> {
    info!("Analyzing code for vulnerabilities");
    let request = EngineRequest::json(EnginePurpose::Classify, classification_prompt(artifact));

    metrics.record_engine_call();
    let response = engine
        .complete(&request)
        .await
        .map_err(|e| RemediationError::Analysis(e.to_string()))?;

    let analysis = parse_analysis(&response)?;
    info!(
        vulnerability_type = %analysis.vulnerability_type,
        research_urls = analysis.research_urls.len(),
        "Identified vulnerability"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ResponseFormat;
    use crate::fakes::ScriptedEngine;

    fn artifact() -> RemediationArtifact {
        RemediationArtifact::from_content(
            "file_reader.py",
            "def read(base, name):\n    return open(base + '/' + name).read()\n".to_string(),
        )
    }

    #[tokio::test]
    async fn analyze_parses_structured_reply() {
        let engine = ScriptedEngine::new().respond(
            EnginePurpose::Classify,
            r#"{"vulnerability_type":"path traversal","description":"unsanitized join","research_urls":["https://cwe.mitre.org/data/definitions/22.html","https://owasp.org/www-community/attacks/Path_Traversal"]}"#,
        );
        let mut metrics = RunMetrics::new();

        let analysis = analyze(&engine, &artifact(), &mut metrics).await.unwrap();

        assert_eq!(analysis.vulnerability_type, "path traversal");
        assert_eq!(analysis.research_urls.len(), 2);
        assert_eq!(metrics.engine_calls(), 1);

        let requests = engine.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].format, ResponseFormat::Json);
        assert!(requests[0].prompt.contains("```python"));
        assert!(requests[0].prompt.contains("open(base + '/' + name)"));
    }

    #[tokio::test]
    async fn malformed_reply_is_analysis_error() {
        let engine = ScriptedEngine::new().respond(EnginePurpose::Classify, "not json at all");
        let mut metrics = RunMetrics::new();

        let err = analyze(&engine, &artifact(), &mut metrics).await.unwrap_err();
        assert!(matches!(err, RemediationError::Analysis(_)));
        assert_eq!(metrics.engine_calls(), 1);
    }

    #[tokio::test]
    async fn engine_failure_is_analysis_error() {
        let engine = ScriptedEngine::new().fail(EnginePurpose::Classify, "connection refused");
        let mut metrics = RunMetrics::new();

        let err = analyze(&engine, &artifact(), &mut metrics).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let reply = "```json\n{\"vulnerability_type\":\"CWE-78\",\"description\":\"shell=True\"}\n```";
        let analysis = parse_analysis(reply).unwrap();
        assert_eq!(analysis.vulnerability_type, "CWE-78");
        assert!(analysis.research_urls.is_empty());
    }

    #[test]
    fn null_reference_list_is_accepted() {
        let reply = r#"{"vulnerability_type":"CWE-22","description":"d","research_urls":null}"#;
        let analysis = parse_analysis(reply).unwrap();
        assert_eq!(analysis.vulnerability_type, "CWE-22");
        assert!(analysis.research_urls.is_empty());
    }

    #[test]
    fn blank_type_is_rejected() {
        let reply = r#"{"vulnerability_type":"  ","description":"?"}"#;
        assert!(parse_analysis(reply).is_err());
    }
}
