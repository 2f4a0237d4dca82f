//! Patch synthesizer stage: ask the engine for a complete corrected artifact.

use tracing::{info, instrument, warn};

use crate::domain::{
    RemediationArtifact, RemediationError, ResearchCorpus, Result, RunMetrics,
    VulnerabilityAnalysis,
};
use crate::engine::{EnginePurpose, EngineRequest, ReasoningEngine};
use crate::fence::{extract_fenced_block, language_for};

fn patch_prompt(
    artifact: &RemediationArtifact,
    analysis: &VulnerabilityAnalysis,
    research: &str,
) -> String {
    let lang = language_for(artifact.target_path());
    format!(
        r#"You are an expert secure code developer. Fix the vulnerability in the following code.

Vulnerability Analysis:
{analysis}

Research Content (Reference Material):
{research}

Original Code:
```{lang}
{code}
```

Instructions:
1. Apply a robust fix for the identified vulnerability.
2. Make sure the code still performs its original intended function.
3. Prefer standard library facilities over new external dependencies.
4. Return ONLY the complete source of the fixed file, with no explanations outside the code.
"#,
        analysis = analysis.to_prompt_json(),
        research = research,
        lang = lang,
        code = artifact.original_content(),
    )
}

/// Turn the engine's reply into replacement file content.
///
/// A fenced block's interior is used when present (with a trailing newline).
/// Otherwise the reply is used verbatim, unless `strict` is set, in which
/// case an unfenced reply is rejected. A blank result is always rejected.
pub fn extract_patch(response: &str, strict: bool) -> Result<String> {
    let patch = match extract_fenced_block(response) {
        Some(block) => format!("{}\n", block),
        None if strict => {
            return Err(RemediationError::Synthesis(
                "response contains no fenced code block".to_string(),
            ))
        }
        None => {
            warn!("patch response has no code fence; using it verbatim");
            response.to_string()
        }
    };

    if patch.trim().is_empty() {
        return Err(RemediationError::Synthesis(
            "engine returned an empty patch".to_string(),
        ));
    }
    Ok(patch)
}

/// Produce the patched artifact content. Any failure is fatal.
#[instrument(skip_all, fields(vulnerability = %analysis.vulnerability_type))]
pub async fn synthesize_patch(
    engine: &dyn ReasoningEngine,
    artifact: &RemediationArtifact,
    analysis: &VulnerabilityAnalysis,
    research: &ResearchCorpus,
    strict: bool,
    metrics: &mut RunMetrics,
) -> Result<String> {
    info!("Generating fix");
    let request = EngineRequest::text(
        EnginePurpose::Synthesize,
        patch_prompt(artifact, analysis, &research.text()),
    );

    metrics.record_engine_call();
    let response = engine
        .complete(&request)
        .await
        .map_err(|e| RemediationError::Synthesis(e.to_string()))?;

    let patch = extract_patch(&response, strict)?;
    info!(lines = patch.lines().count(), "patch synthesized");
    Ok(patch)
}
