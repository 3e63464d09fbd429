pub mod backend;
pub mod openai;
pub mod prompts;

use crate::errors::CoreError;
use crate::extract;
use crate::models::{
    AnalysisRequest, AnalysisResponse, CompletionRequest, RiAnalysis, ScoreLabel, SmiAnalysis,
};

use backend::CompletionBackend;

/// Message returned to callers when the prompt or image is missing.
pub const MISSING_INPUT: &str = "Prompt and image are required";

/// Check that both prompt and image are present and non-empty.
/// Returns them borrowed so callers don't re-unwrap the options.
pub fn validate(request: &AnalysisRequest) -> Result<(&str, &str), CoreError> {
    let prompt = request.prompt.as_deref().filter(|s| !s.is_empty());
    let image = request.image.as_deref().filter(|s| !s.is_empty());
    match (prompt, image) {
        (Some(prompt), Some(image)) => Ok((prompt, image)),
        _ => Err(CoreError::Validation(MISSING_INPUT.to_string())),
    }
}

/// Run one analysis: validate, compose the prompt, make the single upstream
/// call and extract the score for `label`.
///
/// Extraction misses never fail the request. For RI the default score is
/// substituted and a warning is logged so formatting drift stays visible.
pub async fn analyze(
    backend: &dyn CompletionBackend,
    label: ScoreLabel,
    max_tokens: u32,
    request: AnalysisRequest,
) -> Result<AnalysisResponse, CoreError> {
    let (prompt, image) = validate(&request).inspect_err(|e| {
        tracing::warn!(stage = e.stage(), error = %e, "rejecting analysis request");
    })?;

    let completion = CompletionRequest {
        system: prompts::SYSTEM_PROMPT.to_string(),
        text: prompts::build_user_prompt(label, prompt, &request),
        image_base64: image.to_string(),
        max_tokens,
    };

    tracing::info!(
        backend = backend.name(),
        %label,
        prompt_chars = completion.text.len(),
        image_bytes = completion.image_base64.len(),
        "calling completion backend"
    );

    let response = backend.complete(&completion).await.inspect_err(|e| {
        tracing::error!(stage = e.stage(), backend = backend.name(), error = %e, "completion failed");
    })?;

    tracing::info!(
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        result_chars = response.text.len(),
        "completion received"
    );

    let extraction = extract::extract(label, &response.text);
    if extraction.defaulted {
        tracing::warn!(
            %label,
            defaulted = true,
            score = extraction.score.as_deref().unwrap_or_default(),
            "no score marker in model output, using default"
        );
    } else {
        tracing::debug!(%label, score = ?extraction.score, "score extracted");
    }

    let result = match label {
        ScoreLabel::Smi => AnalysisResponse::Smi(SmiAnalysis {
            analysis: response.text,
            art_title: request.art_title,
            artist_name: request.artist_name,
            smi_value: extraction.score,
        }),
        ScoreLabel::Ri => AnalysisResponse::Ri(RiAnalysis {
            analysis: response.text,
            ri: extraction
                .score
                .unwrap_or_else(|| extract::DEFAULT_RI.to_string()),
            explanation: extraction.explanation,
        }),
    };

    Ok(result)
}
