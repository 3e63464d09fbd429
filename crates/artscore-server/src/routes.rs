use std::sync::Arc;

use artscore_core::analysis;
use artscore_core::analysis::prompts;
use artscore_core::errors::CoreError;
use artscore_core::models::AnalysisRequest;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// `POST /analyze`
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("analyze", %request_id, label = %state.label);

    async move {
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => {
                tracing::warn!(stage = "decode", error = %rejection.body_text(), "unreadable request body");
                return (
                    rejection.status(),
                    Json(json!({ "error": rejection.body_text() })),
                )
                    .into_response();
            }
        };

        match analysis::analyze(state.backend.as_ref(), state.label, state.max_tokens, request).await {
            Ok(response) => {
                tracing::info!("analysis complete");
                Json(response).into_response()
            }
            Err(e) => ApiError(e).into_response(),
        }
    }
    .instrument(span)
    .await
}

/// `GET /PromptAnalyzeArt.txt` or `GET /PromptCalcRI.txt`, depending on the label.
///
/// Serves the deployed file from the public directory, or the built-in
/// instructions when none is deployed.
pub async fn prompt_file(State(state): State<Arc<AppState>>) -> Response {
    let path = state.public_dir.join(state.label.prompt_file());
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => body.into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "prompt file not deployed, serving built-in text");
            prompts::default_instructions(state.label).into_response()
        }
        Err(e) => {
            tracing::error!(stage = "prompt_file", path = %path.display(), error = %e, "reading prompt file");
            ApiError(CoreError::Io(format!("reading prompt file: {e}"))).into_response()
        }
    }
}
