//! The four generation tasks over an analyzed session. Each is isolated: a
//! failed generation call reports its own error and leaves the indexed
//! video/transcript available for the other tasks.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{gemini_credential, videodb_credential, AppState};
use crate::error::PipelineError;
use crate::llm::GeminiClient;
use crate::pipeline::{self, AskOutcome};
use crate::videodb::VideoDbClient;

#[derive(Serialize)]
pub struct TaskResponse {
    text: String,
}

#[derive(Deserialize)]
pub struct AskRequest {
    question: String,
}

#[derive(Serialize)]
pub struct ClipResponse {
    url: String,
    start: f64,
    end: f64,
}

/// Q&A response. `resolved: false` means the model's output could not be
/// parsed into an answer/timestamp pair; `raw` then carries the full response
/// for display and no clip is generated.
#[derive(Serialize)]
pub struct AskResponse {
    resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clip: Option<ClipResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/:id/visuals", post(visuals))
        .route("/:id/ask", post(ask))
        .route("/:id/quotes", post(quotes))
        .route("/:id/campaign", post(campaign))
        .with_state(state)
}

async fn visuals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<TaskResponse>, PipelineError> {
    let generator = GeminiClient::new(gemini_credential(&headers)?);
    let (_, content) = state.store.analyzed(id).await?;
    let text = pipeline::run_visual_tags(&generator, &content).await?;
    Ok(Json(TaskResponse { text }))
}

async fn quotes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<TaskResponse>, PipelineError> {
    let generator = GeminiClient::new(gemini_credential(&headers)?);
    let (_, content) = state.store.analyzed(id).await?;
    let text = pipeline::run_quotes(&generator, &content).await?;
    Ok(Json(TaskResponse { text }))
}

async fn campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<TaskResponse>, PipelineError> {
    let generator = GeminiClient::new(gemini_credential(&headers)?);
    let (_, content) = state.store.analyzed(id).await?;
    let text = pipeline::run_campaign(&generator, &content).await?;
    Ok(Json(TaskResponse { text }))
}

async fn ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, PipelineError> {
    // The ask path talks to both backends: generation for the answer, the
    // indexing backend for the rendered clip.
    let generator = GeminiClient::new(gemini_credential(&headers)?);
    let backend = VideoDbClient::new(videodb_credential(&headers)?);
    let (video, content) = state.store.analyzed(id).await?;

    let outcome =
        pipeline::run_question(&backend, &generator, &video, &content, &request.question).await?;

    let response = match outcome {
        AskOutcome::Resolved {
            answer,
            window,
            clip_url,
        } => AskResponse {
            resolved: true,
            answer: Some(answer.answer),
            timestamp: Some(answer.timestamp),
            clip: Some(ClipResponse {
                url: clip_url,
                start: window.start,
                end: window.end,
            }),
            raw: None,
        },
        AskOutcome::Unresolved { raw } => AskResponse {
            resolved: false,
            answer: None,
            timestamp: None,
            clip: None,
            raw: Some(raw),
        },
    };
    Ok(Json(response))
}
