use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use engine::Scene;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use super::{videodb_credential, AppState};
use crate::error::PipelineError;
use crate::pipeline;
use crate::session::SessionState;
use crate::videodb::VideoDbClient;

// Uploads are whole video files; the axum default body limit of 2 MB is far
// too small for them.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Serialize)]
pub struct CreateSessionResponse {
    id: Uuid,
}

#[derive(Serialize)]
pub struct SessionResponse {
    id: Uuid,
    analyzed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzed_at: Option<DateTime<Utc>>,
    scenes: Vec<Scene>,
    transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
}

impl SessionResponse {
    fn from_session(session: crate::session::Session) -> Self {
        match session.state {
            SessionState::Empty => SessionResponse {
                id: session.id,
                analyzed: false,
                analyzed_at: None,
                scenes: vec![],
                transcript: String::new(),
                duration: None,
            },
            SessionState::Analyzed {
                content,
                analyzed_at,
                ..
            } => SessionResponse {
                id: session.id,
                analyzed: true,
                analyzed_at: Some(analyzed_at),
                scenes: content.scenes,
                transcript: content.transcript,
                duration: content.duration,
            },
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session))
        .route(
            "/:id/analyze",
            post(analyze).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let id = state.store.create().await;
    info!(session_id = %id, "session created");
    Json(CreateSessionResponse { id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, PipelineError> {
    let session = state.store.get(id).await?;
    Ok(Json(SessionResponse::from_session(session)))
}

/// Run a full analysis for this session: upload, dual indexing, fetch. Any
/// previous analysis is dropped before the run starts; on failure the session
/// is left empty rather than half-updated.
async fn analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SessionResponse>, PipelineError> {
    let api_key = videodb_credential(&headers)?;
    state.store.reset(id).await?;

    let (file_name, payload) = read_video_field(multipart).await?;
    info!(session_id = %id, file_name, "starting analysis");

    let backend = VideoDbClient::new(api_key);
    let (video, content) = match pipeline::analyze(&backend, &state.poll, &file_name, &payload).await
    {
        Ok(result) => result,
        Err(e) => {
            error!(session_id = %id, "analysis failed: {e}");
            return Err(e);
        }
    };

    state.store.commit(id, video, content).await?;
    let session = state.store.get(id).await?;
    Ok(Json(SessionResponse::from_session(session)))
}

async fn read_video_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), PipelineError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| PipelineError::InvalidRequest {
                reason: e.to_string(),
            })?;
        let Some(field) = field else {
            return Err(PipelineError::InvalidRequest {
                reason: "request must include a `video` file field".to_string(),
            });
        };
        if field.name() != Some("video") {
            continue;
        }
        let file_name = field
            .file_name()
            .unwrap_or("upload.mp4")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| PipelineError::InvalidRequest {
            reason: e.to_string(),
        })?;
        if bytes.is_empty() {
            return Err(PipelineError::InvalidRequest {
                reason: "uploaded video is empty".to_string(),
            });
        }
        return Ok((file_name, bytes.to_vec()));
    }
}
