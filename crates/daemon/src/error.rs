use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Everything a pipeline run can report back to the caller. Backend and
/// network failures are converted into one of these at the point of call;
/// raw reqwest/io errors never cross the API boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing or empty {which} API key")]
    ConfigurationInvalid { which: &'static str },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("indexing failed: {reason}")]
    IndexingFailed { reason: String },

    #[error("indexing finished but returned incomplete results")]
    IndexingIncomplete,

    #[error("indexing did not complete within {waited_secs}s")]
    TimedOut { waited_secs: u64 },

    #[error("generation failed: {reason}")]
    GenerationFailed { reason: String },

    #[error("clip rendering failed: {reason}")]
    ClipRenderFailed { reason: String },

    #[error("no analyzed video in this session")]
    NothingToAnalyze,

    #[error("session not found")]
    SessionNotFound,
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::ConfigurationInvalid { .. } | PipelineError::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            PipelineError::UploadFailed { .. }
            | PipelineError::IndexingFailed { .. }
            | PipelineError::IndexingIncomplete
            | PipelineError::GenerationFailed { .. }
            | PipelineError::ClipRenderFailed { .. } => StatusCode::BAD_GATEWAY,
            PipelineError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::NothingToAnalyze => StatusCode::CONFLICT,
            PipelineError::SessionNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
