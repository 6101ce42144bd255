use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;

use crate::error::PipelineError;
use crate::pipeline::PollConfig;
use crate::session::SessionStore;

pub mod sessions;
pub mod tasks;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub poll: Arc<PollConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new().nest(
        "/sessions",
        Router::new()
            .merge(sessions::router(state.clone()))
            .merge(tasks::router(state)),
    )
}

/// Resolve a backend credential: request header first, environment second.
/// Checked before any backend call so a missing key fails fast.
pub fn credential(
    headers: &HeaderMap,
    header_name: &str,
    env_name: &str,
    which: &'static str,
) -> Result<String, PipelineError> {
    let from_header = headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let key = match from_header {
        Some(key) => Some(key),
        None => std::env::var(env_name).ok().filter(|v| !v.trim().is_empty()),
    };

    key.ok_or(PipelineError::ConfigurationInvalid { which })
}

pub fn videodb_credential(headers: &HeaderMap) -> Result<String, PipelineError> {
    credential(headers, "x-videodb-api-key", "VIDEODB_API_KEY", "VideoDB")
}

pub fn gemini_credential(headers: &HeaderMap) -> Result<String, PipelineError> {
    credential(headers, "x-gemini-api-key", "GEMINI_API_KEY", "Gemini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_credential_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-videodb-api-key", "abc123".parse().unwrap());
        assert_eq!(videodb_credential(&headers).unwrap(), "abc123");
    }

    #[test]
    fn blank_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-gemini-api-key", "   ".parse().unwrap());
        // No env fallback set under test; blank header must not count.
        std::env::remove_var("GEMINI_API_KEY");
        assert!(matches!(
            gemini_credential(&headers),
            Err(PipelineError::ConfigurationInvalid { which: "Gemini" })
        ));
    }
}
