//! In-memory session state.
//!
//! One session holds at most one analyzed video. The lifecycle is an explicit
//! state machine: create-empty, populate only on a fully successful analysis,
//! reset to empty when a new run starts or the current one fails. Nothing is
//! persisted; a daemon restart forgets everything.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use engine::AnalyzedVideo;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::videodb::VideoRef;

#[derive(Debug, Clone)]
pub enum SessionState {
    Empty,
    Analyzed {
        video: VideoRef,
        content: AnalyzedVideo,
        analyzed_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
}

/// Per-session isolated store. The write lock is only ever taken for the
/// final state swap, never across a backend call, so a long-running analysis
/// on one session cannot block reads on another.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            id,
            created_at: Utc::now(),
            state: SessionState::Empty,
        };
        self.sessions.write().await.insert(id, session);
        id
    }

    /// Snapshot of the session for read paths.
    pub async fn get(&self, id: Uuid) -> Result<Session, PipelineError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(PipelineError::SessionNotFound)
    }

    /// Snapshot of the analyzed content, or `NothingToAnalyze` when the
    /// session has no completed analysis.
    pub async fn analyzed(&self, id: Uuid) -> Result<(VideoRef, AnalyzedVideo), PipelineError> {
        match self.get(id).await?.state {
            SessionState::Analyzed { video, content, .. } => Ok((video, content)),
            SessionState::Empty => Err(PipelineError::NothingToAnalyze),
        }
    }

    /// Drop any previous analysis. Called at the start of a new run so stale
    /// results are never served while fresh ones are being produced.
    pub async fn reset(&self, id: Uuid) -> Result<(), PipelineError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(PipelineError::SessionNotFound)?;
        session.state = SessionState::Empty;
        Ok(())
    }

    /// Commit a completed analysis. Refuses half-populated content so a
    /// session can never be observed with scenes but no transcript or the
    /// reverse.
    pub async fn commit(
        &self,
        id: Uuid,
        video: VideoRef,
        content: AnalyzedVideo,
    ) -> Result<(), PipelineError> {
        if !content.is_complete() {
            return Err(PipelineError::IndexingIncomplete);
        }
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(PipelineError::SessionNotFound)?;
        session.state = SessionState::Analyzed {
            video,
            content,
            analyzed_at: Utc::now(),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Scene;

    fn complete_content() -> AnalyzedVideo {
        AnalyzedVideo {
            scenes: vec![Scene {
                start: 0.0,
                end: 5.0,
                description: "a car".into(),
            }],
            transcript: "hello".into(),
            duration: Some(20.0),
        }
    }

    fn video() -> VideoRef {
        VideoRef { id: "v1".into() }
    }

    #[tokio::test]
    async fn new_session_starts_empty() {
        let store = SessionStore::new();
        let id = store.create().await;
        assert!(matches!(store.get(id).await.unwrap().state, SessionState::Empty));
        assert!(matches!(
            store.analyzed(id).await,
            Err(PipelineError::NothingToAnalyze)
        ));
    }

    #[tokio::test]
    async fn commit_then_read_back() {
        let store = SessionStore::new();
        let id = store.create().await;
        store.commit(id, video(), complete_content()).await.unwrap();
        let (v, content) = store.analyzed(id).await.unwrap();
        assert_eq!(v.id, "v1");
        assert_eq!(content.scenes.len(), 1);
        assert_eq!(content.transcript, "hello");
    }

    #[tokio::test]
    async fn commit_rejects_partial_content() {
        let store = SessionStore::new();
        let id = store.create().await;

        let scenes_only = AnalyzedVideo {
            transcript: String::new(),
            ..complete_content()
        };
        assert!(matches!(
            store.commit(id, video(), scenes_only).await,
            Err(PipelineError::IndexingIncomplete)
        ));

        let transcript_only = AnalyzedVideo {
            scenes: vec![],
            ..complete_content()
        };
        assert!(matches!(
            store.commit(id, video(), transcript_only).await,
            Err(PipelineError::IndexingIncomplete)
        ));

        // Failed commits leave the session observable as empty, not half-set.
        assert!(matches!(
            store.analyzed(id).await,
            Err(PipelineError::NothingToAnalyze)
        ));
    }

    #[tokio::test]
    async fn reset_clears_previous_analysis() {
        let store = SessionStore::new();
        let id = store.create().await;
        store.commit(id, video(), complete_content()).await.unwrap();
        store.reset(id).await.unwrap();
        assert!(matches!(
            store.analyzed(id).await,
            Err(PipelineError::NothingToAnalyze)
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_reported() {
        let store = SessionStore::new();
        assert!(matches!(
            store.get(Uuid::new_v4()).await,
            Err(PipelineError::SessionNotFound)
        ));
        assert!(matches!(
            store.reset(Uuid::new_v4()).await,
            Err(PipelineError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create().await;
        let b = store.create().await;
        store.commit(a, video(), complete_content()).await.unwrap();
        assert!(store.analyzed(a).await.is_ok());
        assert!(matches!(
            store.analyzed(b).await,
            Err(PipelineError::NothingToAnalyze)
        ));
    }
}
