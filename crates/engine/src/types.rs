use serde::{Deserialize, Serialize};

/// A contiguous time range of video with an AI-generated visual description.
/// Scenes arrive chronological and non-overlapping from the indexing backend;
/// this crate treats the ordering as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub start: f64,
    pub end: f64,
    pub description: String,
}

/// The indexed content for one video: visual channel plus spoken-word channel.
///
/// Invariant: both channels are populated together or not at all. An
/// `AnalyzedVideo` with scenes but no transcript (or the reverse) must never
/// be handed out as a completed analysis; use [`AnalyzedVideo::is_complete`]
/// at the point where results are committed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzedVideo {
    pub scenes: Vec<Scene>,
    pub transcript: String,
    /// Total duration in seconds, when the backend reports one. Used to clamp
    /// clip windows locally instead of trusting the backend to do it.
    pub duration: Option<f64>,
}

impl AnalyzedVideo {
    pub fn is_complete(&self) -> bool {
        !self.scenes.is_empty() && !self.transcript.trim().is_empty()
    }
}

/// Structured output of the response resolver: a free-text answer plus the
/// single timestamp (in seconds) that grounds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAnswer {
    pub answer: String,
    pub timestamp: f64,
}

/// A bounded `(start, end)` range in seconds used to request a short playable
/// excerpt around a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
}
