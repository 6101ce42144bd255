//! Pipeline runs: the indexing coordinator plus one runner per generation
//! task. Backend and generator are taken as trait objects so every run can be
//! exercised against mocks.

use std::time::Duration;

use engine::{clip_window_clamped, prompt, resolve_answer, AnalyzedVideo, ClipWindow, ResolvedAnswer};
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::llm::TextGenerator;
use crate::videodb::{IndexStatus, IndexingBackend, VideoRef};

/// Polling schedule for the backend's asynchronous indexing jobs.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
            timeout: Duration::from_secs(600),
        }
    }
}

impl PollConfig {
    /// Default schedule with the overall timeout overridable via
    /// `ECHOSCOPE_INDEX_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = PollConfig::default();
        if let Some(secs) = std::env::var("ECHOSCOPE_INDEX_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }
}

/// Upload a video and drive both indexing channels to completion.
///
/// The payload is spooled to a temp file for the duration of the upload and
/// removed when this function returns, on every path. Success means both
/// channels came back populated; anything less is an error and the caller's
/// session state stays empty.
pub async fn analyze(
    backend: &dyn IndexingBackend,
    poll: &PollConfig,
    file_name: &str,
    payload: &[u8],
) -> Result<(VideoRef, AnalyzedVideo), PipelineError> {
    // NamedTempFile removes the spool file on drop, so an early return from
    // any of the steps below still cleans up.
    let spool = tempfile::NamedTempFile::new().map_err(|e| PipelineError::UploadFailed {
        reason: e.to_string(),
    })?;
    tokio::fs::write(spool.path(), payload)
        .await
        .map_err(|e| PipelineError::UploadFailed {
            reason: e.to_string(),
        })?;

    info!(file_name, bytes = payload.len(), "uploading video");
    let video = backend
        .upload(spool.path(), file_name)
        .await
        .map_err(|e| PipelineError::UploadFailed {
            reason: e.to_string(),
        })?;

    info!(video_id = %video.id, "requesting scene and spoken-word indexing");
    let scene_index_id =
        backend
            .index_scenes(&video)
            .await
            .map_err(|e| PipelineError::IndexingFailed {
                reason: e.to_string(),
            })?;
    backend
        .index_spoken_words(&video)
        .await
        .map_err(|e| PipelineError::IndexingFailed {
            reason: e.to_string(),
        })?;

    wait_until_indexed(backend, poll, &video, &scene_index_id).await?;

    let scenes =
        backend
            .scene_index(&video, &scene_index_id)
            .await
            .map_err(|e| PipelineError::IndexingFailed {
                reason: e.to_string(),
            })?;
    let transcript = backend
        .transcript(&video)
        .await
        .map_err(|e| PipelineError::IndexingFailed {
            reason: e.to_string(),
        })?;

    // Both channels or neither; a lone transcript is as useless to the
    // downstream tasks as a lone scene list.
    if scenes.is_empty() || transcript.trim().is_empty() {
        return Err(PipelineError::IndexingIncomplete);
    }

    let duration = match backend.video_duration(&video).await {
        Ok(duration) => duration,
        Err(e) => {
            warn!(video_id = %video.id, "could not fetch video duration: {e}");
            None
        }
    };

    info!(
        video_id = %video.id,
        scenes = scenes.len(),
        transcript_chars = transcript.len(),
        "analysis complete"
    );
    Ok((
        video,
        AnalyzedVideo {
            scenes,
            transcript,
            duration,
        },
    ))
}

/// Poll the scene index job with exponential backoff until it is ready,
/// fails, or the configured timeout elapses. A timeout is reported as
/// `TimedOut`, distinct from a backend-reported failure.
async fn wait_until_indexed(
    backend: &dyn IndexingBackend,
    poll: &PollConfig,
    video: &VideoRef,
    scene_index_id: &str,
) -> Result<(), PipelineError> {
    let started = Instant::now();
    let mut backoff = poll.initial_backoff;

    loop {
        if started.elapsed() >= poll.timeout {
            return Err(PipelineError::TimedOut {
                waited_secs: started.elapsed().as_secs(),
            });
        }

        match backend.index_status(video, scene_index_id).await {
            Ok(IndexStatus::Ready) => return Ok(()),
            Ok(IndexStatus::Failed { reason }) => {
                return Err(PipelineError::IndexingFailed { reason });
            }
            Ok(IndexStatus::Processing) => {
                info!(video_id = %video.id, "indexing still processing");
            }
            Err(e) => {
                // Could be a transient network problem; keep polling until
                // the timeout budget runs out.
                warn!(video_id = %video.id, "status check failed: {e}");
            }
        }

        sleep(backoff).await;
        backoff = (backoff * 2).min(poll.max_backoff);
    }
}

fn generation_failed(e: anyhow::Error) -> PipelineError {
    PipelineError::GenerationFailed {
        reason: e.to_string(),
    }
}

fn prompt_failed(e: prompt::PromptError) -> PipelineError {
    match e {
        prompt::PromptError::NothingToAnalyze => PipelineError::NothingToAnalyze,
        prompt::PromptError::EmptyQuestion => PipelineError::InvalidRequest {
            reason: e.to_string(),
        },
    }
}

/// Brand/object list from the visual channel. Output is displayed verbatim.
pub async fn run_visual_tags(
    generator: &dyn TextGenerator,
    content: &AnalyzedVideo,
) -> Result<String, PipelineError> {
    let prompt = prompt::visual_tags_prompt(&content.scenes).map_err(prompt_failed)?;
    generator.generate(&prompt).await.map_err(generation_failed)
}

/// Top quotable lines from the transcript. Output is displayed verbatim.
pub async fn run_quotes(
    generator: &dyn TextGenerator,
    content: &AnalyzedVideo,
) -> Result<String, PipelineError> {
    let prompt = prompt::quotes_prompt(&content.transcript).map_err(prompt_failed)?;
    generator.generate(&prompt).await.map_err(generation_failed)
}

/// Social-media campaign copy from both channels. Output is displayed
/// verbatim.
pub async fn run_campaign(
    generator: &dyn TextGenerator,
    content: &AnalyzedVideo,
) -> Result<String, PipelineError> {
    let prompt =
        prompt::campaign_prompt(&content.scenes, &content.transcript).map_err(prompt_failed)?;
    generator.generate(&prompt).await.map_err(generation_failed)
}

/// Outcome of one Q&A run. An unresolvable model response is not an error:
/// the raw text is handed back for display instead of a fabricated timestamp.
#[derive(Debug, Clone)]
pub enum AskOutcome {
    Resolved {
        answer: ResolvedAnswer,
        window: ClipWindow,
        clip_url: String,
    },
    Unresolved {
        raw: String,
    },
}

/// The full Q&A path: prompt, generate, resolve, map to a clip window, and
/// render the clip.
pub async fn run_question(
    backend: &dyn IndexingBackend,
    generator: &dyn TextGenerator,
    video: &VideoRef,
    content: &AnalyzedVideo,
    question: &str,
) -> Result<AskOutcome, PipelineError> {
    let prompt = prompt::question_prompt(&content.scenes, &content.transcript, question)
        .map_err(prompt_failed)?;
    let raw = generator.generate(&prompt).await.map_err(generation_failed)?;

    let resolved = match resolve_answer(&raw) {
        Ok(resolved) => resolved,
        Err(unresolvable) => {
            info!("model response had no extractable timestamp, returning raw text");
            return Ok(AskOutcome::Unresolved {
                raw: unresolvable.raw,
            });
        }
    };

    let window = clip_window_clamped(resolved.timestamp, content.duration);
    let clip_url =
        backend
            .render_clip(video, window)
            .await
            .map_err(|e| PipelineError::ClipRenderFailed {
                reason: e.to_string(),
            })?;

    Ok(AskOutcome::Resolved {
        answer: resolved,
        window,
        clip_url,
    })
}
