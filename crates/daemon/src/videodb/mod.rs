//! Client for the video indexing backend.
//!
//! The backend owns the heavy lifting: it ingests a video, runs visual scene
//! indexing and spoken-word indexing as asynchronous jobs, and can render a
//! playable stream for an arbitrary time range. This module wraps its REST
//! surface and exposes it behind [`IndexingBackend`] so the pipeline can be
//! exercised against mocks.

use std::path::Path;

use anyhow::Result;
use engine::{ClipWindow, Scene};
use serde::{Deserialize, Serialize};

const VIDEODB_API_BASE: &str = "https://api.videodb.io/v1";

/// Opaque handle to an uploaded video, valid for the lifetime of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: String,
}

/// State of an asynchronous indexing job.
#[derive(Debug, Clone)]
pub enum IndexStatus {
    Processing,
    Ready,
    Failed { reason: String },
}

#[async_trait::async_trait]
pub trait IndexingBackend: Send + Sync {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<VideoRef>;
    async fn index_scenes(&self, video: &VideoRef) -> Result<String>;
    async fn index_spoken_words(&self, video: &VideoRef) -> Result<()>;
    async fn index_status(&self, video: &VideoRef, scene_index_id: &str) -> Result<IndexStatus>;
    async fn scene_index(&self, video: &VideoRef, scene_index_id: &str) -> Result<Vec<Scene>>;
    async fn transcript(&self, video: &VideoRef) -> Result<String>;
    async fn video_duration(&self, video: &VideoRef) -> Result<Option<f64>>;
    async fn render_clip(&self, video: &VideoRef, window: ClipWindow) -> Result<String>;
}

pub struct VideoDbClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VideoDbClient {
    pub fn new(api_key: String) -> Self {
        VideoDbClient {
            http: reqwest::Client::new(),
            api_key,
            base_url: VIDEODB_API_BASE.to_string(),
        }
    }

    async fn parse_ok(response: reqwest::Response) -> Result<serde_json::Value> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(anyhow::anyhow!(
                "VideoDB API error: {} - {}",
                status,
                error_text
            ))
        }
    }
}

#[async_trait::async_trait]
impl IndexingBackend for VideoDbClient {
    async fn upload(&self, path: &Path, file_name: &str) -> Result<VideoRef> {
        let bytes = tokio::fs::read(path).await?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/videos", self.base_url))
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let result = Self::parse_ok(response).await?;
        match result.get("id").and_then(|v| v.as_str()) {
            Some(id) => Ok(VideoRef { id: id.to_string() }),
            None => Err(anyhow::anyhow!("Invalid response format: missing id")),
        }
    }

    async fn index_scenes(&self, video: &VideoRef) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/videos/{}/index/scenes", self.base_url, video.id))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let result = Self::parse_ok(response).await?;
        match result.get("scene_index_id").and_then(|v| v.as_str()) {
            Some(id) => Ok(id.to_string()),
            None => Err(anyhow::anyhow!(
                "Invalid response format: missing scene_index_id"
            )),
        }
    }

    async fn index_spoken_words(&self, video: &VideoRef) -> Result<()> {
        let response = self
            .http
            .post(format!(
                "{}/videos/{}/index/spoken-words",
                self.base_url, video.id
            ))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        Self::parse_ok(response).await?;
        Ok(())
    }

    async fn index_status(&self, video: &VideoRef, scene_index_id: &str) -> Result<IndexStatus> {
        let response = self
            .http
            .get(format!(
                "{}/videos/{}/index/scenes/{}/status",
                self.base_url, video.id, scene_index_id
            ))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let result = Self::parse_ok(response).await?;
        let status = result
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        match status {
            "ready" | "done" => Ok(IndexStatus::Ready),
            "failed" => {
                let reason = result
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown error")
                    .to_string();
                Ok(IndexStatus::Failed { reason })
            }
            _ => Ok(IndexStatus::Processing),
        }
    }

    async fn scene_index(&self, video: &VideoRef, scene_index_id: &str) -> Result<Vec<Scene>> {
        let response = self
            .http
            .get(format!(
                "{}/videos/{}/index/scenes/{}",
                self.base_url, video.id, scene_index_id
            ))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let result = Self::parse_ok(response).await?;
        let mut scenes = Vec::new();
        if let Some(items) = result.get("scenes").and_then(|v| v.as_array()) {
            for item in items {
                if let (Some(start), Some(end), Some(description)) = (
                    item.get("start").and_then(|v| v.as_f64()),
                    item.get("end").and_then(|v| v.as_f64()),
                    item.get("description").and_then(|v| v.as_str()),
                ) {
                    scenes.push(Scene {
                        start,
                        end,
                        description: description.to_string(),
                    });
                }
            }
        }
        Ok(scenes)
    }

    async fn transcript(&self, video: &VideoRef) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/videos/{}/transcript", self.base_url, video.id))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let result = Self::parse_ok(response).await?;
        Ok(result
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn video_duration(&self, video: &VideoRef) -> Result<Option<f64>> {
        let response = self
            .http
            .get(format!("{}/videos/{}", self.base_url, video.id))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let result = Self::parse_ok(response).await?;
        Ok(result.get("duration").and_then(|v| v.as_f64()))
    }

    async fn render_clip(&self, video: &VideoRef, window: ClipWindow) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/videos/{}/stream", self.base_url, video.id))
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({
                "timeline": [[window.start, window.end]]
            }))
            .send()
            .await?;

        let result = Self::parse_ok(response).await?;
        match result.get("stream_url").and_then(|v| v.as_str()) {
            Some(url) => Ok(url.to_string()),
            None => Err(anyhow::anyhow!(
                "Invalid response format: missing stream_url"
            )),
        }
    }
}
