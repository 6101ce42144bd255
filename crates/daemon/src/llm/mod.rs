//! Client for the generative text backend (Gemini).
//!
//! One prompt in, raw text out. Each call is a single blocking round trip:
//! no retry (generation has cost and is non-deterministic, so a silent retry
//! is worse than a reported failure) and no caching of identical prompts.

use anyhow::Result;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
// Fixed low-latency variant; model choice is configuration, not user input.
const GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        GeminiClient {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_BASE, GEMINI_MODEL, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Gemini API error: {} - {}",
                status,
                error_text
            ));
        }

        let result: serde_json::Value = response.json().await?;
        let text = result
            .get("candidates")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.get("parts"))
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("text"))
            .and_then(|v| v.as_str());

        match text {
            Some(text) => Ok(text.to_string()),
            None => Err(anyhow::anyhow!(
                "Invalid response format: no candidate text"
            )),
        }
    }
}
