//! Text generation capability used by the fallback path
//!
//! The harvester only needs "prompt in, text out". `GeminiGenerator` implements it
//! against the Gemini `generateContent` REST endpoint.

use crate::config::FallbackConfig;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A capability that turns a prompt into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, HarvestError>;
}

/// Returns the first non-empty value among the given environment variables
pub fn resolve_api_key(env_names: &[String]) -> Option<String> {
    env_names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Gemini-backed text generator
#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiGenerator {
    /// Creates a generator with an explicit API key
    pub fn new(client: Client, config: &FallbackConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Creates a generator when a credential is present in the environment
    ///
    /// Returns `None` when no configured variable holds a key, which disables
    /// the fallback without failing any request.
    pub fn from_env(client: Client, config: &FallbackConfig) -> Option<Self> {
        resolve_api_key(&config.api_key_env).map(|key| Self::new(client, config, key))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, HarvestError> {
        let url = self.endpoint();
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    HarvestError::Timeout { url: url.clone() }
                } else {
                    HarvestError::Http {
                        url: url.clone(),
                        source,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(HarvestError::Generation(format!(
                "provider returned {}: {}",
                status, text
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::Generation(format!("failed to parse response: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .next()
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(HarvestError::Generation(
                "provider returned no text".to_string(),
            ));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
