//! Generative text client (Gemini `generateContent`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::describe_failure;
use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};

/// Turns a prompt into free text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    api_endpoint: String,
    model: String,
    api_key: String,
    http_client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

impl GeminiClient {
    /// Create a client from configuration. Fails when no API key is set.
    pub fn new(config: &GeminiConfig, http_client: Client) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration("Generative text API key is not set".to_string())
            })?;

        Ok(Self {
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            http_client,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_endpoint, self.model
        );
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::GenerativeApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::GenerativeApi(describe_failure(response).await));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::GenerativeApi(format!("Failed to parse response: {}", e)))?;

        result.first_text().ok_or_else(|| {
            AppError::GenerativeApi("Invalid response format: no candidate text".to_string())
        })
    }
}
