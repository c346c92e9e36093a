//! Gemini `generateContent` client.
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL, so
//! transport errors and request logs cannot leak it.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use kiosk_core::config::OracleConfig;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmClient;

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("gemini api key is not configured")]
    MissingApiKey,
    #[error("could not build http client: {0}")]
    Client(String),
    #[error("gemini request failed: {0}")]
    Transport(String),
    #[error("gemini returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode gemini response: {0}")]
    Decode(String),
}

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|error| GeminiError::Client(error.without_url().to_string()))?;

        Ok(Self { client, base_url: base_url.into(), model: model.into(), api_key })
    }

    pub fn from_config(config: &OracleConfig) -> Result<Self, GeminiError> {
        let api_key = config.api_key.clone().ok_or(GeminiError::MissingApiKey)?;
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_content_url(&self) -> String {
        format!("{}/v1/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let body = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
        };

        let response = self
            .client
            .post(self.generate_content_url())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|error| GeminiError::Transport(error.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|error| GeminiError::Decode(error.without_url().to_string()))?;

        Ok(envelope.first_text().unwrap_or_default())
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self.generate(prompt).await?)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
    }
}
