//! Embedder for OpenAI-compatible `/embeddings` endpoints.

use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{l2_normalize, Embedder};
use crate::error::{Error, Result};

/// Connection settings for an OpenAI-compatible embedding service.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    /// Requested vector length, for models that support shortening
    pub dimensions: Option<usize>,
    pub timeout: Duration,
    /// Extra attempts after a retryable failure (429, 5xx, timeouts)
    pub max_retries: usize,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            dimensions: None,
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Blocking client, one request per text.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    observed_dimensions: OnceLock<usize>,
    max_retries: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Build the HTTP client.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Embedding("missing API key".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(Error::Embedding("missing model name".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.trim()))
            .map_err(|_| Error::Embedding("invalid API key".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Embedding(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model,
            dimensions: config.dimensions,
            observed_dimensions: OnceLock::new(),
            max_retries: config.max_retries,
        })
    }

    fn request(&self, text: &str) -> std::result::Result<Vec<f32>, (bool, String)> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
            dimensions: self.dimensions,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| (e.is_timeout() || e.is_connect(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err((is_retryable(status), format!("{}: {}", status, detail)));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| (false, format!("invalid response: {}", e)))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| (false, "response contained no embedding".to_string()))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn backoff(attempt: usize) -> Duration {
    Duration::from_millis(250 * (1 << attempt.min(5)) as u64)
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut attempt = 0;
        let mut vector = loop {
            match self.request(text) {
                Ok(vector) => break vector,
                Err((true, message)) if attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!("Embedding request failed ({}), retry {}", message, attempt);
                    thread::sleep(backoff(attempt));
                }
                Err((_, message)) => return Err(Error::Embedding(message)),
            }
        };

        let expected = *self.observed_dimensions.get_or_init(|| vector.len());
        if vector.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
            .or_else(|| self.observed_dimensions.get().copied())
            .unwrap_or(0)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
