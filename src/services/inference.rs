use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling a model server
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Model server returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Model not configured: {0}")]
    Unavailable(String),
}

/// Classifier output label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub label: String,
    pub score: f32,
}

/// Sentence-embedding model: text in, dense vector out
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError>;
}

/// Text-classification model used for toxicity detection
#[async_trait]
pub trait ToxicityModel: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<Label>, ModelError>;
}

/// Shared HTTP plumbing for text-embeddings-inference style servers
#[derive(Debug, Clone)]
struct InferenceClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl InferenceClient {
    fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    async fn post(&self, path: &str, text: &str) -> Result<Value, ModelError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::trace!("Calling model server: {}", url);

        let mut request = self.client.post(&url).json(&json!({ "inputs": text }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn probe(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                tracing::debug!("Model server probe failed for {}: {}", url, e);
                false
            }
        }
    }
}

/// Embedding model served over HTTP (`POST /embed`)
#[derive(Debug, Clone)]
pub struct HttpEmbeddingModel {
    inner: InferenceClient,
}

impl HttpEmbeddingModel {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, ModelError> {
        Ok(Self {
            inner: InferenceClient::new(base_url, api_key, timeout)?,
        })
    }

    /// Check that the server answers its health endpoint
    pub async fn probe(&self) -> bool {
        self.inner.probe().await
    }
}

#[async_trait]
impl EmbeddingModel for HttpEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let json = self.inner.post("/embed", text).await?;
        parse_embedding(json)
    }
}

/// Accepts either `[[f32, ...]]` (batch of one) or a flat `[f32, ...]`
fn parse_embedding(json: Value) -> Result<Vec<f32>, ModelError> {
    let outer = json
        .as_array()
        .ok_or_else(|| ModelError::InvalidResponse("Expected a JSON array".into()))?;

    let values = match outer.first() {
        Some(Value::Array(inner)) => inner,
        _ => outer,
    };

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| ModelError::InvalidResponse(format!("Non-numeric embedding value: {}", v)))
        })
        .collect()
}

/// Toxicity classifier served over HTTP (`POST /predict`)
#[derive(Debug, Clone)]
pub struct HttpToxicityModel {
    inner: InferenceClient,
}

impl HttpToxicityModel {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, ModelError> {
        Ok(Self {
            inner: InferenceClient::new(base_url, api_key, timeout)?,
        })
    }

    pub async fn probe(&self) -> bool {
        self.inner.probe().await
    }
}

#[async_trait]
impl ToxicityModel for HttpToxicityModel {
    async fn classify(&self, text: &str) -> Result<Vec<Label>, ModelError> {
        let json = self.inner.post("/predict", text).await?;

        // Some servers wrap single-input predictions in an extra array
        let json = match json {
            Value::Array(mut items) if matches!(items.first(), Some(Value::Array(_))) => items.remove(0),
            other => other,
        };

        serde_json::from_value(json)
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to parse labels: {}", e)))
    }
}
