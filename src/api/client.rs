//! HTTP client for the caretaker backend.

use crate::api::RecordSource;
use crate::error::{Error, Result};
use crate::models::{Conversation, ConversationEnvelope, FlagSummary, Person, PersonEnvelope};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_seconds: None,
        }
    }
}

/// `RecordSource` backed by the HTTP API.
pub struct HttpRecordSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRecordSource {
    /// Create a client for the configured backend.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("api.base_url is required".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL; each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!("GET {}", url);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Status { url, status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| Error::Decode {
            url,
            message: e.to_string(),
        })
    }

    /// Like `get_json`, but a non-2xx body carrying an `error` field is
    /// decoded into the envelope so the backend's reason reaches the page.
    async fn get_envelope<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        match self.get_json(url).await {
            Err(Error::Status { url, status, body }) => match error_body(&body) {
                Some(value) => {
                    debug!("{} answered {} with an error body", url, status);
                    serde_json::from_value(value).map_err(|e| Error::Decode {
                        url,
                        message: e.to_string(),
                    })
                }
                None => Err(Error::Status { url, status, body }),
            },
            other => other,
        }
    }
}

/// The body as JSON, if it is an object with a string `error` field.
fn error_body(body: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(body).ok()?;
    let has_error = matches!(value.get("error"), Some(Value::String(_)));
    has_error.then_some(value)
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn people(&self) -> Result<Vec<Person>> {
        self.get_json(self.endpoint(&["people"])).await
    }

    async fn flags_for(&self, name: &str) -> Result<FlagSummary> {
        self.get_json(self.endpoint(&["flags", name])).await
    }

    async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.get_json(self.endpoint(&["conversations"])).await
    }

    async fn conversations_for(&self, name: &str) -> Result<Vec<Conversation>> {
        self.get_json(self.endpoint(&["conversations", name])).await
    }

    async fn conversation(&self, id: &str) -> Result<ConversationEnvelope> {
        self.get_envelope(self.endpoint(&["conversation", id])).await
    }

    async fn person(&self, name: &str) -> Result<PersonEnvelope> {
        self.get_envelope(self.endpoint(&["person", name])).await
    }
}
