//! HttpAssistantBackend - JSON-over-HTTP client for the assistant service.

use async_trait::async_trait;
use mapchat_core::config::BackendConfig;
use mapchat_core::error::{MapChatError, Result};
use mapchat_core::{AssistantBackend, AssistantReply, ChatRequest, ExchangeError};
use reqwest::Client;
use std::time::Duration;

/// Backend that POSTs `{"message": ...}` to a chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpAssistantBackend {
    client: Client,
    endpoint: String,
}

impl HttpAssistantBackend {
    /// Creates a backend for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapChatError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistantBackend {
    async fn exchange(&self, request: ChatRequest) -> std::result::Result<AssistantReply, ExchangeError> {
        tracing::debug!("[HttpAssistantBackend] POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| ExchangeError::transport(format!("Request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("[HttpAssistantBackend] Non-success status {}", status);
            return Err(ExchangeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| ExchangeError::transport(format!("Failed to read body: {err}")))?;

        AssistantReply::from_json(&body)
    }
}
