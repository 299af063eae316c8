use crate::error::{ApiError, Result};
use crate::types::{ChatRequest, ChatResponse, HealthResponse};
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Anything that can turn a user message into a companion reply.
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn send_message(&self, session_id: &str, message: &str) -> Result<ChatResponse>;
}

#[derive(Clone)]
pub struct ShaeClient {
    base_url: String,
    client: reqwest::Client,
}

impl ShaeClient {
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(%e, "reqwest client build failed; falling back to default client");
                reqwest::Client::new()
            });
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(level = "info", skip_all, fields(session_id = %session_id))]
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<ChatResponse> {
        let req = ChatRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint("/chat"))
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            severity = ?parsed.safety.severity,
            ui_actions = parsed.ui_actions().len(),
            "chat reply received"
        );
        Ok(parsed)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn health_status(&self) -> Result<HealthResponse> {
        let response = self.client.get(self.endpoint("/health")).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// True only when the service answers `{ "ok": true }`.
    pub async fn health(&self) -> bool {
        match self.health_status().await {
            Ok(h) => h.ok,
            Err(e) => {
                tracing::warn!(%e, base_url = %self.base_url, "health check failed");
                false
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl ReplySource for ShaeClient {
    async fn send_message(&self, session_id: &str, message: &str) -> Result<ChatResponse> {
        self.chat(session_id, message).await
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("base_url is required".to_string()));
    }
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ApiError::InvalidInput(format!("invalid base_url: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ApiError::InvalidInput(format!(
            "invalid base_url scheme: {other}"
        ))),
    }
}
