use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use std::time::Duration;
use tracing::debug;

use super::{
    classify_failure, parse_retry_after, CompletionError, CompletionGateway, CompletionRequest,
};
use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::message::Turn;
use crate::utils::url::construct_api_url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Non-streaming client for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiGateway {
    /// A missing key is not an error until a completion is attempted.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn transport_error(&self, err: reqwest::Error) -> CompletionError {
        CompletionError::Transport {
            message: err.to_string(),
            timeout: err.is_timeout(),
            status: err.status().map(|status| status.as_u16()),
        }
    }

    fn timed_out(&self) -> CompletionError {
        CompletionError::Transport {
            message: format!("no response within {}s", self.timeout.as_secs_f32()),
            timeout: true,
            status: None,
        }
    }

    async fn send(&self, request: CompletionRequest<'_>, api_key: &str) -> Result<Turn, CompletionError> {
        let body = ChatRequest {
            model: request.model.to_string(),
            messages: request.turns.iter().map(ChatMessage::from).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let url = construct_api_url(&self.base_url, "chat/completions");
        debug!(%url, model = request.model, turns = request.turns.len(), "sending completion request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            let error = classify_failure(status, &error_text, request.model, retry_after);
            debug!(%status, error = %error, "completion request failed");
            return Err(error);
        }

        let text = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;
        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|err| CompletionError::Transport {
                message: format!("unreadable response body: {err}"),
                timeout: false,
                status: Some(status.as_u16()),
            })?;

        parsed.into_turn().ok_or_else(|| CompletionError::Transport {
            message: "response contained no choices".to_string(),
            timeout: false,
            status: Some(status.as_u16()),
        })
    }
}

#[async_trait]
impl CompletionGateway for OpenAiGateway {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Turn, CompletionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CompletionError::missing_credential());
        };

        // Bounds the whole exchange, including reading the body.
        match tokio::time::timeout(self.timeout, self.send(request, api_key)).await {
            Ok(result) => result,
            Err(_) => Err(self.timed_out()),
        }
    }
}
