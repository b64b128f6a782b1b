use async_trait::async_trait;
use config::ProviderConfig;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use super::{ChatCompletionStream, Provider, http_client::default_http_client_builder};
use crate::{
    error::LlmError,
    messages::openai::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse},
};

/// HTTP transport for any backend speaking the OpenAI chat-completions
/// protocol.
pub(crate) struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenAiCompatibleProvider {
    pub(crate) fn new(config: &ProviderConfig) -> crate::Result<Self> {
        let client = default_http_client_builder(Default::default()).build().map_err(|e| {
            log::error!("Failed to create HTTP client: {e}");
            LlmError::InternalError(None)
        })?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_chat_completions(&self, request: &ChatCompletionRequest) -> crate::Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = sonic_rs::to_vec(request)
            .map_err(|e| LlmError::InvalidRequest(format!("Failed to serialize request: {e}")))?;

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(format!("Failed to send request: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Chat completion error ({status}): {error_text}");

            return Err(map_status(status, error_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    async fn chat_completion(&self, mut request: ChatCompletionRequest) -> crate::Result<ChatCompletionResponse> {
        request.stream = false;

        let response = self.post_chat_completions(&request).await?;

        let response_text = response.text().await.map_err(|e| {
            log::error!("Failed to read chat completion response body: {e}");
            LlmError::InternalError(None)
        })?;

        sonic_rs::from_str(&response_text).map_err(|e| {
            log::error!("Failed to parse chat completion response: {e}");
            log::debug!("Response parsing failed, length: {} bytes", response_text.len());

            LlmError::InternalError(None)
        })
    }

    async fn chat_completion_stream(&self, mut request: ChatCompletionRequest) -> crate::Result<ChatCompletionStream> {
        request.stream = true;

        let response = self.post_chat_completions(&request).await?;
        let event_stream = response.bytes_stream().eventsource();

        let chunk_stream = event_stream.filter_map(|event| async move {
            let event = match event {
                Ok(event) => event,
                Err(EventStreamError::Transport(e)) => {
                    log::error!("Streaming transport error: {e}");
                    return Some(Err(LlmError::StreamingFailed(e.to_string())));
                }
                Err(e) => {
                    // Malformed SSE framing, skip the event.
                    log::warn!("SSE parsing error in chat completion stream: {e}");
                    return None;
                }
            };

            if event.data == "[DONE]" {
                return None;
            }

            match sonic_rs::from_str::<ChatCompletionChunk>(&event.data) {
                Ok(chunk) => Some(Ok(chunk)),
                Err(e) => {
                    log::warn!("Failed to parse streaming chunk: {e}");
                    None
                }
            }
        });

        Ok(Box::pin(chunk_stream))
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

fn map_status(status: StatusCode, error_text: String) -> LlmError {
    match status.as_u16() {
        401 => LlmError::AuthenticationFailed(error_text),
        403 => LlmError::InsufficientQuota(error_text),
        404 => LlmError::ModelNotFound(error_text),
        429 => LlmError::RateLimitExceeded { message: error_text },
        400 => LlmError::InvalidRequest(error_text),
        500 => LlmError::InternalError(Some(error_text)),
        _ => LlmError::ProviderApiError {
            status: status.as_u16(),
            message: error_text,
        },
    }
}

/// Normalize a configured base URL to end in a single `/v1` segment.
///
/// Operators configure bare hosts (`https://api.siliconflow.cn`) as often as
/// full prefixes (`https://api.openai.com/v1`); both must produce the same
/// request URLs.
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');

    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}
