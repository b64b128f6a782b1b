//! The caller-facing content-generation surface.

use std::pin::Pin;

use async_trait::async_trait;
use config::{AuthVariant, ProviderConfig, RawProviderSettings};
use futures::Stream;

use crate::{
    error::LlmError,
    fallback,
    messages::{
        openai::ChatCompletionRequest,
        unified::{
            CountTokensRequest, CountTokensResponse, EmbedContentRequest, EmbedContentResponse, GenerateRequest,
            GenerateResponse,
            from_openai::response_to_unified,
            to_openai::{to_chat_messages, to_tools},
        },
    },
    provider::{OpenAiCompatibleProvider, Provider},
    reassembler::ReassemblingStream,
    token_counter,
};

/// Stream of unified response fragments. Text fragments arrive as the backend
/// produces them; a terminal fragment with no parts marks completion.
pub type GenerateStream = Pin<Box<dyn Stream<Item = crate::Result<GenerateResponse>> + Send>>;

/// Unified content-generation interface over any backend.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate_content(&self, request: GenerateRequest) -> crate::Result<GenerateResponse>;

    async fn stream_generate_content(&self, request: GenerateRequest) -> crate::Result<GenerateStream>;

    async fn count_tokens(&self, request: CountTokensRequest) -> crate::Result<CountTokensResponse>;

    async fn embed_content(&self, request: EmbedContentRequest) -> crate::Result<EmbedContentResponse>;
}

/// [`ContentGenerator`] backed by an OpenAI-compatible chat-completions
/// endpoint, with model fallback on retryable failures.
pub struct OpenAiCompatibleGenerator {
    provider: Box<dyn Provider>,
    config: ProviderConfig,
}

impl OpenAiCompatibleGenerator {
    /// Build a generator from raw operator settings resolved under the given
    /// auth variant.
    pub fn new(variant: AuthVariant, settings: RawProviderSettings) -> crate::Result<Self> {
        let config = ProviderConfig::resolve(variant, settings)?;
        let provider = Box::new(OpenAiCompatibleProvider::new(&config)?);

        Ok(Self { provider, config })
    }

    #[cfg(test)]
    pub(crate) fn with_provider(provider: impl Provider + 'static, config: ProviderConfig) -> Self {
        Self {
            provider: Box::new(provider),
            config,
        }
    }
}

#[async_trait]
impl ContentGenerator for OpenAiCompatibleGenerator {
    async fn generate_content(&self, request: GenerateRequest) -> crate::Result<GenerateResponse> {
        let messages = to_chat_messages(&request.contents)?;
        let tools = to_tools(request.config.as_ref())?;

        let config = request.config.unwrap_or_default();
        let temperature = config.temperature;
        let max_tokens = config.max_output_tokens;
        let top_p = config.top_p;

        let response = fallback::run_with_fallback(
            request.model.as_deref(),
            &self.config.default_model,
            &self.config.fallback_models,
            |model| {
                log::debug!("requesting chat completion from {} for model {model}", self.provider.name());

                let messages = messages.clone();
                let tools = tools.clone();

                async move {
                    self.provider
                        .chat_completion(ChatCompletionRequest {
                            model,
                            messages,
                            stream: false,
                            temperature,
                            max_tokens,
                            top_p,
                            tools,
                        })
                        .await
                }
            },
        )
        .await?;

        response_to_unified(response)
    }

    async fn stream_generate_content(&self, request: GenerateRequest) -> crate::Result<GenerateStream> {
        let messages = to_chat_messages(&request.contents)?;
        let tools = to_tools(request.config.as_ref())?;

        let config = request.config.unwrap_or_default();
        let temperature = config.temperature;
        let max_tokens = config.max_output_tokens;
        let top_p = config.top_p;

        // Fallback applies to stream establishment only; a transport failure
        // after the first chunk surfaces through the stream itself.
        let stream = fallback::run_with_fallback(
            request.model.as_deref(),
            &self.config.default_model,
            &self.config.fallback_models,
            |model| {
                log::debug!("opening chat completion stream to {} for model {model}", self.provider.name());

                let messages = messages.clone();
                let tools = tools.clone();

                async move {
                    self.provider
                        .chat_completion_stream(ChatCompletionRequest {
                            model,
                            messages,
                            stream: true,
                            temperature,
                            max_tokens,
                            top_p,
                            tools,
                        })
                        .await
                }
            },
        )
        .await?;

        Ok(Box::pin(ReassemblingStream::new(stream)))
    }

    async fn count_tokens(&self, request: CountTokensRequest) -> crate::Result<CountTokensResponse> {
        let messages = to_chat_messages(&request.contents)?;

        Ok(CountTokensResponse {
            total_tokens: token_counter::estimate_tokens(&messages),
        })
    }

    async fn embed_content(&self, _request: EmbedContentRequest) -> crate::Result<EmbedContentResponse> {
        Err(LlmError::NotImplemented("embedContent"))
    }
}
