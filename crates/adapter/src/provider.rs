//! Backend transport abstraction.
//!
//! A [`Provider`] speaks one backend wire protocol. The generator layer above
//! it is written against this trait so tests can swap the HTTP transport for
//! a scripted one.

mod http_client;
mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

pub(crate) use self::openai::OpenAiCompatibleProvider;
use crate::messages::openai::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse};

/// Stream of raw backend chunks, before reassembly.
pub(crate) type ChatCompletionStream = Pin<Box<dyn Stream<Item = crate::Result<ChatCompletionChunk>> + Send>>;

#[async_trait]
pub(crate) trait Provider: Send + Sync {
    async fn chat_completion(&self, request: ChatCompletionRequest) -> crate::Result<ChatCompletionResponse>;

    async fn chat_completion_stream(&self, request: ChatCompletionRequest) -> crate::Result<ChatCompletionStream>;

    fn name(&self) -> &str;
}
