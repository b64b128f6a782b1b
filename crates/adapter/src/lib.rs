//! Adapter between the Gemini-style generate-content interface and backends
//! speaking the OpenAI chat-completions protocol.
//!
//! Callers build an [`OpenAiCompatibleGenerator`] from resolved provider
//! settings and talk to it through [`ContentGenerator`]. Behind that surface
//! the crate translates message schemas in both directions, reassembles
//! streamed tool-call fragments into structured function calls, repairs
//! truncated argument JSON, and retries retryable failures across the
//! configured fallback models.

mod error;
mod fallback;
mod generator;
mod json_repair;
mod messages;
mod provider;
mod reassembler;
mod token_counter;

pub use error::{LlmError, Result};
pub use generator::{ContentGenerator, GenerateStream, OpenAiCompatibleGenerator};
pub use messages::unified::{
    Candidate, ContentEmbedding, CountTokensRequest, CountTokensResponse, EmbedContentRequest, EmbedContentResponse,
    GenerateRequest, GenerateResponse, GenerationConfig, SafetyRating, UnifiedContent, UnifiedFunctionCall,
    UnifiedFunctionDeclaration, UnifiedFunctionResponse, UnifiedFunctionResult, UnifiedPart, UnifiedRole,
    UnifiedToolDeclarations, UsageMetadata,
};
