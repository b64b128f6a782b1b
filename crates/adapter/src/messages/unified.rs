//! Caller-facing, provider-agnostic content types.
//!
//! These follow the Gemini generate-content wire shapes: a conversation is an
//! ordered sequence of [`UnifiedContent`], each holding a role and an ordered
//! sequence of [`UnifiedPart`]s. The assistant role is spelled `model` on this
//! side of the adapter; the backend's `assistant` spelling exists only in
//! `messages::openai`.
//!
//! ## Conversion flow
//!
//! ```text
//! GenerateRequest → backend ChatMessages → transport → GenerateResponse (or fragments)
//! ```
//!
//! Responses and streamed fragments share [`GenerateResponse`]: a fragment is
//! simply a response whose single candidate carries an incremental slice of
//! parts, and a terminal fragment carries none.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) mod from_openai;
pub(crate) mod to_openai;

/// A unified content-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Model identifier. When absent, the configured default model is used
    /// and the configured fallbacks still apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Conversation history, oldest first.
    pub contents: Vec<UnifiedContent>,

    /// Generation tuning and tool declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationConfig>,
}

/// Generation tuning options and available tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens to generate; maps to the backend's `max_tokens`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Tools the model may call, grouped Gemini-style into declaration lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<UnifiedToolDeclarations>>,
}

/// A group of function declarations offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedToolDeclarations {
    pub function_declarations: Vec<UnifiedFunctionDeclaration>,
}

/// One callable function the model may request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedFunctionDeclaration {
    /// Function name; must be non-empty.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter schema as JSON Schema. Passed through to the backend as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// One message of a conversation: a role plus ordered parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedContent {
    pub role: UnifiedRole,
    pub parts: Vec<UnifiedPart>,
}

impl UnifiedContent {
    /// A user message holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: UnifiedRole::User,
            parts: vec![UnifiedPart::text(text)],
        }
    }

    /// A model message holding the given parts. This is the shape of every
    /// response candidate and streamed fragment.
    pub fn model_parts(parts: Vec<UnifiedPart>) -> Self {
        Self {
            role: UnifiedRole::Model,
            parts,
        }
    }
}

impl From<&str> for UnifiedContent {
    fn from(text: &str) -> Self {
        Self::user_text(text)
    }
}

/// Message sender role.
///
/// The unified schema uses `model` where chat-completion schemas use
/// `assistant`; there is no unified `tool` role, tool results travel as
/// [`UnifiedPart::FunctionResponse`] parts instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnifiedRole {
    System,
    User,
    Model,
}

/// A tagged content part.
///
/// Every translation site matches exhaustively on this enum; content that
/// maps to nothing is rejected as a schema error rather than coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnifiedPart {
    /// Plain text.
    Text { text: String },

    /// A model-requested function invocation with structured arguments.
    #[serde(rename_all = "camelCase")]
    FunctionCall { function_call: UnifiedFunctionCall },

    /// The caller-produced result of an earlier function call.
    #[serde(rename_all = "camelCase")]
    FunctionResponse { function_response: UnifiedFunctionResponse },
}

impl UnifiedPart {
    pub fn text(text: impl Into<String>) -> Self {
        UnifiedPart::Text { text: text.into() }
    }

    pub fn function_call(name: impl Into<String>, args: Value) -> Self {
        UnifiedPart::FunctionCall {
            function_call: UnifiedFunctionCall {
                name: name.into(),
                args,
            },
        }
    }

    /// Get the text if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UnifiedPart::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedFunctionCall {
    pub name: String,
    /// Structured arguments. Streamed argument fragments are reassembled and
    /// repaired before they land here; this is always a parsed value.
    pub args: Value,
}

/// The result of executing a function call, addressed by the originating
/// call identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedFunctionResponse {
    pub id: String,
    pub name: String,
    pub response: UnifiedFunctionResult,
}

/// Output or error of a function execution. At least one side is expected to
/// be present; an error takes precedence when both are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedFunctionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A unified response, complete or fragmentary.
///
/// The non-streaming path returns exactly one of these. The streaming path
/// yields a sequence of them: text fragments, at most one tool-call fragment,
/// then a terminal fragment with an empty part list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,

    /// Usage counters; populated on completed responses, absent on stream
    /// fragments. Counters the backend omitted default to zero, never null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateResponse {
    /// A single-candidate response fragment carrying the given parts. An
    /// empty part list is the stream-completion signal.
    pub(crate) fn from_parts(parts: Vec<UnifiedPart>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: UnifiedContent::model_parts(parts),
                index: 0,
                safety_ratings: Vec::new(),
            }],
            usage_metadata: None,
        }
    }
}

/// One response candidate. The adapter always produces exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: UnifiedContent,
    pub index: u32,
    /// Carried for wire fidelity with the Gemini schema; the chat-completion
    /// backends never produce ratings, so this stays empty.
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRating {
    pub category: String,
    pub probability: String,
}

/// Token usage counters copied through from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
}

/// Request for a token estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub contents: Vec<UnifiedContent>,
}

/// A token estimate. Heuristic, not a tokenizer count; see
/// `token_counter` for the approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    pub total_tokens: u32,
}

/// Embedding request. Unsupported by the OpenAI-compatible path; carried so
/// the public contract matches the unified interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub content: UnifiedContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentResponse {
    pub embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn part_serialization_shapes() {
        let parts = vec![
            UnifiedPart::text("hello"),
            UnifiedPart::function_call("lookup", json!({"q": "x"})),
            UnifiedPart::FunctionResponse {
                function_response: UnifiedFunctionResponse {
                    id: "call_1".to_string(),
                    name: "lookup".to_string(),
                    response: UnifiedFunctionResult {
                        output: Some("found".to_string()),
                        error: None,
                    },
                },
            },
        ];

        insta::assert_json_snapshot!(parts, @r#"
        [
          {
            "text": "hello"
          },
          {
            "functionCall": {
              "name": "lookup",
              "args": {
                "q": "x"
              }
            }
          },
          {
            "functionResponse": {
              "id": "call_1",
              "name": "lookup",
              "response": {
                "output": "found"
              }
            }
          }
        ]
        "#);
    }

    #[test]
    fn parts_deserialize_from_gemini_wire_shape() {
        let part: UnifiedPart = serde_json::from_str(r#"{"functionCall":{"name":"noop","args":{}}}"#).unwrap();
        assert_eq!(part, UnifiedPart::function_call("noop", json!({})));

        let part: UnifiedPart = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(part.as_text(), Some("hi"));
    }

    #[test]
    fn usage_counters_default_to_zero() {
        let usage: UsageMetadata = serde_json::from_str(r#"{"promptTokenCount": 7}"#).unwrap();
        assert_eq!(usage.prompt_token_count, 7);
        assert_eq!(usage.candidates_token_count, 0);
        assert_eq!(usage.total_token_count, 0);
    }
}
