//! Schema normalization from backend responses back to unified content.
//!
//! The backend's `assistant` role maps to the unified `model` role. A
//! response choice carries either text or completed tool calls; tool-call
//! argument text goes through the JSON repair pass before it becomes a
//! structured value.

use serde_json::{Map, Value};

use crate::{
    error::LlmError,
    json_repair,
    messages::{
        openai::ChatCompletionResponse,
        unified::{Candidate, GenerateResponse, UnifiedContent, UnifiedPart, UsageMetadata},
    },
};

/// Convert a complete backend response into a unified response.
pub(crate) fn response_to_unified(response: ChatCompletionResponse) -> crate::Result<GenerateResponse> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(LlmError::Schema("no valid choices in backend response".to_string()));
    };

    let parts = if let Some(text) = choice.message.content.filter(|text| !text.is_empty()) {
        vec![UnifiedPart::text(text)]
    } else if let Some(calls) = choice.message.tool_calls {
        let mut parts = Vec::with_capacity(calls.len());

        for call in calls {
            let args = if call.function.arguments.trim().is_empty() {
                Value::Object(Map::new())
            } else {
                json_repair::repair(&call.function.arguments)?
            };

            parts.push(UnifiedPart::function_call(call.function.name, args));
        }

        parts
    } else {
        return Err(LlmError::Schema("no valid choices in backend response".to_string()));
    };

    let usage = response.usage.unwrap_or_default();

    Ok(GenerateResponse {
        candidates: vec![Candidate {
            content: UnifiedContent::model_parts(parts),
            index: choice.index,
            safety_ratings: Vec::new(),
        }],
        usage_metadata: Some(UsageMetadata {
            prompt_token_count: usage.prompt_tokens,
            candidates_token_count: usage.completion_tokens,
            total_token_count: usage.total_tokens,
        }),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::messages::{
        openai::{ChatChoice, ChatMessage, ChatRole, FinishReason, FunctionCall, ToolCall, ToolCallType, Usage},
        unified::{UnifiedRole, to_openai::to_chat_messages},
    };

    fn text_response(text: &str, usage: Option<Usage>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage {
                    role: ChatRole::Assistant,
                    content: Some(text.to_string()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                finish_reason: Some(FinishReason::Stop),
            }],
            usage,
        }
    }

    #[test]
    fn text_response_maps_to_model_text_part() {
        let unified = response_to_unified(text_response(
            "hello",
            Some(Usage {
                prompt_tokens: 3,
                completion_tokens: 5,
                total_tokens: 8,
            }),
        ))
        .unwrap();

        let candidate = &unified.candidates[0];
        assert_eq!(candidate.content.role, UnifiedRole::Model);
        assert_eq!(candidate.content.parts[0].as_text(), Some("hello"));

        let usage = unified.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 3);
        assert_eq!(usage.candidates_token_count, 5);
        assert_eq!(usage.total_token_count, 8);
    }

    #[test]
    fn absent_usage_defaults_to_zero_counters() {
        let unified = response_to_unified(text_response("hi", None)).unwrap();
        assert_eq!(unified.usage_metadata, Some(UsageMetadata::default()));
    }

    #[test]
    fn tool_calls_are_repaired_into_structured_args() {
        let response = ChatCompletionResponse {
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage {
                    role: ChatRole::Assistant,
                    content: None,
                    tool_calls: Some(vec![ToolCall {
                        id: "call_1".to_string(),
                        tool_type: ToolCallType::Function,
                        function: FunctionCall {
                            name: "lookup".to_string(),
                            // Truncated by the backend; repair closes it.
                            arguments: r#"{"q":"x""#.to_string(),
                        },
                    }]),
                    tool_call_id: None,
                },
                finish_reason: Some(FinishReason::ToolCalls),
            }],
            usage: None,
        };

        let unified = response_to_unified(response).unwrap();
        assert_eq!(
            unified.candidates[0].content.parts[0],
            UnifiedPart::function_call("lookup", json!({"q": "x"}))
        );
    }

    #[test]
    fn empty_choices_are_a_schema_error() {
        let response = ChatCompletionResponse {
            choices: vec![],
            usage: None,
        };
        assert!(matches!(response_to_unified(response), Err(LlmError::Schema(_))));
    }

    /// Inverse of `to_chat_messages` for text-only messages, enough for the
    /// round-trip check below. The tool role has no unified message form.
    fn message_to_unified(message: ChatMessage) -> UnifiedContent {
        let role = match message.role {
            ChatRole::System => UnifiedRole::System,
            ChatRole::User => UnifiedRole::User,
            ChatRole::Assistant | ChatRole::Tool => UnifiedRole::Model,
        };

        let parts = message
            .content
            .filter(|text| !text.is_empty())
            .map(|text| vec![UnifiedPart::text(text)])
            .unwrap_or_default();

        UnifiedContent { role, parts }
    }

    #[test]
    fn text_only_contents_round_trip() {
        let original = vec![
            UnifiedContent {
                role: UnifiedRole::System,
                parts: vec![UnifiedPart::text("be terse")],
            },
            UnifiedContent::user_text("hello"),
            UnifiedContent::model_parts(vec![UnifiedPart::text("hi there")]),
        ];

        let round_tripped: Vec<UnifiedContent> = to_chat_messages(&original)
            .unwrap()
            .into_iter()
            .map(message_to_unified)
            .collect();

        assert_eq!(round_tripped, original);
    }
}
