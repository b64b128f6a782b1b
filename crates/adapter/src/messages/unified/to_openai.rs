//! Schema normalization from unified contents to backend chat messages.
//!
//! One unified message buckets its parts by kind and maps to up to three
//! backend messages: coalesced text, a tool-result message, and an assistant
//! tool-call announcement. A message whose parts produce nothing is a schema
//! error, never silently dropped.

use serde_json::json;
use uuid::Uuid;

use crate::{
    error::LlmError,
    messages::{
        openai::{ChatMessage, ChatRole, FunctionCall, FunctionDefinition, Tool, ToolCall, ToolCallType},
        unified::{GenerationConfig, UnifiedContent, UnifiedFunctionCall, UnifiedFunctionResponse, UnifiedPart, UnifiedRole},
    },
};

impl From<UnifiedRole> for ChatRole {
    fn from(role: UnifiedRole) -> Self {
        match role {
            UnifiedRole::System => ChatRole::System,
            UnifiedRole::User => ChatRole::User,
            UnifiedRole::Model => ChatRole::Assistant,
        }
    }
}

/// Convert unified contents into the backend message sequence.
pub(crate) fn to_chat_messages(contents: &[UnifiedContent]) -> crate::Result<Vec<ChatMessage>> {
    let mut messages = Vec::with_capacity(contents.len());

    for content in contents {
        let role = ChatRole::from(content.role);

        let mut texts: Vec<&str> = Vec::new();
        let mut calls: Vec<&UnifiedFunctionCall> = Vec::new();
        let mut responses: Vec<&UnifiedFunctionResponse> = Vec::new();

        for part in &content.parts {
            match part {
                UnifiedPart::Text { text } => texts.push(text),
                UnifiedPart::FunctionCall { function_call } => calls.push(function_call),
                UnifiedPart::FunctionResponse { function_response } => responses.push(function_response),
            }
        }

        if texts.is_empty() && calls.is_empty() && responses.is_empty() {
            return Err(LlmError::Schema(format!(
                "content parts produced no backend message: {}",
                serde_json::to_string(content).unwrap_or_else(|_| "<unserializable content>".to_string())
            )));
        }

        if !texts.is_empty() {
            messages.push(ChatMessage {
                role,
                content: Some(texts.join("\n")),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        if !responses.is_empty() {
            let body = responses
                .iter()
                .map(|response| match &response.response.error {
                    Some(error) => format!("Error: {error}"),
                    None => response.response.output.clone().unwrap_or_default(),
                })
                .collect::<Vec<_>>()
                .join("\n");

            messages.push(ChatMessage {
                role: ChatRole::Tool,
                content: Some(body),
                tool_calls: None,
                tool_call_id: Some(responses[0].id.clone()),
            });
        }

        if !calls.is_empty() {
            if content.role == UnifiedRole::User {
                return Err(LlmError::Schema(
                    "a functionCall part cannot originate from a user message".to_string(),
                ));
            }

            messages.push(ChatMessage {
                role: ChatRole::Assistant,
                content: None,
                tool_calls: Some(
                    calls
                        .iter()
                        .map(|call| ToolCall {
                            id: new_call_id(),
                            tool_type: ToolCallType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: serde_json::to_string(&call.args).unwrap_or_else(|_| "{}".to_string()),
                            },
                        })
                        .collect(),
                ),
                tool_call_id: None,
            });
        }
    }

    Ok(messages)
}

/// Convert Gemini-style function declarations into backend tool entries.
pub(crate) fn to_tools(config: Option<&GenerationConfig>) -> crate::Result<Option<Vec<Tool>>> {
    let Some(declarations) = config.and_then(|config| config.tools.as_ref()) else {
        return Ok(None);
    };

    let mut tools = Vec::new();

    for group in declarations {
        for function in &group.function_declarations {
            if function.name.is_empty() {
                return Err(LlmError::Schema("function declaration must have a name".to_string()));
            }

            tools.push(Tool {
                tool_type: ToolCallType::Function,
                function: FunctionDefinition {
                    name: function.name.clone(),
                    description: function.description.clone().unwrap_or_default(),
                    parameters: function.parameters.clone().unwrap_or_else(|| json!({})),
                },
            });
        }
    }

    Ok((!tools.is_empty()).then_some(tools))
}

fn new_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}
