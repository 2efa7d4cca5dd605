//! Adapter between internal messages and the OpenAI chat-completions format.

use crate::error::Result;
use crate::llm::models::{LlmMessage, LlmToolCall, MessageRole};
use serde_json::{json, Value};

/// Adapt LLM messages to OpenAI format.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Result<Vec<Value>> {
    let mut result = Vec::with_capacity(messages.len());

    for msg in messages {
        let openai_msg = match msg.role {
            MessageRole::System => json!({
                "role": "system",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::User => json!({
                "role": "user",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::Assistant => {
                let mut assistant_msg = json!({ "role": "assistant" });

                if let Some(ref content) = msg.content {
                    assistant_msg["content"] = json!(content);
                }

                if let Some(ref tool_calls) = msg.tool_calls {
                    let formatted_calls = tool_calls
                        .iter()
                        .map(format_tool_call)
                        .collect::<Result<Vec<_>>>()?;
                    assistant_msg["tool_calls"] = Value::Array(formatted_calls);
                }

                assistant_msg
            }
            MessageRole::Tool => json!({
                "role": "tool",
                "content": msg.content.as_deref().unwrap_or(""),
                "tool_call_id": msg.tool_call_id.as_deref().unwrap_or("")
            }),
        };

        result.push(openai_msg);
    }

    Ok(result)
}

fn format_tool_call(tool_call: &LlmToolCall) -> Result<Value> {
    // Arguments that never parsed are echoed back exactly as received.
    let arguments = match &tool_call.arguments {
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string(other)?,
    };

    Ok(json!({
        "id": tool_call.id.as_deref().unwrap_or(""),
        "type": "function",
        "function": {
            "name": tool_call.name,
            "arguments": arguments
        }
    }))
}

/// Decode a streamed tool-call argument string.
///
/// An empty string means "no arguments". Text that is not valid JSON is kept
/// as a JSON string so tool validation rejects it with a readable error.
pub fn parse_tool_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
