// OpenAI-compatible Chat Completions adapter for the agents' LanguageModel port.
// Function calling carries tools and hand-offs; structured answers use json_schema.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::agents::errors::{AgentError, AgentResult};
use crate::agents::messages::{Message, ToolCall};
use crate::agents::runtime::{LanguageModel, ModelRequest, ModelResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 4096;

/// Chat Completions client
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> AgentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Build the JSON request body for the Chat Completions API
    pub fn build_request_body(&self, request: &ModelRequest) -> Value {
        let mut messages = vec![json!({
            "role": "system",
            "content": request.instructions
        })];
        messages.extend(request.messages.iter().map(message_to_openai));

        let mut body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "messages": messages,
        });

        if !request.functions.is_empty() {
            let tools: Vec<Value> = request
                .functions
                .iter()
                .map(|f| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": f.name,
                            "description": f.description,
                            "parameters": f.parameters
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
            body["tool_choice"] = json!("auto");
        }

        if let Some(output) = &request.output_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": output.name,
                    "schema": output.schema
                }
            });
        }

        body
    }

    /// Parse a Chat Completions response
    ///
    /// Tool calls win over text content; a response with neither is invalid.
    pub fn parse_response(response_body: &Value) -> AgentResult<ModelResponse> {
        let choice = response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AgentError::InvalidResponse("missing choices array in response".to_string())
            })?
            .first()
            .ok_or_else(|| AgentError::InvalidResponse("empty choices array".to_string()))?;

        let message = choice.get("message").ok_or_else(|| {
            AgentError::InvalidResponse("missing message in choice".to_string())
        })?;

        if let Some(tool_calls) = message.get("tool_calls").and_then(|t| t.as_array()) {
            if !tool_calls.is_empty() {
                let calls = tool_calls
                    .iter()
                    .map(parse_tool_call)
                    .collect::<AgentResult<Vec<_>>>()?;
                return Ok(ModelResponse::ToolCalls(calls));
            }
        }

        match message.get("content").and_then(|c| c.as_str()) {
            Some(content) if !content.is_empty() => Ok(ModelResponse::Message(content.to_string())),
            _ => Err(AgentError::InvalidResponse(
                "no tool calls or content in response".to_string(),
            )),
        }
    }
}

fn message_to_openai(message: &Message) -> Value {
    match message {
        Message::User { content } => json!({
            "role": "user",
            "content": content
        }),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut value = json!({
                "role": "assistant",
                "content": content
            });
            if !tool_calls.is_empty() {
                value["tool_calls"] = tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.arguments.to_string()
                            }
                        })
                    })
                    .collect();
            }
            value
        }
        Message::Tool {
            call_id, content, ..
        } => json!({
            "role": "tool",
            "tool_call_id": call_id,
            "content": content
        }),
    }
}

fn parse_tool_call(tool_call: &Value) -> AgentResult<ToolCall> {
    let id = tool_call
        .get("id")
        .and_then(|i| i.as_str())
        .ok_or_else(|| AgentError::InvalidResponse("tool_call missing id".to_string()))?;

    let function = tool_call
        .get("function")
        .ok_or_else(|| AgentError::InvalidResponse("tool_call missing function".to_string()))?;

    let name = function
        .get("name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| AgentError::InvalidResponse("function missing name".to_string()))?;

    let arguments_str = function
        .get("arguments")
        .and_then(|a| a.as_str())
        .unwrap_or("{}");
    let arguments: Value = if arguments_str.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(arguments_str).map_err(|e| {
            AgentError::InvalidResponse(format!("failed to parse function arguments: {}", e))
        })?
    };

    Ok(ToolCall::new(id, name, arguments))
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, request: &ModelRequest) -> AgentResult<ModelResponse> {
        let body = self.build_request_body(request);
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(agent = %request.agent, model = %self.model, "Calling chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::LlmError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AgentError::LlmError(
                "Unauthorized: check OPENAI_API_KEY".to_string(),
            ));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        Self::parse_response(&response_body)
    }
}
