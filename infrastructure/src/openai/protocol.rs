//! Chat completions wire types.
//!
//! Only the fields the council needs are modelled. Requests borrow from the
//! caller's messages; responses are decoded leniently since local model
//! servers differ in which optional fields they send.

use council_application::{GatewayError, ModelReply};
use council_domain::{ActionInvocation, ActionSpec, ChatMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /v1/chat/completions`
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition<'a>>>,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(
        model: &'a str,
        messages: &'a [ChatMessage],
        actions: Option<&'a [ActionSpec]>,
        max_tokens: u32,
    ) -> Self {
        Self {
            model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens,
            tools: actions
                .filter(|specs| !specs.is_empty())
                .map(|specs| specs.iter().map(ToolDefinition::from_spec).collect()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Tool declaration in the OpenAI function format
#[derive(Debug, Serialize)]
pub struct ToolDefinition<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDefinition<'a>,
}

impl<'a> ToolDefinition<'a> {
    pub fn from_spec(spec: &'a ActionSpec) -> Self {
        Self {
            kind: "function",
            function: FunctionDefinition {
                name: &spec.name,
                description: &spec.description,
                parameters: &spec.parameters,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FunctionDefinition<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: &'a Value,
}

/// Response body
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub function: FunctionCall,
}

#[derive(Debug, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// A JSON-encoded string per the API; some servers send an object
    #[serde(default)]
    pub arguments: Value,
}

impl FunctionCall {
    /// Arguments as a JSON object; unparseable arguments become `{}`
    fn decoded_arguments(&self) -> Value {
        let decoded = match &self.arguments {
            Value::String(raw) => serde_json::from_str(raw).unwrap_or(Value::Null),
            other => other.clone(),
        };
        if decoded.is_object() {
            decoded
        } else {
            Value::Object(Default::default())
        }
    }
}

impl ChatCompletionResponse {
    /// First choice as a [`ModelReply`]
    pub fn into_reply(self) -> Result<ModelReply, GatewayError> {
        let message = self
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| GatewayError::InvalidResponse("no choices in response".to_string()))?;

        let invocations = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = call.function.decoded_arguments();
                let invocation = ActionInvocation::new(call.function.name, arguments);
                match call.id {
                    Some(id) => invocation.with_id(id),
                    None => invocation,
                }
            })
            .collect();

        Ok(ModelReply::text(message.content.unwrap_or_default()).with_invocations(invocations))
    }
}
