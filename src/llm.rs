use crate::config::{Config, LlmConfig};
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const FALLBACK_REPLY: &str =
    "I'm sorry, I couldn't come up with a response just now. Please try again.";

/// One message on the chat completions wire. The same shape is used for
/// requests and responses; optional fields stay off the wire when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain("assistant", content)
    }

    /// Tool result message answering one tool call.
    pub fn tool(tool_call_id: String, name: String, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(tool_call_id),
            name: Some(name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, as the API ships it.
    pub arguments: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// The capability the LLM loop hands tool calls to: a declared tool list
/// plus a dispatcher executing one call by name.
#[async_trait::async_trait]
pub trait ToolDispatcher: Send + Sync {
    fn tools(&self) -> Vec<Value>;

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value>;
}

/// Chat client for OpenAI-compatible completions endpoints, with a bounded
/// function-calling loop. Works against hosted OpenAI or a local server via
/// `llm.base_url` in the config.
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_iterations: usize,
}

impl LlmClient {
    pub fn new(api_key: String, llm: &LlmConfig, client: reqwest::Client) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AgentError::Config("OpenAI API key is empty".to_string()));
        }
        Ok(Self {
            client,
            api_key,
            model: llm.model.clone(),
            base_url: llm
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            max_iterations: llm.max_iterations,
        })
    }

    /// Reads the API key from `OPENAI_API_KEY`, failing fast if unset.
    pub fn from_env(config: &Config) -> Result<Self> {
        Self::new(
            std::env::var("OPENAI_API_KEY")?,
            &config.llm,
            config.http.build_client()?,
        )
    }

    /// One completions round trip. `tools` advertises the callable tools;
    /// the returned message may carry `tool_calls` instead of content.
    #[instrument(skip_all)]
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ChatMessage> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            tools,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AgentError::Llm {
                message: format!("chat completion request failed: {}", e),
            })?;

        let mut body: ChatResponse = response.json().await.map_err(|e| AgentError::Llm {
            message: format!("failed to parse chat completion response: {}", e),
        })?;

        if body.choices.is_empty() {
            return Err(AgentError::Llm {
                message: "chat completion returned no choices".to_string(),
            });
        }
        Ok(body.choices.remove(0).message)
    }

    /// Full function-calling workflow: completes, executes any requested
    /// tool calls through `dispatcher`, feeds the results back, and repeats
    /// up to `max_iterations` times. Tool failures and unknown tool names
    /// become `{"error": ...}` tool results rather than ending the chat.
    ///
    /// Returns the final reply plus the grown message transcript.
    pub async fn chat_with_tools(
        &self,
        mut messages: Vec<ChatMessage>,
        dispatcher: &dyn ToolDispatcher,
    ) -> Result<(String, Vec<ChatMessage>)> {
        let tools = dispatcher.tools();

        for iteration in 0..self.max_iterations {
            let reply = self.complete(&messages, Some(&tools)).await?;

            let tool_calls = match &reply.tool_calls {
                Some(calls) if !calls.is_empty() => calls.clone(),
                _ => {
                    let content = reply
                        .content
                        .clone()
                        .unwrap_or_else(|| FALLBACK_REPLY.to_string());
                    messages.push(ChatMessage::assistant(content.clone()));
                    return Ok((content, messages));
                }
            };

            debug!(iteration, calls = tool_calls.len(), "executing tool calls");
            messages.push(reply);

            for call in tool_calls {
                let result = self.execute_tool_call(&call, dispatcher).await;
                messages.push(ChatMessage::tool(
                    call.id,
                    call.function.name,
                    result.to_string(),
                ));
            }
        }

        // Iteration budget exhausted: ask for a plain answer, no more tools.
        warn!("tool-call iteration limit reached, requesting final answer");
        let reply = self.complete(&messages, None).await?;
        let content = reply
            .content
            .unwrap_or_else(|| FALLBACK_REPLY.to_string());
        messages.push(ChatMessage::assistant(content.clone()));
        Ok((content, messages))
    }

    async fn execute_tool_call(&self, call: &ToolCall, dispatcher: &dyn ToolDispatcher) -> Value {
        let arguments: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                return json!({ "error": format!("Invalid tool arguments: {}", e) });
            }
        };

        match dispatcher.dispatch(&call.function.name, arguments).await {
            Ok(result) => result,
            Err(e) => json!({ "error": e.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages_serialize_without_tool_fields() {
        let message = ChatMessage::user("hello");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "hello" }));
    }

    #[test]
    fn tool_result_messages_carry_call_id_and_name() {
        let message = ChatMessage::tool(
            "call_1".to_string(),
            "get_weather".to_string(),
            r#"{"temp_c":21}"#.to_string(),
        );
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert_eq!(value["name"], "get_weather");
    }

    #[test]
    fn assistant_tool_call_round_trips() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_7",
                        "type": "function",
                        "function": { "name": "get_events", "arguments": "{\"city\":\"Austin\",\"country_code\":\"US\"}" }
                    }]
                }
            }]
        });
        let response: ChatResponse = serde_json::from_value(body).unwrap();
        let message = &response.choices[0].message;
        assert!(message.content.is_none());
        let calls = message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "get_events");
    }
}
