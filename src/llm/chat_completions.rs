//! OpenAI Chat Completions API client.
//!
//! Non-streaming client for `/v1/chat/completions` endpoints. One request in,
//! one assistant [`Message`] out; tool calls arrive fully formed on the
//! response message rather than as deltas.

use super::{LlmError, Message};

/// Attribution headers sent with every OpenRouter request.
const HTTP_REFERER: &str = "https://github.com/smart-hospital-system";
const X_TITLE: &str = "Smart Hospital AI Agent";

/// Client for an `OpenAI`-compatible Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Create a client for the given API base, credential, and model.
    ///
    /// No request timeout is configured: calls either return or the request
    /// fails outright, and the caller owns how long it is willing to wait.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Model identifier requests are issued for.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a conversation and return the assistant's message.
    ///
    /// When `tools` is non-empty the schemas are attached with automatic
    /// tool choice, so the model decides per request whether to call any.
    ///
    /// # Errors
    ///
    /// [`LlmError::Transport`] when the request cannot be completed,
    /// [`LlmError::Api`] on non-success status codes, and
    /// [`LlmError::MalformedResponse`] when the body carries no usable
    /// assistant message.
    pub async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[serde_json::Value]>,
    ) -> Result<Message, LlmError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let body = request_body(&self.model, messages, tools);

        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.map_or(0, <[serde_json::Value]>::len),
            "submitting chat completion"
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", X_TITLE)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "chat completion rejected");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::MalformedResponse(format!("invalid response JSON: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::MalformedResponse("response contained no choices".to_string()))
    }
}

/// Build the request payload; `tool_choice` rides along only when schemas do.
fn request_body(
    model: &str,
    messages: &[Message],
    tools: Option<&[serde_json::Value]>,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
    });
    if let Some(schemas) = tools
        && !schemas.is_empty()
    {
        body["tools"] = serde_json::Value::Array(schemas.to_vec());
        body["tool_choice"] = serde_json::Value::String("auto".to_string());
    }
    body
}

/// Top-level chat-completions response body.
#[derive(Debug, serde::Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: Message,
}

// ============================================================================
// Tests
// ============================================================================
