//! LLM wire types and the chat-completions client.
//!
//! This module defines the `OpenAI`-compatible message shapes shared by the
//! [`ChatCompletionsClient`], the conversation orchestrator, and the HTTP
//! surface, which echoes conversation history back to callers verbatim.
//!
//! # Example
//!
//! ```rust,ignore
//! use hospital_agent::llm::{ChatCompletionsClient, Message};
//!
//! let client = ChatCompletionsClient::new(
//!     "https://openrouter.ai/api",
//!     "sk-or-...",
//!     "tngtech/deepseek-r1t2-chimera:free",
//! );
//! let reply = client.complete(&[Message::user("hello")], None).await?;
//! ```

pub mod chat_completions;

pub use chat_completions::ChatCompletionsClient;

/// A message in a conversation.
///
/// Field names and role tags follow the Chat Completions wire format, so the
/// same struct serves request assembly, response parsing, and the
/// conversation history echoed to API callers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content. `None` for assistant turns that only carry tool calls.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool call this message responds to (tool turns only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_call_id: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    /// Create a tool-result message answering the tool call `id`.
    #[must_use]
    pub fn tool(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_call_id: Some(id.into()),
            tool_calls: None,
        }
    }

    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    /// Text content, or the empty string for content-less turns.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Tool calls carried by this message, empty slice when absent.
    #[must_use]
    pub fn requested_tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
    /// Tool response.
    Tool,
}

/// A tool call made by the assistant.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call.
    pub id: String,
    /// Type of tool (always "function" for now).
    #[serde(rename = "type")]
    pub call_type: String,
    /// Function details.
    pub function: ToolCallFunction,
}

/// Function details in a tool call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCallFunction {
    /// Function name.
    pub name: String,
    /// Arguments as JSON string.
    pub arguments: String,
}

/// Failures of a chat-completions call.
///
/// Every variant is terminal for the request in flight: the orchestrator
/// surfaces it as a single error reply with no partial output.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request could not be sent or the response body not read.
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The LLM API answered with a non-success status.
    #[error("LLM API error {status}: {body}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body text, as far as it could be read.
        body: String,
    },
    /// The response parsed as JSON but did not contain a usable message.
    #[error("malformed LLM response: {0}")]
    MalformedResponse(String),
}

// ============================================================================
// Tests
// ============================================================================
