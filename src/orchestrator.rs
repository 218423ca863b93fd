//! Conversation orchestration.
//!
//! One request flows straight through: assemble the prompt for the
//! configured [`PromptMode`], call the model, resolve at most one round of
//! tool calls through the hospital gateway, and hand back the final answer
//! with its bookkeeping. Tool failures become tool-result content the model
//! can react to; only the two model calls themselves can fail the request.
//!
//! The orchestrator holds no per-conversation state. Callers carry history
//! between requests and the echoed `conversation_history` is what the next
//! request should send back.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::hospital::{GatewayError, HospitalGateway};
use crate::llm::{ChatCompletionsClient, LlmError, Message, MessageRole, ToolCall};
use crate::relevance::{ContextBundle, RelevanceExtractor};
use crate::tools::{ToolCatalog, ToolId};

/// System prompt for tool-calling mode and for messages that stay outside
/// the hospital domain.
const STANDARD_SYSTEM_PROMPT: &str = "You are an AI assistant for a Smart Hospital Management System. You have access to various hospital tools and APIs that allow you to:

- Manage patient records, vitals, and treatments
- Monitor staff schedules and assignments
- Track IoT devices and sensor data
- Detect anomalies in patient monitoring
- Manage room and bed assignments
- View alerts and simulation status

When users ask questions about the hospital, use the appropriate tools to gather information and provide helpful responses. Always be professional and prioritize patient safety and privacy.";

/// How the orchestrator routes hospital data to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptMode {
    /// Fetch keyword-relevant data eagerly and embed it in the system turn.
    /// No tool schemas are sent.
    #[default]
    ContextInjection,
    /// Advertise the tool catalog and let the model request data itself.
    ToolCalling,
}

impl PromptMode {
    /// Configuration value for this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContextInjection => "context-injection",
            Self::ToolCalling => "tool-calling",
        }
    }
}

impl std::str::FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "context-injection" => Ok(Self::ContextInjection),
            "tool-calling" => Ok(Self::ToolCalling),
            other => Err(format!(
                "unknown agent mode '{other}' (expected 'context-injection' or 'tool-calling')"
            )),
        }
    }
}

impl std::fmt::Display for PromptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final answer plus bookkeeping for one chat request.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChatReply {
    /// The model's final text answer.
    pub response: String,
    /// Number of tool invocations resolved for this answer.
    pub tool_calls_made: usize,
    /// Distinct tool names used, in first-use order.
    pub tools_used: Vec<String>,
    /// The conversation as submitted on the last model call. Carry this
    /// into the next request's history.
    pub conversation_history: Vec<Message>,
}

/// Coordinates prompts, model calls, and the single tool round-trip.
///
/// Constructed once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: ChatCompletionsClient,
    gateway: Arc<HospitalGateway>,
    catalog: ToolCatalog,
    extractor: RelevanceExtractor,
    mode: PromptMode,
}

impl Orchestrator {
    /// Wire up an orchestrator from its parts.
    #[must_use]
    pub fn new(
        client: ChatCompletionsClient,
        gateway: Arc<HospitalGateway>,
        catalog: ToolCatalog,
        mode: PromptMode,
    ) -> Self {
        let extractor = RelevanceExtractor::new(Arc::clone(&gateway));
        Self {
            client,
            gateway,
            catalog,
            extractor,
            mode,
        }
    }

    /// Operating mode this orchestrator was configured with.
    #[must_use]
    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    /// Answer one user message given the caller's prior history.
    ///
    /// # Errors
    ///
    /// Fails only when a model call does: transport trouble, an API error
    /// status, or an unusable response body. Hospital-side failures are
    /// folded into tool results and never abort the request.
    pub async fn chat(
        &self,
        user_message: &str,
        history: &[Message],
    ) -> Result<ChatReply, LlmError> {
        let request_id = Uuid::new_v4();
        tracing::info!(
            name: "chat.request",
            request_id = %request_id,
            mode = %self.mode,
            history_turns = history.len(),
            "processing chat message"
        );

        let mut messages = self.assemble(user_message, history).await;

        let tools = match self.mode {
            PromptMode::ToolCalling => Some(self.catalog.openai_tools()),
            PromptMode::ContextInjection => None,
        };
        let first = self.client.complete(&messages, tools).await?;

        // Tool calls are only honored in tool-calling mode; a model that
        // produces them anyway is answered from its text content.
        let calls = if self.mode == PromptMode::ToolCalling {
            first.requested_tool_calls().to_vec()
        } else {
            Vec::new()
        };

        if calls.is_empty() {
            let response = first.text().to_string();
            tracing::info!(
                name: "chat.done",
                request_id = %request_id,
                tool_calls = 0_usize,
                "answered without tools"
            );
            return Ok(ChatReply {
                response,
                tool_calls_made: 0,
                tools_used: Vec::new(),
                conversation_history: messages,
            });
        }

        let mut tools_used: Vec<String> = Vec::new();
        messages.push(first);
        for call in &calls {
            let content = self.resolve_tool(request_id, call).await;
            record_tool_use(&mut tools_used, &call.function.name);
            messages.push(Message::tool(call.id.clone(), content));
        }

        // One round-trip is the limit: the follow-up call carries no tool
        // schemas, and any further tool requests are ignored.
        let final_msg = self.client.complete(&messages, None).await?;
        if !final_msg.requested_tool_calls().is_empty() {
            tracing::warn!(
                request_id = %request_id,
                "model requested more tools after its round-trip; ignoring"
            );
        }

        tracing::info!(
            name: "chat.done",
            request_id = %request_id,
            tool_calls = calls.len(),
            tools = ?tools_used,
            "answered after tool round-trip"
        );
        Ok(ChatReply {
            response: final_msg.text().to_string(),
            tool_calls_made: calls.len(),
            tools_used,
            conversation_history: messages,
        })
    }

    /// Build the outbound conversation: fresh system turn, the caller's
    /// non-system history, then the new user turn.
    async fn assemble(&self, user_message: &str, history: &[Message]) -> Vec<Message> {
        let system_text = match self.mode {
            PromptMode::ContextInjection
                if RelevanceExtractor::is_domain_related(user_message) =>
            {
                let bundle = self.extractor.extract(user_message).await;
                context_system_prompt(&bundle)
            }
            _ => STANDARD_SYSTEM_PROMPT.to_string(),
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system_text));
        messages.extend(
            history
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .cloned(),
        );
        messages.push(Message::user(user_message));
        messages
    }

    /// Resolve one tool call into the content of its tool turn.
    ///
    /// Never fails: unparseable arguments, unknown names, and upstream
    /// errors all come back as `{"error": ...}` content.
    async fn resolve_tool(&self, request_id: Uuid, call: &ToolCall) -> String {
        let name = call.function.name.as_str();
        let outcome = match parse_arguments(&call.function.arguments) {
            Ok(args) => self.gateway.invoke(name, &args).await,
            Err(parse_err) => Err(match ToolId::parse(name) {
                Some(id) => GatewayError::InvalidArguments {
                    tool: id.name(),
                    reason: format!("arguments are not valid JSON: {parse_err}"),
                },
                None => GatewayError::UnknownTool {
                    name: name.to_string(),
                },
            }),
        };

        let payload = match outcome {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    tool = name,
                    error = %e,
                    "tool invocation failed"
                );
                serde_json::json!({"error": e.to_string()})
            }
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Parse a tool call's argument string. An empty string counts as the empty
/// object, which some models emit for zero-argument tools.
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw)
}

/// Append `name` if this is its first use, preserving first-use order.
fn record_tool_use(tools_used: &mut Vec<String>, name: &str) {
    if !tools_used.iter().any(|n| n == name) {
        tools_used.push(name.to_string());
    }
}

/// System prompt carrying the extracted hospital data.
fn context_system_prompt(bundle: &ContextBundle) -> String {
    let data = serde_json::to_string_pretty(bundle).unwrap_or_else(|_| String::from("{}"));
    format!(
        "You are an AI assistant for a Smart Hospital Management System.\n\n\
         Based on the user's question, here is the relevant hospital data:\n\n\
         {data}\n\n\
         Use this data to answer the user's question. Be professional and prioritize patient safety and privacy."
    )
}

// ============================================================================
// Tests
// ============================================================================
