//! Hospital AI agent service.
//!
//! An intermediary between a natural-language chat interface, a hospital
//! management REST API, and an LLM completion API. Per user message the
//! service decides which hospital data matters, routes it to the model
//! either as injected prompt context or as callable tool schemas, resolves
//! at most one round of model-requested tool calls, and returns the final
//! answer together with the updated conversation.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP surface with the chat endpoint, a per-category
//!   data passthrough, and a liveness probe
//! - **Orchestrator**: prompt assembly, model calls, and the single tool
//!   round-trip
//! - **Tool catalog + gateway**: a fixed set of hospital operations mapped
//!   onto REST calls
//! - **Relevance extraction**: keyword-routed eager data fetch for
//!   context-injection mode
//!
//! # Modules
//!
//! - [`config`]: server config and agent settings loading
//! - [`llm`]: chat-completions wire types and client
//! - [`tools`]: the advertised tool catalog
//! - [`hospital`]: gateway to the hospital REST API
//! - [`relevance`]: keyword tables and context bundles
//! - [`orchestrator`]: the conversation loop
//! - [`server`]: HTTP routes and state

pub mod config;
pub mod hospital;
pub mod llm;
pub mod orchestrator;
pub mod relevance;
pub mod server;
pub mod tools;
