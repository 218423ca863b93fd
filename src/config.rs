//! Configuration loading.
//!
//! Two layers, loaded separately at startup:
//!
//! - [`AppConfig`]: the HTTP server surface. Defaults, then an optional
//!   config file, then `HOSPITAL_AGENT_`-prefixed environment variables,
//!   then CLI flags (which also read `PORT`/`HOST`).
//! - [`AgentSettings`]: upstream endpoints, credential, model, and
//!   operating mode, read from plain environment variables. The credential
//!   has no default on purpose: without it the process refuses to start.

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::orchestrator::PromptMode;

/// Hospital API used when `HOSPITAL_BASE_URL` is not set.
pub const DEFAULT_HOSPITAL_BASE_URL: &str = "https://dt-agent-api.onrender.com/";

/// LLM API base used when `LLM_BASE_URL` is not set. The client appends
/// `/v1/chat/completions`.
pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api";

/// Model used when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "tngtech/deepseek-r1t2-chimera:free";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Host to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,
}

/// Server-surface configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    /// Load configuration from process args, environment, and files.
    ///
    /// # Errors
    ///
    /// Returns an error when a source cannot be read or a value fails to
    /// deserialize.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(env::args())
    }

    /// Load configuration with explicit args (used by tests).
    ///
    /// Priority: CLI flag > CLI env var > prefixed env > config file >
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a source cannot be read or a value fails to
    /// deserialize.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?;

        // Optional config file: an explicit path must exist, the cwd
        // fallback may be absent.
        builder = if let Some(path) = &cli.config {
            builder.add_source(File::with_name(path))
        } else {
            builder.add_source(File::with_name("config").required(false))
        };

        builder = builder.add_source(
            Environment::with_prefix("HOSPITAL_AGENT")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.clone())?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

/// Startup configuration failures. All of them are fatal: the process
/// reports the problem and exits non-zero rather than running half-wired.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The LLM credential is absent. There is no fallback value.
    #[error("Missing required env var: OPENROUTER_API_KEY")]
    MissingCredential,
    /// An environment variable held an unusable value.
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Upstream endpoints, credential, model, and operating mode.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Hospital REST API base URL.
    pub hospital_base_url: String,
    /// Chat-completions API base URL.
    pub llm_base_url: String,
    /// Bearer credential for the LLM API.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// How hospital data reaches the model.
    pub mode: PromptMode,
}

impl AgentSettings {
    /// Read settings from the environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingCredential`] when `OPENROUTER_API_KEY` is
    /// unset or blank; [`ConfigError::Invalid`] when `AGENT_MODE` is not a
    /// recognized mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingCredential)?;

        let mode = match env::var("AGENT_MODE") {
            Ok(raw) if !raw.trim().is_empty() => {
                raw.trim()
                    .parse()
                    .map_err(|reason| ConfigError::Invalid {
                        name: "AGENT_MODE",
                        reason,
                    })?
            }
            _ => PromptMode::default(),
        };

        Ok(Self {
            hospital_base_url: env_or("HOSPITAL_BASE_URL", DEFAULT_HOSPITAL_BASE_URL),
            llm_base_url: env_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            api_key,
            model: env_or("LLM_MODEL", DEFAULT_MODEL),
            mode,
        })
    }
}

/// An env var's value, or `default` when unset or blank.
fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
