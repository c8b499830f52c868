//! Command-line and environment configuration

use crate::client::DEFAULT_RETRY_DELAY;
use crate::llm::{UpstreamRetryConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use std::time::Duration;

/// Praise chat - compliment chatbot server and terminal client
#[derive(Parser, Debug)]
#[command(name = "praise-chat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server exposing `POST /api/chat`
    Serve(ServeArgs),
    /// Send one message to a running server and print the reply
    Ask(AskArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PRAISE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Environment variable holding the Gemini API key (read per request)
    #[arg(long, default_value = "GEMINI_API_KEY", value_name = "VAR")]
    pub api_key_env: String,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Backoff unit for upstream retries, in milliseconds
    #[arg(long, env = "PRAISE_RETRY_BASE_MS", default_value_t = 1000)]
    pub retry_base_ms: u64,

    /// Upstream attempts per chat message, including the first
    #[arg(long, env = "PRAISE_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,
}

impl ServeArgs {
    pub fn retry_config(&self) -> UpstreamRetryConfig {
        UpstreamRetryConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_ms),
        }
    }

    pub fn api_key_source(&self) -> ApiKeySource {
        ApiKeySource::Env(self.api_key_env.clone())
    }
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Message to send (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,

    /// Server root URL
    #[arg(long, env = "PRAISE_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Wait before a manual retry, in milliseconds
    #[arg(long, default_value_t = default_retry_delay_ms())]
    pub retry_delay_ms: u64,

    /// Take the manual retry once if the fallback offers it
    #[arg(long)]
    pub retry: bool,
}

impl AskArgs {
    pub fn message(&self) -> String {
        self.message.join(" ")
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_retry_delay_ms() -> u64 {
    u64::try_from(DEFAULT_RETRY_DELAY.as_millis()).unwrap_or(2000)
}

/// Where the upstream API key comes from
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// Process environment variable, read every time it is resolved
    Env(String),
    #[cfg(test)]
    Fixed(Option<String>),
}

impl ApiKeySource {
    /// Current key, or `None` when unset or blank
    pub fn resolve(&self) -> Option<SecretString> {
        let key = match self {
            ApiKeySource::Env(var) => std::env::var(var).ok(),
            #[cfg(test)]
            ApiKeySource::Fixed(key) => key.clone(),
        };
        key.filter(|k| !k.trim().is_empty()).map(SecretString::from)
    }
}
