//! Service configuration, read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present.

use crate::conversation::RetentionPolicy;
use crate::error::{Result, StorefrontError};
use crate::llm::broker::DEFAULT_MAX_TOOL_ROUNDS;
use crate::llm::gateway::CompletionConfig;
use crate::llm::gateways::openai::{OpenAIConfig, DEFAULT_BASE_URL};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "c1-nightly";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway: OpenAIConfig,
    pub completion: CompletionConfig,
    pub model: String,
    pub listen_addr: SocketAddr,
    pub stream_idle_timeout: Duration,
    pub retention: RetentionPolicy,
    pub max_tool_rounds: usize,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("THESYS_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| StorefrontError::ConfigError("THESYS_API_KEY is not set".to_string()))?;

        let base_url = lookup("GATEWAY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = lookup("GATEWAY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let listen_addr: SocketAddr = parse_or(&lookup, "LISTEN_ADDR", DEFAULT_LISTEN_ADDR.parse().ok())?;
        let idle_secs: u64 = parse_or(&lookup, "STREAM_IDLE_TIMEOUT_SECS", Some(60))?;
        let max_threads: usize = parse_or(&lookup, "MAX_THREADS", Some(1024))?;
        let ttl_secs: u64 = parse_or(&lookup, "THREAD_TTL_SECS", Some(3600))?;
        let max_tool_rounds: usize =
            parse_or(&lookup, "MAX_TOOL_ROUNDS", Some(DEFAULT_MAX_TOOL_ROUNDS))?;

        let connect_secs: u64 = parse_or(&lookup, "GATEWAY_CONNECT_TIMEOUT_SECS", Some(10))?;
        let temperature: Option<f32> = parse_optional(&lookup, "GATEWAY_TEMPERATURE")?;
        let max_tokens: Option<usize> = parse_optional(&lookup, "GATEWAY_MAX_TOKENS")?;

        if max_threads == 0 {
            return Err(StorefrontError::ConfigError("MAX_THREADS must be at least 1".to_string()));
        }

        Ok(Self {
            gateway: OpenAIConfig {
                api_key,
                base_url,
                connect_timeout: Some(Duration::from_secs(connect_secs)),
            },
            completion: CompletionConfig {
                temperature,
                max_tokens,
            },
            model,
            listen_addr,
            stream_idle_timeout: Duration::from_secs(idle_secs),
            retention: RetentionPolicy {
                max_threads,
                thread_ttl: Duration::from_secs(ttl_secs),
            },
            max_tool_rounds,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: Option<T>) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| StorefrontError::ConfigError(format!("{}={:?}: {}", key, raw, e))),
        None => default
            .ok_or_else(|| StorefrontError::ConfigError(format!("{} has no default", key))),
    }
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map(|_| parse_or(lookup, key, None)).transpose()
}
