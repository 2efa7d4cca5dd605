//! Error types and result aliases for the storefront chat service.
//!
//! [`StorefrontError`] covers everything that aborts a turn: gateway faults,
//! transport failures, bad configuration and stalled streams. Malformed tool
//! arguments are *not* represented here; they are reported back
//! to the model as structured tool output (see [`crate::validation`]).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
