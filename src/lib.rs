//! Streaming storefront chat service.
//!
//! A chat endpoint relays model output to the caller as it arrives, keeps a
//! per-thread transcript, and lets the model call inventory and order tools
//! backed by in-memory stores.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod relay;
pub mod server;
pub mod store;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use error::{Result, StorefrontError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::conversation::{ConversationStore, MessageThread, RetentionPolicy};
    pub use crate::error::{Result, StorefrontError};
    pub use crate::llm::gateways::OpenAIGateway;
    pub use crate::llm::tools::{FunctionDescriptor, LlmTool, ToolDescriptor};
    pub use crate::llm::{CompletionConfig, LlmBroker, LlmGateway, LlmMessage, MessageRole};
    pub use crate::server::{build_router, AppState};
}
