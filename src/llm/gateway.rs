use crate::error::Result;
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use futures::stream::Stream;
use std::pin::Pin;

/// Configuration for LLM completion
///
/// Unset fields are left out of the request so the gateway applies its own
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct CompletionConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

/// One incremental fragment of a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// A text delta, forwarded in arrival order
    Content(String),
    /// Fully assembled tool calls requested by the model
    ToolCalls(Vec<LlmToolCall>),
}

impl StreamChunk {
    /// The textual delta carried by this fragment, if any
    pub fn delta(&self) -> Option<&str> {
        match self {
            StreamChunk::Content(text) => Some(text),
            StreamChunk::ToolCalls(_) => None,
        }
    }
}

pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + 'a>>;

/// Abstract interface for LLM providers
pub trait LlmGateway: Send + Sync {
    /// Stream a chat completion for `messages`, declaring `tools` to the model
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        tools: Option<&'a [Box<dyn LlmTool>]>,
        config: &'a CompletionConfig,
    ) -> ChunkStream<'a>;
}
