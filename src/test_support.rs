//! Scripted gateway shared by the broker and route tests.

use crate::error::Result;
use crate::llm::gateway::{ChunkStream, CompletionConfig, LlmGateway, StreamChunk};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use futures::stream;
use serde_json::Value;
use std::sync::Mutex;

/// Replays one scripted round per `complete_stream` call and records the
/// transcript each call received.
pub struct ScriptedGateway {
    rounds: Mutex<Vec<Vec<Result<StreamChunk>>>>,
    seen: Mutex<Vec<Vec<LlmMessage>>>,
}

impl ScriptedGateway {
    pub fn new(rounds: Vec<Vec<Result<StreamChunk>>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into_iter().rev().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Transcripts received so far, one per completion
    pub fn seen(&self) -> Vec<Vec<LlmMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

impl LlmGateway for ScriptedGateway {
    fn complete_stream<'a>(
        &'a self,
        _model: &'a str,
        messages: &'a [LlmMessage],
        _tools: Option<&'a [Box<dyn LlmTool>]>,
        _config: &'a CompletionConfig,
    ) -> ChunkStream<'a> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let round = self.rounds.lock().unwrap().pop().unwrap_or_default();
        Box::pin(stream::iter(round))
    }
}

pub fn content(text: &str) -> Result<StreamChunk> {
    Ok(StreamChunk::Content(text.to_string()))
}

pub fn tool_calls(calls: Vec<LlmToolCall>) -> Result<StreamChunk> {
    Ok(StreamChunk::ToolCalls(calls))
}

pub fn call(id: &str, name: &str, arguments: Value) -> LlmToolCall {
    LlmToolCall {
        id: Some(id.to_string()),
        name: name.to_string(),
        arguments,
    }
}
