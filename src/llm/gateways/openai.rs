//! OpenAI-compatible gateway for streamed chat completions.
//!
//! Works against any endpoint that speaks the OpenAI `chat/completions`
//! protocol with `stream: true`, including hosted generative-UI gateways.

use crate::error::{Result, StorefrontError};
use crate::llm::gateway::{ChunkStream, CompletionConfig, LlmGateway, StreamChunk};
use crate::llm::gateways::openai_messages_adapter::{adapt_messages_to_openai, parse_tool_arguments};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use futures::stream::StreamExt;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.thesys.dev/v1/embed";

/// Configuration for connecting to an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub connect_timeout: Option<Duration>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Gateway for an OpenAI-compatible LLM service.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new gateway with custom configuration.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.connect_timeout {
            client_builder = client_builder.connect_timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(OpenAIConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_body(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: Option<&[Box<dyn LlmTool>]>,
        config: &CompletionConfig,
    ) -> Result<Value> {
        let mut body = serde_json::json!({
            "model": model,
            "messages": adapt_messages_to_openai(messages)?,
            "stream": true
        });

        if let Some(temperature) = config.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            let tool_defs: Vec<_> = tools.iter().map(|t| t.descriptor()).collect();
            body["tools"] = serde_json::to_value(tool_defs)?;
        }

        Ok(body)
    }
}

impl LlmGateway for OpenAIGateway {
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        tools: Option<&'a [Box<dyn LlmTool>]>,
        config: &'a CompletionConfig,
    ) -> ChunkStream<'a> {
        Box::pin(async_stream::stream! {
            info!("Starting streaming completion");
            debug!("Model: {}, Message count: {}", model, messages.len());

            let body = match self.build_body(model, messages, tools, config) {
                Ok(body) => body,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let response = match self
                .client
                .post(self.completions_url())
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                yield Err(StorefrontError::GatewayError(format!(
                    "API error: {} - {}",
                    status, error_text
                )));
                return;
            }

            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            let mut tool_calls = ToolCallAccumulator::default();
            let mut done = false;

            'read: while let Some(chunk_result) = stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);

                // Process complete SSE lines
                while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=line_end).collect();
                    match parse_sse_line(&line, &mut tool_calls) {
                        Ok(SseLine::Done) => {
                            done = true;
                            break 'read;
                        }
                        Ok(SseLine::Chunks(chunks)) => {
                            for chunk in chunks {
                                yield Ok(chunk);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            // The final event may arrive without a trailing newline.
            if !done && !buffer.is_empty() {
                match parse_sse_line(&buffer, &mut tool_calls) {
                    Ok(SseLine::Done) => {}
                    Ok(SseLine::Chunks(chunks)) => {
                        for chunk in chunks {
                            yield Ok(chunk);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            let remaining = tool_calls.take();
            if !remaining.is_empty() {
                yield Ok(StreamChunk::ToolCalls(remaining));
            }
        })
    }
}

/// What one SSE line contributed to the stream
#[derive(Debug, PartialEq)]
enum SseLine {
    /// The `[DONE]` sentinel
    Done,
    /// Fragments to yield, possibly none
    Chunks(Vec<StreamChunk>),
}

/// Interpret a single SSE line, feeding tool-call fragments into `tool_calls`.
///
/// Lines that are not `data:` events, or whose payload is not JSON, yield
/// nothing. An `error` payload fails the stream.
fn parse_sse_line(line: &[u8], tool_calls: &mut ToolCallAccumulator) -> Result<SseLine> {
    let line = String::from_utf8_lossy(line);
    let Some(data) = line.trim().strip_prefix("data:").map(str::trim_start) else {
        return Ok(SseLine::Chunks(Vec::new()));
    };

    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let json = match serde_json::from_str::<Value>(data) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to parse streaming chunk: {}", e);
            return Ok(SseLine::Chunks(Vec::new()));
        }
    };

    if let Some(error) = json.get("error") {
        return Err(StorefrontError::GatewayError(format!("stream error: {}", error)));
    }

    let mut chunks = Vec::new();
    let Some(choice) = json["choices"].as_array().and_then(|c| c.first()) else {
        return Ok(SseLine::Chunks(chunks));
    };
    let delta = &choice["delta"];

    if let Some(content) = delta["content"].as_str() {
        chunks.push(StreamChunk::Content(content.to_string()));
    }

    if let Some(fragments) = delta["tool_calls"].as_array() {
        tool_calls.absorb(fragments);
    }

    if choice["finish_reason"].as_str() == Some("tool_calls") {
        let complete = tool_calls.take();
        if !complete.is_empty() {
            chunks.push(StreamChunk::ToolCalls(complete));
        }
    }

    Ok(SseLine::Chunks(chunks))
}

/// Collects tool-call fragments streamed across many chunks, keyed by index.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<u64, PartialToolCall>,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl ToolCallAccumulator {
    fn absorb(&mut self, fragments: &[Value]) {
        for fragment in fragments {
            let Some(index) = fragment["index"].as_u64() else {
                continue;
            };
            let partial = self.calls.entry(index).or_default();

            if let Some(id) = fragment["id"].as_str() {
                partial.id = Some(id.to_string());
            }
            if let Some(name) = fragment["function"]["name"].as_str() {
                partial.name = Some(name.to_string());
            }
            if let Some(args) = fragment["function"]["arguments"].as_str() {
                partial.arguments.push_str(args);
            }
        }
    }

    /// Drain the accumulated calls in index order, dropping any without a name.
    fn take(&mut self) -> Vec<LlmToolCall> {
        std::mem::take(&mut self.calls)
            .into_values()
            .filter_map(|partial| {
                let name = partial.name?;
                Some(LlmToolCall {
                    id: partial.id,
                    name,
                    arguments: parse_tool_arguments(&partial.arguments),
                })
            })
            .collect()
    }
}
