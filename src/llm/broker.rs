use crate::error::{Result, StorefrontError};
use crate::llm::gateway::{ChunkStream, CompletionConfig, LlmGateway, StreamChunk};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use futures::stream::StreamExt;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on completions per turn, counting each tool round-trip.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;

/// Main interface for LLM interactions
///
/// The broker owns the tool loop: it streams a completion, and whenever the
/// model asks for tools it runs them, appends their results to the transcript
/// and streams the follow-up completion. Which tools run, and when, is decided
/// by the model alone.
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    max_tool_rounds: usize,
    completion: CompletionConfig,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            completion: CompletionConfig::default(),
        }
    }

    /// Completion settings used when a call does not supply its own
    pub fn with_completion_config(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    /// Limit the number of completions a single turn may issue
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate streaming response from LLM
    ///
    /// Yields every fragment the gateway produces, across all tool rounds, in
    /// arrival order. Content fragments carry text; tool-call fragments are
    /// passed through after the broker has recorded them. The first error
    /// ends the stream.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::stream::StreamExt;
    ///
    /// let broker = LlmBroker::new("c1-nightly", gateway);
    /// let mut stream = broker.generate_stream(vec![LlmMessage::user("show gloves")], tools, None);
    /// while let Some(chunk) = stream.next().await {
    ///     if let Some(text) = chunk?.delta() {
    ///         print!("{}", text);
    ///     }
    /// }
    /// ```
    pub fn generate_stream(
        &self,
        messages: Vec<LlmMessage>,
        tools: Arc<[Box<dyn LlmTool>]>,
        config: Option<CompletionConfig>,
    ) -> ChunkStream<'static> {
        let config = config.unwrap_or_else(|| self.completion.clone());
        let gateway = Arc::clone(&self.gateway);
        let model = self.model.clone();
        let max_rounds = self.max_tool_rounds;

        Box::pin(async_stream::stream! {
            let mut messages = messages;

            for round in 0..max_rounds {
                debug!(round, message_count = messages.len(), "Streaming completion round");
                let mut content = String::new();
                let mut requested: Vec<LlmToolCall> = Vec::new();

                {
                    let mut stream = gateway.complete_stream(&model, &messages, Some(&tools[..]), &config);

                    while let Some(chunk_result) = stream.next().await {
                        match chunk_result {
                            Ok(StreamChunk::Content(text)) => {
                                content.push_str(&text);
                                yield Ok(StreamChunk::Content(text));
                            }
                            Ok(StreamChunk::ToolCalls(calls)) => {
                                requested.extend(calls.iter().cloned());
                                yield Ok(StreamChunk::ToolCalls(calls));
                            }
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                }

                if requested.is_empty() {
                    return;
                }

                info!("Tool calls requested: {}", requested.len());
                let content = if content.is_empty() { None } else { Some(content) };
                messages.push(LlmMessage::assistant_tool_calls(content, requested.clone()));

                for tool_call in &requested {
                    match run_tool(&tools, tool_call) {
                        Ok(output) => {
                            messages.push(LlmMessage::tool_result(tool_call.id.clone(), output));
                        }
                        Err(e) => {
                            warn!("Tool execution failed: {}", e);
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            yield Err(StorefrontError::GatewayError(format!(
                "model kept requesting tools after {} completions",
                max_rounds
            )));
        })
    }
}

/// Run the tool named by `tool_call`, returning its serialised output
///
/// Unknown tool names are answered with a structured failure so the model can
/// recover.
fn run_tool(tools: &[Box<dyn LlmTool>], tool_call: &LlmToolCall) -> Result<String> {
    let output = match tools.iter().find(|t| t.matches(&tool_call.name)) {
        Some(tool) => {
            info!("Executing tool: {}", tool_call.name);
            tool.run(&tool_call.arguments)?
        }
        None => {
            warn!("Tool not found: {}", tool_call.name);
            json!({ "success": false, "error": format!("unknown tool: {}", tool_call.name) })
        }
    };
    Ok(serde_json::to_string(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::MessageRole;
    use crate::llm::tools::ToolDescriptor;
    use crate::test_support::{call, content, tool_calls, ScriptedGateway};
    use serde_json::Value;

    #[derive(serde::Deserialize, schemars::JsonSchema)]
    struct EchoArgs {}

    struct EchoTool;

    impl LlmTool for EchoTool {
        fn run(&self, args: &Value) -> Result<Value> {
            Ok(json!({ "success": true, "echo": args }))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::function::<EchoArgs>("echo", "Echo arguments")
        }
    }

    struct FailingTool;

    impl LlmTool for FailingTool {
        fn run(&self, _args: &Value) -> Result<Value> {
            Err(StorefrontError::ToolError("store unavailable".to_string()))
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::function::<EchoArgs>("echo", "Always fails")
        }
    }

    fn echo_tools() -> Arc<[Box<dyn LlmTool>]> {
        Arc::from(vec![Box::new(EchoTool) as Box<dyn LlmTool>])
    }

    async fn drain(stream: ChunkStream<'static>) -> Vec<Result<StreamChunk>> {
        stream.collect().await
    }

    #[test]
    fn test_broker_new() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let broker = LlmBroker::new("c1-nightly", gateway);
        assert_eq!(broker.model(), "c1-nightly");
        assert_eq!(broker.max_tool_rounds, DEFAULT_MAX_TOOL_ROUNDS);
    }

    #[test]
    fn test_with_completion_config() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let broker = LlmBroker::new("c1-nightly", gateway).with_completion_config(CompletionConfig {
            temperature: Some(0.3),
            max_tokens: Some(512),
        });

        assert_eq!(broker.completion.temperature, Some(0.3));
        assert_eq!(broker.completion.max_tokens, Some(512));
    }

    #[tokio::test]
    async fn test_generate_stream_without_tool_calls() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![content("Hello"), content(" World")]]));
        let broker = LlmBroker::new("test-model", gateway.clone());

        let chunks = drain(broker.generate_stream(vec![LlmMessage::user("Hi")], echo_tools(), None)).await;

        let text: String = chunks.iter().filter_map(|c| c.as_ref().unwrap().delta()).collect();
        assert_eq!(text, "Hello World");
        assert_eq!(gateway.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_stream_runs_tools_and_continues() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            vec![content("Checking"), tool_calls(vec![call("call_1", "echo", json!({"x": 1}))])],
            vec![content("Done")],
        ]));
        let broker = LlmBroker::new("test-model", gateway.clone());

        let chunks = drain(broker.generate_stream(vec![LlmMessage::user("Hi")], echo_tools(), None)).await;

        assert_eq!(chunks.len(), 3);
        assert!(matches!(chunks[1], Ok(StreamChunk::ToolCalls(_))));

        let seen = gateway.seen();
        assert_eq!(seen.len(), 2);
        let second = &seen[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, MessageRole::Assistant);
        assert_eq!(second[1].content.as_deref(), Some("Checking"));
        assert_eq!(second[1].tool_calls.as_ref().unwrap()[0].name, "echo");
        assert_eq!(second[2].role, MessageRole::Tool);
        assert_eq!(second[2].tool_call_id.as_deref(), Some("call_1"));
        let output: Value = serde_json::from_str(second[2].content.as_deref().unwrap()).unwrap();
        assert_eq!(output["echo"], json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            vec![tool_calls(vec![call("call_1", "deleteOrders", json!({}))])],
            vec![content("Sorry")],
        ]));
        let broker = LlmBroker::new("test-model", gateway.clone());

        let chunks = drain(broker.generate_stream(vec![LlmMessage::user("Hi")], echo_tools(), None)).await;

        assert!(chunks.iter().all(|c| c.is_ok()));
        let seen = gateway.seen();
        let tool_msg = seen[1].last().unwrap();
        assert!(tool_msg.content.as_deref().unwrap().contains("unknown tool: deleteOrders"));
    }

    #[tokio::test]
    async fn test_tool_error_ends_stream() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![tool_calls(vec![call(
            "call_1",
            "echo",
            json!({}),
        )])]]));
        let broker = LlmBroker::new("test-model", gateway.clone());
        let tools: Arc<[Box<dyn LlmTool>]> = Arc::from(vec![Box::new(FailingTool) as Box<dyn LlmTool>]);

        let chunks = drain(broker.generate_stream(vec![LlmMessage::user("Hi")], tools, None)).await;

        assert!(matches!(chunks.last(), Some(Err(StorefrontError::ToolError(_)))));
        assert_eq!(gateway.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_gateway_error_ends_stream() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![
            content("par"),
            Err(StorefrontError::GatewayError("reset".to_string())),
            content("never"),
        ]]));
        let broker = LlmBroker::new("test-model", gateway);

        let chunks = drain(broker.generate_stream(vec![LlmMessage::user("Hi")], echo_tools(), None)).await;

        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].is_err());
    }

    #[tokio::test]
    async fn test_round_limit() {
        let looping = || vec![tool_calls(vec![call("c", "echo", json!({}))])];
        let gateway = Arc::new(ScriptedGateway::new(vec![looping(), looping(), looping()]));
        let broker = LlmBroker::new("test-model", gateway.clone()).with_max_tool_rounds(2);

        let chunks = drain(broker.generate_stream(vec![LlmMessage::user("Hi")], echo_tools(), None)).await;

        assert!(matches!(chunks.last(), Some(Err(StorefrontError::GatewayError(_)))));
        assert_eq!(gateway.seen().len(), 2);
    }
}
