//! HTTP surface: the chat endpoint and a liveness probe.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::conversation::{ConversationStore, SYSTEM_PROMPT};
use crate::error::Result;
use crate::llm::gateways::OpenAIGateway;
use crate::llm::tools::storefront::all_tools;
use crate::llm::tools::LlmTool;
use crate::llm::{LlmBroker, LlmMessage, MessageRole};
use crate::relay::relay_stream;
use crate::store::{Inventory, OrderBook};

#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<LlmBroker>,
    pub conversations: Arc<ConversationStore>,
    pub tools: Arc<[Box<dyn LlmTool>]>,
    pub stream_idle_timeout: Duration,
}

impl AppState {
    pub fn new(
        broker: LlmBroker,
        conversations: ConversationStore,
        tools: Vec<Box<dyn LlmTool>>,
        stream_idle_timeout: Duration,
    ) -> Self {
        Self {
            broker: Arc::new(broker),
            conversations: Arc::new(conversations),
            tools: Arc::from(tools),
            stream_idle_timeout,
        }
    }

    /// Wire the gateway, broker, stores and tool table from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let gateway = OpenAIGateway::with_config(config.gateway.clone())?;
        let broker = LlmBroker::new(config.model.clone(), Arc::new(gateway))
            .with_max_tool_rounds(config.max_tool_rounds)
            .with_completion_config(config.completion.clone());
        let tools = all_tools(Arc::new(Inventory::seeded()), Arc::new(OrderBook::new()));

        Ok(Self::new(
            broker,
            ConversationStore::new(config.retention),
            tools,
            config.stream_idle_timeout,
        ))
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub prompt: LlmMessage,
    pub thread_id: String,
    pub response_id: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn chat_handler(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let ChatRequest {
        prompt,
        thread_id,
        response_id,
    } = request;
    info!(thread_id = %thread_id, response_id = %response_id, "Chat turn received");

    if prompt.role == MessageRole::Tool {
        warn!(thread_id = %thread_id, "Rejected prompt with tool role");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            "prompt role must be system, user or assistant",
        )
            .into_response();
    }

    let thread = state.conversations.get(&thread_id);
    let mut guard = thread.lock_owned().await;
    if guard.seed(SYSTEM_PROMPT) {
        debug!(thread_id = %thread_id, "Seeded new thread");
    }
    guard.add_message(prompt);
    let transcript = guard.openai_compatible_messages();

    let upstream = state
        .broker
        .generate_stream(transcript, Arc::clone(&state.tools), None);

    // The thread stays locked until the relay commits or is dropped.
    let relay = relay_stream(upstream, state.stream_idle_timeout, move |text| {
        guard.add_message(LlmMessage::assistant(text).with_id(response_id));
    });

    let mut response = Body::from_stream(relay).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-transform"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}
