//! Streaming relay between the model gateway and the caller.
//!
//! The relay forwards each text delta as soon as it arrives and, once the
//! upstream stream ends cleanly, hands the concatenated reply to a commit
//! callback. An upstream error or an idle timeout fails the turn: the error is
//! yielded, the output ends, and nothing is committed.

use crate::error::{Result, StorefrontError};
use crate::llm::gateway::StreamChunk;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    AwaitingChunk,
    Emitting,
    Complete,
    Failed,
}

/// Bookkeeping for one relayed turn
#[derive(Debug)]
pub struct Relay {
    state: RelayState,
    deltas: Vec<String>,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            state: RelayState::AwaitingChunk,
            deltas: Vec::new(),
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Record a fragment, returning the delta to forward if it carries one
    pub fn accept(&mut self, chunk: &StreamChunk) -> Option<String> {
        match chunk.delta() {
            Some(delta) => {
                self.state = RelayState::Emitting;
                self.deltas.push(delta.to_string());
                Some(delta.to_string())
            }
            None => {
                self.state = RelayState::AwaitingChunk;
                None
            }
        }
    }

    /// Mark the last forwarded delta as delivered
    pub fn forwarded(&mut self) {
        self.state = RelayState::AwaitingChunk;
    }

    /// Every delta accepted so far, in order
    pub fn deltas(&self) -> &[String] {
        &self.deltas
    }

    /// Upstream ended cleanly; the full reply with empty deltas skipped
    pub fn complete(&mut self) -> String {
        self.state = RelayState::Complete;
        self.deltas.iter().filter(|d| !d.is_empty()).map(String::as_str).collect()
    }

    pub fn fail(&mut self) {
        self.state = RelayState::Failed;
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Relay `upstream` to the caller, committing the reply through `commit`
///
/// `commit` runs exactly once, after upstream exhaustion, and never on
/// failure. Each wait for the next fragment is bounded by `idle_timeout`.
pub fn relay_stream<S, F>(upstream: S, idle_timeout: Duration, commit: F) -> TextStream
where
    S: Stream<Item = Result<StreamChunk>> + Send + 'static,
    F: FnOnce(String) + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        let mut relay = Relay::new();

        loop {
            match tokio::time::timeout(idle_timeout, upstream.next()).await {
                Ok(Some(Ok(chunk))) => {
                    if let Some(delta) = relay.accept(&chunk) {
                        yield Ok(delta);
                        relay.forwarded();
                    }
                }
                Ok(Some(Err(e))) => {
                    relay.fail();
                    error!(error = %e, "Upstream failed mid-stream; reply not committed");
                    yield Err(e);
                    return;
                }
                Ok(None) => break,
                Err(_) => {
                    relay.fail();
                    error!(?idle_timeout, "Upstream idle; reply not committed");
                    yield Err(StorefrontError::TimeoutError(format!(
                        "no response fragment within {:?}",
                        idle_timeout
                    )));
                    return;
                }
            }
        }

        debug!(deltas = relay.deltas().len(), "Upstream exhausted");
        let text = relay.complete();
        info!(length = text.len(), "Committing assistant reply");
        commit(text);
    })
}
