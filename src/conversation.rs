//! Per-thread conversation transcripts.
//!
//! Each thread is an append-only message log behind an async mutex. A request
//! holds that mutex for its whole turn, so two requests on the same thread
//! run one after the other and their messages never interleave.
//!
//! Retention is bounded: threads idle for longer than the configured TTL are
//! dropped, and once `max_threads` is reached the least recently used idle
//! thread is evicted. Threads in use by a turn are never evicted.

use crate::llm::models::LlmMessage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Instruction seeded into every new thread
pub const SYSTEM_PROMPT: &str = "
You are a helpful assistant who can help with placing orders and checking inventory.

<ui_rules>
- When showing inventory, use the list component to show the inventory along with its image.
  Always add the imageSrc to the list component.
</ui_rules>
";

/// Ordered message log for one conversation
#[derive(Debug, Clone, Default)]
pub struct MessageThread {
    messages: Vec<LlmMessage>,
}

impl MessageThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` unconditionally
    pub fn add_message(&mut self, message: LlmMessage) {
        self.messages.push(message);
    }

    /// Append the system instruction if nothing has been said yet
    ///
    /// Returns whether the thread was seeded.
    pub fn seed(&mut self, system_prompt: &str) -> bool {
        if !self.messages.is_empty() {
            return false;
        }
        self.add_message(LlmMessage::system(system_prompt));
        true
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    /// The full transcript in the shape handed to the gateway
    pub fn openai_compatible_messages(&self) -> Vec<LlmMessage> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub type SharedThread = Arc<tokio::sync::Mutex<MessageThread>>;

/// Retention limits for the conversation store
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub max_threads: usize,
    pub thread_ttl: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_threads: 1024,
            thread_ttl: Duration::from_secs(3600),
        }
    }
}

struct Entry {
    thread: SharedThread,
    last_used: Instant,
}

impl Entry {
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.thread) > 1
    }
}

/// Thread-id keyed store of conversation transcripts
pub struct ConversationStore {
    threads: Mutex<HashMap<String, Entry>>,
    policy: RetentionPolicy,
}

impl ConversationStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
            policy,
        }
    }

    /// The thread for `thread_id`, created empty on first reference
    pub fn get(&self, thread_id: &str) -> SharedThread {
        let now = Instant::now();
        let mut threads = self.threads.lock();

        let ttl = self.policy.thread_ttl;
        threads.retain(|id, entry| {
            let keep = entry.in_use() || now.duration_since(entry.last_used) <= ttl;
            if !keep {
                debug!(thread_id = %id, "Dropping expired thread");
            }
            keep
        });

        if let Some(entry) = threads.get_mut(thread_id) {
            entry.last_used = now;
            return Arc::clone(&entry.thread);
        }

        while threads.len() >= self.policy.max_threads {
            let oldest = threads
                .iter()
                .filter(|(_, entry)| !entry.in_use())
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    debug!(thread_id = %id, "Evicting least recently used thread");
                    threads.remove(&id);
                }
                None => break,
            }
        }

        let thread = SharedThread::default();
        threads.insert(
            thread_id.to_string(),
            Entry {
                thread: Arc::clone(&thread),
                last_used: now,
            },
        );
        thread
    }

    /// Number of threads currently retained
    pub fn len(&self) -> usize {
        self.threads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.lock().is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}
