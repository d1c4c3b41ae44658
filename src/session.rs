//! One chat conversation and its single in-flight reply stream.
//!
//! State lives behind a `watch` channel: every mutation is one published
//! update, applied in order, and front ends redraw off their receiver. Writes
//! that come from a reply stream go through [`Shared::mutate`], which drops
//! them once the session has been torn down.

use futures_util::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::analytics::Analytics;
use crate::decoder::Utf8Decoder;
use crate::error::ChatError;
use crate::state::{Message, MessageId, SessionState};
use crate::transport::ChatTransport;

pub const ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

pub const EXAMPLE_QUESTIONS: [&str; 3] = [
    "What are Cory's technical skills?",
    "Tell me about Cory's experience at J&J",
    "What are Cory's leadership values and approach?",
];

pub const HEADER_TITLE: &str = "Ask me about Cory's skills and experience";
pub const HEADER_SUBTITLE: &str =
    "I'm an AI assistant that can help you learn about Cory's technical abilities and work history.";
pub const WELCOME_MESSAGE: &str =
    "Welcome! Ask me anything about Cory's technical skills, work experience, or projects.";

const ANALYTICS_CATEGORY: &str = "Chatbot";

struct Shared {
    state: watch::Sender<SessionState>,
    alive: AtomicBool,
}

impl Shared {
    /// Apply `f` unless the session is gone. The liveness check happens under
    /// the state lock, so it cannot race with teardown.
    fn mutate(&self, f: impl FnOnce(&mut SessionState)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.alive.load(Ordering::Acquire) {
                return false;
            }
            f(state);
            true
        })
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

/// Clears `is_loading` when the stream task ends, however it ends.
struct LoadingGuard {
    shared: Arc<Shared>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.shared.mutate(|state| state.is_loading = false);
    }
}

pub struct ChatSession {
    shared: Arc<Shared>,
    transport: Arc<dyn ChatTransport>,
    analytics: Analytics,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>, analytics: Analytics) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            shared: Arc::new(Shared {
                state,
                alive: AtomicBool::new(true),
            }),
            transport,
            analytics,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    pub fn is_alive(&self) -> bool {
        self.shared.is_alive()
    }

    pub fn set_input(&self, value: &str) {
        self.shared.mutate(|state| {
            state.input_value.clear();
            state.input_value.push_str(value);
        });
    }

    /// Submit whatever is currently in the input box.
    pub fn submit_input(&self) -> bool {
        let input = self.shared.state.borrow().input_value.clone();
        self.submit(&input)
    }

    /// Send `text` as the next user message and start streaming the reply.
    ///
    /// Returns false, changing nothing, when the trimmed text is empty or a
    /// reply is already streaming. Must be called inside a tokio runtime.
    pub fn submit(&self, text: &str) -> bool {
        let message = text.trim();
        if message.is_empty() || !self.is_alive() {
            return false;
        }

        let reply = Message::pending_reply();
        let reply_id = reply.id.clone();
        let accepted = self.shared.state.send_if_modified(|state| {
            if state.is_loading || !self.shared.is_alive() {
                return false;
            }
            state.messages.push(Message::user(message));
            state.messages.push(reply);
            state.is_loading = true;
            state.input_value.clear();
            true
        });
        if !accepted {
            return false;
        }

        self.analytics
            .track_event(ANALYTICS_CATEGORY, "Message Sent", Some("User Query"), None);

        tracing::debug!(reply = %reply_id, "submitting chat message");
        let shared = Arc::clone(&self.shared);
        let transport = Arc::clone(&self.transport);
        let message = message.to_string();
        tokio::spawn(async move {
            stream_reply(shared, transport, reply_id, message).await;
        });

        true
    }

    /// Preset prompt: fill the input with `question`, then submit it.
    pub fn submit_example(&self, question: &str) -> bool {
        self.analytics.track_event(
            ANALYTICS_CATEGORY,
            "Example Question Click",
            Some(question),
            None,
        );
        self.set_input(question);
        self.submit(question)
    }

    /// Flip fullscreen mode and return the new value.
    pub fn toggle_fullscreen(&self) -> bool {
        self.shared.mutate(|state| state.is_fullscreen = !state.is_fullscreen);
        let fullscreen = self.shared.state.borrow().is_fullscreen;
        self.analytics.track_event(
            ANALYTICS_CATEGORY,
            "Toggle Fullscreen",
            Some(if fullscreen { "Enter" } else { "Exit" }),
            None,
        );
        fullscreen
    }

    /// End the session. Any reply still streaming stops writing to the state.
    pub fn teardown(&self) {
        self.shared.state.send_if_modified(|_| {
            self.shared.alive.store(false, Ordering::Release);
            false
        });
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn stream_reply(
    shared: Arc<Shared>,
    transport: Arc<dyn ChatTransport>,
    reply_id: MessageId,
    message: String,
) {
    let _loading = LoadingGuard {
        shared: Arc::clone(&shared),
    };

    match pump_reply(&shared, transport.as_ref(), &reply_id, &message).await {
        Ok(()) => tracing::debug!(reply = %reply_id, "chat reply finished"),
        Err(e) => {
            tracing::warn!(reply = %reply_id, error = %e, "chat reply failed");
            shared.mutate(|state| {
                state.replace_content(&reply_id, ERROR_MESSAGE);
            });
        }
    }
}

async fn pump_reply(
    shared: &Shared,
    transport: &dyn ChatTransport,
    reply_id: &MessageId,
    message: &str,
) -> Result<(), ChatError> {
    let mut chunks = transport.open(message).await?;
    let mut decoder = Utf8Decoder::new();

    while let Some(chunk) = chunks.next().await {
        let text = decoder.decode(&chunk?)?;
        if text.is_empty() {
            continue;
        }
        if !shared.mutate(|state| {
            state.append_to(reply_id, &text);
        }) {
            tracing::debug!(reply = %reply_id, "session torn down; abandoning reply stream");
            return Ok(());
        }
    }

    if decoder.pending_len() > 0 {
        tracing::warn!(
            reply = %reply_id,
            bytes = decoder.pending_len(),
            "reply ended mid-character; dropping incomplete bytes"
        );
    }

    Ok(())
}
