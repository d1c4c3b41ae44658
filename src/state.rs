//! UI-agnostic chat state types
//!
//! These structures are shared between the session core and whichever front
//! end renders it, and don't depend on any specific UI framework.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique token identifying a message for the life of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Empty reply that streaming fills in
    pub fn pending_reply() -> Self {
        Self {
            id: MessageId::new(),
            role: ChatRole::Assistant,
            content: String::new(),
        }
    }

    /// Copy of this message with `chunk` appended to its content.
    pub fn with_appended(&self, chunk: &str) -> Self {
        let mut content = String::with_capacity(self.content.len() + chunk.len());
        content.push_str(&self.content);
        content.push_str(chunk);
        Self {
            id: self.id.clone(),
            role: self.role,
            content,
        }
    }

    /// Copy of this message with its content swapped for `content`.
    pub fn with_content(&self, content: &str) -> Self {
        Self {
            id: self.id.clone(),
            role: self.role,
            content: content.to_string(),
        }
    }
}

/// Everything a front end needs to render one chat conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub input_value: String,
    pub is_loading: bool,
    pub is_fullscreen: bool,
}

impl SessionState {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True while the newest message is an empty reply still waiting on its
    /// first chunk.
    pub fn is_awaiting_first_chunk(&self) -> bool {
        self.is_loading
            && self
                .messages
                .last()
                .is_some_and(|m| m.role == ChatRole::Assistant && m.content.is_empty())
    }

    /// Replace the message `id` with a copy carrying `chunk` appended.
    ///
    /// Returns false when no message has that id.
    pub fn append_to(&mut self, id: &MessageId, chunk: &str) -> bool {
        match self.messages.iter().rposition(|m| &m.id == id) {
            Some(idx) => {
                self.messages[idx] = self.messages[idx].with_appended(chunk);
                true
            }
            None => false,
        }
    }

    /// Replace the message `id` with a copy whose content is `content`.
    pub fn replace_content(&mut self, id: &MessageId, content: &str) -> bool {
        match self.messages.iter().rposition(|m| &m.id == id) {
            Some(idx) => {
                self.messages[idx] = self.messages[idx].with_content(content);
                true
            }
            None => false,
        }
    }
}
