//! Append-only message log
//!
//! The log is the single record of what has been said in a session. Renderers
//! paint from it, and the conversation transcript and the follow-up question
//! count are computed from it on demand, so neither can go stale.
//!
//! Messages are only ever appended. The one exception is the thinking
//! placeholder: it may be replaced with plain text or removed through the
//! [`MessageId`] handle returned when it was pushed.

use super::types::{Message, MessageId, MessageKind, Sender, MAX_QUESTIONS};
use crate::markup;

/// Append-only log of rendered messages
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
    next_id: u64,
    /// User message that opened the therapy phase, once known
    therapy_start: Option<MessageId>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return its handle
    pub fn push(&mut self, sender: Sender, kind: MessageKind, content: impl Into<String>) -> MessageId {
        self.append(sender, kind, content.into(), false)
    }

    /// Append a rich-text message. The content is trusted HTML.
    pub fn push_text(&mut self, sender: Sender, html: impl Into<String>) -> MessageId {
        self.push(sender, MessageKind::Text, html)
    }

    /// Append an image message
    pub fn push_image(&mut self, sender: Sender, src: impl Into<String>) -> MessageId {
        self.push(sender, MessageKind::Image, src)
    }

    /// Append a transient bot placeholder showing plain text
    pub fn push_placeholder(&mut self, text: &str) -> MessageId {
        self.append(Sender::Bot, MessageKind::Text, markup::escape_html(text), true)
    }

    fn append(&mut self, sender: Sender, kind: MessageKind, content: String, transient: bool) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            sender,
            kind,
            content,
            transient,
        });
        id
    }

    /// Replace a message with plain text, settling it if it was a
    /// placeholder. Returns false if the message no longer exists.
    pub fn replace_text(&mut self, id: MessageId, text: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.kind = MessageKind::Text;
                message.content = markup::escape_html(text);
                message.transient = false;
                true
            }
            None => false,
        }
    }

    /// Remove a message (used for placeholders)
    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        if self.therapy_start == Some(id) {
            self.therapy_start = None;
        }
        Some(self.messages.remove(index))
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Record the user message that confirmed the therapy phase
    pub fn mark_therapy_start(&mut self, id: MessageId) {
        if self.get(id).is_some() {
            self.therapy_start = Some(id);
        }
    }

    /// Index of the therapy confirmation message.
    ///
    /// Uses the recorded marker when there is one; otherwise the first user
    /// message reading "yes" (case-insensitive, trimmed), which is how the
    /// server stores the confirmation.
    fn therapy_start_index(&self) -> Option<usize> {
        if let Some(id) = self.therapy_start {
            return self.messages.iter().position(|m| m.id == id);
        }
        self.messages.iter().position(|m| {
            m.is_user()
                && m.text()
                    .map(|t| t.trim().eq_ignore_ascii_case("yes"))
                    .unwrap_or(false)
        })
    }

    /// Number of user messages after the therapy confirmation, capped at
    /// [`MAX_QUESTIONS`]. Zero when the therapy phase has not started.
    pub fn question_count(&self) -> u32 {
        let Some(start) = self.therapy_start_index() else {
            return 0;
        };
        let count = self.messages[start + 1..]
            .iter()
            .filter(|m| m.is_user())
            .count();
        (count as u32).min(MAX_QUESTIONS)
    }

    /// Conversation transcript sent as context with follow-up questions.
    ///
    /// One `"<User|AI>: <text>\n"` line per text message, in order. Images
    /// carry no text and placeholders are not part of the conversation, so
    /// both are skipped.
    pub fn history(&self) -> String {
        let mut history = String::new();
        for message in self.messages.iter().filter(|m| !m.transient) {
            if let Some(text) = message.text() {
                history.push_str(message.sender.transcript_label());
                history.push_str(": ");
                history.push_str(&text);
                history.push('\n');
            }
        }
        history
    }
}
