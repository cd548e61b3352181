//! Core data types for a chat session
//!
//! - `SessionId`: server-issued session identifier
//! - `SessionPhase`: where the conversation currently is
//! - `Sender`, `MessageKind`, `Message`: entries of the message log

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of follow-up questions in the therapy phase
pub const MAX_QUESTIONS: u32 = 10;

/// Server-issued session identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl SessionId {
    /// Page path the browser navigates to for this session
    pub fn chat_path(&self) -> String {
        format!("/chat/{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SessionId)
    }
}

/// Phase of the dream-to-therapy conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for the user to describe a dream
    #[default]
    InitialDream,
    /// Interpretation delivered, waiting for the user to opt into follow-ups
    AwaitingTherapyStart,
    /// Bounded follow-up Q&A
    InTherapySession,
    /// Terminal: no further input accepted
    SessionEnded,
}

impl SessionPhase {
    /// Wire name, as rendered into the `session-state` hidden field
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::InitialDream => "initial_dream",
            SessionPhase::AwaitingTherapyStart => "awaiting_therapy_start",
            SessionPhase::InTherapySession => "in_therapy_session",
            SessionPhase::SessionEnded => "session_ended",
        }
    }

    /// True once no transition can leave this phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::SessionEnded)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a phase name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown session state: {0:?}")]
pub struct UnknownPhase(pub String);

impl FromStr for SessionPhase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "initial_dream" => Ok(SessionPhase::InitialDream),
            "awaiting_therapy_start" => Ok(SessionPhase::AwaitingTherapyStart),
            "in_therapy_session" => Ok(SessionPhase::InTherapySession),
            "session_ended" => Ok(SessionPhase::SessionEnded),
            other => Err(UnknownPhase(other.to_string())),
        }
    }
}

/// Who a message came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// CSS class marker on the rendered bubble
    pub fn css_class(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    /// Speaker label used in the conversation transcript
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Bot => "AI",
        }
    }
}

/// How a message's content is rendered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Rich text; the content is an HTML fragment
    Text,
    /// Image; the content is the image source URL
    Image,
}

/// Handle to a message in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub(crate) u64);

/// A rendered chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub kind: MessageKind,
    /// HTML fragment for text messages, image URL for images
    pub content: String,
    /// Thinking placeholder, waiting to be replaced or removed
    pub transient: bool,
}

impl Message {
    /// Plain text of a text message; `None` for images
    pub fn text(&self) -> Option<String> {
        match self.kind {
            MessageKind::Text => Some(crate::markup::text_content(&self.content)),
            MessageKind::Image => None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
