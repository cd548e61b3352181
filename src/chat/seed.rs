//! Session seed
//!
//! What the server rendered into the chat page: the phase and id hidden
//! fields plus the message bubbles already on screen. The page is read once,
//! into a [`SessionSeed`], and everything after that works off the log.

use tracing::warn;

use super::log::MessageLog;
use super::types::{MessageKind, SessionId, SessionPhase, Sender};

/// One server-rendered message bubble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedMessage {
    pub sender: Sender,
    pub kind: MessageKind,
    /// HTML fragment for text, image URL for images
    pub content: String,
}

impl SeedMessage {
    pub fn text(sender: Sender, html: impl Into<String>) -> Self {
        Self {
            sender,
            kind: MessageKind::Text,
            content: html.into(),
        }
    }

    pub fn image(sender: Sender, src: impl Into<String>) -> Self {
        Self {
            sender,
            kind: MessageKind::Image,
            content: src.into(),
        }
    }
}

/// Initial session state read from a rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSeed {
    pub phase: SessionPhase,
    pub session_id: Option<SessionId>,
    pub messages: Vec<SeedMessage>,
}

impl SessionSeed {
    /// Parse the raw hidden-field values.
    ///
    /// A missing or empty state means a fresh page (`initial_dream`). A state
    /// we do not recognize ends the session rather than guessing. A missing
    /// or non-numeric id means no session yet.
    pub fn from_fields(state: Option<&str>, id: Option<&str>) -> Self {
        let phase = match state.map(str::trim).filter(|s| !s.is_empty()) {
            None => SessionPhase::InitialDream,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Unrecognized session state, ending session");
                SessionPhase::SessionEnded
            }),
        };

        let session_id = id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|raw| match raw.parse::<SessionId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(value = raw, error = %e, "Ignoring malformed session id");
                    None
                }
            });

        Self {
            phase,
            session_id,
            messages: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<SeedMessage>) -> Self {
        self.messages = messages;
        self
    }

    /// Message log holding the seeded bubbles, in page order
    pub fn build_log(&self) -> MessageLog {
        let mut log = MessageLog::new();
        for message in &self.messages {
            log.push(message.sender, message.kind, message.content.clone());
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_parsed() {
        let seed = SessionSeed::from_fields(Some("awaiting_therapy_start"), Some("17"));
        assert_eq!(seed.phase, SessionPhase::AwaitingTherapyStart);
        assert_eq!(seed.session_id, Some(SessionId(17)));
    }

    #[test]
    fn test_missing_fields_mean_fresh_page() {
        let seed = SessionSeed::from_fields(None, None);
        assert_eq!(seed.phase, SessionPhase::InitialDream);
        assert_eq!(seed.session_id, None);

        let seed = SessionSeed::from_fields(Some("  "), Some(""));
        assert_eq!(seed.phase, SessionPhase::InitialDream);
        assert_eq!(seed.session_id, None);
    }

    #[test]
    fn test_unknown_state_ends_session() {
        let seed = SessionSeed::from_fields(Some("therapy_mode"), Some("3"));
        assert_eq!(seed.phase, SessionPhase::SessionEnded);
        assert_eq!(seed.session_id, Some(SessionId(3)));
    }

    #[test]
    fn test_bad_id_is_dropped() {
        let seed = SessionSeed::from_fields(Some("in_therapy_session"), Some("None"));
        assert_eq!(seed.session_id, None);
    }

    #[test]
    fn test_build_log_keeps_order() {
        let seed = SessionSeed::default().with_messages(vec![
            SeedMessage::text(Sender::User, "dream"),
            SeedMessage::image(Sender::Bot, "https://img.example/a.png"),
            SeedMessage::text(Sender::Bot, "<p>meaning</p>"),
        ]);
        let log = seed.build_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log.messages()[1].kind, MessageKind::Image);
        assert!(log.iter().all(|m| !m.transient));
        assert_eq!(log.history(), "User: dream\nAI: meaning\n");
    }
}
