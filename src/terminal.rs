//! Terminal renderer
//!
//! Prints the message log line by line. The log only grows (apart from
//! placeholders being settled or dropped), so the renderer remembers what it
//! already printed and emits just the new or changed messages.

use std::collections::HashMap;

use crate::chat::{Controls, Message, MessageId, MessageKind, MessageLog, Sender};
use crate::markup;

#[derive(Debug, Default)]
pub struct TerminalRenderer {
    printed: HashMap<MessageId, String>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything printed (after navigating to another page)
    pub fn reset(&mut self) {
        self.printed.clear();
    }

    /// Lines for messages not printed yet, or whose content changed
    pub fn render(&mut self, log: &MessageLog) -> Vec<String> {
        let mut lines = Vec::new();
        for message in log.iter() {
            if self.printed.get(&message.id) == Some(&message.content) {
                continue;
            }
            self.printed.insert(message.id, message.content.clone());
            lines.push(format_message(message));
        }
        self.printed.retain(|id, _| log.get(*id).is_some());
        lines
    }
}

/// One message as terminal text
pub fn format_message(message: &Message) -> String {
    let label = match message.sender {
        Sender::User => "You",
        Sender::Bot => "AI",
    };
    match message.kind {
        MessageKind::Image => format!("{}: [Dream Visualization] {}", label, message.content),
        MessageKind::Text => {
            let text = markup::to_terminal(&message.content);
            if message.transient {
                format!("{}: ({})", label, text)
            } else {
                format!("{}: {}", label, text)
            }
        }
    }
}

/// Input prompt for the current controls
pub fn prompt(controls: &Controls) -> String {
    format!("[{}] > ", controls.placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatSession, Sender};

    #[test]
    fn test_render_only_new_messages() {
        let mut log = MessageLog::new();
        let mut renderer = TerminalRenderer::new();

        log.push_text(Sender::User, "I was flying");
        log.push_image(Sender::Bot, "https://img.example/f.png");
        assert_eq!(
            renderer.render(&log),
            vec![
                "You: I was flying".to_string(),
                "AI: [Dream Visualization] https://img.example/f.png".to_string(),
            ]
        );
        assert!(renderer.render(&log).is_empty());

        log.push_text(Sender::Bot, "Themes:<ul><li>freedom</li></ul>");
        assert_eq!(renderer.render(&log), vec!["AI: Themes:\n• freedom".to_string()]);
    }

    #[test]
    fn test_settled_placeholder_is_reprinted() {
        let mut log = MessageLog::new();
        let mut renderer = TerminalRenderer::new();

        let id = log.push_placeholder("Thinking...");
        assert_eq!(renderer.render(&log), vec!["AI: (Thinking...)".to_string()]);

        log.replace_text(id, "Sorry, an error occurred during the follow-up.");
        assert_eq!(
            renderer.render(&log),
            vec!["AI: Sorry, an error occurred during the follow-up.".to_string()]
        );
    }

    #[test]
    fn test_prompt() {
        let session = ChatSession::default();
        assert_eq!(prompt(session.controls()), "[I dreamt that . . .] > ");
    }
}
