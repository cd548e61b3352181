//! Request/response bodies of the chat endpoints
//!
//! Field names match the server's JSON exactly. Response fields are all
//! optional: the server signals failure by leaving a field out, not by a
//! distinct shape.

use serde::{Deserialize, Serialize};

use crate::chat::SessionId;

// ============ Dream submission: POST /submit_message ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DreamRequest {
    pub dream_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DreamResponse {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============ Therapy start: POST /start_therapy ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartTherapyRequest {
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartTherapyResponse {
    #[serde(default)]
    pub bot_message: Option<BotMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotMessage {
    /// HTML fragment
    pub text: String,
    #[serde(default)]
    pub sender: Option<String>,
}

// ============ Therapy follow-up: POST /therapy ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TherapyRequest {
    pub question: String,
    pub history: String,
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TherapyResponse {
    /// HTML fragment
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let body = serde_json::to_value(TherapyRequest {
            question: "Why water?".to_string(),
            history: "User: A\nAI: B\n".to_string(),
            session_id: Some(SessionId(7)),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "question": "Why water?",
                "history": "User: A\nAI: B\n",
                "session_id": 7
            })
        );
    }

    #[test]
    fn test_missing_fields_decode_as_none() {
        let dream: DreamResponse = serde_json::from_str(r#"{"error": "nope"}"#).unwrap();
        assert_eq!(dream.session_id, None);
        assert_eq!(dream.error.as_deref(), Some("nope"));

        let start: StartTherapyResponse = serde_json::from_str("{}").unwrap();
        assert!(start.bot_message.is_none());

        let start: StartTherapyResponse = serde_json::from_str(
            r#"{"bot_message": {"text": "Great. What is your first question?", "sender": "bot"}}"#,
        )
        .unwrap();
        assert_eq!(
            start.bot_message.unwrap().text,
            "Great. What is your first question?"
        );
    }
}
