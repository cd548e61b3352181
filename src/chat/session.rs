//! Session state machine
//!
//! ```text
//!   initial_dream ──dream ok──▶ (navigate to /chat/{id}; server decides next state)
//!
//!   awaiting_therapy_start ──affirmative + start ok──▶ in_therapy_session
//!   awaiting_therapy_start ──anything else──────────▶ session_ended
//!
//!   in_therapy_session ──10th answered question──▶ session_ended
//! ```
//!
//! A submit is split in two: [`ChatSession::submit`] renders the user message
//! and a thinking placeholder and hands back a [`PendingRequest`];
//! [`ChatSession::resolve`] applies the server's reply. The send control stays
//! disabled in between, which is what keeps a session to one request in
//! flight.

use tracing::{debug, info, warn};

use super::log::MessageLog;
use super::seed::SessionSeed;
use super::types::{MessageId, SessionId, SessionPhase, Sender, MAX_QUESTIONS};
use crate::markup;
use crate::transport::{
    DreamRequest, DreamResponse, StartTherapyRequest, StartTherapyResponse, TherapyRequest,
    TherapyResponse, TransportResult,
};

pub const DREAM_PROMPT: &str = "I dreamt that . . .";
pub const THERAPY_START_PROMPT: &str = "Type 'yes' to explore further...";
pub const SESSION_ENDED_PROMPT: &str = "Session ended. Please start a new dream.";

const DREAM_THINKING: &str = "Dreaming up an interpretation...";
const THERAPY_START_THINKING: &str = "...";
const FOLLOW_UP_THINKING: &str = "Thinking...";

const DREAM_CONNECTION_ERROR: &str =
    "Sorry, a connection error occurred while processing your dream.";
const DREAM_NO_SESSION: &str = "Could not create a new session.";
const THERAPY_START_FAILED: &str = "Sorry, something went wrong starting the therapy session.";
const THERAPY_START_ERROR: &str = "An error occurred. Please try again.";
const FOLLOW_UP_ERROR: &str = "Sorry, an error occurred during the follow-up.";
const THERAPY_DECLINED: &str =
    "No problem. This concludes our session. Feel free to start a new dream conversation anytime.";

/// Answers that opt into the therapy phase (compared trimmed, lower-cased)
pub const AFFIRMATIVE_ANSWERS: [&str; 5] = ["yes", "y", "sure", "ok", "okay"];

/// True if `text` opts into the therapy phase
pub fn is_affirmative(text: &str) -> bool {
    let answer = text.trim().to_lowercase();
    AFFIRMATIVE_ANSWERS.contains(&answer.as_str())
}

/// Input-area controls as the page should currently show them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    /// Current text of the input field
    pub input: String,
    pub placeholder: String,
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub mic_enabled: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            input: String::new(),
            placeholder: DREAM_PROMPT.to_string(),
            input_enabled: true,
            send_enabled: true,
            mic_enabled: true,
        }
    }
}

/// A request waiting to be sent, with the placeholder it will settle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRequest {
    Dream {
        placeholder: MessageId,
        request: DreamRequest,
    },
    StartTherapy {
        placeholder: MessageId,
        /// The user's affirmative answer
        confirmation: MessageId,
        request: StartTherapyRequest,
    },
    FollowUp {
        placeholder: MessageId,
        request: TherapyRequest,
    },
}

impl PendingRequest {
    /// Placeholder shown while this request is in flight
    pub fn placeholder(&self) -> MessageId {
        match self {
            PendingRequest::Dream { placeholder, .. }
            | PendingRequest::StartTherapy { placeholder, .. }
            | PendingRequest::FollowUp { placeholder, .. } => *placeholder,
        }
    }
}

/// Decoded reply to a [`PendingRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Dream(DreamResponse),
    StartTherapy(StartTherapyResponse),
    FollowUp(TherapyResponse),
}

/// What a submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing happened: empty input, send disabled, or session over
    Ignored,
    /// Handled without a request (therapy declined)
    Local,
    /// A request must be sent and its reply passed to [`ChatSession::resolve`]
    Request(PendingRequest),
}

/// Where the conversation stands after a reply is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep chatting on this page
    Continue,
    /// Leave for the page of a newly created session
    Navigate(SessionId),
    /// The session is over
    Ended,
}

/// One chat session: phase, question counter, message log and controls
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Option<SessionId>,
    phase: SessionPhase,
    question_count: u32,
    log: MessageLog,
    controls: Controls,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(SessionPhase::InitialDream, None)
    }
}

impl ChatSession {
    /// Create a session with an empty log
    pub fn new(phase: SessionPhase, id: Option<SessionId>) -> Self {
        Self::restore(SessionSeed {
            phase,
            session_id: id,
            messages: Vec::new(),
        })
    }

    /// Rebuild a session from what the server rendered into the page
    pub fn restore(seed: SessionSeed) -> Self {
        let log = seed.build_log();
        let question_count = match seed.phase {
            SessionPhase::InTherapySession => log.question_count(),
            _ => 0,
        };

        let mut session = Self {
            id: seed.session_id,
            phase: SessionPhase::InitialDream,
            question_count,
            log,
            controls: Controls::default(),
        };

        if seed.phase.is_terminal() {
            session.end();
        } else {
            session.phase = seed.phase;
            session.restore_placeholder();
        }

        debug!(
            phase = %session.phase,
            session_id = ?session.id,
            messages = session.log.len(),
            questions = session.question_count,
            "Session restored"
        );
        session
    }

    pub fn id(&self) -> Option<SessionId> {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Follow-up questions answered so far in the therapy phase
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn remaining_questions(&self) -> u32 {
        MAX_QUESTIONS.saturating_sub(self.question_count)
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Mirror what the user typed into the input field
    pub fn set_input(&mut self, text: impl Into<String>) {
        if self.controls.input_enabled {
            self.controls.input = text.into();
        }
    }

    /// Show a bot notice outside the request cycle (speech errors).
    /// The content is trusted HTML.
    pub fn push_notice(&mut self, html: impl Into<String>) -> MessageId {
        self.log.push_text(Sender::Bot, html)
    }

    pub(crate) fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.controls.placeholder = placeholder.into();
    }

    /// Reset the placeholder for the current phase.
    ///
    /// In the therapy phase this is also where the question limit is
    /// enforced: with no questions left the session ends.
    pub fn restore_placeholder(&mut self) {
        let placeholder = match self.phase {
            SessionPhase::InitialDream => DREAM_PROMPT.to_string(),
            SessionPhase::AwaitingTherapyStart => THERAPY_START_PROMPT.to_string(),
            SessionPhase::InTherapySession => {
                let remaining = self.remaining_questions();
                if remaining == 0 {
                    self.end();
                    return;
                }
                format!("Ask your question ({} remaining)...", remaining)
            }
            SessionPhase::SessionEnded => SESSION_ENDED_PROMPT.to_string(),
        };
        self.controls.placeholder = placeholder;
    }

    /// Move to the terminal phase and lock every control
    fn end(&mut self) {
        if self.phase != SessionPhase::SessionEnded {
            info!(session_id = ?self.id, "Session ended");
        }
        self.phase = SessionPhase::SessionEnded;
        self.controls.input_enabled = false;
        self.controls.send_enabled = false;
        self.controls.mic_enabled = false;
        self.controls.placeholder = SESSION_ENDED_PROMPT.to_string();
    }

    fn transition(&mut self, to: SessionPhase) {
        debug!(from = %self.phase, to = %to, "Session transition");
        self.phase = to;
    }

    /// Submit the input text for the current phase
    pub fn submit(&mut self, raw: &str) -> Submission {
        let text = raw.trim();
        if text.is_empty() || !self.controls.send_enabled || !self.controls.input_enabled {
            return Submission::Ignored;
        }

        info!(phase = %self.phase, "Submitting message");

        match self.phase {
            SessionPhase::InitialDream => self.begin_dream(text),
            SessionPhase::AwaitingTherapyStart => self.begin_therapy_start(text),
            SessionPhase::InTherapySession => self.begin_follow_up(text),
            SessionPhase::SessionEnded => Submission::Ignored,
        }
    }

    /// Submit whatever is currently in the input field
    pub fn submit_input(&mut self) -> Submission {
        let text = self.controls.input.clone();
        self.submit(&text)
    }

    fn push_user(&mut self, text: &str) -> MessageId {
        self.controls.input.clear();
        self.log.push_text(Sender::User, markup::escape_html(text))
    }

    fn begin_dream(&mut self, text: &str) -> Submission {
        self.push_user(text);
        let placeholder = self.log.push_placeholder(DREAM_THINKING);
        self.controls.send_enabled = false;

        Submission::Request(PendingRequest::Dream {
            placeholder,
            request: DreamRequest {
                dream_text: text.to_string(),
            },
        })
    }

    fn begin_therapy_start(&mut self, text: &str) -> Submission {
        let confirmation = self.push_user(text);

        if !is_affirmative(text) {
            self.log.push_text(Sender::Bot, THERAPY_DECLINED);
            self.end();
            return Submission::Local;
        }

        let placeholder = self.log.push_placeholder(THERAPY_START_THINKING);
        self.controls.send_enabled = false;

        Submission::Request(PendingRequest::StartTherapy {
            placeholder,
            confirmation,
            request: StartTherapyRequest {
                session_id: self.id,
            },
        })
    }

    fn begin_follow_up(&mut self, question: &str) -> Submission {
        self.push_user(question);
        let history = self.log.history();
        let placeholder = self.log.push_placeholder(FOLLOW_UP_THINKING);
        self.controls.send_enabled = false;

        Submission::Request(PendingRequest::FollowUp {
            placeholder,
            request: TherapyRequest {
                question: question.to_string(),
                history,
                session_id: self.id,
            },
        })
    }

    /// Apply the reply (or failure) of a pending request
    pub fn resolve(&mut self, pending: PendingRequest, reply: TransportResult<Reply>) -> Outcome {
        match (pending, reply) {
            (PendingRequest::Dream { placeholder, .. }, Ok(Reply::Dream(response))) => {
                self.finish_dream(placeholder, Ok(response))
            }
            (PendingRequest::Dream { placeholder, .. }, Err(e)) => {
                self.finish_dream(placeholder, Err(e.to_string()))
            }
            (
                PendingRequest::StartTherapy {
                    placeholder,
                    confirmation,
                    ..
                },
                Ok(Reply::StartTherapy(response)),
            ) => self.finish_therapy_start(placeholder, confirmation, Ok(response)),
            (
                PendingRequest::StartTherapy {
                    placeholder,
                    confirmation,
                    ..
                },
                Err(e),
            ) => self.finish_therapy_start(placeholder, confirmation, Err(e.to_string())),
            (PendingRequest::FollowUp { placeholder, .. }, Ok(Reply::FollowUp(response))) => {
                self.finish_follow_up(placeholder, Ok(response))
            }
            (PendingRequest::FollowUp { placeholder, .. }, Err(e)) => {
                self.finish_follow_up(placeholder, Err(e.to_string()))
            }
            (pending, Ok(reply)) => {
                warn!(?pending, ?reply, "Reply does not match the pending request");
                let placeholder = pending.placeholder();
                match pending {
                    PendingRequest::Dream { .. } => {
                        self.finish_dream(placeholder, Err("mismatched reply".to_string()))
                    }
                    PendingRequest::StartTherapy { confirmation, .. } => self.finish_therapy_start(
                        placeholder,
                        confirmation,
                        Err("mismatched reply".to_string()),
                    ),
                    PendingRequest::FollowUp { .. } => {
                        self.finish_follow_up(placeholder, Err("mismatched reply".to_string()))
                    }
                }
            }
        }
    }

    fn outcome(&self) -> Outcome {
        if self.phase.is_terminal() {
            Outcome::Ended
        } else {
            Outcome::Continue
        }
    }

    fn finish_dream(&mut self, placeholder: MessageId, result: Result<DreamResponse, String>) -> Outcome {
        match result {
            Ok(DreamResponse {
                session_id: Some(id),
                ..
            }) => {
                info!(session_id = %id, "Dream accepted, opening session");
                self.id = Some(id);
                Outcome::Navigate(id)
            }
            Ok(DreamResponse { error, .. }) => {
                let reason = error.unwrap_or_else(|| DREAM_NO_SESSION.to_string());
                warn!(%reason, "Dream submission returned no session");
                self.log
                    .replace_text(placeholder, &format!("Sorry, an error occurred: {}", reason));
                self.controls.send_enabled = true;
                self.outcome()
            }
            Err(e) => {
                warn!(error = %e, "Dream submission failed");
                self.log.replace_text(placeholder, DREAM_CONNECTION_ERROR);
                self.controls.send_enabled = true;
                self.outcome()
            }
        }
    }

    fn finish_therapy_start(
        &mut self,
        placeholder: MessageId,
        confirmation: MessageId,
        result: Result<StartTherapyResponse, String>,
    ) -> Outcome {
        match result {
            Ok(response) => {
                self.log.remove(placeholder);
                match response.bot_message {
                    Some(message) => {
                        self.log.push_text(Sender::Bot, message.text);
                        self.log.mark_therapy_start(confirmation);
                        self.question_count = 0;
                        self.transition(SessionPhase::InTherapySession);
                        self.restore_placeholder();
                    }
                    None => {
                        warn!("Therapy start response carried no bot message");
                        self.log
                            .push_text(Sender::Bot, markup::escape_html(THERAPY_START_FAILED));
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Therapy start failed");
                self.log.replace_text(placeholder, THERAPY_START_ERROR);
            }
        }
        self.controls.send_enabled = true;
        self.outcome()
    }

    fn finish_follow_up(&mut self, placeholder: MessageId, result: Result<TherapyResponse, String>) -> Outcome {
        match result {
            Ok(response) => {
                self.log.remove(placeholder);
                match (response.error, response.answer) {
                    (Some(error), _) => {
                        self.log.push_text(Sender::Bot, error);
                    }
                    (None, Some(answer)) => {
                        self.log.push_text(Sender::Bot, answer);
                    }
                    (None, None) => {
                        warn!("Follow-up response carried neither answer nor error");
                        self.log
                            .push_text(Sender::Bot, markup::escape_html(FOLLOW_UP_ERROR));
                    }
                }
                self.question_count = (self.question_count + 1).min(MAX_QUESTIONS);
                debug!(questions = self.question_count, "Follow-up answered");
                self.restore_placeholder();
            }
            Err(e) => {
                warn!(error = %e, "Follow-up failed");
                self.log.replace_text(placeholder, FOLLOW_UP_ERROR);
            }
        }

        if !self.phase.is_terminal() {
            self.controls.send_enabled = true;
        }
        self.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::seed::SeedMessage;
    use crate::chat::MessageKind;
    use crate::transport::{BotMessage, TransportError};

    fn texts(session: &ChatSession) -> Vec<(Sender, String)> {
        session
            .log()
            .iter()
            .filter_map(|m| m.text().map(|t| (m.sender, t)))
            .collect()
    }

    fn therapy_session(prior_questions: usize) -> ChatSession {
        let mut messages = vec![
            SeedMessage::text(Sender::User, "I was falling"),
            SeedMessage::image(Sender::Bot, "https://img.example/1.png"),
            SeedMessage::text(Sender::Bot, "Falling means letting go."),
            SeedMessage::text(Sender::Bot, "Would you like to ask some follow-up questions?"),
            SeedMessage::text(Sender::User, "Yes"),
            SeedMessage::text(Sender::Bot, "Great. What is your first question?"),
        ];
        for i in 0..prior_questions {
            messages.push(SeedMessage::text(Sender::User, &format!("q{}", i)));
            messages.push(SeedMessage::text(Sender::Bot, &format!("a{}", i)));
        }
        ChatSession::restore(SessionSeed {
            phase: SessionPhase::InTherapySession,
            session_id: Some(SessionId(3)),
            messages,
        })
    }

    fn request(submission: Submission) -> PendingRequest {
        match submission {
            Submission::Request(pending) => pending,
            other => panic!("expected a request, got {:?}", other),
        }
    }

    fn network_error() -> TransportError {
        TransportError::Network("connection refused".to_string())
    }

    #[test]
    fn test_affirmative_answers() {
        for answer in ["yes", "Y", " Sure ", "OK", "okay"] {
            assert!(is_affirmative(answer), "{answer}");
        }
        for answer in ["no", "yes please", "", "yeah"] {
            assert!(!is_affirmative(answer), "{answer}");
        }
    }

    #[test]
    fn test_blank_input_is_ignored_in_every_phase() {
        for phase in [
            SessionPhase::InitialDream,
            SessionPhase::AwaitingTherapyStart,
            SessionPhase::InTherapySession,
            SessionPhase::SessionEnded,
        ] {
            let mut session = ChatSession::new(phase, Some(SessionId(1)));
            let before = session.controls().clone();
            assert_eq!(session.submit("   \n\t"), Submission::Ignored);
            assert_eq!(session.phase(), phase);
            assert!(session.log().is_empty());
            assert_eq!(session.controls(), &before);
        }
    }

    #[test]
    fn test_submit_while_request_in_flight_is_ignored() {
        let mut session = ChatSession::default();
        let _pending = request(session.submit("I dreamt of the sea"));
        assert!(!session.controls().send_enabled);

        assert_eq!(session.submit("again"), Submission::Ignored);
        assert_eq!(session.log().len(), 2);
    }

    #[test]
    fn test_initial_placeholders() {
        assert_eq!(ChatSession::default().controls().placeholder, DREAM_PROMPT);
        assert_eq!(
            ChatSession::new(SessionPhase::AwaitingTherapyStart, None)
                .controls()
                .placeholder,
            THERAPY_START_PROMPT
        );
        assert_eq!(
            therapy_session(3).controls().placeholder,
            "Ask your question (7 remaining)..."
        );
        let ended = ChatSession::new(SessionPhase::SessionEnded, None);
        assert_eq!(ended.controls().placeholder, SESSION_ENDED_PROMPT);
        assert!(!ended.controls().input_enabled);
        assert!(!ended.controls().mic_enabled);
    }

    #[test]
    fn test_dream_success_navigates() {
        let mut session = ChatSession::default();
        let pending = request(session.submit("  I dreamt of the sea  "));

        match &pending {
            PendingRequest::Dream { request, .. } => {
                assert_eq!(request.dream_text, "I dreamt of the sea")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            texts(&session),
            vec![
                (Sender::User, "I dreamt of the sea".to_string()),
                (Sender::Bot, DREAM_THINKING.to_string()),
            ]
        );
        assert_eq!(session.controls().input, "");

        let outcome = session.resolve(
            pending,
            Ok(Reply::Dream(DreamResponse {
                session_id: Some(SessionId(12)),
                error: None,
            })),
        );
        assert_eq!(outcome, Outcome::Navigate(SessionId(12)));
        assert_eq!(session.id(), Some(SessionId(12)));
    }

    #[test]
    fn test_dream_without_session_id_reenables_submit() {
        let mut session = ChatSession::default();
        let pending = request(session.submit("a dream"));
        let placeholder = pending.placeholder();

        let outcome = session.resolve(pending, Ok(Reply::Dream(DreamResponse::default())));

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.phase(), SessionPhase::InitialDream);
        assert!(session.controls().send_enabled);
        assert_eq!(
            session.log().get(placeholder).unwrap().text().unwrap(),
            "Sorry, an error occurred: Could not create a new session."
        );
    }

    #[test]
    fn test_dream_server_error_is_shown() {
        let mut session = ChatSession::default();
        let pending = request(session.submit("a dream"));
        let placeholder = pending.placeholder();

        session.resolve(
            pending,
            Ok(Reply::Dream(DreamResponse {
                session_id: None,
                error: Some("<quota>".to_string()),
            })),
        );
        let message = session.log().get(placeholder).unwrap();
        assert_eq!(message.content, "Sorry, an error occurred: &lt;quota&gt;");
    }

    #[test]
    fn test_dream_transport_failure() {
        let mut session = ChatSession::default();
        let pending = request(session.submit("a dream"));
        let placeholder = pending.placeholder();

        let outcome = session.resolve(pending, Err(network_error()));

        assert_eq!(outcome, Outcome::Continue);
        assert!(session.controls().send_enabled);
        assert_eq!(
            session.log().get(placeholder).unwrap().text().unwrap(),
            DREAM_CONNECTION_ERROR
        );
    }

    #[test]
    fn test_affirmative_starts_therapy() {
        let mut session = ChatSession::new(SessionPhase::AwaitingTherapyStart, Some(SessionId(4)));
        let pending = request(session.submit("Sure"));

        match &pending {
            PendingRequest::StartTherapy { request, .. } => {
                assert_eq!(request.session_id, Some(SessionId(4)))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!session.controls().send_enabled);

        let outcome = session.resolve(
            pending,
            Ok(Reply::StartTherapy(StartTherapyResponse {
                bot_message: Some(BotMessage {
                    text: "Great. What is your first question?".to_string(),
                    sender: Some("bot".to_string()),
                }),
            })),
        );

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.phase(), SessionPhase::InTherapySession);
        assert_eq!(session.question_count(), 0);
        assert!(session.controls().send_enabled);
        assert_eq!(
            session.controls().placeholder,
            "Ask your question (10 remaining)..."
        );
        assert_eq!(
            texts(&session),
            vec![
                (Sender::User, "Sure".to_string()),
                (Sender::Bot, "Great. What is your first question?".to_string()),
            ]
        );
    }

    #[test]
    fn test_decline_ends_without_request() {
        let mut session = ChatSession::new(SessionPhase::AwaitingTherapyStart, Some(SessionId(4)));
        assert_eq!(session.submit("no thanks"), Submission::Local);

        assert_eq!(session.phase(), SessionPhase::SessionEnded);
        assert!(!session.controls().input_enabled);
        assert!(!session.controls().send_enabled);
        assert_eq!(session.controls().placeholder, SESSION_ENDED_PROMPT);
        assert_eq!(texts(&session).last().unwrap().1, THERAPY_DECLINED);

        assert_eq!(session.submit("yes"), Submission::Ignored);
    }

    #[test]
    fn test_therapy_start_without_bot_message() {
        let mut session = ChatSession::new(SessionPhase::AwaitingTherapyStart, Some(SessionId(4)));
        let pending = request(session.submit("yes"));
        let placeholder = pending.placeholder();

        let outcome = session.resolve(pending, Ok(Reply::StartTherapy(StartTherapyResponse::default())));

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.phase(), SessionPhase::AwaitingTherapyStart);
        assert!(session.log().get(placeholder).is_none());
        assert!(session.controls().send_enabled);
        assert_eq!(texts(&session).last().unwrap().1, THERAPY_START_FAILED);
    }

    #[test]
    fn test_therapy_start_transport_failure() {
        let mut session = ChatSession::new(SessionPhase::AwaitingTherapyStart, Some(SessionId(4)));
        let pending = request(session.submit("ok"));
        let placeholder = pending.placeholder();

        session.resolve(
            pending,
            Err(TransportError::Status {
                status: 403,
                message: "Forbidden".to_string(),
            }),
        );

        assert_eq!(session.phase(), SessionPhase::AwaitingTherapyStart);
        assert!(session.controls().send_enabled);
        assert_eq!(
            session.log().get(placeholder).unwrap().text().unwrap(),
            THERAPY_START_ERROR
        );
    }

    #[test]
    fn test_follow_up_sends_history_and_counts() {
        let mut session = therapy_session(0);
        let pending = request(session.submit("Why was I falling?"));

        match &pending {
            PendingRequest::FollowUp { request, .. } => {
                assert_eq!(request.question, "Why was I falling?");
                assert_eq!(request.session_id, Some(SessionId(3)));
                assert_eq!(
                    request.history,
                    "User: I was falling\n\
                     AI: Falling means letting go.\n\
                     AI: Would you like to ask some follow-up questions?\n\
                     User: Yes\n\
                     AI: Great. What is your first question?\n\
                     User: Why was I falling?\n"
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        let outcome = session.resolve(
            pending,
            Ok(Reply::FollowUp(TherapyResponse {
                answer: Some("<strong>Control</strong> matters to you.".to_string()),
                error: None,
            })),
        );

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.question_count(), 1);
        assert_eq!(
            session.controls().placeholder,
            "Ask your question (9 remaining)..."
        );
        let last = session.log().messages().last().unwrap();
        assert_eq!(last.content, "<strong>Control</strong> matters to you.");
        assert!(!last.transient);
    }

    #[test]
    fn test_follow_up_application_error_is_rendered_and_counted() {
        let mut session = therapy_session(2);
        let pending = request(session.submit("And the cliff?"));

        session.resolve(
            pending,
            Ok(Reply::FollowUp(TherapyResponse {
                answer: None,
                error: Some("Sorry, an error occurred during the therapy session: quota".to_string()),
            })),
        );

        assert_eq!(session.question_count(), 3);
        assert!(session.controls().send_enabled);
        assert_eq!(
            texts(&session).last().unwrap().1,
            "Sorry, an error occurred during the therapy session: quota"
        );
    }

    #[test]
    fn test_follow_up_transport_failure_keeps_count() {
        let mut session = therapy_session(2);
        let pending = request(session.submit("And the cliff?"));
        let placeholder = pending.placeholder();

        let outcome = session.resolve(pending, Err(TransportError::Timeout));

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(session.question_count(), 2);
        assert!(session.controls().send_enabled);
        assert_eq!(
            session.log().get(placeholder).unwrap().text().unwrap(),
            FOLLOW_UP_ERROR
        );
    }

    #[test]
    fn test_tenth_question_renders_answer_then_ends() {
        let mut session = therapy_session(9);
        assert_eq!(session.question_count(), 9);
        assert_eq!(
            session.controls().placeholder,
            "Ask your question (1 remaining)..."
        );

        let pending = request(session.submit("Last one?"));
        let outcome = session.resolve(
            pending,
            Ok(Reply::FollowUp(TherapyResponse {
                answer: Some("Final answer.".to_string()),
                error: None,
            })),
        );

        assert_eq!(outcome, Outcome::Ended);
        assert_eq!(session.question_count(), MAX_QUESTIONS);
        assert_eq!(texts(&session).last().unwrap().1, "Final answer.");
        assert_eq!(session.phase(), SessionPhase::SessionEnded);
        assert!(!session.controls().input_enabled);
        assert!(!session.controls().send_enabled);
        assert!(!session.controls().mic_enabled);
        assert_eq!(session.controls().placeholder, SESSION_ENDED_PROMPT);
    }

    #[test]
    fn test_tenth_question_ends_even_on_error_reply() {
        let mut session = therapy_session(9);
        let pending = request(session.submit("Last one?"));
        session.resolve(
            pending,
            Ok(Reply::FollowUp(TherapyResponse {
                answer: None,
                error: Some("server hiccup".to_string()),
            })),
        );
        assert_eq!(session.phase(), SessionPhase::SessionEnded);
        assert_eq!(session.question_count(), MAX_QUESTIONS);
    }

    #[test]
    fn test_restore_with_exhausted_quota_ends() {
        let session = therapy_session(12);
        assert_eq!(session.question_count(), MAX_QUESTIONS);
        assert_eq!(session.phase(), SessionPhase::SessionEnded);
        assert!(!session.controls().input_enabled);
    }

    #[test]
    fn test_counter_never_exceeds_limit() {
        let mut session = therapy_session(8);
        for i in 0..5 {
            if let Submission::Request(pending) = session.submit(&format!("q{}", i)) {
                session.resolve(
                    pending,
                    Ok(Reply::FollowUp(TherapyResponse {
                        answer: Some("a".to_string()),
                        error: None,
                    })),
                );
            }
            assert!(session.question_count() <= MAX_QUESTIONS);
        }
        assert_eq!(session.question_count(), MAX_QUESTIONS);
        assert_eq!(session.phase(), SessionPhase::SessionEnded);
    }

    #[test]
    fn test_mismatched_reply_is_a_failure() {
        let mut session = therapy_session(0);
        let pending = request(session.submit("q"));
        let placeholder = pending.placeholder();

        session.resolve(pending, Ok(Reply::Dream(DreamResponse::default())));

        assert_eq!(session.question_count(), 0);
        assert_eq!(
            session.log().get(placeholder).unwrap().text().unwrap(),
            FOLLOW_UP_ERROR
        );
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut session = ChatSession::default();
        request(session.submit("<img src=x onerror=alert(1)>"));
        let first = &session.log().messages()[0];
        assert_eq!(first.kind, MessageKind::Text);
        assert_eq!(first.content, "&lt;img src=x onerror=alert(1)&gt;");
    }

    #[test]
    fn test_submit_input_uses_field() {
        let mut session = ChatSession::default();
        session.set_input("typed dream");
        let pending = request(session.submit_input());
        assert!(matches!(pending, PendingRequest::Dream { .. }));
        assert_eq!(session.controls().input, "");
    }
}
