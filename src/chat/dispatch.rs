//! Request dispatch
//!
//! Runs a [`PendingRequest`] over a [`ChatTransport`]. Front-ends that own
//! their executor call [`PendingRequest::send`] themselves; everything else
//! can use [`send_message`].

use tracing::debug;

use super::session::{ChatSession, Outcome, PendingRequest, Reply, Submission};
use crate::transport::{ChatTransport, TransportResult};

impl PendingRequest {
    /// Perform the call this request stands for
    pub async fn send<T>(&self, transport: &T) -> TransportResult<Reply>
    where
        T: ChatTransport + ?Sized,
    {
        match self {
            PendingRequest::Dream { request, .. } => {
                transport.submit_dream(request).await.map(Reply::Dream)
            }
            PendingRequest::StartTherapy { request, .. } => {
                transport.start_therapy(request).await.map(Reply::StartTherapy)
            }
            PendingRequest::FollowUp { request, .. } => {
                transport.ask_follow_up(request).await.map(Reply::FollowUp)
            }
        }
    }
}

/// Submit `text` and, if that needs the server, wait for the reply
pub async fn send_message<T>(session: &mut ChatSession, transport: &T, text: &str) -> Outcome
where
    T: ChatTransport + ?Sized,
{
    match session.submit(text) {
        Submission::Ignored => {
            debug!("Submission ignored");
            if session.phase().is_terminal() {
                Outcome::Ended
            } else {
                Outcome::Continue
            }
        }
        Submission::Local => {
            if session.phase().is_terminal() {
                Outcome::Ended
            } else {
                Outcome::Continue
            }
        }
        Submission::Request(pending) => {
            let reply = pending.send(transport).await;
            session.resolve(pending, reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{SessionId, SessionPhase};
    use crate::transport::{
        BotMessage, DreamRequest, DreamResponse, StartTherapyRequest, StartTherapyResponse,
        TherapyRequest, TherapyResponse, TransportError,
    };
    use async_trait::async_trait;
    use std::cell::RefCell;

    /// Scripted transport that records what it was asked
    #[derive(Default)]
    struct FakeTransport {
        dream: Option<TransportResult<DreamResponse>>,
        start: Option<TransportResult<StartTherapyResponse>>,
        follow_up: Option<TransportResult<TherapyResponse>>,
        calls: RefCell<Vec<String>>,
    }

    fn unscripted<T>() -> TransportResult<T> {
        Err(TransportError::Network("unscripted call".to_string()))
    }

    #[async_trait(?Send)]
    impl ChatTransport for FakeTransport {
        async fn submit_dream(&self, request: &DreamRequest) -> TransportResult<DreamResponse> {
            self.calls
                .borrow_mut()
                .push(format!("dream:{}", request.dream_text));
            self.dream.clone().unwrap_or_else(unscripted)
        }

        async fn start_therapy(
            &self,
            request: &StartTherapyRequest,
        ) -> TransportResult<StartTherapyResponse> {
            self.calls
                .borrow_mut()
                .push(format!("start:{:?}", request.session_id));
            self.start.clone().unwrap_or_else(unscripted)
        }

        async fn ask_follow_up(&self, request: &TherapyRequest) -> TransportResult<TherapyResponse> {
            self.calls
                .borrow_mut()
                .push(format!("therapy:{}", request.question));
            self.follow_up.clone().unwrap_or_else(unscripted)
        }
    }

    #[tokio::test]
    async fn test_dream_navigates() {
        let transport = FakeTransport {
            dream: Some(Ok(DreamResponse {
                session_id: Some(SessionId(5)),
                error: None,
            })),
            ..Default::default()
        };
        let mut session = ChatSession::default();

        let outcome = send_message(&mut session, &transport, "I dreamt of a tower").await;

        assert_eq!(outcome, Outcome::Navigate(SessionId(5)));
        assert_eq!(*transport.calls.borrow(), vec!["dream:I dreamt of a tower"]);
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_call() {
        let transport = FakeTransport::default();
        let mut session = ChatSession::default();

        let outcome = send_message(&mut session, &transport, "   ").await;

        assert_eq!(outcome, Outcome::Continue);
        assert!(transport.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_decline_makes_no_call() {
        let transport = FakeTransport::default();
        let mut session = ChatSession::new(SessionPhase::AwaitingTherapyStart, Some(SessionId(2)));

        let outcome = send_message(&mut session, &transport, "nope").await;

        assert_eq!(outcome, Outcome::Ended);
        assert!(transport.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_full_therapy_run() {
        let transport = FakeTransport {
            start: Some(Ok(StartTherapyResponse {
                bot_message: Some(BotMessage {
                    text: "Great. What is your first question?".to_string(),
                    sender: None,
                }),
            })),
            follow_up: Some(Ok(TherapyResponse {
                answer: Some("An answer.".to_string()),
                error: None,
            })),
            ..Default::default()
        };
        let mut session = ChatSession::new(SessionPhase::AwaitingTherapyStart, Some(SessionId(8)));

        assert_eq!(
            send_message(&mut session, &transport, "yes").await,
            Outcome::Continue
        );
        assert_eq!(session.phase(), SessionPhase::InTherapySession);

        for i in 1..10 {
            let outcome = send_message(&mut session, &transport, &format!("question {}", i)).await;
            assert_eq!(outcome, Outcome::Continue);
            assert_eq!(session.question_count(), i);
        }

        let outcome = send_message(&mut session, &transport, "question 10").await;
        assert_eq!(outcome, Outcome::Ended);
        assert_eq!(session.question_count(), 10);

        let outcome = send_message(&mut session, &transport, "question 11").await;
        assert_eq!(outcome, Outcome::Ended);

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 11);
        assert_eq!(calls[0], "start:Some(SessionId(8))");
        assert_eq!(calls[10], "therapy:question 10");
    }

    #[tokio::test]
    async fn test_transport_failure_reenables_send() {
        let transport = FakeTransport {
            follow_up: Some(Err(TransportError::Timeout)),
            ..Default::default()
        };
        let mut session = ChatSession::new(SessionPhase::InTherapySession, Some(SessionId(1)));

        let outcome = send_message(&mut session, &transport, "why?").await;

        assert_eq!(outcome, Outcome::Continue);
        assert!(session.controls().send_enabled);
        assert_eq!(session.question_count(), 0);
    }
}
