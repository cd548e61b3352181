//! Chat transport
//!
//! The three calls the chat page makes, as a trait so the session state
//! machine can run against the browser's fetch, a native HTTP client, or a
//! test double.
//!
//! | Call | Endpoint |
//! |---|---|
//! | [`ChatTransport::submit_dream`] | `POST /submit_message` |
//! | [`ChatTransport::start_therapy`] | `POST /start_therapy` |
//! | [`ChatTransport::ask_follow_up`] | `POST /therapy` |
//!
//! The trait is `?Send`: the browser client holds `JsValue`s across awaits.

pub mod dto;
pub mod error;
#[cfg(feature = "native")]
pub mod http;

pub use dto::{
    BotMessage, DreamRequest, DreamResponse, StartTherapyRequest, StartTherapyResponse,
    TherapyRequest, TherapyResponse,
};
pub use error::{TransportError, TransportResult};
#[cfg(feature = "native")]
pub use http::{HttpTransport, HttpTransportConfig};

use async_trait::async_trait;

/// Endpoint paths, relative to the server base URL
pub mod paths {
    pub const SUBMIT_DREAM: &str = "/submit_message";
    pub const START_THERAPY: &str = "/start_therapy";
    pub const THERAPY: &str = "/therapy";
    pub const LOGIN: &str = "/login";
    pub const HOME: &str = "/";
}

/// Client side of the chat API
#[async_trait(?Send)]
pub trait ChatTransport {
    /// Submit the initial dream; success carries the new session id
    async fn submit_dream(&self, request: &DreamRequest) -> TransportResult<DreamResponse>;

    /// Confirm the therapy phase for a session
    async fn start_therapy(
        &self,
        request: &StartTherapyRequest,
    ) -> TransportResult<StartTherapyResponse>;

    /// Ask one follow-up question with the conversation so far
    async fn ask_follow_up(&self, request: &TherapyRequest) -> TransportResult<TherapyResponse>;
}
