//! Chat session core
//!
//! The session state machine, its message log, and the seed read from a
//! server-rendered page. Nothing here touches the network or the DOM.

pub mod dispatch;
pub mod log;
pub mod seed;
pub mod session;
pub mod types;

pub use dispatch::send_message;
pub use log::MessageLog;
pub use seed::{SeedMessage, SessionSeed};
pub use session::{
    is_affirmative, ChatSession, Controls, Outcome, PendingRequest, Reply, Submission,
    AFFIRMATIVE_ANSWERS, DREAM_PROMPT, SESSION_ENDED_PROMPT, THERAPY_START_PROMPT,
};
pub use types::{
    Message, MessageId, MessageKind, SessionId, SessionPhase, Sender, UnknownPhase, MAX_QUESTIONS,
};
