//! # OneiroMind
//!
//! Client for the OneiroMind dream interpretation service. A conversation
//! moves through three stages: the user describes a dream, opts into
//! follow-up questions, then asks up to ten of them.
//!
//! ## Modules
//!
//! - [`chat`]: Session state machine, message log and page seed
//! - [`transport`]: The chat endpoints as a trait, plus the native HTTP client
//! - [`voice`]: Speech recognition adapter for the input field
//! - [`modal`]: Click-to-enlarge image overlay
//! - [`login`]: Login form validation
//! - [`markup`]: Text extraction and escaping for server HTML
//!
//! With the default `native` feature the crate also carries a rendered-page
//! reader ([`page`]), file configuration ([`config`]) and a terminal
//! renderer ([`terminal`]). The browser front-end builds without it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oneiromind::chat::{send_message, ChatSession, Outcome};
//! use oneiromind::login::check_login;
//! use oneiromind::page::parse_chat_page;
//! use oneiromind::transport::{HttpTransport, HttpTransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(HttpTransportConfig::default())?;
//!     if let oneiromind::login::LoginCheck::Allow(credentials) = check_login("me@example.com", "pw") {
//!         transport.login(&credentials).await?;
//!     }
//!
//!     let page = transport.load_page("/").await?;
//!     let mut session = ChatSession::restore(parse_chat_page(&page)?);
//!
//!     if let Outcome::Navigate(id) = send_message(&mut session, &transport, "I dreamt of the sea").await {
//!         println!("Continue at {}", id.chat_path());
//!     }
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod login;
pub mod markup;
pub mod modal;
pub mod transport;
pub mod voice;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod page;
#[cfg(feature = "native")]
pub mod terminal;

// Re-export top-level types for convenience
pub use chat::{
    send_message, ChatSession, Controls, Message, MessageId, MessageKind, MessageLog, Outcome,
    PendingRequest, Reply, Sender, SessionId, SessionPhase, SessionSeed, Submission,
    MAX_QUESTIONS,
};

pub use transport::{ChatTransport, TransportError, TransportResult};

pub use login::{check_login, Credentials, LoginCheck, LoginError, LoginForm};

pub use modal::{ImageModal, ModalTarget};

pub use voice::{
    MicCommand, NoSpeech, SpeechCapability, SpeechError, SpeechEvent, VoiceInput,
};

#[cfg(feature = "native")]
pub use transport::{HttpTransport, HttpTransportConfig};

#[cfg(feature = "native")]
pub use config::{Config, ConfigError, LoggingConfig, ServerConfig};

#[cfg(feature = "native")]
pub use page::{parse_chat_page, PageError};
