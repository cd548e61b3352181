//! Voice input
//!
//! Speech recognition fills the chat input while the user talks. The
//! platform recognizer sits behind [`SpeechCapability`]; [`VoiceInput`]
//! turns its events into changes on the [`ChatSession`].
//!
//! Recognition runs continuously with interim results, and every results
//! event carries the full transcript so far, so the input is overwritten
//! rather than appended to.

use thiserror::Error;
use tracing::{debug, warn};

use crate::chat::ChatSession;

pub const LISTENING_PROMPT: &str = "Listening... click mic again to stop.";

/// Recognition language
pub const RECOGNITION_LANG: &str = "en-US";

/// Errors raised by a speech capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("Speech recognition is not supported")]
    Unsupported,

    #[error("Speech recognition failed to start: {0}")]
    Start(String),
}

pub type SpeechResult<T> = Result<T, SpeechError>;

/// Platform speech recognizer
pub trait SpeechCapability {
    /// Checked once when the page starts
    fn is_supported(&self) -> bool;

    fn start(&self) -> SpeechResult<()>;

    fn stop(&self);
}

/// Fallback when the platform has no recognizer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

impl SpeechCapability for NoSpeech {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&self) -> SpeechResult<()> {
        Err(SpeechError::Unsupported)
    }

    fn stop(&self) {}
}

/// Events delivered by the recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    /// Best transcript of each result received so far, in order
    Results(Vec<String>),
    Ended,
    /// Recognizer error code (`no-speech`, `not-allowed`, ...)
    Error(String),
}

/// What the caller should do with the recognizer after a mic click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicCommand {
    Start,
    Stop,
    Ignore,
}

/// Readable message for a recognizer error code
pub fn describe_error(code: &str) -> String {
    match code {
        "no-speech" => "No speech was detected. Please try again.".to_string(),
        "audio-capture" => "Microphone problem. Please check its connection.".to_string(),
        "not-allowed" => {
            "Microphone access was denied. Please allow it in your browser settings.".to_string()
        }
        other => format!("An unknown error occurred: {}", other),
    }
}

/// Voice input state for one chat page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceInput {
    supported: bool,
    listening: bool,
}

impl VoiceInput {
    /// Probe the capability once
    pub fn new(capability: &dyn SpeechCapability) -> Self {
        Self {
            supported: capability.is_supported(),
            listening: false,
        }
    }

    /// Whether the mic control should be shown at all
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Mic button clicked
    pub fn toggle(&self, session: &ChatSession) -> MicCommand {
        if !self.supported || !session.controls().input_enabled || !session.controls().mic_enabled {
            return MicCommand::Ignore;
        }
        if self.listening {
            MicCommand::Stop
        } else {
            MicCommand::Start
        }
    }

    /// Apply a mic command to the capability. A failed start is reported
    /// the same way a recognizer error is.
    pub fn apply(
        &mut self,
        command: MicCommand,
        capability: &dyn SpeechCapability,
        session: &mut ChatSession,
    ) {
        match command {
            MicCommand::Start => {
                if let Err(e) = capability.start() {
                    warn!(error = %e, "Could not start speech recognition");
                    self.handle(SpeechEvent::Error(e.to_string()), session);
                }
            }
            MicCommand::Stop => capability.stop(),
            MicCommand::Ignore => {}
        }
    }

    /// Apply a recognizer event to the session
    pub fn handle(&mut self, event: SpeechEvent, session: &mut ChatSession) {
        match event {
            SpeechEvent::Started => {
                debug!("Listening");
                self.listening = true;
                session.set_placeholder(LISTENING_PROMPT);
            }
            SpeechEvent::Results(transcripts) => {
                session.set_input(transcripts.concat());
            }
            SpeechEvent::Ended => {
                debug!("Stopped listening");
                self.stop_listening(session);
            }
            SpeechEvent::Error(code) => {
                warn!(%code, "Speech recognition error");
                self.stop_listening(session);
                session.push_notice(format!(
                    "🎤 <strong>Error:</strong> {}",
                    crate::markup::escape_html(&describe_error(&code))
                ));
            }
        }
    }

    fn stop_listening(&mut self, session: &mut ChatSession) {
        self.listening = false;
        if !session.phase().is_terminal() {
            session.restore_placeholder();
        }
    }
}
