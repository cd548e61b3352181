//! Chat Page State
//!
//! Reactive state for the chat page using Leptos signals. The session
//! object owns everything the page shows; components read it and send their
//! events back through the methods here.

use leptos::*;
use std::rc::Rc;

use oneiromind::chat::{ChatSession, Outcome, SessionId, SessionSeed, Submission};
use oneiromind::modal::{ImageModal, ModalTarget};
use oneiromind::voice::{MicCommand, SpeechEvent, VoiceInput};

use crate::api::ApiClient;
use crate::voice::BrowserSpeech;

/// Chat page state provided to all components
#[derive(Clone, Copy)]
pub struct ChatState {
    /// Session phase, message log and input controls
    pub session: RwSignal<ChatSession>,
    /// Speech recognition state
    pub voice: RwSignal<VoiceInput>,
    /// Enlarged image overlay
    pub modal: RwSignal<ImageModal>,
    speech: StoredValue<Rc<BrowserSpeech>>,
    client: StoredValue<ApiClient>,
}

/// Provide chat state to the component tree
pub fn provide_chat_state(seed: SessionSeed) -> ChatState {
    let speech = Rc::new(BrowserSpeech::new());
    let state = ChatState {
        session: create_rw_signal(ChatSession::restore(seed)),
        voice: create_rw_signal(VoiceInput::new(speech.as_ref())),
        modal: create_rw_signal(ImageModal::new()),
        speech: store_value(speech),
        client: store_value(ApiClient::default()),
    };

    state
        .speech
        .with_value(|speech| speech.on_event(move |event| state.handle_speech(event)));

    provide_context(state);
    state
}

/// Leave for another session's page
fn navigate(id: SessionId) {
    let path = id.chat_path();
    web_sys::console::log_1(&format!("Opening session {}", path).into());
    if let Err(e) = window().location().set_href(&path) {
        web_sys::console::error_1(&format!("Navigation to {} failed: {:?}", path, e).into());
    }
}

impl ChatState {
    /// Submit the input field. The request runs on the browser's event
    /// loop; the send button stays disabled until it settles.
    pub fn submit(&self) {
        let Some(submission) = self.session.try_update(|s| s.submit_input()) else {
            return;
        };

        let Submission::Request(pending) = submission else {
            return;
        };

        let session = self.session;
        let client = self.client.get_value();
        spawn_local(async move {
            let reply = pending.send(&client).await;
            if let Err(e) = &reply {
                web_sys::console::error_1(&format!("Request failed: {}", e).into());
            }
            match session.try_update(|s| s.resolve(pending, reply)) {
                Some(Outcome::Navigate(id)) => navigate(id),
                Some(Outcome::Ended) => {
                    web_sys::console::log_1(&"Session ended".into());
                }
                _ => {}
            }
        });
    }

    pub fn set_input(&self, text: String) {
        self.session.update(|s| s.set_input(text));
    }

    /// Mic button clicked
    pub fn toggle_mic(&self) {
        let command: MicCommand = self
            .session
            .with(|session| self.voice.with(|voice| voice.toggle(session)));
        if command == MicCommand::Ignore {
            return;
        }

        let speech = self.speech.get_value();
        let voice = self.voice;
        self.session
            .update(|session| voice.update(|v| v.apply(command, speech.as_ref(), session)));
    }

    fn handle_speech(&self, event: SpeechEvent) {
        let voice = self.voice;
        self.session
            .update(|session| voice.update(|v| v.handle(event, session)));
    }

    pub fn open_image(&self, src: String) {
        self.modal.update(|m| m.open(src));
    }

    pub fn modal_click(&self, target: ModalTarget) {
        self.modal.update(|m| m.on_click(target));
    }
}
