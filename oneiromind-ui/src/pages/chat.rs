//! Chat Page
//!
//! Dream submission, therapy start and follow-up questions, all on one page.

use leptos::*;

use oneiromind::chat::SessionSeed;

use crate::components::{ChatForm, ImageModal, MessageList};
use crate::state::provide_chat_state;

#[component]
pub fn ChatPage() -> impl IntoView {
    let seed = use_context::<SessionSeed>().unwrap_or_default();
    provide_chat_state(seed);

    view! {
        <div class="chat-container">
            <MessageList />
            <ChatForm />
            <ImageModal />
        </div>
    }
}
