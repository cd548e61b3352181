//! Chat Form Component
//!
//! Text input, microphone toggle and send button. All three follow the
//! session's controls.

use leptos::*;

use crate::state::ChatState;

/// Input area under the chat log
#[component]
pub fn ChatForm() -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");
    let controls = move || state.session.with(|s| s.controls().clone());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        state.submit();
    };

    view! {
        <form id="chat-form" class="chat-form" on:submit=on_submit>
            <input
                type="text"
                id="user-input"
                autocomplete="off"
                placeholder=move || controls().placeholder
                prop:value=move || controls().input
                prop:disabled=move || !controls().input_enabled
                on:input=move |ev| state.set_input(event_target_value(&ev))
            />
            <MicButton />
            <button type="submit" disabled=move || {
                let c = controls();
                !c.send_enabled || !c.input_enabled
            }>
                "Send"
            </button>
        </form>
    }
}

#[component]
fn MicButton() -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");

    // Hidden for good when the browser has no recognizer
    if !state.voice.with_untracked(|v| v.is_supported()) {
        return view! {}.into_view();
    }

    view! {
        <button
            type="button"
            id="mic-button"
            class=move || {
                if state.voice.with(|v| v.is_listening()) {
                    "mic-button listening"
                } else {
                    "mic-button"
                }
            }
            disabled=move || state.session.with(|s| !s.controls().mic_enabled)
            on:click=move |_| state.toggle_mic()
        >
            "🎤"
        </button>
    }
    .into_view()
}
