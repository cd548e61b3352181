//! Message List Component
//!
//! Renders the session's message log as chat bubbles and keeps the newest
//! one in view.

use leptos::html::Div;
use leptos::*;

use oneiromind::chat::{Message, MessageKind};

use crate::state::ChatState;

/// Scrolling chat log
#[component]
pub fn MessageList() -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");
    let window_ref = create_node_ref::<Div>();

    let messages = move || state.session.with(|s| s.log().messages().to_vec());

    // Scroll to the latest message after each change to the log, including
    // a placeholder replaced in place
    create_effect(move |_| {
        state.session.with(|s| {
            let log = s.log();
            (log.len(), log.messages().last().map(|m| m.content.len()))
        });
        gloo_timers::callback::Timeout::new(0, move || {
            if let Some(el) = window_ref.get_untracked() {
                el.set_scroll_top(el.scroll_height());
            }
        })
        .forget();
    });

    view! {
        <div id="chat-window" class="chat-window" node_ref=window_ref>
            <For
                each=messages
                key=|message| (message.id, message.content.clone())
                children=move |message| view! { <MessageBubble message=message /> }
            />
        </div>
    }
}

#[component]
fn MessageBubble(message: Message) -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");
    let class = format!("message {}", message.sender.css_class());

    match message.kind {
        MessageKind::Image => {
            let src = message.content;
            let open_src = src.clone();
            view! {
                <div class=class>
                    <div class="image-container">
                        <img
                            class="dream-image"
                            src=src
                            alt="Dream Visualization"
                            on:click=move |_| state.open_image(open_src.clone())
                        />
                    </div>
                </div>
            }
            .into_view()
        }
        MessageKind::Text => {
            let class = if message.transient {
                format!("{} thinking", class)
            } else {
                class
            };
            view! {
                <div class=class>
                    <div class="message-text" inner_html=message.content />
                </div>
            }
            .into_view()
        }
    }
}
