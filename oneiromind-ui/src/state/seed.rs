//! Page Seed
//!
//! The server renders the session's hidden fields and the conversation so
//! far into the page. They are read here once, before the app mounts, and the
//! server-rendered widgets are then removed so each id exists only once.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use oneiromind::chat::{SeedMessage, Sender, SessionSeed};

/// Server-rendered elements the app mounts its own copy of
const SERVER_ELEMENTS: [&str; 4] = ["#chat-window", "#chat-form", "#image-modal", "#login-form"];

/// Sender of a `.message` element from its class attribute
pub fn sender_from_classes(class_name: &str) -> Sender {
    if class_name.split_whitespace().any(|c| c == "user") {
        Sender::User
    } else {
        Sender::Bot
    }
}

fn hidden_value(document: &Document, id: &str) -> Option<String> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value())
}

fn read_message(element: &Element, out: &mut Vec<SeedMessage>) {
    let sender = sender_from_classes(&element.class_name());

    if let Ok(Some(img)) = element.query_selector("img.dream-image") {
        if let Some(src) = img.get_attribute("src") {
            out.push(SeedMessage::image(sender, src));
        }
    }

    if let Ok(Some(text)) = element.query_selector(".message-text") {
        out.push(SeedMessage::text(sender, text.inner_html().trim()));
    }
}

/// Read the session seed out of the current document
pub fn read_page_seed() -> SessionSeed {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return SessionSeed::default();
    };

    let state = hidden_value(&document, "session-state");
    let id = hidden_value(&document, "session-id-input");

    let mut messages = Vec::new();
    if let Ok(nodes) = document.query_selector_all(".message") {
        for i in 0..nodes.length() {
            if let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                read_message(&element, &mut messages);
            }
        }
    }

    // Hidden fields may live inside the form, so only after they are read
    for selector in SERVER_ELEMENTS {
        if let Ok(Some(element)) = document.query_selector(selector) {
            element.remove();
        }
    }

    let seed = SessionSeed::from_fields(state.as_deref(), id.as_deref()).with_messages(messages);
    web_sys::console::log_1(
        &format!(
            "Session state initialized to: {} (id: {:?}, {} messages)",
            seed.phase,
            seed.session_id,
            seed.messages.len()
        )
        .into(),
    );
    seed
}
