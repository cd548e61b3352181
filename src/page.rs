//! Rendered page reader
//!
//! Reads a server-rendered chat page into a [`SessionSeed`]: the
//! `session-state` and `session-id-input` hidden fields, and the `.message`
//! bubbles in document order. This is the native twin of the browser reading
//! its own DOM on load.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::chat::{SeedMessage, Sender, SessionSeed};

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Invalid selector {selector:?}: {message}")]
    Selector { selector: &'static str, message: String },

    #[error("Page has no chat form; is this a chat page?")]
    NotAChatPage,
}

pub type PageResult<T> = Result<T, PageError>;

const STATE_FIELD: &str = "#session-state";
const ID_FIELD: &str = "#session-id-input";
const CHAT_FORM: &str = "#chat-form";
const MESSAGE: &str = ".message";
const MESSAGE_TEXT: &str = ".message-text";
const DREAM_IMAGE: &str = "img.dream-image";

fn selector(selector: &'static str) -> PageResult<Selector> {
    Selector::parse(selector).map_err(|e| PageError::Selector {
        selector,
        message: e.to_string(),
    })
}

fn field_value(document: &Html, id: &'static str) -> PageResult<Option<String>> {
    let sel = selector(id)?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(str::to_string))
}

fn read_message(
    element: ElementRef<'_>,
    text_sel: &Selector,
    image_sel: &Selector,
    out: &mut Vec<SeedMessage>,
) {
    let sender = if element.value().classes().any(|c| c == "user") {
        Sender::User
    } else {
        Sender::Bot
    };

    if let Some(src) = element
        .select(image_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
    {
        out.push(SeedMessage::image(sender, src));
    }

    if let Some(text) = element.select(text_sel).next() {
        out.push(SeedMessage::text(sender, text.inner_html().trim()));
    }
}

/// Parse a chat page into a session seed
pub fn parse_chat_page(html: &str) -> PageResult<SessionSeed> {
    let document = Html::parse_document(html);

    let form = selector(CHAT_FORM)?;
    if document.select(&form).next().is_none() {
        return Err(PageError::NotAChatPage);
    }

    let state = field_value(&document, STATE_FIELD)?;
    let id = field_value(&document, ID_FIELD)?;

    let message_sel = selector(MESSAGE)?;
    let text_sel = selector(MESSAGE_TEXT)?;
    let image_sel = selector(DREAM_IMAGE)?;

    let mut messages = Vec::new();
    for element in document.select(&message_sel) {
        read_message(element, &text_sel, &image_sel, &mut messages);
    }

    let seed = SessionSeed::from_fields(state.as_deref(), id.as_deref()).with_messages(messages);
    debug!(
        phase = %seed.phase,
        session_id = ?seed.session_id,
        messages = seed.messages.len(),
        "Parsed chat page"
    );
    Ok(seed)
}
