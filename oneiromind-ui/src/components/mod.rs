//! UI Components
//!
//! Pieces of the chat page.

mod chat_form;
mod image_modal;
mod message_list;

pub use chat_form::ChatForm;
pub use image_modal::ImageModal;
pub use message_list::MessageList;
