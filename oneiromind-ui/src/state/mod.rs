//! State Management
//!
//! Chat page state and the one-time read of the server-rendered page.

pub mod chat;
pub mod seed;

pub use chat::{provide_chat_state, ChatState};
pub use seed::read_page_seed;
