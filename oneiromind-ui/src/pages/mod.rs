//! Pages
//!
//! Route-level components.

mod chat;
mod login;

pub use chat::ChatPage;
pub use login::LoginPage;
