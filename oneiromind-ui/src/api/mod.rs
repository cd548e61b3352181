//! API Layer
//!
//! Talks to the chat server from the browser.

pub mod client;

pub use client::ApiClient;
