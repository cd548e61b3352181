//! OneiroMind Chat Page
//!
//! Dream interpretation chat built with Leptos (WASM).
//!
//! # Features
//!
//! - Dream submission with a generated interpretation and image
//! - Up to ten follow-up questions per session
//! - Voice input through the browser's speech recognition
//! - Click-to-enlarge dream images
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. The server renders the session into the page; the app reads
//! it once at startup and then talks to the chat API over HTTP.

use leptos::*;

mod api;
mod app;
mod components;
mod pages;
mod state;
mod voice;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    let seed = state::read_page_seed();

    // Mount the app to the document body
    mount_to_body(move || view! { <app::App seed=seed /> });
}
