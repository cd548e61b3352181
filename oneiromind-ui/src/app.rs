//! App Root Component
//!
//! Routing for the chat and login pages.

use leptos::*;
use leptos_router::*;

use oneiromind::chat::SessionSeed;

use crate::pages::{ChatPage, LoginPage};

/// Root application component
#[component]
pub fn App(seed: SessionSeed) -> impl IntoView {
    // Read once from the server-rendered page before mounting
    provide_context(seed);

    view! {
        <Router>
            <main class="app">
                <Routes>
                    <Route path="/" view=ChatPage />
                    <Route path="/chat/:id" view=ChatPage />
                    <Route path="/login" view=LoginPage />
                    <Route path="/*any" view=NotFound />
                </Routes>
            </main>
        </Router>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="not-found">
            <h1>"Page Not Found"</h1>
            <p>"The page you're looking for doesn't exist."</p>
            <a href="/">"Start a new dream"</a>
        </div>
    }
}
