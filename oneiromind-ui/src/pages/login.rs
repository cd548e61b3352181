//! Login Page
//!
//! Plain form post to `/login`. The fields are checked first; a submit with
//! a blank field never leaves the page.

use leptos::html::Input;
use leptos::*;

use oneiromind::login::{LoginCheck, LoginForm};

#[component]
pub fn LoginPage() -> impl IntoView {
    let form = create_rw_signal(LoginForm::new());
    let email_ref = create_node_ref::<Input>();
    let password_ref = create_node_ref::<Input>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        let email = email_ref.get().map(|el| el.value()).unwrap_or_default();
        let password = password_ref.get().map(|el| el.value()).unwrap_or_default();

        let check = form.try_update(|f| f.on_submit(&email, &password));
        if let Some(LoginCheck::Prevent(reason)) = check {
            web_sys::console::log_1(&format!("Login blocked: {}", reason).into());
            ev.prevent_default();
        }
    };

    view! {
        <div class="login-container">
            <h1>"OneiroMind"</h1>
            <form id="login-form" action="/login" method="post" on:submit=on_submit>
                <input type="email" id="email" name="email" placeholder="Email" node_ref=email_ref />
                <input
                    type="password"
                    id="password"
                    name="password"
                    placeholder="Password"
                    node_ref=password_ref
                />
                <p
                    id="error-msg"
                    class="error"
                    style=move || {
                        if form.with(|f| f.error_visible) { "display: block" } else { "display: none" }
                    }
                >
                    "Please enter both email and password."
                </p>
                <button type="submit">"Log In"</button>
            </form>
        </div>
    }
}
