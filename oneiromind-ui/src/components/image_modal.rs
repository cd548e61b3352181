//! Image Modal Component
//!
//! Full-size view of a dream image.

use leptos::*;

use oneiromind::modal::ModalTarget;

use crate::state::ChatState;

#[component]
pub fn ImageModal() -> impl IntoView {
    let state = use_context::<ChatState>().expect("ChatState not found");

    // Clicks on the image bubble up here too; only the overlay itself closes
    let on_overlay_click = move |ev: web_sys::MouseEvent| {
        let target = if ev.target() == ev.current_target() {
            ModalTarget::Overlay
        } else {
            ModalTarget::Image
        };
        state.modal_click(target);
    };

    view! {
        <div
            id="image-modal"
            class="modal"
            style=move || {
                if state.modal.with(|m| m.is_open()) {
                    "display: flex"
                } else {
                    "display: none"
                }
            }
            on:click=on_overlay_click
        >
            <span
                class="close-modal-btn"
                on:click=move |ev: web_sys::MouseEvent| {
                    ev.stop_propagation();
                    state.modal_click(ModalTarget::CloseButton);
                }
            >
                "×"
            </span>
            <img
                id="modal-img"
                class="modal-content"
                alt="Dream Visualization"
                src=move || state.modal.with(|m| m.image().unwrap_or_default().to_string())
            />
        </div>
    }
}
