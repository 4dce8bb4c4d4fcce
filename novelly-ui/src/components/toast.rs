//! Toast Notification Component
//!
//! Shows the current success, error, warning or info message.

use leptos::*;

use crate::state::global::{GlobalState, ToastMessage};

/// Toast notification container
#[component]
pub fn Toast() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let toast = state.toast;

    view! {
        <div class="fixed bottom-6 right-4 z-50 space-y-2">
            {move || toast.get().map(|message| view! { <ToastItem message=message /> })}
        </div>
    }
}

#[component]
fn ToastItem(message: ToastMessage) -> impl IntoView {
    let state = expect_context::<GlobalState>();

    view! {
        <div class=format!(
            "flex items-center space-x-3 {} text-white px-4 py-3 rounded-lg shadow-lg \
             transform transition-all duration-300 ease-out animate-slide-in",
            message.kind.class()
        )>
            <span class="text-lg">{message.kind.icon()}</span>
            <span class="text-sm font-medium">{message.text}</span>
            <button class="ml-2 text-white/70 hover:text-white" on:click=move |_| state.dismiss_toast()>
                "×"
            </button>
        </div>
    }
}
