//! Loading Component
//!
//! Inline spinner and the request overlay.

use leptos::*;

use crate::state::global::GlobalState;

/// Inline loading spinner
#[component]
pub fn Loading(#[prop(optional, into)] message: Option<String>) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center py-12 space-y-3">
            <div class="loading-spinner w-8 h-8" />
            {message.map(|m| view! { <p class="text-gray-400 text-sm">{m}</p> })}
        </div>
    }
}

/// Full-screen overlay shown while any request is in flight
#[component]
pub fn Spinner() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let pending = state.pending;

    view! {
        <Show when=move || pending.get() > 0>
            <div class="fixed inset-0 bg-gray-900/50 flex items-center justify-center z-50">
                <div class="loading-spinner w-12 h-12" />
            </div>
        </Show>
    }
}

/// Skeleton loader for novel grids
#[component]
pub fn GridSkeleton(#[prop(default = 6)] count: usize) -> impl IntoView {
    view! {
        <div class="grid grid-cols-2 md:grid-cols-4 lg:grid-cols-6 gap-4 animate-pulse">
            {(0..count)
                .map(|_| view! {
                    <div class="bg-gray-800 rounded-lg p-3">
                        <div class="h-40 bg-gray-700 rounded mb-3" />
                        <div class="h-4 bg-gray-700 rounded w-2/3" />
                    </div>
                })
                .collect_view()}
        </div>
    }
}
