//! Not Found Page
//!
//! Warns and sends the user to `fallback` after `delay`, unless they leave first.

use leptos::*;
use std::time::Duration;

use crate::state::GlobalState;

#[component]
pub fn NotFound(path: String, fallback: &'static str, delay: Duration) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    state.show_warning("Page not found. Redirecting...");

    let redirect = state.navigate_later(fallback, delay.as_millis() as u32);
    on_cleanup(move || drop(redirect));

    view! {
        <div class="text-center py-20 space-y-4">
            <h1 class="text-6xl font-bold text-gray-600">"404"</h1>
            <h2 class="text-2xl font-semibold">"Page not found"</h2>
            <p class="text-gray-400">
                {format!("No page at \"{}\". ", path)}
                {format!("Redirecting in {} seconds...", delay.as_secs())}
            </p>
            <a href="#/home" class="text-blue-400 hover:underline">"Go to Home now"</a>
        </div>
    }
}
