//! Star rating display and picker

use leptos::*;
use novelly::catalog::{stars, Star};

/// Read-only five-star rating
#[component]
pub fn StarRating(rating: f64) -> impl IntoView {
    view! {
        <span class="text-yellow-400" title=format!("{:.1}", rating)>
            {stars(rating)
                .into_iter()
                .map(|star| view! { <span class=star.class()>{star.glyph()}</span> })
                .collect_view()}
        </span>
    }
}

/// Clickable 1-5 picker for the review form
#[component]
pub fn StarPicker(value: RwSignal<u8>) -> impl IntoView {
    view! {
        <span class="text-2xl text-yellow-400 cursor-pointer">
            {(1..=5u8)
                .map(|n| {
                    let glyph = move || {
                        if value.get() >= n { Star::Full.glyph() } else { Star::Empty.glyph() }
                    };
                    view! { <span on:click=move |_| value.set(n)>{glyph}</span> }
                })
                .collect_view()}
        </span>
    }
}
