//! Novel Card Component
//!
//! Cover, title, author and a short description excerpt.

use leptos::*;
use novelly::catalog::{cover_url, excerpt, read_link, CARD_EXCERPT_CHARS, PLACEHOLDER_COVER};
use novelly::models::Novel;
use novelly::router::href;

use crate::state::global::GlobalState;

#[component]
pub fn NovelCard(novel: Novel) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let cover = cover_url(novel.cover_image.as_deref(), state.api().base_url());
    let link = href(&read_link(&novel));
    let description = excerpt(novel.description_or_empty(), CARD_EXCERPT_CHARS);
    let author = novel.author_or_unknown().to_string();

    view! {
        <a href=link class="block bg-gray-800 rounded-lg overflow-hidden hover:ring-2 hover:ring-blue-500 transition">
            <img
                src=cover
                alt=novel.title.clone()
                class="w-full h-48 object-cover"
                on:error=|ev| {
                    use wasm_bindgen::JsCast;
                    if let Some(img) = ev
                        .target()
                        .and_then(|t| t.dyn_into::<web_sys::HtmlImageElement>().ok())
                    {
                        img.set_src(PLACEHOLDER_COVER);
                    }
                }
            />
            <div class="p-3">
                <h3 class="font-semibold truncate">{novel.title}</h3>
                <p class="text-sm text-gray-400">{author}</p>
                <p class="text-xs text-gray-500 mt-1">{description}</p>
            </div>
        </a>
    }
}

/// Compact row for search results; children render beside the cover
#[component]
pub fn NovelRow(novel: Novel, children: Children) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let cover = cover_url(novel.cover_image.as_deref(), state.api().base_url());
    let link = href(&read_link(&novel));

    view! {
        <a href=link class="flex items-center space-x-4 bg-gray-800 rounded-lg p-3 hover:bg-gray-700">
            <img src=cover alt=novel.title.clone() class="w-12 h-16 object-cover rounded" />
            <div class="flex-1 min-w-0">{children()}</div>
        </a>
    }
}
