//! Search Page
//!
//! Shows results handed over by the header search, or fetches `q` when the
//! page is opened directly.

use leptos::*;
use novelly::catalog::{excerpt, highlight, Segment, ROW_EXCERPT_CHARS};
use novelly::models::Novel;

use super::{EmptyState, ErrorMessage};
use crate::components::{Loading, NovelRow};
use crate::state::{log_error, GlobalState};

#[derive(Clone, PartialEq)]
enum SearchView {
    Prompt,
    Loading,
    Results { query: String, novels: Vec<Novel> },
    Failed,
}

#[component]
pub fn Search(query: String) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let view_state = create_rw_signal(SearchView::Loading);

    match state.store.take_search() {
        Some(handoff) => view_state.set(SearchView::Results {
            query: handoff.query,
            novels: handoff.results,
        }),
        None if !query.trim().is_empty() => {
            let query = query.trim().to_string();
            spawn_local(async move {
                match state.api().novels().search(&query).await {
                    Ok(novels) => view_state.set(SearchView::Results { query, novels }),
                    Err(e) => {
                        log_error(&format!("Search error: {}", e));
                        view_state.set(SearchView::Failed);
                    }
                }
            });
        }
        None => view_state.set(SearchView::Prompt),
    }

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Search Results"</h1>
            {move || match view_state.get() {
                SearchView::Prompt => view! {
                    <EmptyState
                        title="Start Searching"
                        message="Use the search bar in the header to find novels by title or author"
                    />
                }
                .into_view(),
                SearchView::Loading => view! { <Loading message="Searching..." /> }.into_view(),
                SearchView::Failed => {
                    view! { <ErrorMessage message="Failed to search novels. Please try again." /> }.into_view()
                }
                SearchView::Results { query, novels } if novels.is_empty() => view! {
                    <EmptyState
                        title="No results found"
                        message=format!("No novels match \"{}\"", query)
                    />
                }
                .into_view(),
                SearchView::Results { query, novels } => view! {
                    <p class="text-gray-400">{format!("{} results for \"{}\"", novels.len(), query)}</p>
                    <div class="space-y-3">
                        {novels
                            .into_iter()
                            .map(|novel| view! { <SearchResult novel=novel query=query.clone() /> })
                            .collect_view()}
                    </div>
                }
                .into_view(),
            }}
        </div>
    }
}

#[component]
fn SearchResult(novel: Novel, query: String) -> impl IntoView {
    let title = highlighted(&novel.title, &query);
    let author = highlighted(novel.author_or_unknown(), &query);
    let description = excerpt(novel.description_or_empty(), ROW_EXCERPT_CHARS);

    view! {
        <NovelRow novel=novel>
            <h3 class="font-semibold">{title}</h3>
            <p class="text-sm text-gray-400">{author}</p>
            <p class="text-xs text-gray-500 mt-1">{description}</p>
        </NovelRow>
    }
}

fn highlighted(text: &str, query: &str) -> View {
    highlight(text, query)
        .into_iter()
        .map(|Segment { text, highlighted: marked }| {
            if marked {
                view! { <mark class="bg-yellow-500/40 text-inherit rounded px-0.5">{text}</mark> }.into_view()
            } else {
                text.into_view()
            }
        })
        .collect_view()
}
