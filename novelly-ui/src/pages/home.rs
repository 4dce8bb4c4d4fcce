//! Home Page
//!
//! Popular novels strip and the paginated catalogue grid.

use leptos::*;
use novelly::catalog::{Paginator, GRID_PAGE_SIZE, POPULAR_COUNT};
use novelly::models::Novel;

use super::{EmptyState, ErrorMessage, SECONDARY_BUTTON};
use crate::components::{GridSkeleton, NovelCard};
use crate::state::{log_error, GlobalState};

#[component]
pub fn Home() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (novels, set_novels) = create_signal(None::<Result<Vec<Novel>, String>>);
    let (page, set_page) = create_signal(1usize);

    spawn_local(async move {
        match state.api().novels().list().await {
            Ok(list) => {
                let cached = list.clone();
                state.store.update(move |s| s.novels = cached);
                set_novels.set(Some(Ok(list)));
            }
            Err(e) => {
                log_error(&format!("Error loading novels: {}", e));
                set_novels.set(Some(Err(e.to_string())));
            }
        }
    });

    let popular = move || match novels.get() {
        None => view! { <GridSkeleton count=6 /> }.into_view(),
        Some(Err(_)) => view! { <ErrorMessage message="Failed to load latest novels" /> }.into_view(),
        Some(Ok(list)) => view! {
            <div class="flex space-x-4 overflow-x-auto pb-2">
                {list
                    .into_iter()
                    .take(POPULAR_COUNT)
                    .map(|novel| view! { <div class="w-40 flex-shrink-0"><NovelCard novel=novel /></div> })
                    .collect_view()}
            </div>
        }
        .into_view(),
    };

    let grid = move || match novels.get() {
        None => view! { <GridSkeleton count=GRID_PAGE_SIZE /> }.into_view(),
        Some(Err(_)) => view! { <ErrorMessage message="Failed to load novels" /> }.into_view(),
        Some(Ok(list)) if list.is_empty() => view! { <EmptyState title="No novels found" /> }.into_view(),
        Some(Ok(list)) => {
            let mut pager = Paginator::grid(list.len());
            pager.go_to(page.get());
            let cards = pager
                .slice(&list)
                .iter()
                .cloned()
                .map(|novel| view! { <NovelCard novel=novel /> })
                .collect_view();

            view! {
                <div class="grid grid-cols-2 md:grid-cols-4 lg:grid-cols-6 gap-4">{cards}</div>
                <div class="flex items-center justify-center space-x-4 mt-6">
                    <button
                        class=SECONDARY_BUTTON
                        disabled={!pager.has_prev()}
                        on:click=move |_| {
                            let mut pager = pager;
                            set_page.set(pager.prev());
                        }
                    >
                        "← Previous"
                    </button>
                    <span class="text-sm text-gray-400">{pager.label()}</span>
                    <button
                        class=SECONDARY_BUTTON
                        disabled={!pager.has_next()}
                        on:click=move |_| {
                            let mut pager = pager;
                            set_page.set(pager.next());
                        }
                    >
                        "Next →"
                    </button>
                </div>
            }
            .into_view()
        }
    };

    view! {
        <div class="space-y-10">
            <section>
                <h2 class="text-2xl font-bold mb-4">"Popular Novels"</h2>
                {popular}
            </section>

            <section>
                <h2 class="text-2xl font-bold mb-4">"All Novels"</h2>
                {grid}
            </section>
        </div>
    }
}
