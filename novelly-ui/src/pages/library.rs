//! Library Page
//!
//! The signed-in user's saved novels.

use leptos::*;
use novelly::models::{LibraryItem, NovelId};

use super::{format_date, EmptyState, ErrorMessage, DANGER_BUTTON};
use crate::components::{GridSkeleton, NovelCard};
use crate::state::{confirm, log_error, GlobalState};

#[component]
pub fn Library() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let items = create_rw_signal(None::<Result<Vec<LibraryItem>, String>>);

    let state_for_load = state.clone();
    spawn_local(async move {
        let state = state_for_load;
        let Some(user_id) = state.store.state().user_id() else {
            items.set(Some(Err("Please log in to view your library.".to_string())));
            return;
        };
        match state.api().library().list(user_id).await {
            Ok(list) => items.set(Some(Ok(list))),
            Err(e) => {
                log_error(&format!("Error loading library: {}", e));
                items.set(Some(Err("Failed to load library".to_string())));
            }
        }
    });

    let remove = move |novel_id: NovelId| {
        let Some(user_id) = state.store.state().user_id() else {
            state.show_error("Please log in first");
            return;
        };
        if !confirm("Remove this novel from your library?") {
            return;
        }
        let state = state.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().library().remove(user_id, novel_id)).await {
                Ok(()) => {
                    items.update(|current| {
                        if let Some(Ok(list)) = current {
                            list.retain(|item| item.novel.novel_id != novel_id);
                        }
                    });
                    state.show_success("Removed from library");
                }
                Err(e) => {
                    log_error(&format!("Error removing from library: {}", e));
                    state.show_error("Failed to remove from library");
                }
            }
        });
    };

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"My Library"</h1>
            {move || match items.get() {
                None => view! { <GridSkeleton /> }.into_view(),
                Some(Err(message)) => view! { <ErrorMessage message=message /> }.into_view(),
                Some(Ok(list)) if list.is_empty() => view! {
                    <EmptyState
                        title="Your library is empty"
                        message="No novels in your library yet. Click \"Add to Library\" on any novel page to save it here."
                    >
                        <a href="#/home" class="text-blue-400 hover:underline">"Browse novels"</a>
                    </EmptyState>
                }
                .into_view(),
                Some(Ok(list)) => view! {
                    <div class="grid grid-cols-2 md:grid-cols-4 lg:grid-cols-6 gap-4">
                        {list
                            .into_iter()
                            .map(|item| {
                                let novel_id = item.novel.novel_id;
                                let remove = remove.clone();
                                view! {
                                    <div class="space-y-2">
                                        <NovelCard novel=item.novel />
                                        <div class="flex items-center justify-between text-xs text-gray-500">
                                            <span>{format_date(item.added_at)}</span>
                                            <button class=DANGER_BUTTON on:click=move |_| remove(novel_id)>
                                                "Remove"
                                            </button>
                                        </div>
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>
                }
                .into_view(),
            }}
        </div>
    }
}
