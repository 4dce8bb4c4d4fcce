//! Profile Page
//!
//! Account info, API connection and recent reading history.

use leptos::*;
use novelly::catalog::{initials, time_ago};
use novelly::models::{NovelId, ReadingProgress};
use novelly::router::{href, paths, LOGIN_PATH};

use super::{now, EmptyState, DANGER_BUTTON, INPUT_CLASS, PRIMARY_BUTTON, SECONDARY_BUTTON};
use crate::api;
use crate::components::Loading;
use crate::state::{confirm, log_error, GlobalState};

const HISTORY_LIMIT: usize = 10;

#[component]
pub fn Profile() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let app = state.app;
    let (loaded, set_loaded) = create_signal(false);

    let state_for_load = state.clone();
    spawn_local(async move {
        let state = state_for_load;
        let Some(user_id) = state.store.state().user_id() else {
            return;
        };
        match state.api().progress().list(user_id).await {
            Ok(mut history) => {
                history.sort_by(|a, b| b.last_read_at.cmp(&a.last_read_at));
                state.store.update(move |s| s.reading_history = history);
            }
            Err(e) => log_error(&format!("Failed to load reading history: {}", e)),
        }
        set_loaded.set(true);
    });

    let state_for_logout = state.clone();
    let logout = move |_: ev::MouseEvent| {
        if confirm("Are you sure you want to logout?") {
            state_for_logout.session.logout();
            state_for_logout.navigate(LOGIN_PATH);
        }
    };

    let forget = move |novel_id: NovelId| {
        let Some(user_id) = state.store.state().user_id() else {
            return;
        };
        let state = state.clone();
        spawn_local(async move {
            match state.api().progress().delete(user_id, novel_id).await {
                Ok(()) => state.store.update(|s| {
                    s.reading_history
                        .retain(|p| p.novel.as_ref().map(|n| n.novel_id) != Some(novel_id))
                }),
                Err(e) => state.show_error(&format!("Failed to clear progress: {}", e)),
            }
        });
    };

    view! {
        <div class="max-w-3xl mx-auto space-y-8">
            <h1 class="text-3xl font-bold">"My Profile"</h1>

            {move || app.with(|s| s.current_user.clone()).map(|user| view! {
                <section class="bg-gray-800 rounded-xl p-6 flex items-center gap-6">
                    <div class="w-20 h-20 rounded-full bg-blue-600 flex items-center justify-center text-2xl font-bold">
                        {initials(&user.username)}
                    </div>
                    <div class="flex-1">
                        <h2 class="text-2xl font-semibold">{user.username.clone()}</h2>
                        <p class="text-gray-400">{user.email.clone().unwrap_or_default()}</p>
                        <p class="text-sm text-gray-500">
                            "Role: " {user.role.map(|r| r.as_str()).unwrap_or("USER")}
                        </p>
                    </div>
                    <div class="flex flex-col gap-2">
                        <a href=href("/edit-profile") class=SECONDARY_BUTTON>"Edit Profile"</a>
                        <button class=DANGER_BUTTON on:click=logout.clone()>"Logout"</button>
                    </div>
                </section>
            })}

            <ApiSettings />

            <section class="bg-gray-800 rounded-xl p-6">
                <h2 class="text-xl font-semibold mb-4">"Reading History"</h2>
                {move || {
                    if !loaded.get() {
                        return view! { <Loading /> }.into_view();
                    }
                    let history = app.with(|s| s.reading_history.clone());
                    if history.is_empty() {
                        return view! {
                            <EmptyState title="No reading history yet" message="Start reading a novel to see it here" />
                        }
                        .into_view();
                    }
                    history
                        .into_iter()
                        .take(HISTORY_LIMIT)
                        .map(|entry| {
                            view! { <HistoryRow entry=entry on_forget=Callback::new(forget.clone()) /> }
                        })
                        .collect_view()
                }}
            </section>
        </div>
    }
}

#[component]
fn HistoryRow(entry: ReadingProgress, on_forget: Callback<NovelId>) -> impl IntoView {
    let (Some(novel), Some(chapter)) = (entry.novel, entry.chapter) else {
        return ().into_view();
    };
    let novel_id = novel.novel_id;
    let last_read = entry
        .last_read_at
        .map(|at| time_ago(at, now()))
        .unwrap_or_default();
    let percentage = entry.reading_percentage.unwrap_or(0.0).round();

    view! {
        <div class="flex items-center justify-between border-t border-gray-700 py-3">
            <div>
                <a href=href(&paths::novel(novel_id)) class="font-medium hover:text-blue-400">{novel.title}</a>
                <p class="text-sm text-gray-400">{chapter.label()} " · " {format!("{}%", percentage)}</p>
                <p class="text-xs text-gray-500">{last_read}</p>
            </div>
            <div class="flex gap-2">
                <a href=href(&paths::reader(novel_id, chapter.chapter_id)) class=SECONDARY_BUTTON>"Continue"</a>
                <button class=DANGER_BUTTON on:click=move |_| on_forget.call(novel_id)>"Clear"</button>
            </div>
        </div>
    }
    .into_view()
}

/// API base override, read by the client on the next page load
#[component]
fn ApiSettings() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (api_url, set_api_url) = create_signal(api::get_api_base());

    let save_url = move |_| {
        api::set_api_base(api_url.get().trim());
        state.show_success("API URL saved. Reload the page to apply it.");
    };

    view! {
        <section class="bg-gray-800 rounded-xl p-6 space-y-3">
            <h2 class="text-xl font-semibold">"API Connection"</h2>
            <div class="flex gap-3">
                <input
                    type="text"
                    class=INPUT_CLASS
                    prop:value=move || api_url.get()
                    on:input=move |ev| set_api_url.set(event_target_value(&ev))
                />
                <button class=PRIMARY_BUTTON on:click=save_url>"Save"</button>
            </div>
        </section>
    }
}
