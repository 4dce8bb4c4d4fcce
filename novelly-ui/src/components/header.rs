//! Header Component
//!
//! Brand, search box, navigation links and the guest or user menu.

use leptos::*;
use novelly::catalog::initials;
use novelly::models::Role;
use novelly::router::{href, paths, LOGIN_PATH};
use novelly::store::SearchHandoff;
use novelly::validation::validate_search_term;

use crate::state::{confirm, GlobalState};

const LOGOUT_REDIRECT_MS: u32 = 1000;

#[component]
pub fn Header() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (query, set_query) = create_signal(String::new());

    let state_for_search = state.clone();
    let on_search = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let term = match validate_search_term(&query.get()) {
            Ok(term) => term,
            Err(e) => {
                state_for_search.show_warning(&e.to_string());
                return;
            }
        };

        let state = state_for_search.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().novels().search(&term)).await {
                Ok(results) => {
                    state.store.update(|s| {
                        s.search = Some(SearchHandoff {
                            query: term.clone(),
                            results,
                        })
                    });
                    state.navigate(&paths::search(&term));
                }
                Err(e) => state.show_error(&format!("Search failed: {}", e)),
            }
        });
    };

    let app = state.app;
    let is_admin = move || app.with(|s| s.role() == Some(Role::Admin));

    view! {
        <header class="bg-gray-800 border-b border-gray-700 sticky top-0 z-40">
            <div class="container mx-auto px-4 h-16 flex items-center justify-between gap-4">
                <a href="#/home" class="flex items-center space-x-2">
                    <span class="text-2xl">"📚"</span>
                    <span class="text-xl font-bold">"Novelly"</span>
                </a>

                <form class="flex-1 max-w-md flex" on:submit=on_search>
                    <input
                        type="search"
                        placeholder="Search novels..."
                        class="flex-1 bg-gray-700 rounded-l-lg px-3 py-2 text-sm"
                        prop:value=move || query.get()
                        on:input=move |ev| set_query.set(event_target_value(&ev))
                    />
                    <button type="submit" class="bg-gray-600 hover:bg-gray-500 rounded-r-lg px-3">"🔍"</button>
                </form>

                <nav class="flex items-center space-x-4 text-sm">
                    <a href="#/home">"Home"</a>
                    <a href="#/library">"Library"</a>
                    <Show when=is_admin>
                        <a href="#/admin">"Admin"</a>
                    </Show>
                </nav>

                {move || {
                    match app.with(|s| s.current_user.clone()) {
                        Some(user) => view! { <UserMenu username=user.username /> }.into_view(),
                        None => view! {
                            <div class="flex items-center space-x-2">
                                <a href="#/login" class="px-3 py-1.5 border border-gray-600 rounded-lg text-sm">"Login"</a>
                                <a href="#/register" class="px-3 py-1.5 bg-blue-600 hover:bg-blue-700 rounded-lg text-sm">"Register"</a>
                            </div>
                        }
                        .into_view(),
                    }
                }}
            </div>
        </header>
    }
}

#[component]
fn UserMenu(username: String) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (open, set_open) = create_signal(false);
    let avatar = initials(&username);

    let on_logout = move |_: ev::MouseEvent| {
        set_open.set(false);
        if !confirm("Are you sure you want to logout?") {
            return;
        }
        state.session.logout();
        state.show_success("Logged out successfully");
        state.navigate_later(LOGIN_PATH, LOGOUT_REDIRECT_MS).forget();
    };

    view! {
        <div class="relative">
            <button class="w-9 h-9 rounded-full bg-blue-600 font-semibold text-sm" on:click=move |_| set_open.update(|o| *o = !*o)>
                {avatar}
            </button>
            <Show when=move || open.get()>
                <div class="absolute right-0 mt-2 w-44 bg-gray-800 border border-gray-700 rounded-lg shadow-lg flex flex-col py-2 text-sm">
                    <span class="px-4 py-1 text-gray-400">{username.clone()}</span>
                    <a class="px-4 py-1 hover:bg-gray-700" href=href("/profile") on:click=move |_| set_open.set(false)>"Profile"</a>
                    <a class="px-4 py-1 hover:bg-gray-700" href=href("/edit-profile") on:click=move |_| set_open.set(false)>"Edit Profile"</a>
                    <button class="text-left px-4 py-1 text-red-400 hover:bg-gray-700" on:click=on_logout.clone()>"Logout"</button>
                </div>
            </Show>
        </div>
    }
}
