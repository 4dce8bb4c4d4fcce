//! App Root Component
//!
//! Listens to `hashchange`, resolves the fragment through the route table
//! and renders the matching page.

use leptos::*;
use novelly::router::{resolve, AuthContext, Page, Params, Resolution};

use crate::components::{Header, Loading, Spinner, Toast};
use crate::pages::{
    Admin, EditProfile, Home, Library, Login, NotFound, NovelDetail, Profile, Reader, Register,
    Search,
};
use crate::state::global::{current_hash, provide_global_state};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let state = provide_global_state();

    let hash = state.hash;
    let _ = window_event_listener(ev::hashchange, move |_| hash.set(current_hash()));

    // Re-validate a stored session against the backend
    let session = state.session.clone();
    spawn_local(async move {
        session.init().await;
    });

    let app = state.app;
    let resolution = create_memo(move |_| {
        let auth = app.with(|state| AuthContext::from(state));
        resolve(&hash.get(), &auth)
    });

    let state_for_effect = state.clone();
    create_effect(move |_| match resolution.get() {
        Resolution::Redirect(target) => state_for_effect.navigate(&target),
        Resolution::NotFound { .. } => {}
        Resolution::Render { page, .. } => {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                document.set_title(&format!("{} - Novelly", page.title()));
            }
        }
    });

    view! {
        <div class="app">
            <Header />

            <main class="main-content">
                {move || match resolution.get() {
                    Resolution::Render { page, params, query } => render_page(page, &params, &query),
                    Resolution::NotFound { path, fallback, delay } => {
                        view! { <NotFound path=path fallback=fallback delay=delay /> }.into_view()
                    }
                    Resolution::Redirect(_) => view! { <Loading /> }.into_view(),
                }}
            </main>

            <Toast />
            <Spinner />
        </div>
    }
}

fn render_page(page: Page, params: &Params, query: &Params) -> View {
    match page {
        Page::Home => view! { <Home /> }.into_view(),
        Page::Login => view! { <Login /> }.into_view(),
        Page::Register => view! { <Register /> }.into_view(),
        Page::Search => {
            let q = query.get("q").unwrap_or_default().to_string();
            view! { <Search query=q /> }.into_view()
        }
        Page::Library => view! { <Library /> }.into_view(),
        Page::Profile => view! { <Profile /> }.into_view(),
        Page::EditProfile => view! { <EditProfile /> }.into_view(),
        Page::Admin => view! { <Admin /> }.into_view(),
        Page::NovelDetail => match params.param_id("novelId") {
            Ok(novel_id) => view! { <NovelDetail novel_id=novel_id /> }.into_view(),
            Err(e) => invalid_route(&e.to_string()),
        },
        Page::Reader => match (params.param_id("novelId"), params.param_id("chapterId")) {
            (Ok(novel_id), Ok(chapter_id)) => {
                view! { <Reader novel_id=novel_id chapter_id=chapter_id /> }.into_view()
            }
            (Err(e), _) | (_, Err(e)) => invalid_route(&e.to_string()),
        },
    }
}

fn invalid_route(message: &str) -> View {
    let message = message.to_string();
    view! {
        <div class="error-state">
            <h2>"Invalid link"</h2>
            <p>{message}</p>
            <a href="#/home" class="btn btn-primary">"Return to Home"</a>
        </div>
    }
    .into_view()
}
