//! Reader Page
//!
//! Chapter text with reading preferences, chapter navigation and
//! reading-progress saves (on open, after scrolling settles, and on demand).

use gloo_timers::callback::Timeout;
use leptos::*;
use novelly::models::{Chapter, ChapterId, Novel, NovelId};
use novelly::reader::{
    load_preferences, paragraphs, progress_update, readable_content, save_preferences,
    scroll_percentage, ChapterNav, FontFamily, Paragraph, ReadingPreferences, Theme,
    EMPTY_CHAPTER_MESSAGE, FIRST_CHAPTER_MESSAGE, FONT_SIZE_STEP, LAST_CHAPTER_MESSAGE,
    SCROLL_SAVE_DEBOUNCE,
};
use novelly::router::{href, paths};

use super::{ErrorMessage, PRIMARY_BUTTON, SECONDARY_BUTTON};
use crate::components::Loading;
use crate::state::{log_error, GlobalState, TimerSlot};

const SAVE_ICON_RESET_MS: u32 = 1500;

/// Where a progress save came from
#[derive(Clone, Copy, PartialEq, Eq)]
enum SaveTrigger {
    Open,
    Scroll,
    Manual,
}

#[component]
pub fn Reader(novel_id: NovelId, chapter_id: ChapterId) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let storage = state.store.storage();

    let prefs = create_rw_signal(load_preferences(storage.as_ref()));
    create_effect(move |_| {
        if let Err(e) = save_preferences(storage.as_ref(), &prefs.get()) {
            log_error(&format!("Failed to save reading preferences: {}", e));
        }
    });

    let (novel, set_novel) = create_signal(None::<Novel>);
    let (chapter, set_chapter) = create_signal(None::<Result<Chapter, String>>);
    let (chapters, set_chapters) = create_signal(Vec::<Chapter>::new());
    let (save_icon, set_save_icon) = create_signal("💾");

    let save = {
        let state = state.clone();
        move |trigger: SaveTrigger, scroll_position: i64, percentage: u8| {
            // Signals are gone once the page has been left
            let Some(Some(Ok(current))) = chapter.try_get_untracked() else {
                return;
            };
            let Some(user_id) = state.store.state().user_id() else {
                if trigger == SaveTrigger::Manual {
                    state.show_info("Please log in to save progress");
                }
                return;
            };
            let update = progress_update(
                novel.try_get_untracked().flatten().as_ref(),
                &current,
                novel_id,
                scroll_position,
                percentage,
            );

            let state = state.clone();
            spawn_local(async move {
                if trigger == SaveTrigger::Manual {
                    set_save_icon.set("⏳");
                }
                let result = state.api().progress().save(user_id, &update).await;
                match (result, trigger) {
                    (Ok(()), SaveTrigger::Manual) => {
                        set_save_icon.set("✅");
                        let title = update.chapter_title.clone().unwrap_or_default();
                        state.show_success(&format!("Progress saved: {}", title));
                    }
                    (Ok(()), _) => {}
                    (Err(e), SaveTrigger::Manual) => {
                        log_error(&format!("Error saving progress: {}", e));
                        set_save_icon.set("❌");
                        state.show_error("Failed to save progress");
                    }
                    (Err(e), _) => log_error(&format!("Auto-save failed: {}", e)),
                }
                if trigger == SaveTrigger::Manual {
                    Timeout::new(SAVE_ICON_RESET_MS, move || set_save_icon.set("💾")).forget();
                }
            });
        }
    };

    let state_for_load = state.clone();
    let save_on_open = save.clone();
    spawn_local(async move {
        let state = state_for_load;
        let api = state.api();

        match api.novels().get(novel_id).await {
            Ok(loaded) => set_novel.set(Some(loaded)),
            Err(e) => log_error(&format!("Error loading novel: {}", e)),
        }

        match state.with_spinner(api.chapters().get(chapter_id)).await {
            Ok(loaded) if readable_content(&loaded).is_some() => {
                let current = loaded.clone();
                state.store.update(move |s| s.current_chapter = Some(current));
                set_chapter.set(Some(Ok(loaded)));
                save_on_open(SaveTrigger::Open, 0, 0);
            }
            Ok(_) => set_chapter.set(Some(Err(EMPTY_CHAPTER_MESSAGE.to_string()))),
            Err(e) => {
                log_error(&format!("Error loading chapter: {}", e));
                state.show_error("Failed to load chapter");
                set_chapter.set(Some(Err("Failed to load chapter".to_string())));
            }
        }

        match api.chapters().list(novel_id).await {
            Ok(list) => set_chapters.set(list),
            Err(e) => log_error(&format!("Error loading chapters list: {}", e)),
        }
    });

    // Save once scrolling has been idle for the debounce period
    let scroll_timer = TimerSlot::<Timeout>::new();
    let save_on_scroll = save.clone();
    let timer = scroll_timer.clone();
    let handle = window_event_listener(ev::scroll, move |_| {
        let save = save_on_scroll.clone();
        timer.set(Timeout::new(SCROLL_SAVE_DEBOUNCE.as_millis() as u32, move || {
            if let Some((top, height, client)) = window_scroll() {
                save(SaveTrigger::Scroll, top as i64, scroll_percentage(top, height, client));
            }
        }));
    });
    on_cleanup(move || {
        handle.remove();
        scroll_timer.cancel();
    });

    let save_now = move |_: ev::MouseEvent| {
        let (top, height, client) = window_scroll().unwrap_or_default();
        save(SaveTrigger::Manual, top as i64, scroll_percentage(top, height, client));
    };

    let state_for_nav = state.clone();
    let go = move |forward: bool| {
        let target = chapters.with_untracked(|list| {
            let nav = ChapterNav::new(list, chapter_id);
            let found = if forward { nav.next() } else { nav.previous() };
            found.map(|c| c.chapter_id)
        });
        match target {
            Some(id) => state_for_nav.navigate(&paths::reader(novel_id, id)),
            None if forward => state_for_nav.show_info(LAST_CHAPTER_MESSAGE),
            None => state_for_nav.show_info(FIRST_CHAPTER_MESSAGE),
        }
    };
    let go_prev = {
        let go = go.clone();
        move |_: ev::MouseEvent| go(false)
    };
    let go_next = move |_: ev::MouseEvent| go(true);

    let state_for_select = state.clone();
    let on_select = move |ev: ev::Event| {
        if let Ok(id) = event_target_value(&ev).parse::<ChapterId>() {
            state_for_select.navigate(&paths::reader(novel_id, id));
        }
    };

    let content = move || match chapter.get() {
        None => view! { <Loading message="Loading chapter..." /> }.into_view(),
        Some(Err(message)) => view! {
            <div class="text-center py-12 space-y-4">
                <ErrorMessage message=message />
                <a href="#/home" class=PRIMARY_BUTTON>"Return to Home"</a>
            </div>
        }
        .into_view(),
        Some(Ok(current)) => {
            let text = current.content.unwrap_or_default();
            view! {
                <article class="reader-text leading-relaxed space-y-4" style=move || prefs.get().text_style()>
                    {paragraphs(&text)
                        .into_iter()
                        .map(|p| match p {
                            Paragraph::Text(line) => view! { <p>{line}</p> }.into_view(),
                            Paragraph::Break => view! { <br /> }.into_view(),
                        })
                        .collect_view()}
                </article>
            }
            .into_view()
        }
    };

    view! {
        <div class=move || format!("min-h-screen {}", prefs.get().theme.class())>
            <div class="flex flex-wrap items-center justify-between gap-4 bg-gray-800 rounded-xl p-4 mb-6">
                <div class="flex items-center gap-4">
                    <a href=href(&paths::novel(novel_id)) class=SECONDARY_BUTTON>"← Back to Novel Info"</a>
                    <div>
                        <h2 class="font-semibold">
                            {move || novel.with(|n| n.as_ref().map_or("Loading...".to_string(), |n| n.title.clone()))}
                        </h2>
                        <span class="text-sm text-gray-400">
                            {move || match chapter.get() {
                                Some(Ok(c)) => c.display_title(),
                                _ => format!("Chapter {}", chapter_id),
                            }}
                        </span>
                    </div>
                </div>

                <div class="flex flex-wrap items-center gap-2">
                    <select class="bg-gray-700 rounded px-3 py-2 text-sm" on:change=on_select>
                        {move || chapters.with(|list| {
                            if list.is_empty() {
                                return view! { <option value="">"Loading chapters..."</option> }.into_view();
                            }
                            list.iter()
                                .map(|c| view! {
                                    <option value=c.chapter_id.to_string() selected={c.chapter_id == chapter_id}>
                                        {c.label()}
                                    </option>
                                })
                                .collect_view()
                        })}
                    </select>
                    <button class=PRIMARY_BUTTON on:click=save_now>
                        {move || save_icon.get()} " Save Progress"
                    </button>
                </div>
            </div>

            <ReadingControls prefs=prefs />

            <div class="max-w-3xl mx-auto bg-gray-800/40 rounded-xl p-8">{content}</div>

            <div class="flex justify-between max-w-3xl mx-auto mt-6">
                <button class=SECONDARY_BUTTON on:click=go_prev>"← Previous Chapter"</button>
                <button class=SECONDARY_BUTTON on:click=go_next>"Next Chapter →"</button>
            </div>
        </div>
    }
}

#[component]
fn ReadingControls(prefs: RwSignal<ReadingPreferences>) -> impl IntoView {
    view! {
        <div class="flex flex-wrap items-center justify-center gap-4 mb-6 text-sm">
            <div class="flex items-center gap-2">
                <button
                    class=SECONDARY_BUTTON
                    on:click=move |_| prefs.update(|p| { p.adjust_font_size(-FONT_SIZE_STEP); })
                >
                    "A-"
                </button>
                <span class="w-12 text-center">{move || prefs.get().font_size_css()}</span>
                <button
                    class=SECONDARY_BUTTON
                    on:click=move |_| prefs.update(|p| { p.adjust_font_size(FONT_SIZE_STEP); })
                >
                    "A+"
                </button>
            </div>

            <select
                class="bg-gray-700 rounded px-3 py-2"
                on:change=move |ev| {
                    if let Some(family) = FontFamily::from_css(&event_target_value(&ev)) {
                        prefs.update(|p| p.font_family = family);
                    }
                }
            >
                {FontFamily::ALL
                    .into_iter()
                    .map(|family| view! {
                        <option value=family.css() selected={move || prefs.get().font_family == family}>
                            {family.label()}
                        </option>
                    })
                    .collect_view()}
            </select>

            <div class="flex gap-1">
                {Theme::ALL
                    .into_iter()
                    .map(|theme| view! {
                        <button
                            class=move || {
                                if prefs.get().theme == theme {
                                    "px-3 py-1.5 rounded-lg bg-blue-600"
                                } else {
                                    "px-3 py-1.5 rounded-lg bg-gray-700"
                                }
                            }
                            on:click=move |_| prefs.update(|p| p.theme = theme)
                        >
                            {theme.as_str()}
                        </button>
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

/// `(scroll_top, scroll_height, client_height)` of the page
fn window_scroll() -> Option<(f64, f64, f64)> {
    let window = web_sys::window()?;
    let top = window.scroll_y().ok()?;
    let client = window.inner_height().ok()?.as_f64()?;
    let height = f64::from(window.document()?.document_element()?.scroll_height());
    Some((top, height, client))
}
