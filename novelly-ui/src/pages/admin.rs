//! Admin Page
//!
//! Novel upload, chapter creation and novel management. The novel list is
//! cached for a few minutes and dropped after every change.

use chrono::Utc;
use leptos::*;
use novelly::catalog::{chapter_count_label, cover_url, NovelCache};
use novelly::models::{FileUpload, Novel, NovelForm, NovelId};
use novelly::validation::{validate_chapter_draft, validate_new_novel, MIN_CHAPTER_CHARS};
use wasm_bindgen::JsCast;

use super::{EmptyState, DANGER_BUTTON, INPUT_CLASS, PRIMARY_BUTTON, SECONDARY_BUTTON};
use crate::api::read_file;
use crate::components::Loading;
use crate::state::{confirm, log_error, GlobalState};

#[derive(Clone, Copy, PartialEq, Eq)]
enum AdminTab {
    AddNovel,
    AddChapter,
    ManageNovels,
}

impl AdminTab {
    const ALL: [AdminTab; 3] = [AdminTab::AddNovel, AdminTab::AddChapter, AdminTab::ManageNovels];

    fn label(&self) -> &'static str {
        match self {
            AdminTab::AddNovel => "📚 Add Novel",
            AdminTab::AddChapter => "📝 Add Chapter",
            AdminTab::ManageNovels => "⚙️ Manage Novels",
        }
    }
}

/// Novel list shared by the tabs, backed by the app-wide novel cache
#[derive(Clone, Copy)]
struct NovelList {
    novels: RwSignal<Option<Vec<Novel>>>,
    cache: StoredValue<NovelCache>,
}

impl NovelList {
    fn new(cache: StoredValue<NovelCache>) -> Self {
        Self {
            novels: create_rw_signal(None),
            cache,
        }
    }

    /// Show the cached list if it is still fresh
    fn show_cached(self) -> bool {
        match self.cache.with_value(|c| c.get(Utc::now())) {
            Some(cached) => {
                self.novels.set(Some(cached));
                true
            }
            None => false,
        }
    }

    fn load(self, state: GlobalState) {
        if self.show_cached() {
            return;
        }
        spawn_local(async move {
            match state.api().novels().list().await {
                Ok(list) => {
                    self.cache.update_value(|c| c.put(list.clone(), Utc::now()));
                    self.novels.set(Some(list));
                }
                Err(e) => {
                    log_error(&format!("Error loading novels: {}", e));
                    state.show_error("Failed to load novels");
                    self.novels.set(Some(Vec::new()));
                }
            }
        });
    }

    fn reload(self, state: GlobalState) {
        self.cache.update_value(NovelCache::invalidate);
        self.load(state);
    }
}

#[component]
pub fn Admin() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (tab, set_tab) = create_signal(AdminTab::AddNovel);
    let list = NovelList::new(state.novel_cache);
    list.load(state);

    view! {
        <div class="space-y-6">
            <h1 class="text-3xl font-bold">"Admin Panel"</h1>

            <div class="flex gap-2 border-b border-gray-700">
                {AdminTab::ALL
                    .into_iter()
                    .map(|t| view! {
                        <button
                            class=move || {
                                if tab.get() == t {
                                    "px-4 py-2 border-b-2 border-blue-500 font-medium"
                                } else {
                                    "px-4 py-2 text-gray-400 hover:text-white"
                                }
                            }
                            on:click=move |_| set_tab.set(t)
                        >
                            {t.label()}
                        </button>
                    })
                    .collect_view()}
            </div>

            {move || match tab.get() {
                AdminTab::AddNovel => view! { <AddNovelForm list=list /> }.into_view(),
                AdminTab::AddChapter => view! { <AddChapterForm list=list /> }.into_view(),
                AdminTab::ManageNovels => view! { <ManageNovels list=list /> }.into_view(),
            }}
        </div>
    }
}

/// Reads the chosen image of a file input into `target`
fn on_cover_change(
    state: GlobalState,
    target: RwSignal<Option<FileUpload>>,
) -> impl Fn(ev::Event) + Clone + 'static {
    move |ev: ev::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        let Some(file) = file else {
            target.set(None);
            return;
        };
        let state = state.clone();
        spawn_local(async move {
            match read_file(&file).await {
                Ok(upload) => target.set(Some(upload)),
                Err(e) => state.show_error(&e),
            }
        });
    }
}

#[component]
fn AddNovelForm(list: NovelList) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (title, set_title) = create_signal(String::new());
    let (author, set_author) = create_signal(String::new());
    let (description, set_description) = create_signal(String::new());
    let cover = create_rw_signal(None::<FileUpload>);
    // Bumped to re-create the file input on reset
    let (form_key, set_form_key) = create_signal(0u32);

    let reset = move || {
        set_title.set(String::new());
        set_author.set(String::new());
        set_description.set(String::new());
        cover.set(None);
        set_form_key.update(|k| *k += 1);
    };

    let state_for_submit = state.clone();
    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let form = match validate_new_novel(&title.get(), &author.get(), &description.get(), cover.get()) {
            Ok(form) => form,
            Err(e) => {
                state_for_submit.show_error(&e.to_string());
                return;
            }
        };
        let state = state_for_submit.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().novels().upload(&form)).await {
                Ok(_) => {
                    state.show_success("Novel added successfully! 🎉");
                    reset();
                    list.reload(state.clone());
                }
                Err(e) => state.show_error(&e.to_string()),
            }
        });
    };

    let on_cover = on_cover_change(state.clone(), cover);

    view! {
        <section class="bg-gray-800 rounded-xl p-6 max-w-2xl">
            <h2 class="text-xl font-semibold mb-4">"Add New Novel"</h2>
            <form on:submit=on_submit class="space-y-4">
                <input
                    class=INPUT_CLASS
                    placeholder="Title *"
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <input
                    class=INPUT_CLASS
                    placeholder="Author *"
                    prop:value=move || author.get()
                    on:input=move |ev| set_author.set(event_target_value(&ev))
                />
                <textarea
                    class=INPUT_CLASS
                    rows="4"
                    placeholder="Description"
                    prop:value=move || description.get()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                />
                <div>
                    <label class="block text-sm mb-1">"Cover Image *"</label>
                    {move || {
                        form_key.track();
                        let on_cover = on_cover.clone();
                        view! { <input type="file" accept="image/*" class="text-sm" on:change=on_cover /> }
                    }}
                    {move || cover.get().map(|c| view! {
                        <p class="text-xs text-gray-400 mt-1">{format!("{} ({} KB)", c.file_name, c.bytes.len() / 1024)}</p>
                    })}
                </div>
                <div class="flex justify-end gap-3">
                    <button type="button" class=SECONDARY_BUTTON on:click=move |_| reset()>"Reset"</button>
                    <button type="submit" class=PRIMARY_BUTTON>"Add Novel"</button>
                </div>
            </form>
        </section>
    }
}

#[component]
fn AddChapterForm(list: NovelList) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (novel_id, set_novel_id) = create_signal(None::<NovelId>);
    let (number, set_number) = create_signal(String::new());
    let (title, set_title) = create_signal(String::new());
    let (content, set_content) = create_signal(String::new());

    let char_count = move || content.with(|c| c.trim().chars().count());

    let reset = move || {
        set_number.set(String::new());
        set_title.set(String::new());
        set_content.set(String::new());
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let draft = match validate_chapter_draft(novel_id.get(), &number.get(), &title.get(), &content.get()) {
            Ok(draft) => draft,
            Err(e) => {
                state.show_error(&e.to_string());
                return;
            }
        };
        let state = state.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().chapters().create(&draft)).await {
                Ok(_) => {
                    state.show_success(&format!("Chapter {} added successfully! 📚", draft.chapter_number));
                    reset();
                    list.reload(state.clone());
                }
                Err(e) => state.show_error(&e.to_string()),
            }
        });
    };

    view! {
        <section class="bg-gray-800 rounded-xl p-6 max-w-2xl">
            <h2 class="text-xl font-semibold mb-4">"Add New Chapter"</h2>
            <form on:submit=on_submit class="space-y-4">
                <select
                    class=INPUT_CLASS
                    on:change=move |ev| set_novel_id.set(event_target_value(&ev).parse().ok())
                >
                    <option value="">"Select a novel *"</option>
                    {move || list.novels.get().unwrap_or_default()
                        .into_iter()
                        .map(|n| view! {
                            <option value=n.novel_id.to_string() selected={novel_id.get() == Some(n.novel_id)}>
                                {n.title}
                            </option>
                        })
                        .collect_view()}
                </select>
                <input
                    type="number"
                    min="1"
                    class=INPUT_CLASS
                    placeholder="Chapter number *"
                    prop:value=move || number.get()
                    on:input=move |ev| set_number.set(event_target_value(&ev))
                />
                <input
                    class=INPUT_CLASS
                    placeholder="Title (defaults to \"Chapter N\")"
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <textarea
                    class=INPUT_CLASS
                    rows="12"
                    placeholder="Chapter content *"
                    prop:value=move || content.get()
                    on:input=move |ev| set_content.set(event_target_value(&ev))
                />
                <p class=move || {
                    if char_count() < MIN_CHAPTER_CHARS { "text-xs text-red-400" } else { "text-xs text-green-400" }
                }>
                    {move || format!("{} characters (minimum {})", char_count(), MIN_CHAPTER_CHARS)}
                </p>
                <div class="flex justify-end gap-3">
                    <button type="button" class=SECONDARY_BUTTON on:click=move |_| reset()>"Reset"</button>
                    <button type="submit" class=PRIMARY_BUTTON>"Add Chapter"</button>
                </div>
            </form>
        </section>
    }
}

#[component]
fn ManageNovels(list: NovelList) -> impl IntoView {
    let editing = create_rw_signal(None::<Novel>);

    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Manage Novels"</h2>
            {move || match list.novels.get() {
                None => view! { <Loading message="Loading novels..." /> }.into_view(),
                Some(novels) if novels.is_empty() => view! { <EmptyState title="No novels yet" /> }.into_view(),
                Some(novels) => novels
                    .into_iter()
                    .map(|novel| view! { <ManagedNovel novel=novel list=list editing=editing /> })
                    .collect_view(),
            }}
            {move || editing.get().map(|novel| view! { <EditNovelModal novel=novel list=list editing=editing /> })}
        </section>
    }
}

#[component]
fn ManagedNovel(novel: Novel, list: NovelList, editing: RwSignal<Option<Novel>>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let novel_id = novel.novel_id;
    let cover = cover_url(novel.cover_image.as_deref(), state.api().base_url());
    let (count, set_count) = create_signal(novel.chapter_count.map(|n| n as usize));

    if count.get_untracked().is_none() {
        let state = state.clone();
        spawn_local(async move {
            if let Ok(chapters) = state.api().chapters().list(novel_id).await {
                set_count.set(Some(chapters.len()));
            }
        });
    }

    let title = novel.title.clone();
    let on_delete = move |_| {
        let prompt = format!(
            "Are you sure you want to delete \"{}\"?\n\nThis will also delete all chapters for this novel. This action cannot be undone.",
            title
        );
        if !confirm(&prompt) {
            return;
        }
        let state = state.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().novels().delete(novel_id)).await {
                Ok(()) => {
                    state.show_success("Novel deleted successfully");
                    list.reload(state.clone());
                }
                Err(e) => state.show_error(&format!("Failed to delete novel: {}", e)),
            }
        });
    };

    let to_edit = novel.clone();

    view! {
        <div class="flex items-center gap-4 border-t border-gray-700 py-3">
            <img src=cover alt=novel.title.clone() class="w-10 h-14 object-cover rounded" />
            <div class="flex-1">
                <h3 class="font-medium">{novel.title.clone()}</h3>
                <p class="text-sm text-gray-400">
                    {novel.author_or_unknown().to_string()} " · " {move || chapter_count_label(count.get())}
                </p>
            </div>
            <button class=SECONDARY_BUTTON on:click=move |_| editing.set(Some(to_edit.clone()))>"✏️ Edit"</button>
            <button class=DANGER_BUTTON on:click=on_delete>"🗑️ Delete"</button>
        </div>
    }
}

#[component]
fn EditNovelModal(novel: Novel, list: NovelList, editing: RwSignal<Option<Novel>>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let novel_id = novel.novel_id;
    let (title, set_title) = create_signal(novel.title.clone());
    let (author, set_author) = create_signal(novel.author.clone().unwrap_or_default());
    let (description, set_description) = create_signal(novel.description.clone().unwrap_or_default());
    let cover = create_rw_signal(None::<FileUpload>);

    let state_for_submit = state.clone();
    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let title = title.get().trim().to_string();
        if title.is_empty() {
            state_for_submit.show_error("Title is required");
            return;
        }
        let form = NovelForm {
            title: Some(title),
            author: Some(author.get().trim().to_string()),
            description: Some(description.get().trim().to_string()),
            cover_image: cover.get(),
        };
        let state = state_for_submit.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().novels().update(novel_id, &form)).await {
                Ok(_) => {
                    state.show_success("Novel updated successfully! ✅");
                    editing.set(None);
                    list.reload(state.clone());
                }
                Err(e) => state.show_error(&e.to_string()),
            }
        });
    };

    let on_cover = on_cover_change(state, cover);

    view! {
        <div class="fixed inset-0 bg-black/60 flex items-center justify-center z-40">
            <div class="bg-gray-800 rounded-xl p-6 w-full max-w-lg">
                <div class="flex justify-between items-center mb-4">
                    <h2 class="text-xl font-semibold">"Edit Novel"</h2>
                    <button on:click=move |_| editing.set(None)>"✕"</button>
                </div>
                <form on:submit=on_submit class="space-y-4">
                    <input
                        class=INPUT_CLASS
                        prop:value=move || title.get()
                        on:input=move |ev| set_title.set(event_target_value(&ev))
                    />
                    <input
                        class=INPUT_CLASS
                        prop:value=move || author.get()
                        on:input=move |ev| set_author.set(event_target_value(&ev))
                    />
                    <textarea
                        class=INPUT_CLASS
                        rows="4"
                        prop:value=move || description.get()
                        on:input=move |ev| set_description.set(event_target_value(&ev))
                    />
                    <div>
                        <label class="block text-sm mb-1">"New Cover Image (optional)"</label>
                        <input type="file" accept="image/*" class="text-sm" on:change=on_cover />
                    </div>
                    <div class="flex justify-end gap-3">
                        <button type="button" class=SECONDARY_BUTTON on:click=move |_| editing.set(None)>
                            "Cancel"
                        </button>
                        <button type="submit" class=PRIMARY_BUTTON>"💾 Save Changes"</button>
                    </div>
                </form>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_list_survives_remount() {
        let runtime = create_runtime();
        let cache = store_value(NovelCache::default());

        let first = NovelList::new(cache);
        assert!(!first.show_cached());
        cache.update_value(|c| c.put(Vec::new(), Utc::now()));

        let second = NovelList::new(cache);
        assert!(second.show_cached());
        assert_eq!(second.novels.get_untracked(), Some(Vec::new()));

        runtime.dispose();
    }

    #[test]
    fn test_invalidated_cache_is_not_shown() {
        let runtime = create_runtime();
        let cache = store_value(NovelCache::default());
        cache.update_value(|c| c.put(Vec::new(), Utc::now()));
        cache.update_value(NovelCache::invalidate);

        let list = NovelList::new(cache);
        assert!(!list.show_cached());
        assert_eq!(list.novels.get_untracked(), None);

        runtime.dispose();
    }
}
