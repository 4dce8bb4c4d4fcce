//! Novel Detail Page
//!
//! Novel info, chapter list, library and bookmark actions, reviews and
//! comments.

use leptos::*;
use novelly::catalog::{chapter_count_label, cover_url, format_rating, initials, time_ago};
use novelly::client::AddOutcome;
use novelly::models::{Chapter, Comment, Novel, NovelId, ReadingProgress, Review, ReviewStats};
use novelly::router::{href, paths, LOGIN_PATH};
use novelly::validation::{validate_comment, validate_review, MAX_REVIEW_CHARS};

use super::{
    format_date, now, EmptyState, ErrorMessage, INPUT_CLASS, PRIMARY_BUTTON, SECONDARY_BUTTON,
};
use crate::components::{Loading, StarPicker, StarRating};
use crate::state::{confirm, log_error, GlobalState};

#[component]
pub fn NovelDetail(novel_id: NovelId) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (novel, set_novel) = create_signal(None::<Result<Novel, String>>);
    let (chapters, set_chapters) = create_signal(None::<Vec<Chapter>>);
    let (stats, set_stats) = create_signal(ReviewStats::default());
    let (progress, set_progress) = create_signal(None::<ReadingProgress>);
    let (in_library, set_in_library) = create_signal(false);

    let state_for_load = state.clone();
    spawn_local(async move {
        let state = state_for_load;
        let api = state.api();

        match api.novels().get(novel_id).await {
            Ok(loaded) => {
                let current = loaded.clone();
                state.store.update(move |s| s.current_novel = Some(current));
                set_novel.set(Some(Ok(loaded)));
            }
            Err(e) => {
                set_novel.set(Some(Err(format!("Failed to load novel: {}", e))));
                return;
            }
        }

        match api.chapters().list(novel_id).await {
            Ok(list) => set_chapters.set(Some(list)),
            Err(e) => {
                log_error(&format!("Error loading chapters: {}", e));
                set_chapters.set(Some(Vec::new()));
            }
        }

        if let Ok(loaded) = api.reviews().stats(novel_id).await {
            set_stats.set(loaded);
        }

        let Some(user_id) = state.store.state().user_id() else {
            return;
        };
        match api.progress().for_novel(user_id, novel_id).await {
            Ok(found) => set_progress.set(found),
            Err(e) => log_error(&format!("No reading progress found: {}", e)),
        }
        if let Ok(contained) = api.library().contains(user_id, novel_id).await {
            set_in_library.set(contained);
        }
    });

    move || match novel.get() {
        None => view! { <Loading message="Loading novel..." /> }.into_view(),
        Some(Err(message)) => view! { <ErrorMessage message=message /> }.into_view(),
        Some(Ok(novel)) => view! {
            <div class="space-y-8">
                <NovelInfo
                    novel=novel
                    chapters=chapters
                    stats=stats
                    progress=progress
                    in_library=in_library
                    set_in_library=set_in_library
                />
                <ChapterList novel_id=novel_id chapters=chapters />
                <ReviewsSection novel_id=novel_id set_stats=set_stats />
                <CommentsSection novel_id=novel_id />
            </div>
        }
        .into_view(),
    }
}

#[component]
fn NovelInfo(
    novel: Novel,
    chapters: ReadSignal<Option<Vec<Chapter>>>,
    stats: ReadSignal<ReviewStats>,
    progress: ReadSignal<Option<ReadingProgress>>,
    in_library: ReadSignal<bool>,
    set_in_library: WriteSignal<bool>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let novel_id = novel.novel_id;
    let cover = cover_url(novel.cover_image.as_deref(), state.api().base_url());
    let app = state.app;

    let state_for_add = state.clone();
    let add_to_library = move |_: ev::MouseEvent| {
        let state = state_for_add.clone();
        let Some(user_id) = state.store.state().user_id() else {
            state.navigate(LOGIN_PATH);
            return;
        };
        spawn_local(async move {
            match state.with_spinner(state.api().library().add(user_id, novel_id)).await {
                Ok(AddOutcome::Added) => {
                    set_in_library.set(true);
                    state.show_success("Novel added to library!");
                }
                Ok(AddOutcome::AlreadyPresent) => {
                    set_in_library.set(true);
                    state.show_info("Novel is already in your library");
                }
                Err(e) => {
                    log_error(&format!("Error adding to library: {}", e));
                    state.show_error("Failed to add to library. Please try again.");
                }
            }
        });
    };

    let state_for_bookmark = state.clone();
    let toggle_bookmark = move |_| {
        if state_for_bookmark.store.toggle_bookmark(novel_id) {
            state_for_bookmark.show_success("Bookmarked");
        } else {
            state_for_bookmark.show_info("Bookmark removed");
        }
    };

    let first_chapter = move || {
        chapters.with(|list| {
            list.as_ref()
                .and_then(|l| l.first())
                .map(|c| href(&paths::reader(novel_id, c.chapter_id)))
        })
    };

    let continue_reading = move || {
        progress.get().and_then(|p| p.chapter).map(|chapter| {
            view! {
                <a
                    href=href(&paths::reader(novel_id, chapter.chapter_id))
                    class="px-4 py-2 bg-green-600 hover:bg-green-700 rounded-lg font-medium"
                >
                    {format!("📖 Continue Reading (Chapter {})", chapter.chapter_number)}
                </a>
            }
        })
    };

    view! {
        <section class="flex flex-col md:flex-row gap-8 bg-gray-800 rounded-xl p-6">
            <img src=cover alt=novel.title.clone() class="w-48 h-72 object-cover rounded-lg" />

            <div class="flex-1 space-y-3">
                <h1 class="text-3xl font-bold">{novel.title.clone()}</h1>
                <p class="text-gray-400">"by " {novel.author_or_unknown().to_string()}</p>

                <div class="flex items-center space-x-4 text-sm text-gray-400">
                    <span>{move || chapter_count_label(chapters.with(|c| c.as_ref().map(Vec::len)))}</span>
                    <span class="flex items-center space-x-1">
                        {move || view! { <StarRating rating=stats.get().average_rating /> }}
                        <span>{move || format_rating(stats.get().average_rating)}</span>
                        <span>{move || format!("({} reviews)", stats.get().review_count)}</span>
                    </span>
                </div>

                <p class="text-gray-300 whitespace-pre-line">{novel.description_or_empty().to_string()}</p>

                <div class="flex flex-wrap gap-3 pt-2">
                    {continue_reading}
                    {move || first_chapter().map(|link| view! {
                        <a href=link class=PRIMARY_BUTTON>"Start Reading"</a>
                    })}
                    {move || {
                        if !app.with(|s| s.is_authenticated) {
                            view! {
                                <a href=href(LOGIN_PATH) class=SECONDARY_BUTTON>"Login to add to library"</a>
                            }
                            .into_view()
                        } else if in_library.get() {
                            view! {
                                <button class=SECONDARY_BUTTON disabled=true>"✓ In Library"</button>
                            }
                            .into_view()
                        } else {
                            view! {
                                <button class=PRIMARY_BUTTON on:click=add_to_library.clone()>"+ Add to Library"</button>
                            }
                            .into_view()
                        }
                    }}
                    <button class=SECONDARY_BUTTON on:click=toggle_bookmark>
                        {move || if app.with(|s| s.is_bookmarked(novel_id)) { "★ Bookmarked" } else { "☆ Bookmark" }}
                    </button>
                </div>
            </div>
        </section>
    }
}

#[component]
fn ChapterList(novel_id: NovelId, chapters: ReadSignal<Option<Vec<Chapter>>>) -> impl IntoView {
    view! {
        <section class="bg-gray-800 rounded-xl p-6">
            <h2 class="text-xl font-semibold mb-4">"Chapters"</h2>
            {move || match chapters.get() {
                None => view! { <Loading /> }.into_view(),
                Some(list) if list.is_empty() => {
                    view! { <EmptyState title="No chapters available yet" /> }.into_view()
                }
                Some(list) => view! {
                    <ul class="divide-y divide-gray-700">
                        {list
                            .into_iter()
                            .map(|chapter| view! {
                                <li>
                                    <a
                                        href=href(&paths::reader(novel_id, chapter.chapter_id))
                                        class="flex justify-between py-3 hover:text-blue-400"
                                    >
                                        <span>{chapter.label()}</span>
                                        <span class="text-sm text-gray-500">{format_date(chapter.created_at)}</span>
                                    </a>
                                </li>
                            })
                            .collect_view()}
                    </ul>
                }
                .into_view(),
            }}
        </section>
    }
}

#[component]
fn ReviewsSection(novel_id: NovelId, set_stats: WriteSignal<ReviewStats>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (reviews, set_reviews) = create_signal(None::<Result<Vec<Review>, String>>);
    let rating = create_rw_signal(0u8);
    let (comment, set_comment) = create_signal(String::new());
    let app = state.app;

    let state_for_load = state.clone();
    let load = move || {
        let state = state_for_load.clone();
        spawn_local(async move {
            let api = state.api();
            match api.reviews().list(novel_id).await {
                Ok(list) => set_reviews.set(Some(Ok(list))),
                Err(e) => {
                    log_error(&format!("Error loading reviews: {}", e));
                    set_reviews.set(Some(Err("Failed to load reviews".to_string())));
                }
            }
            if let Ok(stats) = api.reviews().stats(novel_id).await {
                set_stats.set(stats);
            }
        });
    };
    load();

    let state_for_submit = state.clone();
    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let review = match validate_review(rating.get(), &comment.get()) {
            Ok(review) => review,
            Err(e) => {
                state_for_submit.show_warning(&e.to_string());
                return;
            }
        };

        let state = state_for_submit.clone();
        let reload = load.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().reviews().add(novel_id, &review)).await {
                Ok(_) => {
                    state.show_success("Review submitted successfully!");
                    rating.set(0);
                    set_comment.set(String::new());
                    reload();
                }
                Err(e) => {
                    log_error(&format!("Error submitting review: {}", e));
                    state.show_error("Failed to submit review");
                }
            }
        });
    };

    view! {
        <section class="bg-gray-800 rounded-xl p-6 space-y-6">
            <h2 class="text-xl font-semibold">"Reviews & Ratings"</h2>

            {move || {
                if app.with(|s| s.is_authenticated) {
                    view! {
                        <form on:submit=submit.clone() class="space-y-3">
                            <h3 class="font-medium">"Rate this novel"</h3>
                            <StarPicker value=rating />
                            <textarea
                                class=INPUT_CLASS
                                rows="3"
                                maxlength=MAX_REVIEW_CHARS.to_string()
                                placeholder="Share your thoughts (optional)"
                                prop:value=move || comment.get()
                                on:input=move |ev| set_comment.set(event_target_value(&ev))
                            />
                            <div class="flex items-center justify-between">
                                <span class="text-xs text-gray-500">
                                    {move || format!("{}/{}", comment.with(|c| c.chars().count()), MAX_REVIEW_CHARS)}
                                </span>
                                <button type="submit" class=PRIMARY_BUTTON>"Submit Review"</button>
                            </div>
                        </form>
                    }
                    .into_view()
                } else {
                    view! {
                        <p class="text-gray-400">
                            "Please " <a href="#/login" class="text-blue-400">"log in"</a> " to leave a review"
                        </p>
                    }
                    .into_view()
                }
            }}

            {move || match reviews.get() {
                None => view! { <Loading message="Loading reviews..." /> }.into_view(),
                Some(Err(message)) => view! { <ErrorMessage message=message /> }.into_view(),
                Some(Ok(list)) if list.is_empty() => {
                    view! { <EmptyState title="No reviews yet. Be the first to review!" /> }.into_view()
                }
                Some(Ok(list)) => list
                    .into_iter()
                    .map(|review| view! { <ReviewItem review=review /> })
                    .collect_view(),
            }}
        </section>
    }
}

#[component]
fn ReviewItem(review: Review) -> impl IntoView {
    view! {
        <div class="border-t border-gray-700 pt-4">
            <div class="flex items-center justify-between">
                <div class="flex items-center space-x-3">
                    <span class="w-8 h-8 rounded-full bg-blue-600 flex items-center justify-center text-xs font-semibold">
                        {initials(&review.username)}
                    </span>
                    <span class="font-medium">{review.username.clone()}</span>
                </div>
                <StarRating rating=f64::from(review.rating) />
            </div>
            {review.comment.map(|c| view! { <p class="text-gray-300 mt-2">{c}</p> })}
            <span class="text-xs text-gray-500">{format_date(review.created_at)}</span>
        </div>
    }
}

#[component]
fn CommentsSection(novel_id: NovelId) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let comments = create_rw_signal(None::<Result<Vec<Comment>, String>>);
    let (draft, set_draft) = create_signal(String::new());
    let app = state.app;

    let state_for_load = state.clone();
    spawn_local(async move {
        match state_for_load.api().comments().list(novel_id).await {
            Ok(list) => comments.set(Some(Ok(list))),
            Err(e) => {
                log_error(&format!("Error loading comments: {}", e));
                comments.set(Some(Err("Failed to load comments".to_string())));
            }
        }
    });

    let state_for_post = state.clone();
    let post = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let content = match validate_comment(&draft.get()) {
            Ok(content) => content,
            Err(e) => {
                state_for_post.show_warning(&e.to_string());
                return;
            }
        };
        let state = state_for_post.clone();
        spawn_local(async move {
            match state.with_spinner(state.api().comments().add(novel_id, &content)).await {
                Ok(comment) => {
                    comments.update(|c| {
                        if let Some(Ok(list)) = c {
                            list.insert(0, comment);
                        }
                    });
                    set_draft.set(String::new());
                    state.show_success("Comment posted");
                }
                Err(e) => state.show_error(&format!("Failed to post comment: {}", e)),
            }
        });
    };

    view! {
        <section class="bg-gray-800 rounded-xl p-6 space-y-6">
            <h2 class="text-xl font-semibold">"Comments"</h2>

            <Show when=move || app.with(|s| s.is_authenticated)>
                <form on:submit=post.clone() class="space-y-3">
                    <textarea
                        class=INPUT_CLASS
                        rows="2"
                        placeholder="Write a comment..."
                        prop:value=move || draft.get()
                        on:input=move |ev| set_draft.set(event_target_value(&ev))
                    />
                    <button type="submit" class=PRIMARY_BUTTON>"Post Comment"</button>
                </form>
            </Show>

            {move || match comments.get() {
                None => view! { <Loading /> }.into_view(),
                Some(Err(message)) => view! { <ErrorMessage message=message /> }.into_view(),
                Some(Ok(list)) if list.is_empty() => {
                    view! { <EmptyState title="No comments yet" /> }.into_view()
                }
                Some(Ok(list)) => list
                    .into_iter()
                    .map(|comment| view! { <CommentItem comment=comment comments=comments /> })
                    .collect_view(),
            }}
        </section>
    }
}

#[component]
fn CommentItem(
    comment: Comment,
    comments: RwSignal<Option<Result<Vec<Comment>, String>>>,
) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let comment_id = comment.comment_id;
    let own = comment.user_id.is_some() && comment.user_id == state.store.state().user_id();
    let (editing, set_editing) = create_signal(false);
    let (text, set_text) = create_signal(comment.content.clone());

    let replace = move |updated: Option<Comment>| {
        comments.update(|c| {
            if let Some(Ok(list)) = c {
                match updated {
                    Some(updated) => {
                        if let Some(slot) = list.iter_mut().find(|c| c.comment_id == comment_id) {
                            *slot = updated;
                        }
                    }
                    None => list.retain(|c| c.comment_id != comment_id),
                }
            }
        })
    };

    let state_for_save = state.clone();
    let save = move |_: ev::MouseEvent| {
        let content = match validate_comment(&text.get()) {
            Ok(content) => content,
            Err(e) => {
                state_for_save.show_warning(&e.to_string());
                return;
            }
        };
        let state = state_for_save.clone();
        spawn_local(async move {
            match state.api().comments().update(comment_id, &content).await {
                Ok(updated) => {
                    set_editing.set(false);
                    replace(Some(updated));
                }
                Err(e) => state.show_error(&format!("Failed to update comment: {}", e)),
            }
        });
    };

    let state_for_delete = state.clone();
    let delete = move |_: ev::MouseEvent| {
        if !confirm("Delete this comment?") {
            return;
        }
        let state = state_for_delete.clone();
        spawn_local(async move {
            match state.api().comments().delete(comment_id).await {
                Ok(()) => {
                    replace(None);
                    state.show_success("Comment deleted");
                }
                Err(e) => state.show_error(&format!("Failed to delete comment: {}", e)),
            }
        });
    };

    let posted = comment
        .created_at
        .map(|at| time_ago(at, now()))
        .unwrap_or_default();

    view! {
        <div class="border-t border-gray-700 pt-4">
            <div class="flex items-center justify-between">
                <div class="flex items-center space-x-3">
                    <span class="w-8 h-8 rounded-full bg-purple-600 flex items-center justify-center text-xs font-semibold">
                        {initials(&comment.username)}
                    </span>
                    <span class="font-medium">{comment.username.clone()}</span>
                    <span class="text-xs text-gray-500">{posted}</span>
                </div>
                <Show when=move || own>
                    <div class="space-x-2 text-sm">
                        <button class="text-blue-400" on:click=move |_| set_editing.update(|e| *e = !*e)>"Edit"</button>
                        <button class="text-red-400" on:click=delete.clone()>"Delete"</button>
                    </div>
                </Show>
            </div>
            {move || {
                if editing.get() {
                    view! {
                        <div class="mt-2 space-y-2">
                            <textarea
                                class=INPUT_CLASS
                                rows="2"
                                prop:value=move || text.get()
                                on:input=move |ev| set_text.set(event_target_value(&ev))
                            />
                            <button class=PRIMARY_BUTTON on:click=save.clone()>"Save"</button>
                        </div>
                    }
                    .into_view()
                } else {
                    view! { <p class="text-gray-300 mt-2">{text.get()}</p> }.into_view()
                }
            }}
        </div>
    }
}
