//! Application Pages

pub mod admin;
pub mod edit_profile;
pub mod home;
pub mod library;
pub mod login;
pub mod not_found;
pub mod novel_detail;
pub mod profile;
pub mod reader;
pub mod register;
pub mod search;

pub use admin::Admin;
pub use edit_profile::EditProfile;
pub use home::Home;
pub use library::Library;
pub use login::Login;
pub use not_found::NotFound;
pub use novel_detail::NovelDetail;
pub use profile::Profile;
pub use reader::Reader;
pub use register::Register;
pub use search::Search;

use chrono::NaiveDateTime;
use leptos::*;
use novelly::validation::FieldError;

/// Message for one form field, if validation flagged it
#[component]
pub(crate) fn FieldMessage(errors: ReadSignal<Vec<FieldError>>, field: &'static str) -> impl IntoView {
    move || {
        errors.with(|list| {
            list.iter()
                .find(|e| e.field == field)
                .map(|e| view! { <p class="text-red-400 text-sm mt-1">{e.message.clone()}</p> })
        })
    }
}

#[component]
pub(crate) fn ErrorMessage(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="bg-red-900/40 border border-red-700 text-red-300 rounded-lg px-4 py-3">
            {message}
        </div>
    }
}

#[component]
pub(crate) fn EmptyState(
    #[prop(into)] title: String,
    #[prop(optional, into)] message: Option<String>,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    view! {
        <div class="text-center py-12 text-gray-400 space-y-3">
            <h3 class="text-lg font-semibold text-gray-200">{title}</h3>
            {message.map(|m| view! { <p>{m}</p> })}
            {children.map(|c| c())}
        </div>
    }
}

pub(crate) fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Calendar date of a backend timestamp
pub(crate) fn format_date(at: Option<NaiveDateTime>) -> String {
    at.map(|t| t.format("%b %-d, %Y").to_string()).unwrap_or_default()
}

pub(crate) const INPUT_CLASS: &str =
    "w-full bg-gray-700 rounded-lg px-4 py-2 border border-gray-600 focus:border-blue-500 focus:outline-none";
pub(crate) const PRIMARY_BUTTON: &str =
    "px-4 py-2 bg-blue-600 hover:bg-blue-700 disabled:bg-gray-600 rounded-lg font-medium";
pub(crate) const SECONDARY_BUTTON: &str =
    "px-4 py-2 bg-gray-700 hover:bg-gray-600 disabled:opacity-50 rounded-lg";
pub(crate) const DANGER_BUTTON: &str = "px-3 py-1.5 bg-red-600 hover:bg-red-700 rounded-lg text-sm";
