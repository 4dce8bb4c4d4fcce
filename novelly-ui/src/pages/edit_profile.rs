//! Edit Profile Page
//!
//! Username, password and avatar changes. The backend has no profile
//! endpoint, so accepted changes are applied to the local session only.

use leptos::*;
use novelly::catalog::initials;
use novelly::validation::{
    validate_avatar_size, validate_profile_edit, FieldError, ProfileEdit, ProfileEditError,
};
use wasm_bindgen::JsCast;

use super::{FieldMessage, INPUT_CLASS, PRIMARY_BUTTON, SECONDARY_BUTTON};
use crate::state::GlobalState;

#[component]
pub fn EditProfile() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let current_username = state
        .store
        .state()
        .current_user
        .as_ref()
        .map(|u| u.username.clone())
        .unwrap_or_default();

    let (username, set_username) = create_signal(current_username.clone());
    let (current_password, set_current_password) = create_signal(String::new());
    let (new_password, set_new_password) = create_signal(String::new());
    let (confirm_password, set_confirm_password) = create_signal(String::new());
    let (avatar, set_avatar) = create_signal(None::<(String, u64)>);
    let (errors, set_errors) = create_signal(Vec::<FieldError>::new());

    let state_for_avatar = state.clone();
    let on_avatar = move |ev: ev::Event| {
        let file = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));
        let Some(file) = file else {
            return;
        };
        let size = file.size() as u64;
        if let Err(e) = validate_avatar_size(size) {
            state_for_avatar.show_error(&e.to_string());
            return;
        }
        set_avatar.set(Some((file.name(), size)));
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let edit = ProfileEdit {
            username: username.get(),
            current_password: current_password.get(),
            new_password: new_password.get(),
            confirm_password: confirm_password.get(),
            avatar_bytes: avatar.get().map(|(_, size)| size),
        };

        match validate_profile_edit(&current_username, &edit) {
            Err(ProfileEditError::NoChanges) => {
                set_errors.set(Vec::new());
                state.show_info("No changes to save");
            }
            Err(ProfileEditError::Invalid(problems)) => set_errors.set(problems),
            Ok(changes) => {
                set_errors.set(Vec::new());
                if let Some(name) = changes.username {
                    state.store.update(move |s| {
                        if let Some(user) = s.current_user.as_mut() {
                            user.username = name;
                        }
                    });
                }
                state.show_success("Profile updated successfully!");
                state.navigate("/profile");
            }
        }
    };

    let field = |label: &'static str,
                 kind: &'static str,
                 name: &'static str,
                 value: ReadSignal<String>,
                 set: WriteSignal<String>| {
        view! {
            <div>
                <label class="block text-sm mb-1">{label}</label>
                <input
                    type=kind
                    class=INPUT_CLASS
                    prop:value=move || value.get()
                    on:input=move |ev| set.set(event_target_value(&ev))
                />
                <FieldMessage errors=errors field=name />
            </div>
        }
    };

    view! {
        <div class="max-w-xl mx-auto space-y-6">
            <h1 class="text-3xl font-bold">"Edit Profile"</h1>

            <form on:submit=on_submit class="space-y-6">
                <section class="bg-gray-800 rounded-xl p-6 space-y-3">
                    <h3 class="font-semibold">"Profile Picture"</h3>
                    <div class="flex items-center gap-4">
                        <div class="w-16 h-16 rounded-full bg-blue-600 flex items-center justify-center text-xl font-bold">
                            {move || initials(&username.get())}
                        </div>
                        <div>
                            <input type="file" accept="image/*" on:change=on_avatar class="text-sm" />
                            <p class="text-xs text-gray-500 mt-1">
                                {move || match avatar.get() {
                                    Some((name, _)) => name,
                                    None => "JPG, PNG or GIF. Max 2MB.".to_string(),
                                }}
                            </p>
                        </div>
                    </div>
                </section>

                <section class="bg-gray-800 rounded-xl p-6 space-y-3">
                    <h3 class="font-semibold">"Username"</h3>
                    {field("Username", "text", "username", username, set_username)}
                </section>

                <section class="bg-gray-800 rounded-xl p-6 space-y-3">
                    <h3 class="font-semibold">"Change Password"</h3>
                    {field("Current Password", "password", "current_password", current_password, set_current_password)}
                    {field("New Password", "password", "new_password", new_password, set_new_password)}
                    {field("Confirm New Password", "password", "confirm_password", confirm_password, set_confirm_password)}
                </section>

                <div class="flex justify-end gap-3">
                    <a href="#/profile" class=SECONDARY_BUTTON>"Cancel"</a>
                    <button type="submit" class=PRIMARY_BUTTON>"Save Changes"</button>
                </div>
            </form>
        </div>
    }
}
