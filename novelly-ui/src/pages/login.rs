//! Login Page

use leptos::*;
use novelly::router::HOME_PATH;
use novelly::validation::{validate_login, FieldError};

use super::{FieldMessage, INPUT_CLASS, PRIMARY_BUTTON};
use crate::state::GlobalState;

#[component]
pub fn Login() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let (identifier, set_identifier) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (errors, set_errors) = create_signal(Vec::<FieldError>::new());

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let identifier = identifier.get();
        let password = password.get();
        let problems = validate_login(&identifier, &password);
        let invalid = !problems.is_empty();
        set_errors.set(problems);
        if invalid {
            return;
        }

        let state = state.clone();
        spawn_local(async move {
            match state.with_spinner(state.session.login(&identifier, &password)).await {
                Ok(user) => {
                    state.show_success(&format!("Welcome back, {}!", user.username));
                    state.navigate(HOME_PATH);
                }
                Err(e) => set_errors.set(vec![FieldError {
                    field: "password",
                    message: e.to_string(),
                }]),
            }
        });
    };

    view! {
        <div class="max-w-md mx-auto bg-gray-800 rounded-xl p-8 mt-8">
            <h1 class="text-2xl font-bold mb-1">"Welcome Back"</h1>
            <p class="text-gray-400 mb-6">"Log in to continue reading"</p>

            <form on:submit=on_submit class="space-y-4">
                <div>
                    <label class="block text-sm mb-1">"Email or Username"</label>
                    <input
                        type="text"
                        class=INPUT_CLASS
                        autocomplete="username"
                        prop:value=move || identifier.get()
                        on:input=move |ev| set_identifier.set(event_target_value(&ev))
                    />
                    <FieldMessage errors=errors field="identifier" />
                </div>

                <div>
                    <label class="block text-sm mb-1">"Password"</label>
                    <input
                        type="password"
                        class=INPUT_CLASS
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                    <FieldMessage errors=errors field="password" />
                </div>

                <button type="submit" class=format!("{} w-full", PRIMARY_BUTTON)>"Login"</button>
            </form>

            <p class="text-sm text-gray-400 mt-6 text-center">
                "Don't have an account? "
                <a href="#/register" class="text-blue-400 hover:underline">"Register"</a>
            </p>
        </div>
    }
}
