//! Register Page
//!
//! Account creation with live password strength feedback.

use leptos::*;
use novelly::router::HOME_PATH;
use novelly::validation::{password_strength, validate_registration, FieldError};

use super::{FieldMessage, INPUT_CLASS, PRIMARY_BUTTON};
use crate::state::GlobalState;

#[component]
pub fn Register() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let (username, set_username) = create_signal(String::new());
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (confirm, set_confirm) = create_signal(String::new());
    let (errors, set_errors) = create_signal(Vec::<FieldError>::new());

    let strength = create_memo(move |_| password.with(|p| password_strength(p)));

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();

        let (username, email, password) = (username.get(), email.get(), password.get());
        let problems = validate_registration(&username, &email, &password, &confirm.get());
        let invalid = !problems.is_empty();
        set_errors.set(problems);
        if invalid {
            return;
        }

        let state = state.clone();
        spawn_local(async move {
            let result = state
                .with_spinner(state.session.register(&username, &email, &password))
                .await;
            match result {
                Ok(user) => {
                    state.show_success(&format!("Welcome, {}!", user.username));
                    state.navigate(HOME_PATH);
                }
                Err(e) => set_errors.set(vec![FieldError {
                    field: "form",
                    message: e.to_string(),
                }]),
            }
        });
    };

    let input = |label: &'static str,
                 kind: &'static str,
                 field: &'static str,
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
                <FieldMessage errors=errors field=field />
            </div>
        }
    };

    view! {
        <div class="max-w-md mx-auto bg-gray-800 rounded-xl p-8 mt-8">
            <h1 class="text-2xl font-bold mb-1">"Create Account"</h1>
            <p class="text-gray-400 mb-6">"Join Novelly and start reading"</p>

            <form on:submit=on_submit class="space-y-4">
                <FieldMessage errors=errors field="form" />
                {input("Username", "text", "username", username, set_username)}
                {input("Email", "email", "email", email, set_email)}
                {input("Password", "password", "password", password, set_password)}

                <Show when=move || !password.with(String::is_empty)>
                    <div class="text-sm">
                        <div class="h-1.5 bg-gray-700 rounded">
                            <div
                                class=move || format!("h-1.5 rounded strength-{}", strength.get().level.as_str())
                                style=move || format!("width: {}%", u32::from(strength.get().score) * 100 / 6)
                            />
                        </div>
                        <p class="text-gray-400 mt-1">{move || strength.get().level.message()}</p>
                    </div>
                </Show>

                {input("Confirm Password", "password", "confirm", confirm, set_confirm)}

                <button type="submit" class=format!("{} w-full", PRIMARY_BUTTON)>"Register"</button>
            </form>

            <p class="text-sm text-gray-400 mt-6 text-center">
                "Already have an account? "
                <a href="#/login" class="text-blue-400 hover:underline">"Login"</a>
            </p>
        </div>
    }
}
