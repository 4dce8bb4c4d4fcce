//! Global Application State
//!
//! Bridges the `novelly` store into Leptos signals and holds UI-only state
//! (toast, spinner, current hash).

use leptos::*;
use gloo_timers::callback::Timeout;
use novelly::catalog::NovelCache;
use novelly::client::ApiClient;
use novelly::router::{href, Navigator};
use novelly::store::{AppState, Store};
use novelly::Session;
use std::future::Future;
use std::rc::Rc;

use super::storage::LocalStorage;
use crate::api::{get_api_base, GlooTransport};

const TOAST_DURATION_MS: u32 = 3000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
            ToastKind::Warning => "⚠",
            ToastKind::Info => "ℹ",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "bg-green-600",
            ToastKind::Error => "bg-red-600",
            ToastKind::Warning => "bg-yellow-600",
            ToastKind::Info => "bg-blue-600",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToastMessage {
    pub id: u64,
    pub kind: ToastKind,
    pub text: String,
}

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    pub store: Store,
    pub session: Session,
    /// Latest store snapshot, refreshed on every store update
    pub app: RwSignal<AppState>,
    /// Current `location.hash`
    pub hash: RwSignal<String>,
    /// In-flight requests behind the spinner overlay
    pub pending: RwSignal<u32>,
    pub toast: RwSignal<Option<ToastMessage>>,
    /// Admin novel list, kept across page visits
    pub novel_cache: StoredValue<NovelCache>,
}

/// Sets `window.location.hash`; the `hashchange` listener does the rest
pub struct HashNavigator;

impl Navigator for HashNavigator {
    fn navigate(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_hash(&href(path));
        }
    }
}

pub fn current_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

/// Provide global state to the component tree
pub fn provide_global_state() -> GlobalState {
    let store = Store::new(Rc::new(LocalStorage));
    store.initialize();

    let api = ApiClient::new(get_api_base(), Rc::new(GlooTransport), Rc::new(store.clone()));
    let session = Session::new(store.clone(), api);

    let app = create_rw_signal(store.snapshot());
    store.subscribe(move |state| app.set(state.clone()));

    let state = GlobalState {
        store,
        session,
        app,
        hash: create_rw_signal(current_hash()),
        pending: create_rw_signal(0),
        toast: create_rw_signal(None),
        novel_cache: store_value(NovelCache::default()),
    };

    provide_context(state.clone());
    state
}

impl GlobalState {
    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }

    pub fn navigate(&self, path: &str) {
        HashNavigator.navigate(path);
    }

    /// Navigate once `delay_ms` has passed; dropping the handle cancels it
    #[must_use]
    pub fn navigate_later(&self, path: &str, delay_ms: u32) -> Timeout {
        let path = path.to_string();
        Timeout::new(delay_ms, move || {
            HashNavigator.navigate(&path);
        })
    }

    /// Run a request with the spinner overlay shown
    pub async fn with_spinner<T>(&self, fut: impl Future<Output = T>) -> T {
        self.pending.update(|n| *n += 1);
        let out = fut.await;
        self.pending.update(|n| *n = n.saturating_sub(1));
        out
    }

    /// Show a toast; it clears itself unless replaced in the meantime
    pub fn show_toast(&self, kind: ToastKind, message: &str) {
        let id = self.toast.get_untracked().map_or(1, |t| t.id + 1);
        self.toast.set(Some(ToastMessage {
            id,
            kind,
            text: message.to_string(),
        }));

        let toast = self.toast;
        Timeout::new(TOAST_DURATION_MS, move || {
            if toast.get_untracked().is_some_and(|t| t.id == id) {
                toast.set(None);
            }
        })
        .forget();
    }

    pub fn show_success(&self, message: &str) {
        self.show_toast(ToastKind::Success, message);
    }

    pub fn show_error(&self, message: &str) {
        log_error(message);
        self.show_toast(ToastKind::Error, message);
    }

    pub fn show_warning(&self, message: &str) {
        self.show_toast(ToastKind::Warning, message);
    }

    pub fn show_info(&self, message: &str) {
        self.show_toast(ToastKind::Info, message);
    }

    pub fn dismiss_toast(&self) {
        self.toast.set(None);
    }
}

pub fn log_error(message: &str) {
    web_sys::console::error_1(&message.into());
}

/// Native confirmation dialog; false when it cannot be shown
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_kinds_have_distinct_classes() {
        let classes = [
            ToastKind::Success.class(),
            ToastKind::Error.class(),
            ToastKind::Warning.class(),
            ToastKind::Info.class(),
        ];
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
