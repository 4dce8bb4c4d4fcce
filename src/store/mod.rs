//! Application State Store
//!
//! Single-threaded container for the client's global state. Every mutation
//! goes through [`Store::update`], which persists the session keys that
//! changed and then notifies subscribers with the new state.
//!
//! - **storage**: the [`Storage`] seam and an in-memory backend
//! - **file**: JSON-file backend used by the terminal client
//!
//! # Persisted keys
//!
//! ```text
//! jwtToken     raw token string
//! currentUser  User as JSON
//! bookmarks    novel ids as a JSON array
//! ```

#[cfg(feature = "native")]
pub mod file;
pub mod storage;

#[cfg(feature = "native")]
pub use file::FileStorage;
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};

use crate::models::{Chapter, Novel, NovelId, ReadingProgress, Role, User};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

pub const KEY_TOKEN: &str = "jwtToken";
pub const KEY_USER: &str = "currentUser";
pub const KEY_BOOKMARKS: &str = "bookmarks";

/// Search results carried from the header search box to the search page
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHandoff {
    pub query: String,
    pub results: Vec<Novel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub current_user: Option<User>,
    pub novels: Vec<Novel>,
    pub bookmarks: Vec<NovelId>,
    pub reading_history: Vec<ReadingProgress>,
    pub current_novel: Option<Novel>,
    pub current_chapter: Option<Chapter>,
    pub jwt_token: Option<String>,
    pub is_authenticated: bool,
    pub search: Option<SearchHandoff>,
}

impl AppState {
    pub fn role(&self) -> Option<Role> {
        self.current_user.as_ref().and_then(|u| u.role)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.current_user.as_ref().map(|u| u.user_id)
    }

    pub fn is_bookmarked(&self, novel_id: NovelId) -> bool {
        self.bookmarks.contains(&novel_id)
    }
}

/// Serialized form of the persisted keys, used to detect changes
#[derive(Debug, PartialEq)]
struct PersistedValues {
    token: Option<String>,
    user: Option<String>,
    bookmarks: Option<String>,
}

impl PersistedValues {
    fn capture(state: &AppState) -> Self {
        Self {
            token: state.jwt_token.clone().filter(|t| !t.is_empty()),
            user: state
                .current_user
                .as_ref()
                .and_then(|u| serde_json::to_string(u).ok()),
            bookmarks: if state.bookmarks.is_empty() {
                None
            } else {
                serde_json::to_string(&state.bookmarks).ok()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&AppState)>;

struct Inner {
    state: RefCell<AppState>,
    storage: Rc<dyn Storage>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: RefCell<u64>,
}

/// Cheaply clonable handle to the shared state
#[derive(Clone)]
pub struct Store {
    inner: Rc<Inner>,
}

impl Store {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(AppState::default()),
                storage,
                listeners: RefCell::new(Vec::new()),
                next_id: RefCell::new(0),
            }),
        }
    }

    /// Store backed by a fresh [`MemoryStorage`]
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStorage::new()))
    }

    pub fn storage(&self) -> Rc<dyn Storage> {
        Rc::clone(&self.inner.storage)
    }

    /// Register a listener. Listeners run in subscription order.
    pub fn subscribe(&self, listener: impl Fn(&AppState) + 'static) -> SubscriptionId {
        let id = {
            let mut next = self.inner.next_id.borrow_mut();
            *next += 1;
            SubscriptionId(*next)
        };
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Returns false when the id was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Borrowed read access. Do not hold across an `update`.
    pub fn state(&self) -> Ref<'_, AppState> {
        self.inner.state.borrow()
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    /// Apply a mutation, persist changed keys, then notify every listener once.
    pub fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.inner.state.borrow_mut();
            let before = PersistedValues::capture(&state);
            let result = f(&mut state);
            let after = PersistedValues::capture(&state);
            self.persist(&before, &after);
            (result, state.clone())
        };
        self.notify(&snapshot);
        result
    }

    /// Restore the session and bookmarks from storage
    pub fn initialize(&self) {
        let storage = &self.inner.storage;
        let token = read_key(storage.as_ref(), KEY_TOKEN).filter(|t| !t.is_empty());
        let user_json = read_key(storage.as_ref(), KEY_USER);

        let snapshot = {
            let mut state = self.inner.state.borrow_mut();

            if let (Some(token), Some(user_json)) = (token, user_json) {
                match serde_json::from_str::<User>(&user_json) {
                    Ok(user) => {
                        tracing::debug!(username = %user.username, "Restored session");
                        state.jwt_token = Some(token);
                        state.current_user = Some(user);
                        state.is_authenticated = true;
                    }
                    Err(e) => {
                        tracing::warn!("Discarding unreadable stored user: {}", e);
                        remove_key(storage.as_ref(), KEY_TOKEN);
                        remove_key(storage.as_ref(), KEY_USER);
                    }
                }
            }

            if let Some(raw) = read_key(storage.as_ref(), KEY_BOOKMARKS) {
                match serde_json::from_str::<Vec<NovelId>>(&raw) {
                    Ok(bookmarks) => state.bookmarks = bookmarks,
                    Err(e) => tracing::warn!("Ignoring unreadable bookmarks: {}", e),
                }
            }

            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Enter the authenticated state
    pub fn set_session(&self, token: impl Into<String>, user: User) {
        let token = token.into();
        self.update(move |state| {
            state.jwt_token = Some(token);
            state.current_user = Some(user);
            state.is_authenticated = true;
        });
    }

    /// Logout: drop the session, bookmarks and history and their stored keys
    pub fn clear(&self) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            state.current_user = None;
            state.jwt_token = None;
            state.is_authenticated = false;
            state.bookmarks.clear();
            state.reading_history.clear();
            state.current_novel = None;
            state.current_chapter = None;
            state.search = None;
            state.clone()
        };

        let storage = &self.inner.storage;
        for key in [KEY_TOKEN, KEY_USER, KEY_BOOKMARKS] {
            remove_key(storage.as_ref(), key);
        }

        self.notify(&snapshot);
    }

    /// Add or remove a bookmark, returning whether it is now bookmarked
    pub fn toggle_bookmark(&self, novel_id: NovelId) -> bool {
        self.update(|state| {
            if let Some(pos) = state.bookmarks.iter().position(|id| *id == novel_id) {
                state.bookmarks.remove(pos);
                false
            } else {
                state.bookmarks.push(novel_id);
                true
            }
        })
    }

    /// Take the pending search hand-off, if any
    pub fn take_search(&self) -> Option<SearchHandoff> {
        if self.inner.state.borrow().search.is_none() {
            return None;
        }
        self.update(|state| state.search.take())
    }

    fn persist(&self, before: &PersistedValues, after: &PersistedValues) {
        let storage = self.inner.storage.as_ref();
        let pairs = [
            (KEY_TOKEN, &before.token, &after.token),
            (KEY_USER, &before.user, &after.user),
            (KEY_BOOKMARKS, &before.bookmarks, &after.bookmarks),
        ];
        for (key, old, new) in pairs {
            if old == new {
                continue;
            }
            match new {
                Some(value) => {
                    if let Err(e) = storage.set_item(key, value) {
                        tracing::warn!(key, "Failed to persist state: {}", e);
                    }
                }
                None => remove_key(storage, key),
            }
        }
    }

    fn notify(&self, state: &AppState) {
        // Cloned so listeners may subscribe, unsubscribe or read the store
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn read_key(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, "Failed to read stored value: {}", e);
            None
        }
    }
}

fn remove_key(storage: &dyn Storage, key: &str) {
    if let Err(e) = storage.remove_item(key) {
        tracing::warn!(key, "Failed to remove stored value: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn user(role: Role) -> User {
        User {
            user_id: 7,
            username: "reader".to_string(),
            email: Some("reader@example.com".to_string()),
            role: Some(role),
        }
    }

    fn store_with(storage: &MemoryStorage) -> Store {
        Store::new(Rc::new(storage.clone()))
    }

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let store = Store::in_memory();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let c1 = Rc::clone(&calls);
        store.subscribe(move |_| c1.borrow_mut().push("first"));
        let c2 = Rc::clone(&calls);
        store.subscribe(move |_| c2.borrow_mut().push("second"));

        store.update(|s| s.novels.clear());
        assert_eq!(*calls.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = Store::in_memory();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let id = store.subscribe(move |_| c.set(c.get() + 1));

        store.update(|_| ());
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.update(|_| ());

        assert_eq!(count.get(), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_session_persisted_before_notification() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);

        let seen = Rc::new(Cell::new(false));
        let seen_in = Rc::clone(&seen);
        let probe = storage.clone();
        store.subscribe(move |state| {
            assert!(state.is_authenticated);
            assert_eq!(probe.get_item(KEY_TOKEN).unwrap().as_deref(), Some("tok"));
            seen_in.set(true);
        });

        store.set_session("tok", user(Role::User));
        assert!(seen.get());

        let stored: User =
            serde_json::from_str(&storage.get_item(KEY_USER).unwrap().unwrap()).unwrap();
        assert_eq!(stored.username, "reader");
    }

    #[test]
    fn test_unchanged_keys_are_not_rewritten() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.set_session("tok", user(Role::User));

        // Out-of-band edit must survive an unrelated update
        storage.set_item(KEY_TOKEN, "external").unwrap();
        store.update(|s| s.current_novel = None);
        assert_eq!(storage.get_item(KEY_TOKEN).unwrap().as_deref(), Some("external"));
    }

    #[test]
    fn test_listener_can_read_store() {
        let store = Store::in_memory();
        let handle = store.clone();
        let observed = Rc::new(Cell::new(0usize));
        let o = Rc::clone(&observed);
        store.subscribe(move |_| o.set(handle.state().bookmarks.len()));

        store.toggle_bookmark(3);
        assert_eq!(observed.get(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = Store::in_memory();
        let mut copy = store.snapshot();
        copy.bookmarks.push(1);
        assert!(store.state().bookmarks.is_empty());
    }

    #[test]
    fn test_initialize_restores_session_and_bookmarks() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY_TOKEN, "tok").unwrap();
        storage
            .set_item(KEY_USER, &serde_json::to_string(&user(Role::Admin)).unwrap())
            .unwrap();
        storage.set_item(KEY_BOOKMARKS, "[5,9]").unwrap();

        let store = store_with(&storage);
        store.initialize();

        let state = store.state();
        assert!(state.is_authenticated);
        assert_eq!(state.jwt_token.as_deref(), Some("tok"));
        assert_eq!(state.role(), Some(Role::Admin));
        assert_eq!(state.bookmarks, vec![5, 9]);
    }

    #[test]
    fn test_initialize_requires_both_keys() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY_TOKEN, "tok").unwrap();

        let store = store_with(&storage);
        store.initialize();
        assert!(!store.state().is_authenticated);
        assert!(store.state().jwt_token.is_none());
    }

    #[test]
    fn test_initialize_ignores_empty_token() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY_TOKEN, "").unwrap();
        storage
            .set_item(KEY_USER, &serde_json::to_string(&user(Role::Admin)).unwrap())
            .unwrap();

        let store = store_with(&storage);
        store.initialize();

        let state = store.state();
        assert!(!state.is_authenticated);
        assert!(state.jwt_token.is_none());
        assert!(state.current_user.is_none());

        let auth = crate::router::AuthContext::from(&*state);
        assert!(matches!(
            crate::router::resolve("#/admin", &auth),
            crate::router::Resolution::Redirect(_)
        ));
    }

    #[test]
    fn test_initialize_drops_corrupt_user() {
        let storage = MemoryStorage::new();
        storage.set_item(KEY_TOKEN, "tok").unwrap();
        storage.set_item(KEY_USER, "{broken").unwrap();
        storage.set_item(KEY_BOOKMARKS, "also broken").unwrap();

        let store = store_with(&storage);
        store.initialize();

        assert!(!store.state().is_authenticated);
        assert!(!storage.contains_key(KEY_TOKEN));
        assert!(!storage.contains_key(KEY_USER));
        assert!(store.state().bookmarks.is_empty());
    }

    #[test]
    fn test_clear_removes_session_keys_and_notifies() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.set_session("tok", user(Role::User));
        store.toggle_bookmark(4);
        store.update(|s| s.reading_history.push(ReadingProgress {
            progress_id: Some(1),
            novel: None,
            chapter: None,
            scroll_position: None,
            reading_percentage: None,
            last_read_at: None,
        }));

        let notified = Rc::new(Cell::new(false));
        let n = Rc::clone(&notified);
        store.subscribe(move |state| {
            assert!(!state.is_authenticated);
            n.set(true);
        });

        store.clear();
        assert!(notified.get());
        assert!(storage.is_empty());
        let state = store.state();
        assert!(state.current_user.is_none());
        assert!(state.bookmarks.is_empty());
        assert!(state.reading_history.is_empty());
    }

    #[test]
    fn test_toggle_bookmark_persists_and_removes_key() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);

        assert!(store.toggle_bookmark(2));
        assert_eq!(storage.get_item(KEY_BOOKMARKS).unwrap().as_deref(), Some("[2]"));
        assert!(store.state().is_bookmarked(2));

        assert!(!store.toggle_bookmark(2));
        assert!(!storage.contains_key(KEY_BOOKMARKS));
    }

    #[test]
    fn test_take_search_clears_handoff() {
        let store = Store::in_memory();
        store.update(|s| {
            s.search = Some(SearchHandoff {
                query: "dune".to_string(),
                results: Vec::new(),
            })
        });

        let handoff = store.take_search().unwrap();
        assert_eq!(handoff.query, "dune");
        assert!(store.take_search().is_none());
    }
}
