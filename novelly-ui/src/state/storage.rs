//! `window.localStorage` backend for the state store

use novelly::store::{Storage, StorageError, StorageResult};

pub struct LocalStorage;

impl LocalStorage {
    fn backend(&self) -> StorageResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }
}

fn js_error(e: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", e))
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.backend()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.backend()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.backend()?.remove_item(key).map_err(js_error)
    }
}
