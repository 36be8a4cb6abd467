//! `localStorage` as the durable store

use cuberun_core::{KeyValueStore, StoreError, StoreResult};
use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Storage;

pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    /// Grab `window.localStorage`. Private browsing modes can deny it; the
    /// store then reports every access as unavailable.
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("localStorage is not available, high scores will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> StoreResult<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage is not available".into()))
    }
}

fn js_error(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StoreError::Read(js_error(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Write(js_error(&e)))
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Write(js_error(&e)))
    }
}
