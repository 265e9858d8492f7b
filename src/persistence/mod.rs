//! Key/value persistence
//!
//! The game persists a single value (the best score). Browsers back it with
//! LocalStorage; native builds and tests use an in-memory map.

use std::collections::HashMap;

/// String key/value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Returns false if the write was rejected (quota, private mode, ...)
    fn set(&mut self, key: &str, value: &str) -> bool;
}

/// Non-persistent store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.entries.insert(key.to_owned(), value.to_owned());
        true
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        let storage = Self::storage()?;
        match storage.get_item(key) {
            Ok(value) => value,
            Err(_) => {
                log::warn!("LocalStorage read failed for {key}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable");
            return false;
        };
        if storage.set_item(key, value).is_err() {
            log::warn!("LocalStorage write failed for {key}");
            return false;
        }
        true
    }
}
