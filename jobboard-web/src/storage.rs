//! `window.localStorage` preference store

use jobboard::preferences::{PreferenceError, PreferenceStore};
use web_sys::Storage;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

fn local_storage() -> Result<Storage, PreferenceError> {
    let window = web_sys::window()
        .ok_or_else(|| PreferenceError::Unavailable("no window".to_string()))?;
    match window.local_storage() {
        Ok(Some(storage)) => Ok(storage),
        Ok(None) => Err(PreferenceError::Unavailable(
            "localStorage is disabled".to_string(),
        )),
        Err(e) => Err(PreferenceError::Unavailable(format!("{:?}", e))),
    }
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| PreferenceError::Unavailable(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| PreferenceError::Unavailable(format!("{:?}", e)))
    }
}
