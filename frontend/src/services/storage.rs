use common::submission::store::{StorageSlot, StoreError};
use web_sys::Storage;

/// One `localStorage` key.
pub struct LocalStorageSlot {
    key: &'static str,
}

impl LocalStorageSlot {
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }

    fn storage(&self) -> Result<Storage, StoreError> {
        web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
    }
}

impl StorageSlot for LocalStorageSlot {
    fn read(&self) -> Option<String> {
        self.storage().ok()?.get_item(self.key).ok().flatten()
    }

    fn write(&self, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(self.key, value)
            .map_err(|e| StoreError::Write(format!("{:?}", e)))
    }

    fn remove(&self) {
        if let Ok(storage) = self.storage() {
            storage.remove_item(self.key).ok();
        }
    }
}
