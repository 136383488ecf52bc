use booking_core::storage::DraftStorage;
use booking_core::StorageError;
use gloo::storage::{LocalStorage, Storage};

/// Draft storage backed by `window.localStorage`.
///
/// Drafts are already JSON, so values go through the raw string API
/// instead of being encoded a second time.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct LocalDraftStorage;

impl DraftStorage for LocalDraftStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        LocalStorage::delete(key);
        Ok(())
    }
}
