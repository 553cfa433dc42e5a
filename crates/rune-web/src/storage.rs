use rune_engine::assets::save::SAVE_FILE_NAME;
use rune_engine::{PlayerRecord, PlayerStore, StoreError};
use web_sys::Storage;

/// Keeps the player record in the browser's `localStorage`.
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        Self::with_key(SAVE_FILE_NAME)
    }

    pub fn with_key(key: &str) -> Self {
        Self { key: key.to_string() }
    }

    fn storage(&self) -> Result<Storage, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStore for LocalStorageStore {
    fn load(&self) -> Result<Option<PlayerRecord>, StoreError> {
        let item = self
            .storage()?
            .get_item(&self.key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        match item {
            Some(doc) => Ok(Some(PlayerRecord::from_json(&doc)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, record: &PlayerRecord) -> Result<(), StoreError> {
        let json = record.to_json()?;
        self.storage()?
            .set_item(&self.key, &json)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?;
        log::debug!("saved player under {}", self.key);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}
