//! Player save records and the stores that hold them.
//!
//! A record carries the player's persistent identity across battles: name,
//! stats, experience and known spells. Active effects are never saved.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::stats::{Character, Stats};

/// File name used by [`FileStore::in_dir`].
pub const SAVE_FILE_NAME: &str = "player_save.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub name: String,
    pub stats: Stats,
    pub xp: u32,
    pub level: u32,
    pub known_spell_ids: BTreeSet<String>,
}

impl PlayerRecord {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Snapshot a character's persistent fields.
    pub fn from_character(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            stats: character.stats,
            xp: character.xp,
            level: character.level,
            known_spell_ids: character.known_spells.clone(),
        }
    }

    /// Rebuild a character with no active effects. Life is clamped into
    /// `[0, max_life]` in case the document was edited by hand.
    pub fn into_character(self) -> Character {
        let mut character = Character::new(&self.name);
        character.stats = self.stats;
        character.stats.max_life = character.stats.max_life.max(1);
        character.stats.life = character.stats.life.clamp(0, character.stats.max_life);
        character.xp = self.xp;
        character.level = self.level.max(1);
        character.known_spells = self.known_spell_ids;
        character
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("save I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Where the player record lives.
pub trait PlayerStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PlayerRecord>, StoreError>;
    fn save(&mut self, record: &PlayerRecord) -> Result<(), StoreError>;
    /// Remove the saved record. Deleting a missing record is not an error.
    fn delete(&mut self) -> Result<(), StoreError>;
}

/// Load the saved player, or build a fresh one named `default_name`.
/// A corrupt or unreadable record is logged and left in place.
pub fn load_player(store: &dyn PlayerStore, default_name: &str) -> Character {
    match store.load() {
        Ok(Some(record)) => {
            log::info!("loaded player {} (level {})", record.name, record.level);
            record.into_character()
        }
        Ok(None) => {
            log::info!("no saved player, creating {default_name}");
            Character::new_player(default_name)
        }
        Err(e) => {
            log::warn!("could not load player, starting fresh: {e}");
            Character::new_player(default_name)
        }
    }
}

/// Pretty-printed JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/player_save.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SAVE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlayerStore for FileStore {
    fn load(&self) -> Result<Option<PlayerRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(PlayerRecord::from_json(&text)?))
    }

    fn save(&mut self, record: &PlayerRecord) -> Result<(), StoreError> {
        let json = record.to_json()?;
        log::debug!("saving player to {}", self.path.display());
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the serialized document in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document, valid or not.
    pub fn with_document(document: &str) -> Self {
        Self {
            document: Some(document.to_string()),
        }
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl PlayerStore for MemoryStore {
    fn load(&self) -> Result<Option<PlayerRecord>, StoreError> {
        match &self.document {
            Some(doc) => Ok(Some(PlayerRecord::from_json(doc)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, record: &PlayerRecord) -> Result<(), StoreError> {
        self.document = Some(record.to_json()?);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        self.document = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn veteran() -> Character {
        let mut c = Character::new_player("Ada");
        c.gain_xp(130);
        c.known_spells.insert("Lefu".to_string());
        c
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let json = PlayerRecord::from_character(&veteran()).to_json().unwrap();
        assert!(json.contains("\"knownSpellIds\""));
        assert!(json.contains("\"maxLife\": 35"));
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_none());

        let record = PlayerRecord::from_character(&veteran());
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), Some(record));
        assert!(store.path().ends_with(SAVE_FILE_NAME));
    }

    #[test]
    fn corrupt_file_falls_back_but_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
        let player = load_player(&store, "Ada");
        assert_eq!(player.level, 1);
        assert!(player.knows_spell("Fehu"));
        assert!(store.path().exists());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path());
        store.save(&PlayerRecord::from_character(&veteran())).unwrap();
        store.delete().unwrap();
        store.delete().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn loaded_player_keeps_progress() {
        let mut store = MemoryStore::new();
        store.save(&PlayerRecord::from_character(&veteran())).unwrap();
        let player = load_player(&store, "Someone Else");
        assert_eq!(player.name, "Ada");
        assert_eq!(player.level, 2);
        assert_eq!(player.xp, 30);
        assert!(player.knows_spell("Lefu"));
        assert!(!player.has_effects());
    }

    #[test]
    fn hand_edited_life_is_clamped() {
        let json = r#"{
            "name": "Ada",
            "stats": { "life": 90, "maxLife": 30, "strength": 5, "defense": 5,
                       "constitution": 5, "speed": 5, "dexterity": 5 },
            "xp": 0, "level": 0, "knownSpellIds": ["Fehu"]
        }"#;
        let player = load_player(&MemoryStore::with_document(json), "x");
        assert_eq!(player.stats.life, 30);
        assert_eq!(player.level, 1);
    }
}
