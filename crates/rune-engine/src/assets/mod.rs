pub mod save;

pub use save::{load_player, FileStore, MemoryStore, PlayerRecord, PlayerStore, StoreError};
