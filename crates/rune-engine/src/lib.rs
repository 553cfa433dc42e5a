pub mod api;
pub mod assets;
pub mod combat;
pub mod core;
pub mod input;
pub mod recognition;

// Re-export key types at crate root for convenience
pub use api::config::EngineConfig;
pub use api::session::{BattleSession, ClassifiedCast, PendingCast};
pub use api::types::{CharacterSnapshot, EffectSnapshot, SessionUpdate};
pub use assets::save::{FileStore, MemoryStore, PlayerRecord, PlayerStore, StoreError};
pub use combat::{Battle, Character, Outcome, SpellBook, Stats};
pub use crate::core::time::{DebounceTimer, RepeatingTimer};
pub use input::gesture::{CaptureEvent, Gesture, GestureCapture, Point, Stroke};
pub use recognition::{
    Classification, ClassifierOracle, LabelTable, ModelClassifier, OracleError, RuneClassifier,
    RuneTemplate, TemplateClassifier, TemplateSet,
};
#[cfg(feature = "onnx")]
pub use recognition::onnx::OnnxOracle;
