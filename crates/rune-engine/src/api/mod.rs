pub mod config;
pub mod session;
pub mod types;

pub use config::{BattleConfig, EffectRules, EngineConfig, FeatureConfig, RecognitionConfig};
pub use session::{BattleSession, ClassifiedCast, PendingCast, DEFAULT_PLAYER_NAME};
pub use types::{CharacterSnapshot, EffectSnapshot, SessionUpdate};
