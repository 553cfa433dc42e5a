pub mod battle;
pub mod effects;
pub mod engine;
pub mod resolve;
pub mod spells;
pub mod stats;

pub use battle::{Battle, Outcome, Turn};
pub use effects::{BuffEffect, DebuffEffect, EffectDef, EffectInstance, EffectKind, Family, StatusEffect};
pub use resolve::{apply_spell, cast_spell, compute_damage};
pub use spells::{SpellBook, SpellDefinition, SpellType};
pub use stats::{Character, Stat, Stats};
