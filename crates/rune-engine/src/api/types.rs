use serde::Serialize;

use crate::combat::battle::Outcome;
use crate::combat::effects::{EffectInstance, EffectKind, Family};
use crate::combat::stats::Character;

/// One active effect as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSnapshot {
    pub family: Family,
    pub id: &'static str,
    pub name: &'static str,
    pub stacks: u32,
    /// Ticks left before the effect wears off.
    pub remaining: u32,
}

impl<K: EffectKind> From<&EffectInstance<K>> for EffectSnapshot {
    fn from(instance: &EffectInstance<K>) -> Self {
        let def = instance.kind.def();
        Self {
            family: K::FAMILY,
            id: def.id,
            name: def.display_name,
            stacks: instance.stacks,
            remaining: instance.remaining(),
        }
    }
}

/// Render state for one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    pub name: String,
    pub life: i32,
    pub max_life: i32,
    pub level: u32,
    pub xp: u32,
    pub effects: Vec<EffectSnapshot>,
}

impl From<&Character> for CharacterSnapshot {
    fn from(c: &Character) -> Self {
        let effects = c
            .statuses
            .iter()
            .map(EffectSnapshot::from)
            .chain(c.buffs.iter().map(EffectSnapshot::from))
            .chain(c.debuffs.iter().map(EffectSnapshot::from))
            .collect();
        Self {
            name: c.name.clone(),
            life: c.stats.life,
            max_life: c.stats.max_life,
            level: c.level,
            xp: c.xp,
            effects,
        }
    }
}

/// Returned by every capability call: latest log text plus post-mutation
/// state for both combatants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub log: String,
    pub player: CharacterSnapshot,
    pub opponent: CharacterSnapshot,
    pub outcome: Option<Outcome>,
    /// Finished strokes in the gesture being drawn.
    pub pending_strokes: usize,
    /// Spell ids the player can learn now.
    pub learnable: Vec<&'static str>,
}

impl SessionUpdate {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::EffectRules;
    use crate::combat::effects::{DebuffEffect, StatusEffect};
    use crate::combat::engine::{apply_debuff, apply_status};

    #[test]
    fn snapshot_lists_effects_by_family() {
        let rules = EffectRules::default();
        let mut imp = Character::new("Imp");
        apply_debuff(&mut imp, DebuffEffect::Hexed, &rules);
        apply_status(&mut imp, StatusEffect::Poisoned, &rules);
        apply_status(&mut imp, StatusEffect::Poisoned, &rules);

        let snap = CharacterSnapshot::from(&imp);
        assert_eq!(snap.effects.len(), 2);
        assert_eq!(snap.effects[0].id, "POISONED");
        assert_eq!(snap.effects[0].stacks, 2);
        assert_eq!(snap.effects[0].remaining, 5);
        assert_eq!(snap.effects[1].family, Family::Debuff);
    }

    #[test]
    fn update_serializes_for_the_host() {
        let imp = Character::new("Imp");
        let update = SessionUpdate {
            log: "hello".into(),
            player: CharacterSnapshot::from(&imp),
            opponent: CharacterSnapshot::from(&imp),
            outcome: Some(Outcome::Victory),
            pending_strokes: 0,
            learnable: vec!["Thurisaz"],
        };
        let json = update.to_json().unwrap();
        assert!(json.contains("\"maxLife\":30"));
        assert!(json.contains("\"outcome\":\"victory\""));
        assert!(json.contains("\"pendingStrokes\":0"));
        assert!(json.contains("\"learnable\":[\"Thurisaz\"]"));
    }
}
