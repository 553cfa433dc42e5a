use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::effects::{BuffEffect, DebuffEffect, StatusEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpellType {
    Attack,
    Guard,
    Heal,
    Status,
    Buff,
    Debuff,
}

/// A castable spell. `id` is the symbol the recognizers emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub spell_type: SpellType,
    /// Base power for ATTACK spells.
    pub damage: i32,
    pub status: Option<StatusEffect>,
    pub buff: Option<BuffEffect>,
    pub debuff: Option<DebuffEffect>,
    /// Life restored by HEAL spells.
    pub heal: i32,
    /// Spells that must be known before this one can be learned.
    pub requires: &'static [&'static str],
}

impl SpellDefinition {
    const fn new(id: &'static str, name: &'static str, spell_type: SpellType) -> Self {
        Self {
            id,
            name,
            spell_type,
            damage: 0,
            status: None,
            buff: None,
            debuff: None,
            heal: 0,
            requires: &[],
        }
    }
}

static SPELLS: [SpellDefinition; 10] = [
    SpellDefinition { damage: 6, ..SpellDefinition::new("Fehu", "Fireball", SpellType::Attack) },
    SpellDefinition {
        damage: 4,
        status: Some(StatusEffect::Bleeding),
        ..SpellDefinition::new("Thurisaz", "Thorn Lash", SpellType::Attack)
    },
    SpellDefinition {
        status: Some(StatusEffect::Poisoned),
        ..SpellDefinition::new("Venhu", "Venom", SpellType::Status)
    },
    SpellDefinition {
        status: Some(StatusEffect::Frozen),
        ..SpellDefinition::new("Isaz", "Ice Bind", SpellType::Status)
    },
    SpellDefinition {
        heal: 8,
        requires: &["Fehu"],
        ..SpellDefinition::new("Lefu", "Healing Light", SpellType::Heal)
    },
    SpellDefinition {
        buff: Some(BuffEffect::Enraged),
        ..SpellDefinition::new("Tiwaz", "War Cry", SpellType::Buff)
    },
    SpellDefinition {
        buff: Some(BuffEffect::Fortified),
        ..SpellDefinition::new("Uruz", "Stone Skin", SpellType::Buff)
    },
    SpellDefinition::new("Algiz", "Ward", SpellType::Guard),
    SpellDefinition {
        debuff: Some(DebuffEffect::Weakened),
        ..SpellDefinition::new("Nauthiz", "Sap Strength", SpellType::Debuff)
    },
    SpellDefinition {
        damage: 5,
        debuff: Some(DebuffEffect::Crippled),
        requires: &["Thurisaz"],
        ..SpellDefinition::new("Hagalaz", "Hailstorm", SpellType::Attack)
    },
];

/// Read-only spell registry, also the unlock tree.
#[derive(Debug, Clone)]
pub struct SpellBook {
    spells: &'static [SpellDefinition],
}

impl SpellBook {
    /// Every spell in the game.
    pub fn standard() -> Self {
        Self { spells: &SPELLS }
    }

    pub fn get(&self, id: &str) -> Option<&'static SpellDefinition> {
        self.spells.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static SpellDefinition> {
        self.spells.iter()
    }

    /// True if `id` exists and all its prerequisites are in `known`.
    pub fn can_unlock(&self, known: &BTreeSet<String>, id: &str) -> bool {
        self.get(id)
            .is_some_and(|spell| spell.requires.iter().all(|r| known.contains(*r)))
    }

    /// Spells not yet known whose prerequisites are met.
    pub fn unlockable<'a>(&'a self, known: &'a BTreeSet<String>) -> impl Iterator<Item = &'static SpellDefinition> + 'a {
        self.spells
            .iter()
            .filter(move |s| !known.contains(s.id) && self.can_unlock(known, s.id))
    }
}

impl Default for SpellBook {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::runes::TemplateSet;

    #[test]
    fn every_spell_has_a_rune() {
        let runes = TemplateSet::builtin();
        for spell in SpellBook::standard().iter() {
            assert!(runes.get(spell.id).is_some(), "{} has no template", spell.id);
        }
    }

    #[test]
    fn prerequisites_reference_real_spells() {
        let book = SpellBook::standard();
        for spell in book.iter() {
            for req in spell.requires {
                assert!(book.get(req).is_some(), "{} requires unknown {}", spell.id, req);
            }
        }
    }

    #[test]
    fn unlockable_spells() {
        let book = SpellBook::standard();
        let known: BTreeSet<String> = ["Fehu", "Venhu"].iter().map(|s| s.to_string()).collect();
        let ids: Vec<&str> = book.unlockable(&known).map(|s| s.id).collect();
        assert!(ids.contains(&"Lefu"));
        assert!(!ids.contains(&"Hagalaz"));
        assert!(!ids.contains(&"Fehu"));
    }

    #[test]
    fn fireball_is_a_plain_attack() {
        let fehu = SpellBook::standard().get("Fehu").unwrap();
        assert_eq!(fehu.spell_type, SpellType::Attack);
        assert_eq!(fehu.damage, 6);
        assert!(fehu.status.is_none() && fehu.debuff.is_none());
    }
}
