use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::effects::{BuffEffect, DebuffEffect, EffectInstance, StatusEffect};
use super::spells::SpellBook;

/// Experience needed per level to reach the next one.
pub const XP_PER_LEVEL: u32 = 100;

/// Spells every new character starts with.
pub const STARTING_SPELLS: [&str; 2] = ["Fehu", "Venhu"];

/// Numeric attributes of a combatant. `0 <= life <= max_life` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub life: i32,
    pub max_life: i32,
    pub strength: i32,
    pub defense: i32,
    pub constitution: i32,
    pub speed: i32,
    pub dexterity: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            life: 30,
            max_life: 30,
            strength: 5,
            defense: 5,
            constitution: 5,
            speed: 5,
            dexterity: 5,
        }
    }
}

/// Attributes that effects may shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Strength,
    Defense,
    Constitution,
    Speed,
    Dexterity,
}

impl Stat {
    pub fn label(self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Defense => "defense",
            Stat::Constitution => "constitution",
            Stat::Speed => "speed",
            Stat::Dexterity => "dexterity",
        }
    }
}

impl Stats {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Defense => self.defense,
            Stat::Constitution => self.constitution,
            Stat::Speed => self.speed,
            Stat::Dexterity => self.dexterity,
        }
    }

    fn slot(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Strength => &mut self.strength,
            Stat::Defense => &mut self.defense,
            Stat::Constitution => &mut self.constitution,
            Stat::Speed => &mut self.speed,
            Stat::Dexterity => &mut self.dexterity,
        }
    }

    /// Add `delta` to a stat without letting it drop below `floor`.
    /// Returns the change actually applied.
    pub fn shift(&mut self, stat: Stat, delta: i32, floor: i32) -> i32 {
        let slot = self.slot(stat);
        let before = *slot;
        let target = before + delta;
        *slot = if delta < 0 { target.max(floor.min(before)) } else { target };
        *slot - before
    }

    /// Subtract life, floored at zero. Returns the damage taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.life;
        self.life = (self.life - amount.max(0)).max(0);
        before - self.life
    }

    /// Add life, capped at `max_life`. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.life;
        self.life = (self.life + amount.max(0)).min(self.max_life);
        self.life - before
    }
}

/// A combatant: stats and progression plus the three active-effect lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub name: String,
    pub stats: Stats,
    pub xp: u32,
    pub level: u32,
    pub known_spells: BTreeSet<String>,
    pub statuses: Vec<EffectInstance<StatusEffect>>,
    pub buffs: Vec<EffectInstance<BuffEffect>>,
    pub debuffs: Vec<EffectInstance<DebuffEffect>>,
}

impl Character {
    /// A level-1 character with default stats and no spells.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stats: Stats::default(),
            xp: 0,
            level: 1,
            known_spells: BTreeSet::new(),
            statuses: Vec::new(),
            buffs: Vec::new(),
            debuffs: Vec::new(),
        }
    }

    /// A fresh player who knows the starting spells.
    pub fn new_player(name: &str) -> Self {
        let mut c = Self::new(name);
        c.known_spells = STARTING_SPELLS.iter().map(|s| s.to_string()).collect();
        c
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.life <= 0
    }

    pub fn knows_spell(&self, spell_id: &str) -> bool {
        self.known_spells.contains(spell_id)
    }

    /// Learn a spell if the book has it and every prerequisite is known.
    pub fn learn_spell(&mut self, spell_id: &str, book: &SpellBook) -> bool {
        if self.knows_spell(spell_id) || !book.can_unlock(&self.known_spells, spell_id) {
            return false;
        }
        self.known_spells.insert(spell_id.to_string());
        log::info!("{} learned {}", self.name, spell_id);
        true
    }

    /// Experience still needed for the next level.
    pub fn xp_to_next_level(&self) -> u32 {
        (self.level * XP_PER_LEVEL).saturating_sub(self.xp)
    }

    /// Add experience, levelling up as many times as it covers.
    /// Returns the number of levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.level * XP_PER_LEVEL {
            self.xp -= self.level * XP_PER_LEVEL;
            self.level += 1;
            self.grow();
            gained += 1;
        }
        if gained > 0 {
            log::info!("{} reached level {}", self.name, self.level);
        }
        gained
    }

    fn grow(&mut self) {
        let s = &mut self.stats;
        s.max_life += 5;
        s.life = s.max_life;
        s.strength += 1;
        s.defense += 1;
        s.constitution += 1;
        s.speed += 1;
        s.dexterity += 1;
    }

    pub fn has_effects(&self) -> bool {
        !(self.statuses.is_empty() && self.buffs.is_empty() && self.debuffs.is_empty())
    }
}
