//! Effect catalogue: the status, buff and debuff families.
//!
//! Each family is a closed enum backed by a constant definition table. A
//! kind's per-tick behavior is a pure function of `(elapsed, stacked potency,
//! roll)` that describes the stat changes to make and the log line to show;
//! the effect engine is the only place those changes touch a character.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::config::EffectRules;
use super::stats::{Stat, Stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Status,
    Buff,
    Debuff,
}

/// Static description of one effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectDef {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Ticks until expiry.
    pub base_duration: u32,
    pub base_potency: i32,
    pub description: &'static str,
}

const fn def(
    id: &'static str,
    display_name: &'static str,
    base_duration: u32,
    base_potency: i32,
    description: &'static str,
) -> EffectDef {
    EffectDef { id, display_name, base_duration, base_potency, description }
}

/// One stat mutation requested by a tick behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatChange {
    Damage(i32),
    Heal(i32),
    Shift { stat: Stat, delta: i32, floor: i32 },
}

/// What one tick of an effect does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickEffect {
    pub changes: Vec<StatChange>,
    pub log: String,
}

impl TickEffect {
    fn message(log: String) -> Self {
        Self { changes: Vec::new(), log }
    }

    fn with(change: StatChange, log: String) -> Self {
        Self { changes: vec![change], log }
    }
}

/// Behavior shared by the three effect families.
pub trait EffectKind: Copy + Eq + fmt::Debug + 'static {
    const FAMILY: Family;

    fn def(self) -> &'static EffectDef;

    /// Behavior for the tick at `elapsed` (0-based) with the stacked potency.
    /// `roll` is a fresh random number for the few randomized effects.
    fn tick(self, name: &str, elapsed: u32, potency: i32, roll: u32) -> TickEffect;

    /// Stat whose applied shifts are accumulated and undone on expiry.
    fn tracked_stat(self) -> Option<Stat> {
        None
    }

    /// Restoration on expiry beyond undoing the tracked shift.
    fn revert_extra(self, _stats: &mut Stats, _rules: &EffectRules) {}
}

/// An active effect on a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectInstance<K> {
    pub kind: K,
    pub elapsed: u32,
    pub stacks: u32,
    pub potency_bonus: i32,
    /// Net shift applied to the kind's tracked stat so far.
    pub shifted: i32,
}

impl<K: EffectKind> EffectInstance<K> {
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            elapsed: 0,
            stacks: 1,
            potency_bonus: 0,
            shifted: 0,
        }
    }

    /// `base_potency + potency_bonus * (stacks - 1)`.
    pub fn stacked_potency(&self) -> i32 {
        let extra = self.stacks.saturating_sub(1) as i32;
        self.kind.def().base_potency + self.potency_bonus * extra
    }

    /// Ticks left before expiry.
    pub fn remaining(&self) -> u32 {
        self.kind.def().base_duration.saturating_sub(self.elapsed)
    }

    /// False until the first tick has run. A refreshed instance keeps its
    /// earlier shift, so it still counts as ticked.
    pub fn has_ticked(&self) -> bool {
        self.elapsed > 0 || self.shifted != 0
    }
}

fn boost(stat: Stat, delta: i32) -> StatChange {
    StatChange::Shift { stat, delta, floor: 0 }
}

// ---- Status family ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusEffect {
    Poisoned,
    Burned,
    Bleeding,
    CursedFlame,
    Regenerating,
    Haste,
    Barrier,
    Reflecting,
    Stunned,
    Paralyzed,
    Silenced,
    Frozen,
    Weakened,
    Crippled,
    ShatteredGuard,
    CursedMind,
    Doomed,
}

static STATUS_DEFS: [EffectDef; 17] = [
    def("POISONED", "Poisoned", 5, 3, "Poison damage that grows every tick."),
    def("BURNED", "Burned", 4, 5, "Flat fire damage every tick."),
    def("BLEEDING", "Bleeding", 3, 2, "Loses a little life every tick."),
    def("CURSED_FLAME", "Cursed Flame", 3, 4, "Unholy fire damage every tick."),
    def("REGENERATING", "Regenerating", 4, 3, "Recovers life every tick."),
    def("HASTE", "Haste", 3, 2, "Moves faster."),
    def("BARRIER", "Barrier", 2, 3, "A barrier softens incoming blows."),
    def("REFLECTING", "Reflecting", 2, 0, "Ready to return spells."),
    def("STUNNED", "Stunned", 1, 0, "Cannot act."),
    def("PARALYZED", "Paralyzed", 3, 0, "May lose a turn."),
    def("SILENCED", "Silenced", 2, 0, "Cannot cast spells."),
    def("FROZEN", "Frozen", 2, 0, "Encased in ice."),
    def("WEAKENED", "Weakened", 3, 2, "Attack power reduced."),
    def("CRIPPLED", "Crippled", 3, 2, "Speed reduced."),
    def("SHATTERED_GUARD", "Shattered Guard", 3, 2, "Defense reduced."),
    def("CURSED_MIND", "Cursed Mind", 3, 2, "Accuracy and magic reduced."),
    def("DOOMED", "Doomed", 5, 0, "Doom approaches."),
];

impl StatusEffect {
    pub const ALL: [StatusEffect; 17] = [
        StatusEffect::Poisoned,
        StatusEffect::Burned,
        StatusEffect::Bleeding,
        StatusEffect::CursedFlame,
        StatusEffect::Regenerating,
        StatusEffect::Haste,
        StatusEffect::Barrier,
        StatusEffect::Reflecting,
        StatusEffect::Stunned,
        StatusEffect::Paralyzed,
        StatusEffect::Silenced,
        StatusEffect::Frozen,
        StatusEffect::Weakened,
        StatusEffect::Crippled,
        StatusEffect::ShatteredGuard,
        StatusEffect::CursedMind,
        StatusEffect::Doomed,
    ];
}

impl EffectKind for StatusEffect {
    const FAMILY: Family = Family::Status;

    fn def(self) -> &'static EffectDef {
        &STATUS_DEFS[self as usize]
    }

    fn tick(self, name: &str, elapsed: u32, potency: i32, roll: u32) -> TickEffect {
        use StatusEffect::*;
        match self {
            Poisoned => {
                let dmg = potency + elapsed as i32;
                TickEffect::with(StatChange::Damage(dmg), format!("{name} suffers {dmg} poison damage."))
            }
            Burned => TickEffect::with(
                StatChange::Damage(potency),
                format!("{name} takes {potency} burn damage."),
            ),
            Bleeding => TickEffect::with(
                StatChange::Damage(potency),
                format!("{name} bleeds for {potency} HP."),
            ),
            CursedFlame => TickEffect::with(
                StatChange::Damage(potency),
                format!("{name} is scorched by cursed fire for {potency} damage."),
            ),
            Regenerating => TickEffect::with(
                StatChange::Heal(potency),
                format!("{name} regenerates {potency} HP."),
            ),
            Haste => TickEffect::message(format!("Haste quickens {name}'s movement.")),
            Barrier => TickEffect::message(format!("A barrier shimmers around {name}.")),
            Reflecting => TickEffect::message(format!("Reflect shimmers around {name}, ready to return spells.")),
            Stunned => TickEffect::message(format!("{name} is stunned and cannot act!")),
            Paralyzed if roll % 2 == 0 => {
                TickEffect::message(format!("{name} is paralyzed and misses their turn!"))
            }
            Paralyzed => TickEffect::message(format!("{name} pushes through the paralysis!")),
            Silenced => TickEffect::message(format!("{name} is silenced and cannot cast spells!")),
            Frozen if elapsed == 0 => TickEffect::message(format!("{name} is frozen solid!")),
            Frozen => TickEffect::message(format!("{name} remains encased in ice.")),
            Weakened => TickEffect::message(format!("{name}'s attack power is reduced.")),
            Crippled => TickEffect::message(format!("{name}'s speed is reduced.")),
            ShatteredGuard => TickEffect::message(format!("{name}'s defense is reduced.")),
            CursedMind => TickEffect::message(format!("{name}'s mind is clouded by a curse.")),
            Doomed => doom(name, elapsed, self.def()),
        }
    }
}

fn doom(name: &str, elapsed: u32, def: &EffectDef) -> TickEffect {
    if elapsed + 1 >= def.base_duration {
        TickEffect::message(format!("{name} succumbs to the doom!"))
    } else {
        TickEffect::message(format!("{name}'s doom draws closer..."))
    }
}

// ---- Buff family ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuffEffect {
    Enraged,
    Fortified,
    Haste,
    Barrier,
    Regeneration,
    Focus,
    Reflect,
    Invisibility,
    RadiantBlessing,
}

static BUFF_DEFS: [EffectDef; 9] = [
    def("ENRAGED", "Enraged", 3, 3, "Attack up, defense down."),
    def("FORTIFIED", "Fortified", 3, 3, "Defense up."),
    def("HASTE", "Haste", 3, 2, "Speed up."),
    def("BARRIER", "Barrier", 2, 0, "A barrier softens incoming blows."),
    def("REGENERATION", "Regeneration", 4, 2, "Recovers life every tick."),
    def("FOCUS", "Focus", 3, 2, "Dexterity up."),
    def("REFLECT", "Reflect", 2, 0, "Magic swirls defensively."),
    def("INVISIBILITY", "Invisibility", 2, 0, "Hard to hit."),
    def("RADIANT_BLESSING", "Radiant Blessing", 3, 0, "Radiant protection."),
];

impl BuffEffect {
    pub const ALL: [BuffEffect; 9] = [
        BuffEffect::Enraged,
        BuffEffect::Fortified,
        BuffEffect::Haste,
        BuffEffect::Barrier,
        BuffEffect::Regeneration,
        BuffEffect::Focus,
        BuffEffect::Reflect,
        BuffEffect::Invisibility,
        BuffEffect::RadiantBlessing,
    ];
}

impl EffectKind for BuffEffect {
    const FAMILY: Family = Family::Buff;

    fn def(self) -> &'static EffectDef {
        &BUFF_DEFS[self as usize]
    }

    fn tick(self, name: &str, elapsed: u32, potency: i32, _roll: u32) -> TickEffect {
        use BuffEffect::*;
        // stat buffs take hold on the first tick after (re)application
        let first = elapsed == 0;
        match self {
            Enraged if first => TickEffect {
                changes: vec![
                    boost(Stat::Strength, potency),
                    StatChange::Shift { stat: Stat::Defense, delta: -1, floor: 1 },
                ],
                log: format!("{name} is enraged! Attack up, defense down."),
            },
            Enraged => TickEffect::message(format!("{name} seethes with rage.")),
            Fortified if first => TickEffect::with(
                boost(Stat::Defense, potency),
                format!("{name}'s defenses strengthen."),
            ),
            Fortified => TickEffect::message(format!("{name} stands fortified.")),
            Haste if first => TickEffect::with(
                boost(Stat::Speed, potency),
                format!("{name} moves with haste!"),
            ),
            Haste => TickEffect::message(format!("{name} is still quick on their feet.")),
            Barrier => TickEffect::message(format!("A barrier shimmers around {name}.")),
            Regeneration => TickEffect::with(
                StatChange::Heal(potency),
                format!("{name} regenerates {potency} HP."),
            ),
            Focus if first => TickEffect::with(
                boost(Stat::Dexterity, potency),
                format!("{name} focuses intensely."),
            ),
            Focus => TickEffect::message(format!("{name} stays focused.")),
            Reflect => TickEffect::message(format!("Magic energy swirls defensively around {name}.")),
            Invisibility => TickEffect::message(format!("{name} fades from sight.")),
            RadiantBlessing => TickEffect::message(format!("{name} is blessed with radiant protection.")),
        }
    }

    fn tracked_stat(self) -> Option<Stat> {
        match self {
            BuffEffect::Enraged => Some(Stat::Strength),
            BuffEffect::Fortified => Some(Stat::Defense),
            BuffEffect::Haste => Some(Stat::Speed),
            BuffEffect::Focus => Some(Stat::Dexterity),
            _ => None,
        }
    }

    fn revert_extra(self, stats: &mut Stats, rules: &EffectRules) {
        // ENRAGED hands back a fixed amount of defense, not what it took
        if self == BuffEffect::Enraged {
            stats.shift(Stat::Defense, rules.enraged_defense_restore, 0);
        }
    }
}

// ---- Debuff family ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebuffEffect {
    Weakened,
    Crippled,
    ShatteredGuard,
    CursedMind,
    Doomed,
    Hexed,
    ManaLeak,
}

static DEBUFF_DEFS: [EffectDef; 7] = [
    def("WEAKENED", "Weakened", 3, 2, "Strength down."),
    def("CRIPPLED", "Crippled", 3, 2, "Speed down."),
    def("SHATTERED_GUARD", "Shattered Guard", 3, 2, "Defense down."),
    def("CURSED_MIND", "Cursed Mind", 3, 2, "Dexterity down."),
    def("DOOMED", "Doomed", 5, 0, "Doom approaches."),
    def("HEXED", "Hexed", 3, 1, "A random weakness."),
    def("MANA_LEAK", "Mana Leak", 3, 0, "Mana drains away."),
];

impl DebuffEffect {
    pub const ALL: [DebuffEffect; 7] = [
        DebuffEffect::Weakened,
        DebuffEffect::Crippled,
        DebuffEffect::ShatteredGuard,
        DebuffEffect::CursedMind,
        DebuffEffect::Doomed,
        DebuffEffect::Hexed,
        DebuffEffect::ManaLeak,
    ];
}

impl EffectKind for DebuffEffect {
    const FAMILY: Family = Family::Debuff;

    fn def(self) -> &'static EffectDef {
        &DEBUFF_DEFS[self as usize]
    }

    fn tick(self, name: &str, elapsed: u32, potency: i32, roll: u32) -> TickEffect {
        use DebuffEffect::*;
        let first = elapsed == 0;
        match self {
            Weakened if first => TickEffect::with(
                boost(Stat::Strength, -potency),
                format!("{name}'s strength falters!"),
            ),
            Weakened => TickEffect::message(format!("{name} remains weakened.")),
            Crippled if first => TickEffect::with(
                boost(Stat::Speed, -potency),
                format!("{name}'s movement slows."),
            ),
            Crippled => TickEffect::message(format!("{name} limps along.")),
            ShatteredGuard if first => TickEffect::with(
                boost(Stat::Defense, -potency),
                format!("{name}'s guard is shattered!"),
            ),
            ShatteredGuard => TickEffect::message(format!("{name}'s guard is still broken.")),
            CursedMind if first => TickEffect::with(
                boost(Stat::Dexterity, -potency),
                format!("{name}'s focus wavers under the curse."),
            ),
            CursedMind => TickEffect::message(format!("{name}'s mind is clouded.")),
            Doomed => doom(name, elapsed, self.def()),
            Hexed => {
                let stat = [Stat::Strength, Stat::Defense, Stat::Speed][(roll % 3) as usize];
                TickEffect::message(format!("{name} is hexed, {} is weakened!", stat.label()))
            }
            ManaLeak => TickEffect::message(format!("{name}'s mana leaks away...")),
        }
    }

    fn tracked_stat(self) -> Option<Stat> {
        match self {
            DebuffEffect::Weakened => Some(Stat::Strength),
            DebuffEffect::Crippled => Some(Stat::Speed),
            DebuffEffect::ShatteredGuard => Some(Stat::Defense),
            DebuffEffect::CursedMind => Some(Stat::Dexterity),
            _ => None,
        }
    }
}
