//! Effect engine: apply, tick, expire and revert.
//!
//! Every active effect on a character follows the same life cycle. It is
//! applied (or refreshed if already present), ticks once per battle tick,
//! and once `elapsed` reaches its base duration it is reverted and removed.

use crate::api::config::EffectRules;
use crate::core::rng::Dice;
use super::effects::{
    BuffEffect, DebuffEffect, EffectInstance, EffectKind, StatChange, StatusEffect,
};
use super::stats::{Character, Stats};

/// Add `kind` to `list`, or refresh the existing instance.
/// Returns the instance's stack count afterwards.
pub fn apply<K: EffectKind>(list: &mut Vec<EffectInstance<K>>, kind: K, rules: &EffectRules) -> u32 {
    match list.iter_mut().find(|i| i.kind == kind) {
        Some(existing) => {
            existing.stacks += 1;
            existing.potency_bonus += rules.stack_potency_increment;
            existing.elapsed = 0;
            existing.stacks
        }
        None => {
            list.push(EffectInstance::new(kind));
            1
        }
    }
}

pub fn apply_status(target: &mut Character, effect: StatusEffect, rules: &EffectRules) -> u32 {
    apply(&mut target.statuses, effect, rules)
}

pub fn apply_buff(target: &mut Character, effect: BuffEffect, rules: &EffectRules) -> u32 {
    apply(&mut target.buffs, effect, rules)
}

pub fn apply_debuff(target: &mut Character, effect: DebuffEffect, rules: &EffectRules) -> u32 {
    apply(&mut target.debuffs, effect, rules)
}

/// Advance every active effect on `character` by one tick: statuses, then
/// buffs, then debuffs. Returns the log lines in that order.
pub fn tick_character(character: &mut Character, dice: &mut Dice, rules: &EffectRules) -> Vec<String> {
    let Character { name, stats, statuses, buffs, debuffs, .. } = character;
    let name = name.as_str();
    let mut logs = Vec::new();
    tick_list(name, stats, statuses, dice, rules, &mut logs);
    tick_list(name, stats, buffs, dice, rules, &mut logs);
    tick_list(name, stats, debuffs, dice, rules, &mut logs);
    logs
}

fn tick_list<K: EffectKind>(
    name: &str,
    stats: &mut Stats,
    list: &mut Vec<EffectInstance<K>>,
    dice: &mut Dice,
    rules: &EffectRules,
    logs: &mut Vec<String>,
) {
    // instances with no stacks should never exist
    list.retain(|i| i.stacks > 0);

    let mut i = 0;
    while i < list.len() {
        let instance = &mut list[i];
        let effect = instance.kind.tick(
            name,
            instance.elapsed,
            instance.stacked_potency(),
            dice.roll_effect(),
        );

        for change in &effect.changes {
            let applied = apply_change(stats, *change);
            if let StatChange::Shift { stat, .. } = change {
                if instance.kind.tracked_stat() == Some(*stat) {
                    instance.shifted += applied;
                }
            }
        }
        logs.push(effect.log);

        instance.elapsed += 1;
        if instance.elapsed >= instance.kind.def().base_duration {
            let expired = list.remove(i);
            revert(stats, &expired, rules);
            logs.push(format!("{name} is no longer {}.", expired.kind.def().display_name.to_lowercase()));
        } else {
            i += 1;
        }
    }
}

/// Mutate `stats`. Returns the signed amount actually applied.
fn apply_change(stats: &mut Stats, change: StatChange) -> i32 {
    match change {
        StatChange::Damage(amount) => -stats.take_damage(amount),
        StatChange::Heal(amount) => stats.heal(amount),
        StatChange::Shift { stat, delta, floor } => stats.shift(stat, delta, floor),
    }
}

/// Undo what an instance did to its tracked stat, plus any kind-specific
/// restoration.
pub fn revert<K: EffectKind>(stats: &mut Stats, instance: &EffectInstance<K>, rules: &EffectRules) {
    if let Some(stat) = instance.kind.tracked_stat() {
        stats.shift(stat, -instance.shifted, 0);
    }
    // nothing to hand back before the first tick
    if instance.has_ticked() {
        instance.kind.revert_extra(stats, rules);
    }
}

/// Revert and drop every active effect, e.g. when a battle ends.
pub fn clear_effects(character: &mut Character, rules: &EffectRules) {
    let Character { stats, statuses, buffs, debuffs, .. } = character;
    for instance in statuses.drain(..) {
        revert(stats, &instance, rules);
    }
    for instance in buffs.drain(..) {
        revert(stats, &instance, rules);
    }
    for instance in debuffs.drain(..) {
        revert(stats, &instance, rules);
    }
}
