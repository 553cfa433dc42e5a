use crate::api::config::EffectRules;
use super::effects::EffectKind;
use super::engine::{apply_buff, apply_debuff, apply_status};
use super::spells::{SpellBook, SpellDefinition, SpellType};
use super::stats::Character;

/// `max(0, (base_power + strength) - defense / 2)`, with truncating division.
pub fn compute_damage(base_power: i32, strength: i32, defense: i32) -> i32 {
    ((base_power + strength) - defense / 2).max(0)
}

/// Cast `spell_id` if the caster knows it and the book defines it.
/// Otherwise nothing is mutated and an "unknown spell" line is returned.
pub fn cast_spell(
    book: &SpellBook,
    spell_id: &str,
    caster: &mut Character,
    target: &mut Character,
    rules: &EffectRules,
) -> String {
    match book.get(spell_id) {
        Some(spell) if caster.knows_spell(spell_id) => apply_spell(spell, caster, target, rules),
        _ => {
            log::info!("{} tried unknown spell {}", caster.name, spell_id);
            format!("Unknown spell: {spell_id}.")
        }
    }
}

/// Resolve a spell against its target and return the log line.
pub fn apply_spell(
    spell: &SpellDefinition,
    caster: &mut Character,
    target: &mut Character,
    rules: &EffectRules,
) -> String {
    let opening = format!("{} casts {}!", caster.name, spell.name);
    log::info!("{} casts {} on {}", caster.name, spell.id, target.name);

    match spell.spell_type {
        SpellType::Attack => {
            let damage = compute_damage(spell.damage, caster.stats.strength, target.stats.defense);
            let dealt = target.stats.take_damage(damage);
            let mut line = format!("{opening} {} takes {dealt} damage.", target.name);
            if let Some(status) = spell.status {
                apply_status(target, status, rules);
                line.push_str(&afflicted(&target.name, status));
            }
            if let Some(debuff) = spell.debuff {
                apply_debuff(target, debuff, rules);
                line.push_str(&afflicted(&target.name, debuff));
            }
            line
        }
        SpellType::Heal => {
            let healed = caster.stats.heal(spell.heal);
            format!("{opening} {} recovers {healed} HP.", caster.name)
        }
        SpellType::Status => match spell.status {
            Some(status) => {
                let stacks = apply_status(target, status, rules);
                format!("{opening}{}{}", afflicted(&target.name, status), stacked(stacks))
            }
            None => format!("{opening} Nothing happened."),
        },
        SpellType::Debuff => match spell.debuff {
            Some(debuff) => {
                let stacks = apply_debuff(target, debuff, rules);
                format!("{opening}{}{}", afflicted(&target.name, debuff), stacked(stacks))
            }
            None => format!("{opening} Nothing happened."),
        },
        SpellType::Buff => match spell.buff {
            Some(buff) => {
                let stacks = apply_buff(caster, buff, rules);
                format!("{opening}{}{}", afflicted(&caster.name, buff), stacked(stacks))
            }
            None => format!("{opening} Nothing happened."),
        },
        SpellType::Guard => format!("{opening} {} raises a protective ward.", caster.name),
    }
}

fn afflicted<K: EffectKind>(name: &str, kind: K) -> String {
    format!(" {name} is {}.", kind.def().display_name.to_lowercase())
}

fn stacked(stacks: u32) -> String {
    if stacks > 1 {
        format!(" (x{stacks})")
    } else {
        String::new()
    }
}
