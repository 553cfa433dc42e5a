use serde::{Deserialize, Serialize};

use crate::api::config::EffectRules;
use crate::core::rng::Dice;
use super::engine::{clear_effects, tick_character};
use super::resolve::cast_spell;
use super::spells::SpellBook;
use super::stats::Character;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Result of one battle step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    pub log: Vec<String>,
    /// Set only on the step that ended the battle.
    pub finished: Option<Outcome>,
}

/// One player-versus-opponent fight.
///
/// All mutation goes through `cast` and `tick`, which the owner must call
/// from a single logical thread. Once an outcome is reached both become
/// no-ops until `reset`.
pub struct Battle {
    player: Character,
    opponent: Character,
    book: SpellBook,
    rules: EffectRules,
    dice: Dice,
    victory_xp: u32,
    outcome: Option<Outcome>,
    /// Bumped on every reset so stale work can be recognised.
    generation: u64,
    ticks: u64,
}

impl Battle {
    pub fn new(player: Character, opponent: Character, rules: EffectRules, victory_xp: u32, seed: u64) -> Self {
        log::info!("battle: {} vs {}", player.name, opponent.name);
        Self {
            player,
            opponent,
            book: SpellBook::standard(),
            rules,
            dice: Dice::new(seed),
            victory_xp,
            outcome: None,
            generation: 0,
            ticks: 0,
        }
    }

    pub fn player(&self) -> &Character {
        &self.player
    }

    pub fn opponent(&self) -> &Character {
        &self.opponent
    }

    pub fn book(&self) -> &SpellBook {
        &self.book
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Resolve a recognized symbol (or the lack of one) as a player cast.
    pub fn cast(&mut self, label: Option<&str>) -> Turn {
        if self.is_over() {
            return Turn::default();
        }
        let line = match label {
            Some(id) => cast_spell(&self.book, id, &mut self.player, &mut self.opponent, &self.rules),
            None => "No rune recognized.".to_string(),
        };
        let mut turn = Turn {
            log: vec![line],
            finished: None,
        };
        turn.finished = self.check_outcome(&mut turn.log);
        turn
    }

    /// Advance both combatants' effects by one tick.
    pub fn tick(&mut self) -> Turn {
        if self.is_over() {
            return Turn::default();
        }
        self.ticks += 1;
        let mut log = tick_character(&mut self.player, &mut self.dice, &self.rules);
        log.extend(tick_character(&mut self.opponent, &mut self.dice, &self.rules));
        let finished = self.check_outcome(&mut log);
        Turn { log, finished }
    }

    fn check_outcome(&mut self, log: &mut Vec<String>) -> Option<Outcome> {
        if self.is_over() {
            return None;
        }
        // a double knock-out counts against the player
        let outcome = if self.player.is_defeated() {
            Outcome::Defeat
        } else if self.opponent.is_defeated() {
            Outcome::Victory
        } else {
            return None;
        };

        self.outcome = Some(outcome);
        clear_effects(&mut self.player, &self.rules);
        clear_effects(&mut self.opponent, &self.rules);

        match outcome {
            Outcome::Victory => {
                log.push(format!(
                    "Victory! {} is defeated. {} gains {} XP.",
                    self.opponent.name, self.player.name, self.victory_xp
                ));
                if self.player.gain_xp(self.victory_xp) > 0 {
                    log.push(format!("{} reached level {}!", self.player.name, self.player.level));
                }
            }
            Outcome::Defeat => log.push(format!("Defeat... {} has fallen.", self.player.name)),
        }
        log::info!("battle over: {:?} after {} ticks", outcome, self.ticks);
        Some(outcome)
    }

    /// Teach the player a spell from the book. Allowed between fights too.
    pub fn learn_spell(&mut self, spell_id: &str) -> bool {
        self.player.learn_spell(spell_id, &self.book)
    }

    /// Spells the player could learn right now, in book order.
    pub fn unlockable_spells(&self) -> Vec<&'static str> {
        self.book.unlockable(&self.player.known_spells).map(|s| s.id).collect()
    }

    /// Start over against `opponent` with the player healed and unaffected.
    pub fn reset(&mut self, opponent: Character) {
        clear_effects(&mut self.player, &self.rules);
        self.player.stats.life = self.player.stats.max_life;
        self.opponent = opponent;
        self.outcome = None;
        self.ticks = 0;
        self.generation += 1;
        log::info!("battle reset: {} vs {}", self.player.name, self.opponent.name);
    }
}
