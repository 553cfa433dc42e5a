use std::sync::Arc;

use rune_engine::api::config::EffectRules;
use rune_engine::combat::effects::{BuffEffect, EffectKind, StatusEffect};
use rune_engine::combat::engine::{apply_buff, apply_status, tick_character};
use rune_engine::combat::resolve::compute_damage;
use rune_engine::core::rng::Dice;
use rune_engine::recognition::classifier::{ClassifierOracle, OracleError};
use rune_engine::recognition::features::FeatureTensor;
use rune_engine::{
    BattleSession, Character, EngineConfig, FileStore, LabelTable, MemoryStore, ModelClassifier,
    Outcome, Point, PlayerStore, TemplateSet,
};

fn rules() -> EffectRules {
    EffectRules::default()
}

/// Feed a template's strokes through the session as if drawn, scaled up
/// and moved somewhere else on screen.
fn trace_rune(session: &mut BattleSession, id: &str, t0: f32) {
    let set = TemplateSet::builtin();
    let template = set.get(id).unwrap();
    for stroke in &template.strokes.strokes {
        session.begin_stroke();
        for p in stroke {
            session.extend_stroke(Point::new(p.x * 3.0 + 200.0, p.y * 3.0 + 80.0, t0 + p.t));
        }
        session.end_stroke();
    }
}

#[test]
fn poison_ramps_three_four_five() {
    let mut target = Character::new("Dummy");
    let mut dice = Dice::new(3);
    apply_status(&mut target, StatusEffect::Poisoned, &rules());

    let mut lives = Vec::new();
    for _ in 0..3 {
        tick_character(&mut target, &mut dice, &rules());
        lives.push(target.stats.life);
    }
    assert_eq!(lives, vec![27, 23, 18]);
}

#[test]
fn same_status_twice_is_one_stacked_instance() {
    let mut target = Character::new("Dummy");
    apply_status(&mut target, StatusEffect::Burned, &rules());
    apply_status(&mut target, StatusEffect::Burned, &rules());

    assert_eq!(target.statuses.len(), 1);
    let burn = &target.statuses[0];
    assert_eq!((burn.stacks, burn.elapsed, burn.potency_bonus), (2, 0, 1));
}

#[test]
fn three_tick_buff_reverts_exactly_on_third_tick() {
    let mut hero = Character::new("Hero");
    let mut dice = Dice::new(3);
    assert_eq!(BuffEffect::Fortified.def().base_duration, 3);
    apply_buff(&mut hero, BuffEffect::Fortified, &rules());

    tick_character(&mut hero, &mut dice, &rules());
    assert_eq!(hero.stats.defense, 8);
    tick_character(&mut hero, &mut dice, &rules());
    assert_eq!(hero.buffs.len(), 1);
    assert_eq!(hero.buffs[0].elapsed, 2);
    assert_eq!(hero.stats.defense, 8);

    tick_character(&mut hero, &mut dice, &rules());
    assert!(hero.buffs.is_empty());
    assert_eq!(hero.stats.defense, 5);
}

#[test]
fn damage_never_negative() {
    assert_eq!(compute_damage(6, 5, 50), 0);
}

#[test]
fn template_pipeline_casts_drawn_rune() {
    let mut session = BattleSession::with_templates(EngineConfig::default(), Box::new(MemoryStore::new()));
    trace_rune(&mut session, "Fehu", 0.0);
    let update = session.submit_gesture();
    assert!(update.log.contains("Fireball"), "{}", update.log);
    assert_eq!(update.opponent.life, 21);
}

#[test]
fn scribble_is_not_recognized() {
    let mut session = BattleSession::with_templates(EngineConfig::default(), Box::new(MemoryStore::new()));
    let before = session.snapshot();

    // long enough to be kept as a stroke, too sparse to be a rune
    session.begin_stroke();
    for i in 0..6 {
        session.extend_stroke(Point::new(100.0 + i as f32 * 6.0, 100.0, i as f32 * 16.0));
    }
    let update = session.end_stroke();
    assert_eq!(update.pending_strokes, 1);
    let update = session.submit_gesture();

    assert_eq!(update.log, "No rune recognized.");
    assert_eq!(update.player, before.player);
    assert_eq!(update.opponent, before.opponent);
}

#[test]
fn rune_the_player_has_not_learned_is_unknown() {
    let mut session = BattleSession::with_templates(EngineConfig::default(), Box::new(MemoryStore::new()));
    trace_rune(&mut session, "Isaz", 0.0);
    let update = session.submit_gesture();
    assert_eq!(update.log, "Unknown spell: Isaz.");
    assert!(update.opponent.effects.is_empty());
}

struct UnsureOracle;

impl ClassifierOracle for UnsureOracle {
    fn scores(&self, _input: &FeatureTensor) -> Result<Vec<f32>, OracleError> {
        Ok(vec![0.2, 0.1, 0.15])
    }
}

#[test]
fn low_confidence_model_changes_nothing() {
    let labels = LabelTable::from_json(r#"["Fehu", "Venhu", "Lefu"]"#).unwrap();
    let config = EngineConfig::default();
    let classifier = ModelClassifier::new(UnsureOracle, labels, config.features.clone());
    let mut session = BattleSession::new(config, Arc::new(classifier), Box::new(MemoryStore::new()));
    let before = session.snapshot();

    trace_rune(&mut session, "Fehu", 0.0);
    let update = session.submit_gesture();

    assert_eq!(update.log, "No rune recognized.");
    assert_eq!(update.player, before.player);
    assert_eq!(update.opponent, before.opponent);
}

#[test]
fn victory_awards_experience_once_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = BattleSession::with_templates(EngineConfig::default(), Box::new(FileStore::in_dir(dir.path())));

    let mut victories = 0;
    for round in 0..4 {
        trace_rune(&mut session, "Fehu", round as f32 * 2000.0);
        let update = session.submit_gesture();
        if update.outcome == Some(Outcome::Victory) {
            victories += 1;
        }
        if session.battle().is_over() {
            break;
        }
    }
    assert_eq!(victories, 1);
    assert_eq!(session.snapshot().opponent.life, 0);

    // further ticks must not award again
    for _ in 0..5 {
        session.advance(2.0);
    }
    assert_eq!(session.snapshot().player.xp, 50);

    let saved = FileStore::in_dir(dir.path()).load().unwrap().unwrap();
    assert_eq!(saved.xp, 50);
    assert!(saved.known_spell_ids.contains("Fehu"));
}

#[test]
fn saved_progress_carries_into_next_session() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = BattleSession::with_templates(EngineConfig::default(), Box::new(FileStore::in_dir(dir.path())));
        for round in 0..4 {
            trace_rune(&mut session, "Fehu", round as f32 * 2000.0);
            session.submit_gesture();
        }
        assert_eq!(session.battle().outcome(), Some(Outcome::Victory));
    }

    let mut session = BattleSession::with_templates(EngineConfig::default(), Box::new(FileStore::in_dir(dir.path())));
    assert_eq!(session.snapshot().player.xp, 50);

    session.delete_save().unwrap();
    assert!(FileStore::in_dir(dir.path()).load().unwrap().is_none());
}

#[test]
fn poison_cast_wins_over_time() {
    let mut config = EngineConfig::default();
    config.battle.tick_interval = 1.0;
    let mut session = BattleSession::with_templates(config, Box::new(MemoryStore::new()));

    trace_rune(&mut session, "Venhu", 0.0);
    let update = session.submit_gesture();
    assert_eq!(update.opponent.effects[0].id, "POISONED");

    let mut last = update;
    for _ in 0..5 {
        last = session.advance(1.0);
    }
    // 3 + 4 + 5 + 6 + 7
    assert_eq!(last.opponent.life, 5);
    assert!(last.opponent.effects.is_empty());
    assert_eq!(last.outcome, None);
}
