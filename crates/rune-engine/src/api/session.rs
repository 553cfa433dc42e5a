use std::sync::Arc;

use crate::assets::save::{load_player, PlayerRecord, PlayerStore, StoreError};
use crate::combat::battle::{Battle, Outcome, Turn};
use crate::combat::stats::Character;
use crate::core::time::{DebounceTimer, RepeatingTimer};
use crate::input::gesture::{CaptureEvent, Gesture, GestureCapture, Point};
use crate::recognition::classifier::{Classification, RuneClassifier, TemplateClassifier};
use crate::recognition::runes::TemplateSet;
use super::config::EngineConfig;
use super::types::{CharacterSnapshot, SessionUpdate};

/// Name given to a brand-new player.
pub const DEFAULT_PLAYER_NAME: &str = "Apprentice";

const OPPONENTS: [&str; 4] = ["Shade", "Wraith", "Barrow Wight", "Frost Troll"];

/// A gesture drained from the capture, waiting to be classified.
///
/// Classification may run anywhere (another thread, a worker); the result
/// is applied back through [`BattleSession::complete_cast`].
#[derive(Debug, Clone)]
pub struct PendingCast {
    gesture: Gesture,
    generation: u64,
}

impl PendingCast {
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn classify(self, classifier: &dyn RuneClassifier) -> ClassifiedCast {
        ClassifiedCast {
            classification: classifier.classify(&self.gesture),
            generation: self.generation,
        }
    }
}

/// A classified gesture tagged with the battle it was drawn in.
#[derive(Debug, Clone)]
pub struct ClassifiedCast {
    pub classification: Classification,
    generation: u64,
}

/// The capability surface handed to the presentation layer.
///
/// Owns the battle, the stroke capture and both timers. Every call runs to
/// completion and returns a fresh [`SessionUpdate`]; the host drives time
/// through [`advance`](Self::advance).
pub struct BattleSession {
    config: EngineConfig,
    classifier: Arc<dyn RuneClassifier>,
    store: Box<dyn PlayerStore>,
    capture: GestureCapture,
    battle: Battle,
    tick_timer: RepeatingTimer,
    stroke_timeout: DebounceTimer,
    log: String,
    opponents_faced: usize,
}

impl BattleSession {
    pub fn new(
        config: EngineConfig,
        classifier: Arc<dyn RuneClassifier>,
        store: Box<dyn PlayerStore>,
    ) -> Self {
        let player = load_player(store.as_ref(), DEFAULT_PLAYER_NAME);
        let battle = Battle::new(
            player,
            opponent(0),
            config.effects.clone(),
            config.battle.victory_xp,
            config.battle.seed,
        );
        Self {
            capture: GestureCapture::new(config.battle.tap_radius, config.battle.double_tap_window_ms),
            tick_timer: RepeatingTimer::new(config.battle.tick_interval),
            stroke_timeout: DebounceTimer::new(config.battle.stroke_timeout),
            classifier,
            store,
            battle,
            log: "Trace a rune to cast a spell...".to_string(),
            opponents_faced: 1,
            config,
        }
    }

    /// Session backed by the built-in rune templates.
    pub fn with_templates(config: EngineConfig, store: Box<dyn PlayerStore>) -> Self {
        let classifier = TemplateClassifier::new(config.recognition.clone(), TemplateSet::builtin().templates);
        Self::new(config, Arc::new(classifier), store)
    }

    // ---- Stroke capture ----

    pub fn begin_stroke(&mut self) -> SessionUpdate {
        if !self.battle.is_over() {
            self.capture.begin_stroke();
            self.stroke_timeout.disarm();
        }
        self.snapshot()
    }

    pub fn extend_stroke(&mut self, point: Point) -> SessionUpdate {
        if !self.battle.is_over() {
            self.capture.extend_stroke(point);
        }
        self.snapshot()
    }

    /// Close the current stroke. A double tap submits the gesture.
    pub fn end_stroke(&mut self) -> SessionUpdate {
        if self.battle.is_over() {
            return self.snapshot();
        }
        if self.capture.end_stroke() == CaptureEvent::DoubleTap {
            return self.submit_gesture();
        }
        // a stray tap must not leave earlier strokes without a timeout
        if self.capture.stroke_count() > 0 {
            self.stroke_timeout.arm();
        }
        self.snapshot()
    }

    /// Classify the captured gesture and cast the result.
    pub fn submit_gesture(&mut self) -> SessionUpdate {
        let Some(pending) = self.take_pending_cast() else {
            return self.snapshot();
        };
        let classifier = Arc::clone(&self.classifier);
        let cast = pending.classify(classifier.as_ref());
        self.complete_cast(cast)
    }

    // ---- Deferred classification ----

    /// Drain the captured gesture for classification elsewhere. `None` once
    /// the battle is over.
    pub fn take_pending_cast(&mut self) -> Option<PendingCast> {
        self.stroke_timeout.disarm();
        if self.battle.is_over() {
            self.capture.clear();
            return None;
        }
        Some(PendingCast {
            gesture: self.capture.take_gesture(),
            generation: self.battle.generation(),
        })
    }

    /// Apply a classification. Dropped if the battle has ended or been reset
    /// since the gesture was drawn.
    pub fn complete_cast(&mut self, cast: ClassifiedCast) -> SessionUpdate {
        if self.battle.is_over() || cast.generation != self.battle.generation() {
            log::debug!("discarding stale cast from generation {}", cast.generation);
            return self.snapshot();
        }
        let turn = self.battle.cast(cast.classification.label());
        self.record(turn);
        self.snapshot()
    }

    pub fn classifier(&self) -> Arc<dyn RuneClassifier> {
        Arc::clone(&self.classifier)
    }

    // ---- Time ----

    /// Advance the battle clock by `dt` seconds: fizzle an idle gesture and
    /// run any effect ticks that fell due.
    pub fn advance(&mut self, dt: f32) -> SessionUpdate {
        if self.stroke_timeout.advance(dt) {
            self.capture.clear();
            self.log = "The rune fizzles.".to_string();
        }
        for _ in 0..self.tick_timer.advance(dt) {
            let turn = self.battle.tick();
            let done = turn.finished.is_some();
            self.record(turn);
            if done {
                break;
            }
        }
        self.snapshot()
    }

    // ---- Battle lifecycle ----

    /// Start a new fight against the next opponent.
    pub fn reset_battle(&mut self) -> SessionUpdate {
        let next = opponent(self.opponents_faced);
        self.opponents_faced += 1;
        self.battle.reset(next);
        self.capture.clear();
        self.stroke_timeout.disarm();
        self.tick_timer.restart();
        self.log = "Battle reset.".to_string();
        self.snapshot()
    }

    /// Teach the player a spell whose prerequisites are known. Progress is
    /// saved straight away.
    pub fn learn_spell(&mut self, spell_id: &str) -> SessionUpdate {
        if self.battle.learn_spell(spell_id) {
            let name = self.battle.book().get(spell_id).map_or(spell_id, |s| s.name);
            self.log = format!("{} learned {}.", self.battle.player().name, name);
            let record = PlayerRecord::from_character(self.battle.player());
            if let Err(e) = self.store.save(&record) {
                log::warn!("could not save player: {e}");
            }
        } else {
            self.log = format!("Cannot learn {spell_id} yet.");
        }
        self.snapshot()
    }

    /// Forget the saved player. The current battle is unaffected.
    pub fn delete_save(&mut self) -> Result<(), StoreError> {
        self.store.delete()
    }

    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionUpdate {
        SessionUpdate {
            log: self.log.clone(),
            player: CharacterSnapshot::from(self.battle.player()),
            opponent: CharacterSnapshot::from(self.battle.opponent()),
            outcome: self.battle.outcome(),
            pending_strokes: self.capture.stroke_count(),
            learnable: self.battle.unlockable_spells(),
        }
    }

    fn record(&mut self, turn: Turn) {
        if !turn.log.is_empty() {
            self.log = turn.log.join("\n");
        }
        if let Some(outcome) = turn.finished {
            self.finish(outcome);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.tick_timer.cancel();
        self.stroke_timeout.disarm();
        self.capture.clear();
        if outcome == Outcome::Victory {
            let record = PlayerRecord::from_character(self.battle.player());
            if let Err(e) = self.store.save(&record) {
                log::warn!("could not save player: {e}");
            }
        }
    }
}

fn opponent(index: usize) -> Character {
    Character::new(OPPONENTS[index % OPPONENTS.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::save::MemoryStore;

    struct Always(&'static str);

    impl RuneClassifier for Always {
        fn classify(&self, _gesture: &Gesture) -> Classification {
            Classification::Rune { label: self.0.to_string(), score: 1.0 }
        }
    }

    fn session(label: &'static str) -> BattleSession {
        BattleSession::new(EngineConfig::default(), Arc::new(Always(label)), Box::new(MemoryStore::new()))
    }

    fn draw_line(s: &mut BattleSession, t0: f32) {
        s.begin_stroke();
        for i in 0..10 {
            s.extend_stroke(Point::new(i as f32 * 20.0, 0.0, t0 + i as f32 * 16.0));
        }
        s.end_stroke();
    }

    fn double_tap(s: &mut BattleSession, t0: f32) -> SessionUpdate {
        for t in [t0, t0 + 150.0] {
            s.begin_stroke();
            s.extend_stroke(Point::new(5.0, 5.0, t));
            s.end_stroke();
        }
        // second tap's end_stroke submitted
        s.snapshot()
    }

    #[test]
    fn submit_casts_and_clears_capture() {
        let mut s = session("Fehu");
        draw_line(&mut s, 0.0);
        assert_eq!(s.snapshot().pending_strokes, 1);
        let update = s.submit_gesture();
        assert_eq!(update.opponent.life, 21);
        assert_eq!(update.pending_strokes, 0);
        assert!(update.log.contains("Fireball"));
    }

    #[test]
    fn double_tap_submits() {
        let mut s = session("Fehu");
        draw_line(&mut s, 0.0);
        let update = double_tap(&mut s, 1000.0);
        assert_eq!(update.opponent.life, 21);
    }

    #[test]
    fn idle_gesture_fizzles() {
        let mut s = session("Fehu");
        draw_line(&mut s, 0.0);
        s.advance(1.0);
        assert_eq!(s.snapshot().pending_strokes, 1);
        let update = s.advance(2.5);
        assert_eq!(update.pending_strokes, 0);
        assert_eq!(update.log, "The rune fizzles.");
        assert_eq!(update.opponent.life, 30);
    }

    #[test]
    fn new_stroke_defers_timeout() {
        let mut s = session("Fehu");
        draw_line(&mut s, 0.0);
        s.advance(2.0);
        draw_line(&mut s, 2000.0);
        s.advance(2.0);
        assert_eq!(s.snapshot().pending_strokes, 2);
    }

    #[test]
    fn tap_after_strokes_still_fizzles() {
        let mut s = session("Fehu");
        draw_line(&mut s, 0.0);
        s.begin_stroke();
        s.extend_stroke(Point::new(5.0, 5.0, 500.0));
        s.end_stroke();
        s.advance(1.0);
        let update = s.advance(3.0);
        assert_eq!(update.pending_strokes, 0);
        assert_eq!(update.log, "The rune fizzles.");
    }

    #[test]
    fn learning_a_spell_saves_progress() {
        let mut s = session("Fehu");
        let open = s.snapshot().learnable;
        let update = s.learn_spell(open[0]);
        assert!(update.log.starts_with("Apprentice learned "), "{}", update.log);
        assert!(!update.learnable.contains(&open[0]));
        let saved = s.store.load().unwrap().unwrap();
        assert!(saved.known_spell_ids.contains(open[0]));

        let update = s.learn_spell("Nope");
        assert_eq!(update.log, "Cannot learn Nope yet.");
    }

    #[test]
    fn ticks_follow_the_clock() {
        let mut s = session("Venhu");
        draw_line(&mut s, 0.0);
        s.submit_gesture();
        let update = s.advance(1.5);
        assert_eq!(update.opponent.life, 30);
        let update = s.advance(0.5);
        assert_eq!(update.opponent.life, 27);
        assert!(update.log.contains("poison"));
    }

    #[test]
    fn stale_cast_is_discarded_after_reset() {
        let mut s = session("Fehu");
        draw_line(&mut s, 0.0);
        let pending = s.take_pending_cast().unwrap();
        s.reset_battle();
        let cast = pending.classify(s.classifier().as_ref());
        let update = s.complete_cast(cast);
        assert_eq!(update.opponent.life, 30);
        assert_eq!(update.log, "Battle reset.");
    }

    #[test]
    fn victory_saves_and_freezes_input() {
        let mut s = session("Fehu");
        for i in 0..4 {
            draw_line(&mut s, i as f32 * 1000.0);
            s.submit_gesture();
        }
        let update = s.snapshot();
        assert_eq!(update.outcome, Some(Outcome::Victory));
        assert_eq!(update.player.xp, 50);

        draw_line(&mut s, 9000.0);
        let update = s.submit_gesture();
        assert_eq!(update.pending_strokes, 0);
        assert_eq!(update.player.xp, 50);
        assert!(s.store.load().unwrap().is_some());
        assert!(!s.tick_timer.is_active());

        let update = s.reset_battle();
        assert_eq!(update.outcome, None);
        assert_eq!(update.opponent.name, "Wraith");
        assert_eq!(update.opponent.life, 30);
    }
}
