use rune_engine::{BattleSession, Point, SessionUpdate};

/// Wires a [`BattleSession`] to the browser.
///
/// The host calls free functions exported via `#[wasm_bindgen]`, which
/// borrow a thread-local `SessionRunner`. Each call returns the session
/// update encoded as JSON. Pointer timestamps are taken relative to
/// `epoch_ms` so they stay precise as `f32`.
pub struct SessionRunner {
    session: BattleSession,
    epoch_ms: f64,
}

impl SessionRunner {
    pub fn new(session: BattleSession, epoch_ms: f64) -> Self {
        Self { session, epoch_ms }
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn begin_stroke(&mut self) -> String {
        encode(&self.session.begin_stroke())
    }

    /// Add a pointer sample taken at wall-clock `now_ms`.
    pub fn extend_stroke(&mut self, x: f32, y: f32, now_ms: f64) -> String {
        let t = (now_ms - self.epoch_ms).max(0.0) as f32;
        encode(&self.session.extend_stroke(Point::new(x, y, t)))
    }

    pub fn end_stroke(&mut self) -> String {
        encode(&self.session.end_stroke())
    }

    pub fn submit(&mut self) -> String {
        encode(&self.session.submit_gesture())
    }

    pub fn reset(&mut self) -> String {
        encode(&self.session.reset_battle())
    }

    /// Frame tick, `dt` in seconds.
    pub fn advance(&mut self, dt: f32) -> String {
        encode(&self.session.advance(dt))
    }

    pub fn learn(&mut self, spell_id: &str) -> String {
        encode(&self.session.learn_spell(spell_id))
    }

    pub fn delete_save(&mut self) -> bool {
        match self.session.delete_save() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("could not delete save: {e}");
                false
            }
        }
    }

    pub fn snapshot(&self) -> String {
        encode(&self.session.snapshot())
    }
}

fn encode(update: &SessionUpdate) -> String {
    update.to_json().unwrap_or_else(|e| {
        log::warn!("could not encode session update: {e}");
        String::new()
    })
}
