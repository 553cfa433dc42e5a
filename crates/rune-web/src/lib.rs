//! Browser exports for the rune battle.
//!
//! wasm-bindgen cannot export the session directly, so a single
//! [`SessionRunner`] lives in a `thread_local!` and every export borrows it.
//! All exports return the session update as a JSON string, or an empty
//! string when `rune_init()` has not run.

pub mod runner;
pub mod storage;

pub use runner::SessionRunner;
pub use storage::LocalStorageStore;

use std::cell::RefCell;

use rune_engine::{BattleSession, EngineConfig};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SessionRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(fallback: R, f: impl FnOnce(&mut SessionRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            log::warn!("rune session not initialized, call rune_init() first");
            fallback
        }
    })
}

/// Start a session. `config_json` overrides any subset of the defaults; a
/// malformed document is logged and ignored.
#[wasm_bindgen]
pub fn rune_init(config_json: Option<String>) -> String {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = match config_json.as_deref().map(EngineConfig::from_json) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::warn!("bad engine config, using defaults: {e}");
            EngineConfig::default()
        }
        None => EngineConfig::default(),
    };

    let session = BattleSession::with_templates(config, Box::new(LocalStorageStore::new()));
    let runner = SessionRunner::new(session, js_sys::Date::now());
    let update = runner.snapshot();
    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
    log::info!("rune-web: initialized");
    update
}

// ---- Stroke input ----

#[wasm_bindgen]
pub fn rune_begin_stroke() -> String {
    with_runner(String::new(), |r| r.begin_stroke())
}

#[wasm_bindgen]
pub fn rune_extend_stroke(x: f32, y: f32) -> String {
    let now = js_sys::Date::now();
    with_runner(String::new(), |r| r.extend_stroke(x, y, now))
}

#[wasm_bindgen]
pub fn rune_end_stroke() -> String {
    with_runner(String::new(), |r| r.end_stroke())
}

#[wasm_bindgen]
pub fn rune_submit() -> String {
    with_runner(String::new(), |r| r.submit())
}

// ---- Battle ----

/// Drive the battle clock; call once per animation frame with `dt` in seconds.
#[wasm_bindgen]
pub fn rune_advance(dt: f32) -> String {
    with_runner(String::new(), |r| r.advance(dt))
}

#[wasm_bindgen]
pub fn rune_reset() -> String {
    with_runner(String::new(), |r| r.reset())
}

#[wasm_bindgen]
pub fn rune_snapshot() -> String {
    with_runner(String::new(), |r| r.snapshot())
}

/// Learn a spell by id, e.g. one listed in the update's `learnable`.
#[wasm_bindgen]
pub fn rune_learn(spell_id: &str) -> String {
    with_runner(String::new(), |r| r.learn(spell_id))
}

#[wasm_bindgen]
pub fn rune_delete_save() -> bool {
    with_runner(false, |r| r.delete_save())
}
