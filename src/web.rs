//! Browser binding
//!
//! A thin `wasm_bindgen` wrapper around [`Game`]. The page owns the canvas,
//! input listeners and `requestAnimationFrame`; it forwards events here and
//! reads flat views back for drawing.

use glam::Vec2;
use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::game::Game;
use crate::settings::{GameMode, Settings};
use crate::sim::{EnemyKind, Projectile};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    // Already installed on hot reload
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Kiteback starting...");
}

fn seed_from_clock() -> u64 {
    js_sys::Date::now() as u64
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn projectile_view(projectiles: &[Projectile]) -> Float32Array {
    let flat: Vec<f32> = projectiles
        .iter()
        .flat_map(|p| [p.pos.x, p.pos.y, p.size])
        .collect();
    Float32Array::from(flat.as_slice())
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
}

#[wasm_bindgen]
impl WebGame {
    /// Build from stored settings JSON; bad or missing JSON uses defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> WebGame {
        let settings = settings_json
            .and_then(|json| match Settings::from_json(&json) {
                Ok((settings, _)) => Some(settings),
                Err(err) => {
                    log::warn!("Ignoring stored settings: {err}");
                    None
                }
            })
            .unwrap_or_default();
        WebGame {
            game: Game::new(settings),
        }
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        self.game.settings().to_json().map_err(to_js_error)
    }

    // === Lifecycle ===

    pub fn start(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = GameMode::from_str(mode)
            .ok_or_else(|| JsValue::from_str(&format!("unknown mode '{mode}'")))?;
        self.game.start(mode, seed_from_clock());
        Ok(())
    }

    pub fn restart(&mut self) {
        self.game.restart(seed_from_clock());
    }

    pub fn exit(&mut self) {
        self.game.exit();
    }

    /// requestAnimationFrame callback
    pub fn frame(&mut self, timestamp_ms: f64) -> u32 {
        self.game.frame(timestamp_ms)
    }

    // === Input ===

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.game.set_pointer(Vec2::new(x, y));
    }

    pub fn command(&mut self, x: f32, y: f32) {
        self.game.command(Vec2::new(x, y));
    }

    pub fn secondary(&mut self) {
        self.game.secondary();
    }

    pub fn ability(&mut self) {
        self.game.ability();
    }

    pub fn dash(&mut self) {
        self.game.dash();
    }

    /// Returns the outcome name, or nothing if a smite is not allowed now
    pub fn smite(&mut self) -> Option<String> {
        self.game.smite().map(|o| format!("{o:?}"))
    }

    /// Returns a warning message if the change had to be corrected
    pub fn set_enemy_enabled(&mut self, kind: &str, enabled: bool) -> Result<Option<String>, JsValue> {
        let kind = EnemyKind::from_str(kind)
            .ok_or_else(|| JsValue::from_str(&format!("unknown enemy type '{kind}'")))?;
        Ok(self
            .game
            .set_enemy_enabled(kind, enabled)
            .map(|w| w.to_string()))
    }

    // === Views ===

    pub fn is_over(&self) -> bool {
        self.game.is_over()
    }

    pub fn score(&self) -> u32 {
        self.game.state().map_or(0, |s| s.score)
    }

    /// `[x, y, angle, health, max_health, stamina, max_stamina]`
    pub fn player(&self) -> Float32Array {
        let Some(state) = self.game.state() else {
            return Float32Array::new_with_length(0);
        };
        let p = &state.player;
        Float32Array::from(
            [
                p.pos.x,
                p.pos.y,
                p.angle,
                p.health as f32,
                p.max_health as f32,
                p.stamina,
                p.max_stamina,
            ]
            .as_slice(),
        )
    }

    /// Per enemy: `[x, y, size, angle, health, max_health, kind_index]`
    pub fn enemies(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .game
            .state()
            .map(|s| {
                s.enemies
                    .iter()
                    .flat_map(|e| {
                        let kind = EnemyKind::ALL.iter().position(|&k| k == e.kind()).unwrap_or(0);
                        [
                            e.pos.x,
                            e.pos.y,
                            e.size,
                            e.angle,
                            e.health as f32,
                            e.max_health as f32,
                            kind as f32,
                        ]
                    })
                    .collect()
            })
            .unwrap_or_default();
        Float32Array::from(flat.as_slice())
    }

    /// Per bullet: `[x, y, size]`
    pub fn bullets(&self) -> Float32Array {
        self.game
            .state()
            .map_or_else(|| Float32Array::new_with_length(0), |s| projectile_view(&s.bullets))
    }

    pub fn enemy_bullets(&self) -> Float32Array {
        self.game
            .state()
            .map_or_else(|| Float32Array::new_with_length(0), |s| projectile_view(&s.enemy_bullets))
    }

    pub fn special_orbs(&self) -> Float32Array {
        self.game
            .state()
            .map_or_else(|| Float32Array::new_with_length(0), |s| projectile_view(&s.special_orbs))
    }

    /// `[x, y]` of the hook head, empty when no hook is out
    pub fn hook(&self) -> Float32Array {
        match self.game.state().and_then(|s| s.hook.as_ref()) {
            Some(hook) => Float32Array::from([hook.pos.x, hook.pos.y].as_slice()),
            None => Float32Array::new_with_length(0),
        }
    }

    /// Full session state as JSON, for HUD panels
    pub fn state_json(&self) -> Result<String, JsValue> {
        match self.game.state() {
            Some(state) => serde_json::to_string(state).map_err(to_js_error),
            None => match self.game.timing() {
                Some(timing) => serde_json::to_string(timing).map_err(to_js_error),
                None => Ok("null".to_string()),
            },
        }
    }

    /// Drain pending events as a JSON array
    pub fn events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.drain_events()).map_err(to_js_error)
    }

    /// Enemy id and in-range flag under the pointer, or nothing
    pub fn hover(&self) -> Option<Vec<f64>> {
        self.game
            .hover()
            .map(|h| vec![h.id as f64, if h.in_range { 1.0 } else { 0.0 }])
    }

    // === Persistence ===

    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.game.snapshot().map_err(to_js_error)
    }

    pub fn load_snapshot(&mut self, json: &str) -> Result<(), JsValue> {
        self.game.load_snapshot(json).map_err(to_js_error)
    }
}
