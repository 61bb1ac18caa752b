//! Session host
//!
//! Owns the active session, turns frame timestamps into fixed ticks and
//! buffers input between frames. Platform front-ends (the wasm binding, the
//! headless runner) drive everything through this type.

use glam::Vec2;

use crate::error::{ConfigWarning, SnapshotError};
use crate::persistence::Snapshot;
use crate::settings::{GameMode, Settings};
use crate::sim::{
    EnemyKind, FixedStep, GameEvent, GameState, HoverInfo, SmiteOutcome, TickInput, TimingState,
    tick,
};

/// What is currently running
#[derive(Debug, Clone)]
pub enum Session {
    /// Nothing running (menus, mode selection)
    Menu,
    Combat(GameState),
    Precision(TimingState),
}

/// Game instance holding all state
#[derive(Debug, Clone)]
pub struct Game {
    settings: Settings,
    session: Session,
    clock: FixedStep,
    /// Buffered input, applied on the next tick
    input: TickInput,
    /// Host-level events (configuration corrections)
    events: Vec<GameEvent>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Game {
    pub fn new(mut settings: Settings) -> Self {
        let mut events = Vec::new();
        if let Some(warning) = settings.validate() {
            events.push(GameEvent::ConfigCorrected { warning });
        }
        Self {
            settings,
            session: Session::Menu,
            clock: FixedStep::new(),
            input: TickInput::default(),
            events,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Combat session, if one is running
    pub fn state(&self) -> Option<&GameState> {
        match &self.session {
            Session::Combat(state) => Some(state),
            _ => None,
        }
    }

    /// Timing minigame, if it is running
    pub fn timing(&self) -> Option<&TimingState> {
        match &self.session {
            Session::Precision(timing) => Some(timing),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.session, Session::Menu)
    }

    pub fn is_over(&self) -> bool {
        self.state().is_some_and(GameState::is_over)
    }

    /// Start a fresh session in `mode`
    pub fn start(&mut self, mode: GameMode, seed: u64) {
        self.settings.mode = mode;
        self.session = match mode {
            GameMode::Precision => Session::Precision(TimingState::new(seed)),
            GameMode::Combat | GameMode::Grapple => {
                Session::Combat(GameState::with_config(seed, mode, self.settings.enemies))
            }
        };
        self.clock.reset();
        self.input = TickInput::default();
        log::info!("Started {} session (seed {seed})", mode.as_str());
    }

    /// Start over in the current mode
    pub fn restart(&mut self, seed: u64) {
        self.start(self.settings.mode, seed);
    }

    /// Tear down the session and return to the menu
    pub fn exit(&mut self) {
        if let Session::Combat(state) = &self.session {
            log::info!("Leaving session at score {}", state.score);
        }
        self.session = Session::Menu;
        self.clock.reset();
        self.input = TickInput::default();
    }

    /// Host frame callback. Returns the number of ticks simulated.
    pub fn frame(&mut self, timestamp_ms: f64) -> u32 {
        let steps = self.clock.advance(timestamp_ms);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Run exactly one tick regardless of the clock
    pub fn step(&mut self) {
        match &mut self.session {
            Session::Menu => return,
            Session::Combat(state) => tick(state, &self.input),
            Session::Precision(timing) => timing.tick(),
        }
        self.input.clear_one_shots();
    }

    // === Input ===

    pub fn set_pointer(&mut self, pos: Vec2) {
        if pos.is_finite() {
            self.input.pointer = Some(pos);
        }
    }

    /// Move/attack command at a point
    pub fn command(&mut self, pos: Vec2) {
        self.input.command = Some(pos);
    }

    /// Attack the enemy under the pointer
    pub fn secondary(&mut self) {
        self.input.secondary = true;
    }

    /// Special orb, or the hook in grapple mode
    pub fn ability(&mut self) {
        self.input.ability = true;
    }

    pub fn dash(&mut self) {
        self.input.dash = true;
    }

    /// Timing minigame press, judged immediately
    pub fn smite(&mut self) -> Option<SmiteOutcome> {
        match &mut self.session {
            Session::Precision(timing) => timing.smite(),
            _ => None,
        }
    }

    // === Queries ===

    /// Enemy under the pointer, for cursor feedback
    pub fn hover(&self) -> Option<HoverInfo> {
        let state = self.state()?;
        state.hover(self.input.pointer?)
    }

    /// Enable or disable an enemy type. Disabling removes live enemies of
    /// that type from the session without scoring them.
    pub fn set_enemy_enabled(&mut self, kind: EnemyKind, enabled: bool) -> Option<ConfigWarning> {
        if !self.settings.enemies.set(kind, enabled) {
            log::warn!("Enemy type {} cannot be toggled", kind.as_str());
            return None;
        }
        let warning = self.settings.validate();
        if let Some(warning) = warning {
            self.events.push(GameEvent::ConfigCorrected { warning });
        }

        if let Session::Combat(state) = &mut self.session {
            state.enemy_toggles = self.settings.enemies;
            if !state.enemy_toggles.is_enabled(kind) {
                let before = state.enemies.len();
                state.enemies.retain(|e| e.kind() != kind);
                let removed = before - state.enemies.len();
                if removed > 0 {
                    log::info!("Removed {removed} disabled {} enemies", kind.as_str());
                }
            }
        }
        warning
    }

    /// Take pending events from the host and the running session
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.events);
        match &mut self.session {
            Session::Combat(state) => events.extend(state.drain_events()),
            Session::Precision(timing) => events.extend(timing.drain_events()),
            Session::Menu => {}
        }
        events
    }

    // === Persistence ===

    /// Snapshot the running combat session
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        let state = self.state().ok_or(SnapshotError::NoSession)?;
        Snapshot::capture(state).encode()
    }

    /// Replace the session with a decoded snapshot
    pub fn load_snapshot(&mut self, json: &str) -> Result<(), SnapshotError> {
        let state = Snapshot::decode(json)?.restore();
        self.settings.mode = state.mode;
        self.settings.enemies = state.enemy_toggles;
        self.session = Session::Combat(state);
        self.clock.reset();
        self.input = TickInput::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::settings::EnemyToggles;

    fn run_frames(game: &mut Game, frames: u32) -> u32 {
        let mut total = 0;
        for i in 0..=frames {
            total += game.frame(i as f64 * 17.0);
        }
        total
    }

    #[test]
    fn test_menu_does_nothing() {
        let mut game = Game::default();
        assert!(!game.is_running());
        assert_eq!(run_frames(&mut game, 10), 10);
        assert!(game.state().is_none());
    }

    #[test]
    fn test_frames_drive_ticks() {
        let mut game = Game::default();
        game.start(GameMode::Combat, 5);
        assert_eq!(game.frame(0.0), 0);
        assert_eq!(game.frame(TICK_MS), 1);
        assert_eq!(game.frame(TICK_MS + 1000.0), 2);
        assert_eq!(game.state().unwrap().time_ticks, 3);
    }

    #[test]
    fn test_one_shot_input_waits_for_a_tick() {
        let mut game = Game::default();
        game.start(GameMode::Combat, 5);
        game.frame(0.0);
        game.command(Vec2::new(500.0, 300.0));
        assert_eq!(game.frame(5.0), 0);
        assert_eq!(game.input.command, Some(Vec2::new(500.0, 300.0)));
        assert_eq!(game.frame(20.0), 1);
        assert_eq!(game.input.command, None);
        assert!(game.state().unwrap().player.pos.x > 400.0);
    }

    #[test]
    fn test_disable_type_removes_without_scoring() {
        let mut game = Game::default();
        game.start(GameMode::Combat, 5);
        if let Session::Combat(state) = &mut game.session {
            state.spawn_enemy(EnemyKind::Tank, Vec2::new(50.0, 50.0)).unwrap();
            state.spawn_enemy(EnemyKind::Fast, Vec2::new(750.0, 50.0)).unwrap();
        }
        assert!(game.set_enemy_enabled(EnemyKind::Tank, false).is_none());
        let state = game.state().unwrap();
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].kind(), EnemyKind::Fast);
        assert_eq!(state.score, 0);
        assert!(!state.enemy_toggles.tank);
    }

    #[test]
    fn test_disabling_everything_falls_back_to_fast() {
        let mut game = Game::default();
        let mut last = None;
        for kind in crate::tuning::SPAWNABLE_KINDS {
            last = game.set_enemy_enabled(kind, false);
        }
        assert!(last.is_some());
        assert_eq!(game.settings().enemies.enabled_kinds(), vec![EnemyKind::Fast]);
        assert!(
            game.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::ConfigCorrected { .. }))
        );
    }

    #[test]
    fn test_precision_session() {
        let mut game = Game::default();
        game.start(GameMode::Precision, 9);
        assert!(game.state().is_none());
        game.frame(0.0);
        for i in 1..=30 {
            game.frame(i as f64 * TICK_MS);
        }
        let timing = game.timing().unwrap();
        assert!(timing.value < timing.max_value);

        assert!(game.smite().is_some());
        assert!(game.smite().is_none());
        let events = game.drain_events();
        assert!(matches!(events.as_slice(), [GameEvent::SmiteResolved { .. }]));
    }

    #[test]
    fn test_exit_and_restart() {
        let mut game = Game::new(Settings {
            mode: GameMode::Grapple,
            enemies: EnemyToggles::default(),
        });
        game.start(GameMode::Grapple, 1);
        run_frames(&mut game, 300);
        game.restart(2);
        let state = game.state().unwrap();
        assert_eq!(state.mode, GameMode::Grapple);
        assert_eq!(state.time_ticks, 0);
        game.exit();
        assert!(!game.is_running());
        assert!(matches!(game.snapshot(), Err(SnapshotError::NoSession)));
    }

    #[test]
    fn test_snapshot_through_host() {
        let mut game = Game::default();
        game.start(GameMode::Combat, 77);
        game.set_pointer(Vec2::new(100.0, 100.0));
        game.ability();
        run_frames(&mut game, 200);
        let json = game.snapshot().unwrap();

        let mut other = Game::default();
        other.load_snapshot(&json).unwrap();
        assert_eq!(other.snapshot().unwrap(), json);
    }
}
