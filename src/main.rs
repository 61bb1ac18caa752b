//! Kiteback entry point
//!
//! The browser build is driven from JS through `kiteback::web::WebGame`.
//! Natively this runs a headless scripted session and logs how it went,
//! which is handy for checking balance changes and determinism.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use kiteback::consts::*;
    use kiteback::sim::GameEvent;
    use kiteback::{Game, GameMode, Settings, distance};

    /// Frame interval of a 60 Hz display
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten minutes of game time
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    const SMITE_ROUNDS: u32 = 5;

    #[derive(Default)]
    struct Tally {
        kills: u32,
        hits: u32,
        abilities: u32,
        upgrades: u32,
    }

    impl Tally {
        fn record(&mut self, events: &[GameEvent]) {
            for event in events {
                match event {
                    GameEvent::EnemyKilled { .. } => self.kills += 1,
                    GameEvent::PlayerHit { .. } => self.hits += 1,
                    GameEvent::AbilityCast { .. } => self.abilities += 1,
                    GameEvent::DifficultyRaised { .. } => self.upgrades += 1,
                    _ => {}
                }
            }
        }
    }

    /// Kite: attack the nearest enemy, dash away when one gets close
    fn steer(game: &mut Game, frame: u32) {
        let Some(state) = game.state() else {
            return;
        };
        let player = state.player.pos;
        let nearest = state
            .enemies
            .iter()
            .min_by(|a, b| distance(a.pos, player).total_cmp(&distance(b.pos, player)))
            .map(|e| e.pos);

        let Some(target) = nearest else {
            game.command(Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0));
            return;
        };
        game.set_pointer(target);

        if distance(target, player) < 80.0 {
            let away = player + (player - target);
            game.set_pointer(away);
            game.dash();
            game.command(away);
        } else if frame % 20 == 0 {
            game.command(target);
            if frame % 120 == 0 {
                game.ability();
                game.secondary();
            }
        }
    }

    fn run_combat(mode: GameMode, seed: u64) {
        let mut game = Game::new(Settings::default());
        game.start(mode, seed);
        let mut tally = Tally::default();

        let mut frame = 0;
        while frame < MAX_FRAMES && !game.is_over() {
            steer(&mut game, frame);
            game.frame(frame as f64 * FRAME_MS);
            tally.record(&game.drain_events());
            frame += 1;
        }

        if let Some(state) = game.state() {
            log::info!(
                "{} seed {seed}: score {} after {} ticks ({} kills, {} hits taken, {} abilities, {} upgrades, cap {})",
                mode.as_str(),
                state.score,
                state.time_ticks,
                tally.kills,
                tally.hits,
                tally.abilities,
                tally.upgrades,
                state.enemy_cap(),
            );
        }
    }

    fn run_precision(seed: u64) {
        let mut game = Game::new(Settings::default());
        game.start(GameMode::Precision, seed);

        let mut frame = 0;
        let mut rounds = 0;
        while rounds < SMITE_ROUNDS && frame < MAX_FRAMES {
            game.frame(frame as f64 * FRAME_MS);
            let ready = game
                .timing()
                .is_some_and(|t| t.can_smite() && t.value <= t.target as f32);
            if ready {
                if let Some(outcome) = game.smite() {
                    log::debug!("Round {rounds}: {outcome:?}");
                    rounds += 1;
                }
            }
            frame += 1;
        }

        if let Some(timing) = game.timing() {
            log::info!(
                "precision seed {seed}: {} hits, {} misses, accuracy {:.0}%",
                timing.hits,
                timing.misses,
                timing.accuracy()
            );
        }
    }

    pub fn run() {
        let seed = std::env::args()
            .nth(1)
            .and_then(|arg| arg.parse::<u64>().ok())
            .unwrap_or(1);

        run_combat(GameMode::Combat, seed);
        run_combat(GameMode::Grapple, seed);
        run_precision(seed);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Kiteback headless run");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library
}
