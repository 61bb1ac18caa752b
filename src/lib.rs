//! Kiteback - A top-down arena kiting game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, behaviors, combat, abilities)
//! - `game`: Session host driving the simulation from frame timestamps
//! - `persistence`: Versioned snapshot envelope
//! - `settings`: Game mode and enemy-type toggles
//! - `tuning`: Data-driven enemy stats and spawn weights
//! - `web`: Browser binding (wasm32 only)

pub mod error;
pub mod game;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{ConfigWarning, SnapshotError};
pub use game::Game;
pub use settings::{EnemyToggles, GameMode, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation tick rate. Every cooldown and duration is counted in these ticks.
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Fixed simulation timestep in milliseconds
    pub const TICK_MS: f64 = 1000.0 / TICK_RATE as f64;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 3;
    /// Largest frame delta accepted by the scheduler (two ticks)
    pub const MAX_FRAME_DELTA_MS: f64 = TICK_MS * 2.0;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 25.0;
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PLAYER_MAX_HEALTH: u32 = 3;
    pub const PLAYER_SHOOT_RANGE: f32 = 250.0;
    /// Ticks between player shots
    pub const PLAYER_SHOOT_COOLDOWN: u32 = 18;
    pub const PLAYER_MAX_STAMINA: f32 = 100.0;
    /// Stamina regained per tick (full bar in about one second)
    pub const STAMINA_REGEN: f32 = 1.67;
    pub const SHOT_STAMINA_COST: f32 = 100.0;
    /// A move target closer than this is snapped to
    pub const MOVE_SNAP_DISTANCE: f32 = 2.0;
    /// Follow stops at this fraction of the shoot range...
    pub const FOLLOW_APPROACH_FRACTION: f32 = 0.8;
    /// ...and switches to attacking inside this fraction
    pub const FOLLOW_ENGAGE_FRACTION: f32 = 0.9;
    /// Extra radius around an enemy that still counts as clicking it
    pub const CLICK_MARGIN: f32 = 25.0;
    /// Extra radius around an enemy for hover highlighting
    pub const HOVER_MARGIN: f32 = 10.0;

    /// Player bullet
    pub const PLAYER_BULLET_SPEED: f32 = 12.0;
    pub const PLAYER_BULLET_SIZE: f32 = 4.0;
    pub const PLAYER_BULLET_DECAY: f32 = 0.01;
    pub const PLAYER_BULLET_MARGIN: f32 = 50.0;

    /// Enemy melee contact tolerance (overlap must exceed this)
    pub const CONTACT_TOLERANCE: f32 = 5.0;
    /// Enemies spawn this far outside the arena edge
    pub const SPAWN_OFFSET: f32 = 20.0;

    /// Admission caps
    pub const MAX_ENEMIES: usize = 50;
    pub const MAX_PLAYER_BULLETS: usize = 100;
    pub const MAX_ENEMY_BULLETS: usize = 100;
    pub const MAX_SPECIAL_ORBS: usize = 5;
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Option<Vec2> {
    (to - from).try_normalize()
}

/// Heading angle (radians) from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for a heading angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Clamp a point into the arena, inset by `inset` on every side
#[inline]
pub fn clamp_to_arena(pos: Vec2, inset: f32) -> Vec2 {
    use consts::{ARENA_HEIGHT, ARENA_WIDTH};
    Vec2::new(
        pos.x.clamp(inset, ARENA_WIDTH - inset),
        pos.y.clamp(inset, ARENA_HEIGHT - inset),
    )
}

/// Whether a point lies strictly inside the arena
#[inline]
pub fn in_arena(pos: Vec2) -> bool {
    use consts::{ARENA_HEIGHT, ARENA_WIDTH};
    pos.x > 0.0 && pos.x < ARENA_WIDTH && pos.y > 0.0 && pos.y < ARENA_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_degenerate() {
        let p = Vec2::new(10.0, 10.0);
        assert!(direction(p, p).is_none());
        let d = direction(Vec2::ZERO, Vec2::new(3.0, 4.0)).unwrap();
        assert!((d - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_clamp_to_arena() {
        let p = clamp_to_arena(Vec2::new(-100.0, 1000.0), 25.0);
        assert_eq!(p, Vec2::new(25.0, consts::ARENA_HEIGHT - 25.0));
    }

    #[test]
    fn test_in_arena_is_strict() {
        assert!(in_arena(Vec2::new(1.0, 1.0)));
        assert!(!in_arena(Vec2::new(0.0, 300.0)));
        assert!(!in_arena(Vec2::new(400.0, consts::ARENA_HEIGHT)));
    }
}
