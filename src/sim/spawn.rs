//! Spawn and difficulty scheduling
//!
//! Enemies arrive from the arena edges on a shrinking interval. Every tenth
//! kill raises the roster cap by one.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::state::{EntityId, GameEvent, GameState};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, SPAWN_OFFSET};
use crate::settings::EnemyToggles;
use crate::tuning::{self, spawn_weight};

/// Spawn/difficulty state. Cap only grows, interval only shrinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    /// Maximum enemies on screen
    pub cap: usize,
    /// Ticks between spawn attempts
    pub spawn_interval: u32,
    /// Ticks since the last spawn attempt
    pub spawn_timer: u32,
    /// Score at which the cap grows next
    pub next_upgrade: u32,
}

impl Default for Director {
    fn default() -> Self {
        Self {
            cap: tuning::START_ENEMY_CAP,
            spawn_interval: tuning::START_SPAWN_INTERVAL,
            spawn_timer: 0,
            next_upgrade: tuning::KILLS_PER_UPGRADE,
        }
    }
}

/// Count down to the next spawn attempt
pub fn update_spawner(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    let director = &mut state.director;
    director.spawn_timer += 1;
    if director.spawn_timer < director.spawn_interval {
        return;
    }
    director.spawn_timer = 0;
    // The interval shrinks on every attempt, even a rejected one
    director.spawn_interval = director
        .spawn_interval
        .saturating_sub(tuning::SPAWN_INTERVAL_STEP)
        .max(tuning::MIN_SPAWN_INTERVAL);
    try_spawn(state);
}

/// Spawn one enemy at a random edge if the roster has room
pub fn try_spawn(state: &mut GameState) -> Option<EntityId> {
    if state.enemies.len() >= state.enemy_cap() {
        return None;
    }
    let kind = choose_kind(
        state.is_grapple(),
        &state.enemy_toggles,
        state.score,
        &mut state.rng,
    );
    let pos = spawn_point(&mut state.rng);
    state.spawn_enemy(kind, pos)
}

/// Weighted type selection over the enabled set
pub fn choose_kind(grapple: bool, toggles: &EnemyToggles, score: u32, rng: &mut Pcg32) -> EnemyKind {
    if grapple {
        return EnemyKind::Mage;
    }
    let available = toggles.enabled_kinds();
    match available.as_slice() {
        [] => return EnemyKind::Fast,
        [only] => return *only,
        _ => {}
    }

    let total: f32 = available.iter().map(|&k| spawn_weight(k, score)).sum();
    let draw = rng.random::<f32>();
    if total > 0.0 {
        let mut acc = 0.0;
        for &kind in &available {
            acc += spawn_weight(kind, score) / total;
            if draw <= acc {
                return kind;
            }
        }
    }
    // Rounding left the draw past the last band
    available[rng.random_range(0..available.len())]
}

/// Uniform point on a random edge, just outside the arena
pub fn spawn_point(rng: &mut Pcg32) -> Vec2 {
    match rng.random_range(0..4u8) {
        0 => Vec2::new(rng.random::<f32>() * ARENA_WIDTH, -SPAWN_OFFSET),
        1 => Vec2::new(ARENA_WIDTH + SPAWN_OFFSET, rng.random::<f32>() * ARENA_HEIGHT),
        2 => Vec2::new(rng.random::<f32>() * ARENA_WIDTH, ARENA_HEIGHT + SPAWN_OFFSET),
        _ => Vec2::new(-SPAWN_OFFSET, rng.random::<f32>() * ARENA_HEIGHT),
    }
}

/// Raise the cap on every tenth kill
pub fn check_upgrade(state: &mut GameState) {
    let score = state.score;
    if score == 0 || score % tuning::KILLS_PER_UPGRADE != 0 {
        return;
    }
    let director = &mut state.director;
    director.cap += 1;
    director.next_upgrade = score + tuning::KILLS_PER_UPGRADE;
    let cap = director.cap;
    log::info!("Difficulty raised: cap {cap}, next at {}", director.next_upgrade);
    state.events.push(GameEvent::DifficultyRaised { cap });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_first_spawn_after_interval() {
        let mut state = GameState::new(11);
        for _ in 0..179 {
            update_spawner(&mut state);
        }
        assert!(state.enemies.is_empty());
        update_spawner(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.director.spawn_interval, 178);
        assert_eq!(state.director.spawn_timer, 0);
    }

    #[test]
    fn test_interval_floor_and_cap() {
        let mut state = GameState::new(11);
        for _ in 0..20_000 {
            update_spawner(&mut state);
            assert!(state.enemies.len() <= state.director.cap);
        }
        assert_eq!(state.director.spawn_interval, tuning::MIN_SPAWN_INTERVAL);
        assert_eq!(state.enemies.len(), tuning::START_ENEMY_CAP);
    }

    #[test]
    fn test_upgrade_every_tenth_kill() {
        let mut state = GameState::new(1);
        for score in 1..=25 {
            state.score = score;
            check_upgrade(&mut state);
        }
        assert_eq!(state.director.cap, tuning::START_ENEMY_CAP + 2);
        assert_eq!(state.director.next_upgrade, 30);
        let raised = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::DifficultyRaised { .. }))
            .count();
        assert_eq!(raised, 2);
    }

    #[test]
    fn test_choose_kind_special_cases() {
        let mut rng = Pcg32::seed_from_u64(9);
        let all = EnemyToggles::default();
        assert_eq!(choose_kind(true, &all, 0, &mut rng), EnemyKind::Mage);

        let mut only_tank = EnemyToggles::default();
        for kind in tuning::SPAWNABLE_KINDS {
            only_tank.set(kind, kind == EnemyKind::Tank);
        }
        for _ in 0..50 {
            assert_eq!(choose_kind(false, &only_tank, 40, &mut rng), EnemyKind::Tank);
        }

        let mut none = only_tank;
        none.tank = false;
        assert_eq!(choose_kind(false, &none, 0, &mut rng), EnemyKind::Fast);
    }

    #[test]
    fn test_choose_kind_renormalizes_over_enabled() {
        let mut rng = Pcg32::seed_from_u64(21);
        let mut toggles = EnemyToggles::default();
        toggles.sniper = false;
        toggles.berserker = false;
        toggles.mage = false;

        let draws = 10_000;
        let fast = (0..draws)
            .filter(|_| choose_kind(false, &toggles, 0, &mut rng) == EnemyKind::Fast)
            .count();
        // 0.7 / (0.7 + 0.2)
        let share = fast as f32 / draws as f32;
        assert!((share - 0.778).abs() < 0.03, "fast share {share}");
    }

    #[test]
    fn test_spawn_point_on_edge() {
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..200 {
            let p = spawn_point(&mut rng);
            let on_edge = p.x == -SPAWN_OFFSET
                || p.x == ARENA_WIDTH + SPAWN_OFFSET
                || p.y == -SPAWN_OFFSET
                || p.y == ARENA_HEIGHT + SPAWN_OFFSET;
            assert!(on_edge, "{p:?}");
        }
    }
}
