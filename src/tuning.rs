//! Data-driven game balance
//!
//! Per-type enemy stats, behavior timings and the spawn weight bands.
//! Durations are in simulation ticks.

use crate::sim::EnemyKind;

/// Ranged attack profile for enemies that shoot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub range: f32,
    /// Cooldown at zero aggressiveness
    pub base_cooldown: f32,
    /// Cooldown reduction per point of aggressiveness
    pub cooldown_scale: f32,
    /// Cooldown never drops below this
    pub min_cooldown: f32,
    pub bullet_speed: f32,
    pub bullet_size: f32,
    /// Energy lost per tick (0 = never fades)
    pub bullet_decay: f32,
}

impl WeaponStats {
    /// Full cooldown in ticks for the given aggressiveness
    pub fn cooldown(&self, aggressiveness: f32) -> u32 {
        (self.base_cooldown - self.cooldown_scale * aggressiveness)
            .max(self.min_cooldown)
            .round() as u32
    }
}

/// Base stats for one enemy type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub size: f32,
    pub health: u32,
    pub base_speed: f32,
    /// Random extra speed in `[0, speed_jitter)`
    pub speed_jitter: f32,
    /// Speed gain per point of aggressiveness
    pub speed_scale: f32,
    /// `None` for melee-only types
    pub weapon: Option<WeaponStats>,
}

impl EnemyStats {
    /// Movement speed from a uniform roll in `[0, 1)`
    pub fn speed(&self, roll: f32, aggressiveness: f32) -> f32 {
        (self.base_speed + roll * self.speed_jitter) * (1.0 + aggressiveness * self.speed_scale)
    }
}

const STANDARD_BULLET_SPEED: f32 = 4.0;
const STANDARD_BULLET_SIZE: f32 = 4.0;

const fn standard_weapon(range: f32, base: f32, scale: f32, min: f32) -> WeaponStats {
    WeaponStats {
        range,
        base_cooldown: base,
        cooldown_scale: scale,
        min_cooldown: min,
        bullet_speed: STANDARD_BULLET_SPEED,
        bullet_size: STANDARD_BULLET_SIZE,
        bullet_decay: 0.0,
    }
}

/// Stat table lookup
pub const fn enemy_stats(kind: EnemyKind) -> EnemyStats {
    match kind {
        EnemyKind::Basic => EnemyStats {
            size: 18.0,
            health: 3,
            base_speed: 0.8,
            speed_jitter: 0.4,
            speed_scale: 0.3,
            weapon: Some(standard_weapon(180.0, 120.0, 20.0, 80.0)),
        },
        EnemyKind::Fast => EnemyStats {
            size: 14.0,
            health: 1,
            base_speed: 1.5,
            speed_jitter: 0.8,
            speed_scale: 0.4,
            weapon: Some(standard_weapon(150.0, 100.0, 15.0, 60.0)),
        },
        EnemyKind::Tank => EnemyStats {
            size: 24.0,
            health: 8,
            base_speed: 0.9,
            speed_jitter: 0.4,
            speed_scale: 0.25,
            weapon: None,
        },
        EnemyKind::Sniper => EnemyStats {
            size: 16.0,
            health: 2,
            base_speed: 0.6,
            speed_jitter: 0.4,
            speed_scale: 0.2,
            weapon: Some(WeaponStats {
                range: 350.0,
                base_cooldown: 180.0,
                cooldown_scale: 30.0,
                min_cooldown: 120.0,
                bullet_speed: 8.0,
                bullet_size: 3.0,
                bullet_decay: 0.005,
            }),
        },
        EnemyKind::Berserker => EnemyStats {
            size: 20.0,
            health: 3,
            base_speed: 0.8,
            speed_jitter: 0.4,
            speed_scale: 0.3,
            weapon: None,
        },
        EnemyKind::Mage => EnemyStats {
            size: 18.0,
            health: 3,
            base_speed: 0.8,
            speed_jitter: 0.4,
            speed_scale: 0.3,
            weapon: Some(standard_weapon(280.0, 120.0, 20.0, 80.0)),
        },
        EnemyKind::Elite => EnemyStats {
            size: 22.0,
            health: 5,
            base_speed: 1.2,
            speed_jitter: 0.5,
            speed_scale: 0.4,
            weapon: Some(standard_weapon(250.0, 90.0, 25.0, 50.0)),
        },
    }
}

/// Aggressiveness for a score: grows linearly, capped at 2x
pub fn aggressiveness(score: u32) -> f32 {
    (score as f32 / 20.0).min(2.0)
}

// === Behavior timings ===

/// Tank runs for this long...
pub const TANK_CHARGE_TICKS: u32 = 90;
/// ...then stands still for this long
pub const TANK_PAUSE_TICKS: u32 = 180;
pub const TANK_CHARGE_SPEED_MULT: f32 = 1.2;

pub const BERSERKER_RAGE_HEALTH: u32 = 2;
pub const BERSERKER_RAGE_SPEED_MULT: f32 = 1.3;

/// Sniper aims this long before it fires
pub const SNIPER_CHARGE_TICKS: u32 = 60;
/// Closer than this fraction of range, the sniper backs off
pub const SNIPER_FLEE_FRACTION: f32 = 0.8;
pub const SNIPER_FLEE_SPEED_MULT: f32 = 1.5;
pub const SNIPER_HOLD_SPEED_MULT: f32 = 0.1;

pub const MAGE_BURST_SHOTS: u32 = 3;
pub const MAGE_BURST_INTERVAL: u32 = 10;
/// Wandering mages (grapple mode) pick a new heading every 60-120 ticks
pub const MAGE_WANDER_MIN_TICKS: u32 = 60;
pub const MAGE_WANDER_MAX_TICKS: u32 = 120;
pub const MAGE_WANDER_BASE_SPEED: f32 = 2.5;
pub const MAGE_WANDER_SPEED_JITTER: f32 = 1.5;

pub const ELITE_BURST_SHOTS: u32 = 3;
pub const ELITE_BURST_INTERVAL: u32 = 15;
pub const ELITE_TELEPORT_CHANCE: f64 = 0.005;
pub const ELITE_TELEPORT_MIN_DISTANCE: f32 = 150.0;
pub const ELITE_TELEPORT_MAX_DISTANCE: f32 = 250.0;
pub const ELITE_TELEPORT_COOLDOWN: u32 = 300;

pub const FAST_JITTER_INTERVAL: u32 = 30;
/// Heading change range (radians) at each jitter
pub const FAST_JITTER_SPREAD: f32 = 0.8;
pub const FAST_ZIGZAG_AMPLITUDE: f32 = 50.0;
/// Zigzag phase advance per tick
pub const FAST_ZIGZAG_FREQUENCY: f32 = 1000.0 / 60.0 * 0.01;

/// Obstacle avoidance probe distance, in multiples of speed
pub const AVOID_PROBE_FAST: f32 = 3.0;
pub const AVOID_PROBE_DEFAULT: f32 = 2.0;

// === Spawning ===

pub const START_ENEMY_CAP: usize = 3;
pub const START_SPAWN_INTERVAL: u32 = 180;
pub const MIN_SPAWN_INTERVAL: u32 = 45;
pub const SPAWN_INTERVAL_STEP: u32 = 2;
/// Cap grows by one every this many kills
pub const KILLS_PER_UPGRADE: u32 = 10;

/// Kinds that can be drawn by the weighted spawner, in draw order
pub const SPAWNABLE_KINDS: [EnemyKind; 5] = [
    EnemyKind::Fast,
    EnemyKind::Tank,
    EnemyKind::Sniper,
    EnemyKind::Berserker,
    EnemyKind::Mage,
];

/// Spawn weight of a kind at the given score, before renormalization
pub fn spawn_weight(kind: EnemyKind, score: u32) -> f32 {
    // [fast, tank, sniper, berserker, mage]
    let band: [f32; 5] = match score {
        0..5 => [0.7, 0.2, 0.1, 0.05, 0.05],
        5..15 => [0.4, 0.3, 0.2, 0.08, 0.02],
        15..30 => [0.25, 0.25, 0.25, 0.2, 0.05],
        _ => [0.2, 0.2, 0.25, 0.25, 0.1],
    };
    match kind {
        EnemyKind::Fast => band[0],
        EnemyKind::Tank => band[1],
        EnemyKind::Sniper => band[2],
        EnemyKind::Berserker => band[3],
        EnemyKind::Mage => band[4],
        EnemyKind::Basic | EnemyKind::Elite => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_floors() {
        let basic = enemy_stats(EnemyKind::Basic).weapon.unwrap();
        assert_eq!(basic.cooldown(0.0), 120);
        assert_eq!(basic.cooldown(1.0), 100);
        assert_eq!(basic.cooldown(2.0), 80);

        let elite = enemy_stats(EnemyKind::Elite).weapon.unwrap();
        assert_eq!(elite.cooldown(2.0), 50);
    }

    #[test]
    fn test_melee_types_have_no_weapon() {
        assert!(enemy_stats(EnemyKind::Tank).weapon.is_none());
        assert!(enemy_stats(EnemyKind::Berserker).weapon.is_none());
    }

    #[test]
    fn test_aggressiveness_caps() {
        assert_eq!(aggressiveness(0), 0.0);
        assert_eq!(aggressiveness(10), 0.5);
        assert_eq!(aggressiveness(400), 2.0);
    }

    #[test]
    fn test_weight_bands_sum_near_one() {
        for score in [0, 7, 20, 50] {
            let total: f32 = SPAWNABLE_KINDS.iter().map(|&k| spawn_weight(k, score)).sum();
            assert!((total - 1.0).abs() < 0.11, "score {score}: {total}");
        }
    }
}
