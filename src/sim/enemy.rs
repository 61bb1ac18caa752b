//! Enemy roster entries and per-type behavior
//!
//! Every enemy shares a base record; type-specific state lives in the
//! [`Behavior`] payload and is dispatched with `match`. Each tick an enemy
//! updates its timers, runs its behavior state machine, decides whether to
//! fire, then moves.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::blocked_by_obstacles;
use super::combat::{EnemyShot, fire_enemy_shot};
use super::state::{EntityId, GameState, Obstacle};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::tuning::{self, EnemyStats};
use crate::{angle_to, direction, heading, in_arena};

/// Enemy type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
    Sniper,
    Berserker,
    Mage,
    Elite,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 7] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Sniper,
        EnemyKind::Berserker,
        EnemyKind::Mage,
        EnemyKind::Elite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Tank => "tank",
            EnemyKind::Sniper => "sniper",
            EnemyKind::Berserker => "berserker",
            EnemyKind::Mage => "mage",
            EnemyKind::Elite => "elite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
    }

    pub fn stats(&self) -> EnemyStats {
        tuning::enemy_stats(*self)
    }
}

/// Ranged attack, fixed at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub range: f32,
    /// Full cooldown after a shot (or a completed burst)
    pub max_cooldown: u32,
    pub bullet_speed: f32,
    pub bullet_size: f32,
    pub bullet_decay: f32,
}

/// Random-walk state for mages in grapple mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wander {
    pub heading: f32,
    /// Ticks until a new heading is drawn
    pub timer: u32,
}

/// Type-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Basic,
    Fast {
        /// Axis the zigzag oscillates along
        patrol_angle: f32,
        /// Ticks since the last heading jitter
        jitter_timer: u32,
    },
    Tank {
        charging: bool,
        /// Ticks spent in the current half of the duty cycle
        timer: u32,
    },
    Sniper {
        /// Remaining aim ticks while charging
        charge: Option<u32>,
    },
    Berserker {
        raging: bool,
    },
    Mage {
        /// Shots fired in the current burst
        burst_fired: u32,
        /// Set in grapple mode: wander instead of chasing, never fire
        wander: Option<Wander>,
    },
    Elite {
        burst_fired: u32,
        teleport_cooldown: u32,
    },
}

impl Behavior {
    pub fn kind(&self) -> EnemyKind {
        match self {
            Behavior::Basic => EnemyKind::Basic,
            Behavior::Fast { .. } => EnemyKind::Fast,
            Behavior::Tank { .. } => EnemyKind::Tank,
            Behavior::Sniper { .. } => EnemyKind::Sniper,
            Behavior::Berserker { .. } => EnemyKind::Berserker,
            Behavior::Mage { .. } => EnemyKind::Mage,
            Behavior::Elite { .. } => EnemyKind::Elite,
        }
    }
}

/// An active adversary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub health: u32,
    pub max_health: u32,
    /// Collision radius
    pub size: f32,
    pub speed: f32,
    /// Facing toward the player (radians)
    pub angle: f32,
    pub shoot_cooldown: u32,
    /// `None` for melee-only types
    pub weapon: Option<Weapon>,
    pub behavior: Behavior,
}

/// What an enemy can see of the world during its update
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub player: Vec2,
    pub obstacles: &'a [Obstacle],
    /// Grapple mode: enemies never fire
    pub grapple: bool,
    pub time_ticks: u64,
}

impl Enemy {
    /// Build an enemy from its stat table. Speed gets a random roll.
    pub fn spawn(
        id: EntityId,
        kind: EnemyKind,
        pos: Vec2,
        aggressiveness: f32,
        grapple: bool,
        rng: &mut Pcg32,
    ) -> Self {
        let stats = kind.stats();
        let mut speed = stats.speed(rng.random::<f32>(), aggressiveness);
        let weapon = stats.weapon.map(|w| Weapon {
            range: w.range,
            max_cooldown: w.cooldown(aggressiveness),
            bullet_speed: w.bullet_speed,
            bullet_size: w.bullet_size,
            bullet_decay: w.bullet_decay,
        });

        let behavior = match kind {
            EnemyKind::Basic => Behavior::Basic,
            EnemyKind::Fast => Behavior::Fast {
                patrol_angle: rng.random::<f32>() * TAU,
                jitter_timer: 0,
            },
            EnemyKind::Tank => Behavior::Tank {
                charging: false,
                timer: 0,
            },
            EnemyKind::Sniper => Behavior::Sniper { charge: None },
            EnemyKind::Berserker => Behavior::Berserker { raging: false },
            EnemyKind::Mage => {
                let wander = grapple.then(|| {
                    speed = tuning::MAGE_WANDER_BASE_SPEED
                        + rng.random::<f32>() * tuning::MAGE_WANDER_SPEED_JITTER;
                    // Draw a heading on the first update
                    Wander {
                        heading: 0.0,
                        timer: 1,
                    }
                });
                Behavior::Mage {
                    burst_fired: 0,
                    wander,
                }
            }
            EnemyKind::Elite => Behavior::Elite {
                burst_fired: 0,
                teleport_cooldown: 0,
            },
        };

        Self {
            id,
            pos,
            health: stats.health,
            max_health: stats.health,
            size: stats.size,
            speed,
            angle: 0.0,
            shoot_cooldown: 0,
            weapon,
            behavior,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.behavior.kind()
    }

    /// Advance one tick. Returns a shot if the enemy fired.
    pub fn update(&mut self, ctx: &EnemyContext, rng: &mut Pcg32) -> Option<EnemyShot> {
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        if let Behavior::Elite {
            teleport_cooldown, ..
        } = &mut self.behavior
        {
            *teleport_cooldown = teleport_cooldown.saturating_sub(1);
        }

        let dist = self.pos.distance(ctx.player);
        self.angle = angle_to(self.pos, ctx.player);

        self.update_behavior(dist, ctx, rng);
        let shot = if ctx.grapple {
            None
        } else {
            self.try_fire(dist, ctx)
        };
        self.update_movement(dist, ctx, rng);
        shot
    }

    /// Per-type state machine transitions
    fn update_behavior(&mut self, dist: f32, ctx: &EnemyContext, rng: &mut Pcg32) {
        let health = self.health;
        let in_range = self.weapon.is_some_and(|w| dist <= w.range);
        let ready = self.shoot_cooldown == 0;

        match &mut self.behavior {
            Behavior::Berserker { raging } => {
                if !*raging && health <= tuning::BERSERKER_RAGE_HEALTH {
                    *raging = true;
                    self.speed *= tuning::BERSERKER_RAGE_SPEED_MULT;
                }
            }
            Behavior::Sniper { charge } => {
                *charge = if in_range && ready {
                    Some(match *charge {
                        None => tuning::SNIPER_CHARGE_TICKS,
                        Some(remaining) => remaining.saturating_sub(1),
                    })
                } else {
                    None
                };
            }
            Behavior::Fast {
                patrol_angle,
                jitter_timer,
            } => {
                *jitter_timer += 1;
                if *jitter_timer >= tuning::FAST_JITTER_INTERVAL {
                    *patrol_angle += (rng.random::<f32>() - 0.5) * tuning::FAST_JITTER_SPREAD;
                    *jitter_timer = 0;
                }
            }
            Behavior::Tank { charging, timer } => {
                *timer += 1;
                let limit = if *charging {
                    tuning::TANK_CHARGE_TICKS
                } else {
                    tuning::TANK_PAUSE_TICKS
                };
                if *timer >= limit {
                    *charging = !*charging;
                    *timer = 0;
                }
            }
            Behavior::Elite {
                teleport_cooldown, ..
            } => {
                if *teleport_cooldown == 0 && rng.random_bool(tuning::ELITE_TELEPORT_CHANCE) {
                    *teleport_cooldown = tuning::ELITE_TELEPORT_COOLDOWN;
                    let angle = rng.random::<f32>() * TAU;
                    let span = tuning::ELITE_TELEPORT_MAX_DISTANCE - tuning::ELITE_TELEPORT_MIN_DISTANCE;
                    let reach = tuning::ELITE_TELEPORT_MIN_DISTANCE + rng.random::<f32>() * span;
                    self.pos = teleport_target(ctx.player, angle, reach, self.size);
                }
            }
            Behavior::Basic | Behavior::Mage { .. } => {}
        }
    }

    /// Fire policy. Only called outside grapple mode.
    fn try_fire(&mut self, dist: f32, ctx: &EnemyContext) -> Option<EnemyShot> {
        let weapon = self.weapon?;
        if self.shoot_cooldown > 0 {
            return None;
        }

        let fire = match &mut self.behavior {
            Behavior::Tank { .. } | Behavior::Berserker { .. } => false,
            Behavior::Sniper { charge } => {
                if *charge == Some(0) {
                    *charge = None;
                    self.shoot_cooldown = weapon.max_cooldown;
                    true
                } else {
                    false
                }
            }
            Behavior::Mage { burst_fired, .. } => {
                dist <= weapon.range
                    && advance_burst(
                        burst_fired,
                        &mut self.shoot_cooldown,
                        tuning::MAGE_BURST_SHOTS,
                        tuning::MAGE_BURST_INTERVAL,
                        weapon.max_cooldown,
                    )
            }
            Behavior::Elite { burst_fired, .. } => {
                dist <= weapon.range
                    && advance_burst(
                        burst_fired,
                        &mut self.shoot_cooldown,
                        tuning::ELITE_BURST_SHOTS,
                        tuning::ELITE_BURST_INTERVAL,
                        weapon.max_cooldown,
                    )
            }
            Behavior::Basic | Behavior::Fast { .. } => {
                if dist <= weapon.range {
                    self.shoot_cooldown = weapon.max_cooldown;
                    true
                } else {
                    false
                }
            }
        };

        if !fire {
            return None;
        }
        let dir = direction(self.pos, ctx.player)?;
        Some(EnemyShot {
            origin: self.pos,
            vel: dir * weapon.bullet_speed,
            size: weapon.bullet_size,
            decay: weapon.bullet_decay,
        })
    }

    fn update_movement(&mut self, dist: f32, ctx: &EnemyContext, rng: &mut Pcg32) {
        let to_player = ctx.player - self.pos;
        let mut speed = self.speed;
        let mut heading_vec = to_player;

        match &mut self.behavior {
            Behavior::Mage {
                wander: Some(wander),
                ..
            } => {
                wander.timer = wander.timer.saturating_sub(1);
                if wander.timer == 0 {
                    wander.heading = rng.random::<f32>() * TAU;
                    wander.timer =
                        rng.random_range(tuning::MAGE_WANDER_MIN_TICKS..=tuning::MAGE_WANDER_MAX_TICKS);
                }
                let step = heading(wander.heading) * self.speed;
                self.pos = clamp_inside(self.pos + step, self.size);
                return;
            }
            Behavior::Fast { patrol_angle, .. } => {
                let phase = ctx.time_ticks as f32 * tuning::FAST_ZIGZAG_FREQUENCY + self.pos.x * 0.01;
                heading_vec += heading(*patrol_angle) * (phase.sin() * tuning::FAST_ZIGZAG_AMPLITUDE);
            }
            Behavior::Sniper { charge } => {
                let range = self.weapon.map_or(0.0, |w| w.range);
                if charge.is_some() {
                    speed = 0.0;
                } else if dist < range * tuning::SNIPER_FLEE_FRACTION {
                    heading_vec = -to_player;
                    speed *= tuning::SNIPER_FLEE_SPEED_MULT;
                } else if dist <= range {
                    speed *= tuning::SNIPER_HOLD_SPEED_MULT;
                }
            }
            Behavior::Tank { charging, .. } => {
                speed = if *charging {
                    speed * tuning::TANK_CHARGE_SPEED_MULT
                } else {
                    0.0
                };
            }
            Behavior::Basic
            | Behavior::Berserker { .. }
            | Behavior::Mage { wander: None, .. }
            | Behavior::Elite { .. } => {}
        }

        if speed <= 0.0 || to_player == Vec2::ZERO {
            return;
        }
        let Some(dir) = heading_vec.try_normalize() else {
            return;
        };
        let next = self.pos + dir * speed;
        if blocked_by_obstacles(next, self.size, ctx.obstacles) {
            self.avoid_obstacles(ctx.obstacles, rng);
        } else {
            self.pos = next;
        }
    }

    /// Probe eight headings around a random start, take the first clear one
    fn avoid_obstacles(&mut self, obstacles: &[Obstacle], rng: &mut Pcg32) {
        let reach = self.speed
            * match self.behavior {
                Behavior::Fast { .. } => tuning::AVOID_PROBE_FAST,
                _ => tuning::AVOID_PROBE_DEFAULT,
            };
        let base = rng.random::<f32>() * TAU;
        let probe = (0..8)
            .map(|i| self.pos + heading(base + i as f32 * FRAC_PI_4) * reach)
            .find(|&p| !blocked_by_obstacles(p, self.size, obstacles) && in_arena(p));
        if let Some(p) = probe {
            self.pos = p;
        }
    }
}

/// Count one burst shot. Returns true if a shot goes out.
fn advance_burst(fired: &mut u32, cooldown: &mut u32, shots: u32, interval: u32, full: u32) -> bool {
    *fired += 1;
    if *fired >= shots {
        *fired = 0;
        *cooldown = full;
    } else {
        *cooldown = interval;
    }
    true
}

fn clamp_inside(pos: Vec2, size: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(size, ARENA_WIDTH - size),
        pos.y.clamp(size, ARENA_HEIGHT - size),
    )
}

/// Landing point for an elite teleport, kept inside the arena
pub fn teleport_target(player: Vec2, angle: f32, reach: f32, size: f32) -> Vec2 {
    clamp_inside(player + heading(angle) * reach, size)
}

/// Run every enemy for one tick, then resolve melee contact
pub fn update_enemies(state: &mut GameState) {
    if state.is_over() {
        return;
    }

    let captured = state.hook.as_ref().and_then(|h| h.captured);
    let mut shots = Vec::new();
    {
        let GameState {
            enemies,
            obstacles,
            rng,
            player,
            mode,
            time_ticks,
            ..
        } = &mut *state;
        let ctx = EnemyContext {
            player: player.pos,
            obstacles,
            grapple: *mode == crate::settings::GameMode::Grapple,
            time_ticks: *time_ticks,
        };
        for enemy in enemies.iter_mut() {
            // The hook owns a captured enemy's position
            if Some(enemy.id) == captured {
                continue;
            }
            if let Some(shot) = enemy.update(&ctx, rng) {
                shots.push(shot);
            }
        }
    }

    state.enemies.retain(|e| {
        let ok = e.pos.is_finite();
        if !ok {
            log::debug!("Dropping enemy {} with non-finite position", e.id);
        }
        ok
    });

    for shot in shots {
        fire_enemy_shot(state, shot);
    }

    resolve_contact(state);
}

/// End the session if any enemy touches the player. Ignored in grapple mode
/// and for an enemy held by the hook.
pub fn resolve_contact(state: &mut GameState) {
    if state.is_grapple() || state.is_over() {
        return;
    }
    let captured = state.hook.as_ref().and_then(|h| h.captured);
    let touching = state
        .enemies
        .iter()
        .any(|e| Some(e.id) != captured && state.touches_player(e));
    if touching {
        state.end_session(super::state::EndCause::Contact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ctx(player: Vec2) -> EnemyContext<'static> {
        EnemyContext {
            player,
            obstacles: &[],
            grapple: false,
            time_ticks: 0,
        }
    }

    fn make(kind: EnemyKind, pos: Vec2) -> (Enemy, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(7);
        let enemy = Enemy::spawn(1, kind, pos, 0.0, false, &mut rng);
        (enemy, rng)
    }

    #[test]
    fn test_tank_duty_cycle() {
        let player = Vec2::new(400.0, 300.0);
        let (mut tank, mut rng) = make(EnemyKind::Tank, Vec2::new(-2000.0, 300.0));
        let ctx = ctx(player);

        let mut runs: Vec<(bool, u32)> = Vec::new();
        for _ in 0..2000 {
            let before = tank.pos;
            tank.update(&ctx, &mut rng);
            let Behavior::Tank { charging, .. } = tank.behavior else {
                panic!("not a tank");
            };
            if !charging {
                assert_eq!(tank.pos, before, "paused tank moved");
            } else {
                assert!(tank.pos.x > before.x);
            }
            match runs.last_mut() {
                Some((state, len)) if *state == charging => *len += 1,
                _ => runs.push((charging, 1)),
            }
        }

        // Drop the trailing partial run
        runs.pop();
        assert!(runs.len() > 4);
        assert!(!runs[0].0);
        assert!(runs[0].1 <= tuning::TANK_PAUSE_TICKS);
        for &(charging, len) in &runs[1..] {
            if charging {
                assert_eq!(len, tuning::TANK_CHARGE_TICKS);
            } else {
                assert_eq!(len, tuning::TANK_PAUSE_TICKS);
            }
        }
    }

    #[test]
    fn test_sniper_fires_once_per_charge() {
        let player = Vec2::new(400.0, 300.0);
        let (mut sniper, mut rng) = make(EnemyKind::Sniper, Vec2::new(100.0, 300.0));
        let ctx = ctx(player);

        let mut shots = Vec::new();
        for i in 0..200 {
            if sniper.update(&ctx, &mut rng).is_some() {
                shots.push(i);
            }
        }
        assert_eq!(shots, vec![tuning::SNIPER_CHARGE_TICKS as usize]);
    }

    #[test]
    fn test_sniper_charge_resets_out_of_range() {
        let (mut sniper, mut rng) = make(EnemyKind::Sniper, Vec2::new(100.0, 300.0));
        let near = ctx(Vec2::new(400.0, 300.0));
        let far = ctx(Vec2::new(790.0, 300.0));

        for _ in 0..30 {
            assert!(sniper.update(&near, &mut rng).is_none());
        }
        sniper.update(&far, &mut rng);
        assert_eq!(sniper.behavior, Behavior::Sniper { charge: None });

        // A fresh full charge is needed again
        let mut fired_at = None;
        for i in 0..100 {
            if sniper.update(&near, &mut rng).is_some() {
                fired_at = Some(i);
                break;
            }
        }
        assert_eq!(fired_at, Some(tuning::SNIPER_CHARGE_TICKS));
    }

    #[test]
    fn test_berserker_rage_is_permanent() {
        let (mut berserker, mut rng) = make(EnemyKind::Berserker, Vec2::new(50.0, 50.0));
        let base = berserker.speed;
        let ctx = ctx(Vec2::new(400.0, 300.0));

        berserker.update(&ctx, &mut rng);
        assert_eq!(berserker.behavior, Behavior::Berserker { raging: false });

        berserker.health = 2;
        berserker.update(&ctx, &mut rng);
        berserker.update(&ctx, &mut rng);
        assert_eq!(berserker.behavior, Behavior::Berserker { raging: true });
        assert!((berserker.speed - base * tuning::BERSERKER_RAGE_SPEED_MULT).abs() < 1e-5);
    }

    #[test]
    fn test_mage_burst_spacing() {
        let player = Vec2::new(400.0, 300.0);
        let (mut mage, mut rng) = make(EnemyKind::Mage, Vec2::new(200.0, 300.0));
        let ctx = ctx(player);
        let full = mage.weapon.unwrap().max_cooldown as usize;

        let mut shots = Vec::new();
        for i in 0..40 {
            if mage.update(&ctx, &mut rng).is_some() {
                shots.push(i);
            }
            // Keep the distance fixed
            mage.pos = Vec2::new(200.0, 300.0);
        }
        assert_eq!(shots, vec![0, 10, 20]);

        for i in 40..(20 + full + 5) {
            if mage.update(&ctx, &mut rng).is_some() {
                shots.push(i);
            }
            mage.pos = Vec2::new(200.0, 300.0);
        }
        assert_eq!(shots, vec![0, 10, 20, 20 + full]);
    }

    #[test]
    fn test_melee_types_never_fire() {
        let ctx = ctx(Vec2::new(400.0, 300.0));
        for kind in [EnemyKind::Tank, EnemyKind::Berserker] {
            let (mut enemy, mut rng) = make(kind, Vec2::new(350.0, 300.0));
            for _ in 0..300 {
                assert!(enemy.update(&ctx, &mut rng).is_none());
                enemy.pos = Vec2::new(350.0, 300.0);
            }
        }
    }

    #[test]
    fn test_grapple_mage_wanders_without_firing() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut mage = Enemy::spawn(1, EnemyKind::Mage, Vec2::new(300.0, 300.0), 0.0, true, &mut rng);
        assert!(mage.speed >= tuning::MAGE_WANDER_BASE_SPEED);
        let ctx = EnemyContext {
            grapple: true,
            ..ctx(Vec2::new(400.0, 300.0))
        };
        for _ in 0..600 {
            assert!(mage.update(&ctx, &mut rng).is_none());
            assert!(mage.pos.x >= mage.size && mage.pos.x <= ARENA_WIDTH - mage.size);
            assert!(mage.pos.y >= mage.size && mage.pos.y <= ARENA_HEIGHT - mage.size);
        }
    }

    #[test]
    fn test_teleport_target_clamped() {
        let target = teleport_target(Vec2::new(780.0, 20.0), 0.0, 200.0, 22.0);
        assert_eq!(target, Vec2::new(ARENA_WIDTH - 22.0, 22.0));
        let target = teleport_target(Vec2::new(400.0, 300.0), std::f32::consts::PI, 150.0, 22.0);
        assert!((target - Vec2::new(250.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn test_avoidance_leaves_blocked_step() {
        let obstacles = crate::sim::state::default_obstacles();
        let player = Vec2::new(500.0, 300.0);
        // Directly left of the central block, which sits between us and the player
        let (mut basic, mut rng) = make(EnemyKind::Basic, Vec2::new(331.5, 300.0));
        let ctx = EnemyContext {
            player,
            obstacles: &obstacles,
            grapple: false,
            time_ticks: 0,
        };
        for _ in 0..20 {
            basic.update(&ctx, &mut rng);
            assert!(!blocked_by_obstacles(basic.pos, basic.size, &obstacles));
        }
    }

    #[test]
    fn test_kind_roundtrip_names() {
        for kind in EnemyKind::ALL {
            assert_eq!(EnemyKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(EnemyKind::from_str("Sniper"), Some(EnemyKind::Sniper));
    }
}
