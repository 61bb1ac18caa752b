//! Combat resolution
//!
//! Player commands and firing, projectile movement, hit detection, damage
//! and kill bookkeeping. Non-finite projectiles are dropped before any
//! collision test.

use glam::Vec2;

use super::collision::{circles_overlap, outside_arena};
use super::spawn::check_upgrade;
use super::state::{
    EndCause, EntityId, GameEvent, GameState, PlayerIntent, Projectile, ProjectileKind,
};
use crate::consts::*;
use crate::{angle_to, clamp_to_arena, direction};

/// A shot an enemy decided to fire this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyShot {
    pub origin: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub decay: f32,
}

/// Damage dealt by any single projectile hit
pub const PROJECTILE_DAMAGE: u32 = 1;

/// Primary command at a point: engage the enemy under it, or walk there
pub fn issue_command(state: &mut GameState, point: Vec2) {
    if state.is_over() || !point.is_finite() {
        return;
    }
    match state.enemy_at(point, CLICK_MARGIN) {
        Some(id) => engage(state, id),
        None => {
            let target = clamp_to_arena(point, 0.0);
            state.player.angle = angle_to(state.player.pos, target);
            state.player.intent = PlayerIntent::MoveTo(target);
        }
    }
}

/// Attack-only command: engage the enemy under the pointer, ignore empty ground
pub fn issue_attack(state: &mut GameState, point: Vec2) {
    if state.is_over() || !point.is_finite() {
        return;
    }
    if let Some(id) = state.enemy_at(point, CLICK_MARGIN) {
        engage(state, id);
    }
}

/// Attack if in range, otherwise chase
fn engage(state: &mut GameState, id: EntityId) {
    let Some(enemy_pos) = state.enemy(id).map(|e| e.pos) else {
        return;
    };
    let player = &mut state.player;
    if player.in_range(enemy_pos) {
        player.angle = angle_to(player.pos, enemy_pos);
        player.intent = PlayerIntent::Attack(id);
    } else {
        player.intent = PlayerIntent::Follow(id);
    }
}

/// Regenerate, then carry out the current intent
pub fn update_player(state: &mut GameState) {
    if state.is_over() {
        return;
    }

    let player = &mut state.player;
    player.shoot_cooldown = player.shoot_cooldown.saturating_sub(1);
    player.stamina = (player.stamina + STAMINA_REGEN).min(player.max_stamina);

    match state.player.intent {
        PlayerIntent::Idle => {}
        PlayerIntent::MoveTo(target) => {
            if step_player_toward(state, target) {
                state.player.intent = PlayerIntent::Idle;
            }
        }
        PlayerIntent::Follow(id) => {
            let Some(enemy_pos) = state.enemy(id).map(|e| e.pos) else {
                state.player.intent = PlayerIntent::Idle;
                return;
            };
            let player = &mut state.player;
            let dist = player.pos.distance(enemy_pos);
            if dist <= player.shoot_range * FOLLOW_ENGAGE_FRACTION {
                player.angle = angle_to(player.pos, enemy_pos);
                player.intent = PlayerIntent::Attack(id);
            } else {
                // Stop short of the enemy, inside shooting range
                let ratio = player.shoot_range * FOLLOW_APPROACH_FRACTION / dist;
                let approach = enemy_pos + (player.pos - enemy_pos) * ratio;
                player.angle = angle_to(player.pos, approach);
                step_player_toward(state, approach);
            }
        }
        PlayerIntent::Attack(id) => {
            let Some(enemy_pos) = state.enemy(id).map(|e| e.pos) else {
                state.player.intent = PlayerIntent::Idle;
                return;
            };
            if !state.player.in_range(enemy_pos) {
                state.player.intent = PlayerIntent::Follow(id);
                return;
            }
            // Grapple mode kills only with the hook
            if !state.is_grapple()
                && state.player.shoot_cooldown == 0
                && state.player.can_shoot()
                && fire_player_bullet(state, enemy_pos)
            {
                let player = &mut state.player;
                player.shoot_cooldown = PLAYER_SHOOT_COOLDOWN;
                player.stamina = (player.stamina - SHOT_STAMINA_COST).max(0.0);
                player.angle = angle_to(player.pos, enemy_pos);
            }
        }
    }
}

/// Move the player one step toward `target`. Returns true on arrival.
fn step_player_toward(state: &mut GameState, target: Vec2) -> bool {
    let player = &mut state.player;
    let offset = target - player.pos;
    let dist = offset.length();
    if dist <= MOVE_SNAP_DISTANCE {
        player.pos = clamp_to_arena(target, 0.0);
        return true;
    }
    player.pos = clamp_to_arena(player.pos + offset / dist * player.speed, 0.0);
    false
}

/// Spawn a player bullet aimed at a point. Rejected at the admission cap.
fn fire_player_bullet(state: &mut GameState, target: Vec2) -> bool {
    if state.bullets.len() >= MAX_PLAYER_BULLETS {
        log::debug!("Player bullet rejected at cap");
        return false;
    }
    let origin = state.player.pos;
    let Some(dir) = direction(origin, target) else {
        return false;
    };
    let id = state.next_entity_id();
    state.bullets.push(Projectile {
        id,
        kind: ProjectileKind::Player,
        pos: origin,
        vel: dir * PLAYER_BULLET_SPEED,
        size: PLAYER_BULLET_SIZE,
        damage: PROJECTILE_DAMAGE,
        energy: 1.0,
        decay: PLAYER_BULLET_DECAY,
    });
    true
}

/// Admit an enemy shot into the projectile pool
pub fn fire_enemy_shot(state: &mut GameState, shot: EnemyShot) {
    if state.enemy_bullets.len() >= MAX_ENEMY_BULLETS {
        log::debug!("Enemy bullet rejected at cap");
        return;
    }
    if !shot.origin.is_finite() || !shot.vel.is_finite() {
        return;
    }
    let id = state.next_entity_id();
    state.enemy_bullets.push(Projectile {
        id,
        kind: ProjectileKind::Enemy,
        pos: shot.origin,
        vel: shot.vel,
        size: shot.size,
        damage: PROJECTILE_DAMAGE,
        energy: 1.0,
        decay: shot.decay,
    });
}

/// Drop projectiles whose position or velocity went non-finite
pub(crate) fn drop_non_finite(projectiles: &mut Vec<Projectile>) {
    projectiles.retain(|p| {
        let ok = p.is_finite();
        if !ok {
            log::debug!("Dropping {:?} projectile {} with non-finite state", p.kind, p.id);
        }
        ok
    });
}

/// First enemy (roster order) overlapping a circle
pub(crate) fn enemy_hit(state: &GameState, pos: Vec2, size: f32) -> Option<usize> {
    state
        .enemies
        .iter()
        .position(|e| circles_overlap(pos, size, e.pos, e.size))
}

/// Apply damage to the enemy at `index`. Returns true if it died.
pub fn damage_enemy(state: &mut GameState, index: usize, damage: u32) -> bool {
    let Some(enemy) = state.enemies.get_mut(index) else {
        return false;
    };
    enemy.health = enemy.health.saturating_sub(damage);
    if enemy.health == 0 {
        kill_enemy(state, index);
        true
    } else {
        false
    }
}

/// Remove the enemy at `index` and score it
pub fn kill_enemy(state: &mut GameState, index: usize) {
    if index >= state.enemies.len() {
        return;
    }
    let enemy = state.enemies.remove(index);
    state.score += 1;
    state.events.push(GameEvent::EnemyKilled {
        id: enemy.id,
        kind: enemy.kind(),
        pos: enemy.pos,
    });
    check_upgrade(state);
}

/// Move player bullets and resolve hits against the roster
pub fn update_player_bullets(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    drop_non_finite(&mut state.bullets);

    let mut bullets = std::mem::take(&mut state.bullets);
    bullets.retain_mut(|bullet| {
        bullet.step();
        if let Some(index) = enemy_hit(state, bullet.pos, bullet.size) {
            damage_enemy(state, index, bullet.damage);
            return false;
        }
        !outside_arena(bullet.pos, PLAYER_BULLET_MARGIN) && !bullet.is_spent()
    });
    state.bullets = bullets;
}

/// Move enemy bullets and resolve hits against the player
pub fn update_enemy_bullets(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    drop_non_finite(&mut state.enemy_bullets);

    let mut bullets = std::mem::take(&mut state.enemy_bullets);
    bullets.retain_mut(|bullet| {
        // Frozen once the session ends mid-pass
        if state.is_over() {
            return true;
        }
        bullet.step();
        if circles_overlap(bullet.pos, bullet.size, state.player.pos, PLAYER_SIZE) {
            // Absorbed harmlessly in grapple mode
            if !state.is_grapple() {
                hit_player(state, bullet.damage);
            }
            return false;
        }
        !outside_arena(bullet.pos, 0.0) && !bullet.is_spent()
    });
    state.enemy_bullets = bullets;
}

fn hit_player(state: &mut GameState, damage: u32) {
    let player = &mut state.player;
    player.health = player.health.saturating_sub(damage);
    let health = player.health;
    state.events.push(GameEvent::PlayerHit { health });
    if health == 0 {
        state.end_session(EndCause::Shot);
    }
}
