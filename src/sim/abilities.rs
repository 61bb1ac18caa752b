//! Cooldown-gated player abilities
//!
//! - Special orb (combat mode): slow heavy projectile toward the pointer
//! - Dash: instant blink toward the pointer
//! - Grapple hook (grapple mode): pulls the first enemy it touches back to the
//!   player and destroys it

use glam::Vec2;

use super::collision::outside_arena;
use super::combat::{damage_enemy, drop_non_finite, enemy_hit, kill_enemy};
use super::state::{
    Ability, GameEvent, GameState, Hook, HookPhase, PlayerIntent, Projectile, ProjectileKind,
};
use crate::clamp_to_arena;
use crate::consts::MAX_SPECIAL_ORBS;

/// Special orb
pub const SPECIAL_COOLDOWN: u32 = 60;
pub const SPECIAL_SPEED: f32 = 8.0;
pub const SPECIAL_SIZE: f32 = 12.0;
/// Lifetime in ticks
pub const SPECIAL_LIFETIME: f32 = 300.0;
pub const SPECIAL_DAMAGE: u32 = 1;
/// Orbs survive this far past the arena edge
pub const SPECIAL_MARGIN: f32 = 100.0;
/// Pointer must be at least this far from the player to aim
pub const SPECIAL_MIN_AIM: f32 = 5.0;

/// Dash
pub const DASH_COOLDOWN: u32 = 180;
pub const DASH_RANGE: f32 = 150.0;
pub const DASH_MIN_DISTANCE: f32 = 30.0;
/// Landing point keeps this distance from the arena edge
pub const DASH_EDGE_INSET: f32 = 25.0;

/// Grapple hook
pub const HOOK_COOLDOWN: u32 = 120;
pub const HOOK_RANGE: f32 = 400.0;
pub const HOOK_SPEED: f32 = 14.0;
pub const HOOK_MIN_AIM: f32 = 10.0;
/// Hook catches an enemy within its size plus this
pub const HOOK_CATCH_MARGIN: f32 = 10.0;
/// A captured enemy is destroyed once dragged this close
pub const HOOK_CAPTURE_RADIUS: f32 = 30.0;
/// An empty hook is stowed once this close
pub const HOOK_ARRIVAL_RADIUS: f32 = 20.0;

/// Fire a special orb toward `aim`. Returns false if the cast was rejected.
pub fn cast_special(state: &mut GameState, aim: Vec2) -> bool {
    if state.is_over() || state.is_grapple() || state.cooldowns.special > 0 || !aim.is_finite() {
        return false;
    }
    let origin = state.player.pos;
    let offset = aim - origin;
    let dist = offset.length();
    if dist <= SPECIAL_MIN_AIM {
        return false;
    }

    if state.special_orbs.len() >= MAX_SPECIAL_ORBS {
        // Oldest orb makes room
        state.special_orbs.remove(0);
    }
    let id = state.next_entity_id();
    state.special_orbs.push(Projectile {
        id,
        kind: ProjectileKind::Special,
        pos: origin,
        vel: offset / dist * SPECIAL_SPEED,
        size: SPECIAL_SIZE,
        damage: SPECIAL_DAMAGE,
        energy: SPECIAL_LIFETIME,
        decay: 1.0,
    });
    state.cooldowns.special = SPECIAL_COOLDOWN;
    state.events.push(GameEvent::AbilityCast {
        ability: Ability::Special,
    });
    true
}

/// Blink toward `aim`, up to [`DASH_RANGE`]. Cancels movement and shooting.
pub fn dash(state: &mut GameState, aim: Vec2) -> bool {
    if state.is_over() || state.cooldowns.dash > 0 || !aim.is_finite() {
        return false;
    }
    let player = &mut state.player;
    let offset = aim - player.pos;
    let dist = offset.length();
    if dist < DASH_MIN_DISTANCE {
        return false;
    }

    let travel = dist.min(DASH_RANGE);
    let landing = player.pos + offset / dist * travel;
    player.pos = clamp_to_arena(landing, DASH_EDGE_INSET);
    player.intent = PlayerIntent::Idle;
    state.cooldowns.dash = DASH_COOLDOWN;
    state.events.push(GameEvent::AbilityCast {
        ability: Ability::Dash,
    });
    true
}

/// Throw the grapple hook toward `aim`. Only one hook flies at a time.
pub fn launch_hook(state: &mut GameState, aim: Vec2) -> bool {
    if state.is_over()
        || !state.is_grapple()
        || state.hook.is_some()
        || state.cooldowns.hook > 0
        || !aim.is_finite()
    {
        return false;
    }
    let origin = state.player.pos;
    let offset = aim - origin;
    let dist = offset.length();
    if dist < HOOK_MIN_AIM {
        return false;
    }

    state.hook = Some(Hook {
        pos: origin,
        origin,
        vel: offset / dist * HOOK_SPEED,
        max_range: HOOK_RANGE,
        phase: HookPhase::Outgoing,
        captured: None,
    });
    state.cooldowns.hook = HOOK_COOLDOWN;
    state.events.push(GameEvent::AbilityCast {
        ability: Ability::Hook,
    });
    true
}

/// Tick every ability cooldown down by one
pub fn update_cooldowns(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    let cooldowns = &mut state.cooldowns;
    cooldowns.special = cooldowns.special.saturating_sub(1);
    cooldowns.dash = cooldowns.dash.saturating_sub(1);
    cooldowns.hook = cooldowns.hook.saturating_sub(1);
}

/// Move orbs; each one is consumed by the first enemy it touches
pub fn update_special_orbs(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    drop_non_finite(&mut state.special_orbs);

    let mut orbs = std::mem::take(&mut state.special_orbs);
    orbs.retain_mut(|orb| {
        orb.step();
        if let Some(index) = enemy_hit(state, orb.pos, orb.size) {
            damage_enemy(state, index, orb.damage);
            return false;
        }
        !orb.is_spent() && !outside_arena(orb.pos, SPECIAL_MARGIN)
    });
    state.special_orbs = orbs;
}

/// Advance the hook state machine
pub fn update_hook(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    let Some(mut hook) = state.hook.take() else {
        return;
    };

    let keep = match hook.phase {
        HookPhase::Outgoing => {
            hook.pos += hook.vel;
            if hook.pos.distance(hook.origin) >= hook.max_range {
                hook.phase = HookPhase::Returning;
            } else if let Some(enemy) = state
                .enemies
                .iter()
                // Newest enemy wins when several are in reach
                .rev()
                .find(|e| hook.pos.distance(e.pos) < e.size + HOOK_CATCH_MARGIN)
            {
                hook.captured = Some(enemy.id);
                hook.phase = HookPhase::Returning;
            }
            true
        }
        HookPhase::Returning => match hook.captured.map(|id| (id, state.enemy_index(id))) {
            Some((id, Some(index))) => {
                let player = state.player.pos;
                let enemy = &mut state.enemies[index];
                let to_player = player - enemy.pos;
                let dist = to_player.length();
                if dist > HOOK_CAPTURE_RADIUS {
                    enemy.pos += to_player / dist * HOOK_SPEED;
                    hook.pos = enemy.pos;
                    true
                } else {
                    log::debug!("Hook delivered enemy {id}");
                    kill_enemy(state, index);
                    false
                }
            }
            Some((id, None)) => {
                // Captured enemy died elsewhere; come back empty
                log::debug!("Hooked enemy {id} vanished");
                hook.captured = None;
                true
            }
            None => {
                let to_player = state.player.pos - hook.pos;
                let dist = to_player.length();
                if dist > HOOK_ARRIVAL_RADIUS {
                    hook.pos += to_player / dist * HOOK_SPEED;
                    true
                } else {
                    false
                }
            }
        },
    };

    if keep {
        state.hook = Some(hook);
    }
}
