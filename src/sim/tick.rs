//! Fixed timestep simulation tick
//!
//! Core game loop that advances the combat session deterministically.
//! Pass order is fixed: player, enemies, spawner, combat, abilities, hook.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::abilities::{cast_special, dash, launch_hook, update_cooldowns, update_hook, update_special_orbs};
use super::combat::{issue_attack, issue_command, update_enemy_bullets, update_player, update_player_bullets};
use super::enemy::update_enemies;
use super::spawn::update_spawner;
use super::state::GameState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Latest pointer position (aims abilities)
    pub pointer: Option<Vec2>,
    /// Move/attack command at a point (right click / tap)
    pub command: Option<Vec2>,
    /// Attack the enemy under the pointer
    pub secondary: bool,
    /// Ability key: special orb, or the hook in grapple mode
    pub ability: bool,
    /// Dash key
    pub dash: bool,
}

impl TickInput {
    /// Clear one-shot inputs after they have been applied
    pub fn clear_one_shots(&mut self) {
        self.command = None;
        self.secondary = false;
        self.ability = false;
        self.dash = false;
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Frozen until restart
    if state.is_over() {
        return;
    }
    state.time_ticks += 1;

    apply_input(state, input);

    update_player(state);
    update_enemies(state);
    update_spawner(state);
    update_player_bullets(state);
    update_enemy_bullets(state);
    update_special_orbs(state);
    update_cooldowns(state);
    update_hook(state);
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    if let Some(pointer) = input.pointer.filter(|p| p.is_finite()) {
        state.pointer = Some(pointer);
    }
    if let Some(point) = input.command {
        issue_command(state, point);
    }

    let Some(pointer) = state.pointer else {
        return;
    };
    if input.secondary {
        issue_attack(state, pointer);
    }
    // One ability slot: the hook replaces the special orb in grapple mode
    if input.ability {
        if state.is_grapple() {
            launch_hook(state, pointer);
        } else {
            cast_special(state, pointer);
        }
    }
    if input.dash {
        dash(state, pointer);
    }
}
