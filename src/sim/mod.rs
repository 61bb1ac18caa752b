//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (cooldowns and durations in ticks)
//! - Seeded RNG only
//! - Stable iteration order (roster insertion order)
//! - No rendering or platform dependencies

pub mod abilities;
pub mod collision;
pub mod combat;
pub mod enemy;
pub mod scheduler;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timing;

pub use abilities::{cast_special, dash, launch_hook};
pub use collision::{blocked_by_obstacles, circle_rect_overlap, circles_overlap, outside_arena};
pub use combat::{issue_attack, issue_command};
pub use enemy::{Behavior, Enemy, EnemyKind, Weapon};
pub use scheduler::FixedStep;
pub use spawn::{Director, choose_kind};
pub use state::{
    Ability, Cooldowns, EndCause, EntityId, GameEvent, GamePhase, GameState, Hook, HookPhase,
    HoverInfo, Obstacle, ObstacleKind, Player, PlayerIntent, Projectile, ProjectileKind,
};
pub use tick::{TickInput, tick};
pub use timing::{SmiteOutcome, TimingPhase, TimingState, judge_smite};
