//! Game state and core simulation types
//!
//! All state that must be persisted for snapshots/determinism lives here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use super::enemy::{Enemy, EnemyKind};
use super::spawn::Director;
use super::timing::SmiteOutcome;
use crate::consts::*;
use crate::error::ConfigWarning;
use crate::settings::{EnemyToggles, GameMode};

/// Handle to an entity. Resolved against the roster on every use, so a
/// handle to a removed enemy simply resolves to nothing.
pub type EntityId = u32;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended, all updates frozen until restart
    GameOver,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Health reached zero from enemy fire
    Shot,
    /// An enemy touched the player
    Contact,
}

/// What the player is doing. Moving and shooting are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum PlayerIntent {
    #[default]
    Idle,
    /// Walk to a fixed point
    MoveTo(Vec2),
    /// Chase an enemy until it is in range, then attack it
    Follow(EntityId),
    /// Stand and shoot an enemy
    Attack(EntityId),
}

/// The player-controlled entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Facing (radians)
    pub angle: f32,
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub stamina: f32,
    pub max_stamina: f32,
    /// Ticks until the next shot is allowed
    pub shoot_cooldown: u32,
    pub shoot_range: f32,
    pub intent: PlayerIntent,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
            angle: 0.0,
            speed: PLAYER_SPEED,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            stamina: PLAYER_MAX_STAMINA,
            max_stamina: PLAYER_MAX_STAMINA,
            shoot_cooldown: 0,
            shoot_range: PLAYER_SHOOT_RANGE,
            intent: PlayerIntent::Idle,
        }
    }
}

impl Player {
    /// Whether there is enough stamina for a shot
    pub fn can_shoot(&self) -> bool {
        self.stamina >= SHOT_STAMINA_COST
    }

    pub fn in_range(&self, target: Vec2) -> bool {
        self.pos.distance_squared(target) <= self.shoot_range * self.shoot_range
    }
}

/// Projectile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Aimed shot from the player
    Player,
    /// Shot from an enemy
    Enemy,
    /// Special-ability orb
    Special,
}

/// A moving projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub damage: u32,
    /// Remaining energy (or lifetime in ticks for orbs); spent at zero
    pub energy: f32,
    /// Energy lost per tick
    pub decay: f32,
}

impl Projectile {
    /// Advance one tick
    #[inline]
    pub fn step(&mut self) {
        self.pos += self.vel;
        self.energy -= self.decay;
    }

    #[inline]
    pub fn is_spent(&self) -> bool {
        self.energy <= 0.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

/// Hook flight phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookPhase {
    Outgoing,
    Returning,
}

/// Grapple hook in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hook {
    pub pos: Vec2,
    /// Launch point, range is measured from here
    pub origin: Vec2,
    pub vel: Vec2,
    pub max_range: f32,
    pub phase: HookPhase,
    /// Enemy being dragged back
    pub captured: Option<EntityId>,
}

/// Obstacle type tag (affects only presentation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Central,
    Secondary,
}

/// Static axis-aligned rectangle that blocks enemy movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }
}

/// Fixed arena layout
pub fn default_obstacles() -> Vec<Obstacle> {
    let rect = |x: f32, y: f32, w: f32, h: f32, kind| Obstacle {
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
        kind,
    };
    vec![
        rect(350.0, 250.0, 100.0, 100.0, ObstacleKind::Central),
        rect(200.0, 150.0, 60.0, 60.0, ObstacleKind::Secondary),
        rect(550.0, 400.0, 80.0, 50.0, ObstacleKind::Secondary),
    ]
}

/// Cooldown-gated abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    Special,
    Dash,
    Hook,
}

/// Ability cooldown timers (ticks)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub special: u32,
    pub dash: u32,
    pub hook: u32,
}

/// Events emitted by the simulation for the host (audio, effects, HUD)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    EnemyKilled {
        id: EntityId,
        kind: EnemyKind,
        pos: Vec2,
    },
    PlayerHit {
        health: u32,
    },
    SessionEnded {
        cause: EndCause,
        score: u32,
    },
    AbilityCast {
        ability: Ability,
    },
    DifficultyRaised {
        cap: usize,
    },
    SmiteResolved {
        outcome: SmiteOutcome,
    },
    ConfigCorrected { warning: ConfigWarning },
}

/// Enemy under the pointer, for cursor feedback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverInfo {
    pub id: EntityId,
    /// Whether the player could shoot it from where they stand
    pub in_range: bool,
}

/// Complete combat session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session RNG; all randomness in the simulation draws from it
    pub rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Combat or Grapple
    pub mode: GameMode,
    /// Spawnable enemy types
    pub enemy_toggles: EnemyToggles,
    /// Kills
    pub score: u32,
    pub player: Player,
    /// Last known pointer position
    pub pointer: Option<Vec2>,
    /// Active enemies (insertion order)
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Projectile>,
    pub enemy_bullets: Vec<Projectile>,
    pub special_orbs: Vec<Projectile>,
    pub hook: Option<Hook>,
    pub cooldowns: Cooldowns,
    /// Spawn and difficulty scheduler
    pub director: Director,
    pub obstacles: Vec<Obstacle>,
    /// Pending events for the host (not persisted)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new combat session with default settings
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameMode::Combat, EnemyToggles::default())
    }

    /// Create a new session for a mode and enemy set
    pub fn with_config(seed: u64, mode: GameMode, toggles: EnemyToggles) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            phase: GamePhase::Playing,
            mode,
            enemy_toggles: toggles,
            score: 0,
            player: Player::default(),
            pointer: None,
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            special_orbs: Vec::new(),
            hook: None,
            cooldowns: Cooldowns::default(),
            director: Director::default(),
            obstacles: default_obstacles(),
            events: Vec::new(),
            next_id: 1,
        };
        if let Some(warning) = state.enemy_toggles.validate() {
            state.events.push(GameEvent::ConfigCorrected { warning });
        }
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Grapple mode: invulnerable player, hook instead of the special orb
    #[inline]
    pub fn is_grapple(&self) -> bool {
        self.mode == GameMode::Grapple
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Current difficulty scaling from score
    pub fn aggressiveness(&self) -> f32 {
        crate::tuning::aggressiveness(self.score)
    }

    /// Effective roster limit
    pub fn enemy_cap(&self) -> usize {
        self.director.cap.min(MAX_ENEMIES)
    }

    pub fn enemy_index(&self, id: EntityId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Remove an enemy without scoring it
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let index = self.enemy_index(id)?;
        Some(self.enemies.remove(index))
    }

    /// Add an enemy of `kind` at `pos`. Rejected when the roster is full.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> Option<EntityId> {
        if self.enemies.len() >= self.enemy_cap() || !pos.is_finite() {
            log::debug!("Spawn of {kind:?} rejected ({} enemies)", self.enemies.len());
            return None;
        }
        let id = self.next_entity_id();
        let aggressiveness = self.aggressiveness();
        let grapple = self.is_grapple();
        let enemy = Enemy::spawn(id, kind, pos, aggressiveness, grapple, &mut self.rng);
        self.enemies.push(enemy);
        Some(id)
    }

    /// Closest enemy whose body plus `margin` contains `point`
    pub fn enemy_at(&self, point: Vec2, margin: f32) -> Option<EntityId> {
        self.enemies
            .iter()
            .filter(|e| {
                let reach = e.size + margin;
                e.pos.distance_squared(point) <= reach * reach
            })
            .min_by(|a, b| {
                a.pos
                    .distance_squared(point)
                    .total_cmp(&b.pos.distance_squared(point))
            })
            .map(|e| e.id)
    }

    /// Enemy under the pointer, if any
    pub fn hover(&self, pointer: Vec2) -> Option<HoverInfo> {
        let enemy = self
            .enemies
            .iter()
            .find(|e| e.pos.distance(pointer) <= e.size + HOVER_MARGIN)?;
        Some(HoverInfo {
            id: enemy.id,
            in_range: self.player.in_range(enemy.pos),
        })
    }

    /// Whether an enemy is touching the player
    pub fn touches_player(&self, enemy: &Enemy) -> bool {
        circles_overlap(
            self.player.pos,
            PLAYER_SIZE - CONTACT_TOLERANCE,
            enemy.pos,
            enemy.size,
        )
    }

    /// Freeze the session
    pub fn end_session(&mut self, cause: EndCause) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.player.intent = PlayerIntent::Idle;
        log::info!("Session over ({cause:?}) with score {}", self.score);
        self.events.push(GameEvent::SessionEnded {
            cause,
            score: self.score,
        });
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
