//! Collision tests between circles, obstacles and the arena
//!
//! Everything here is overlap-only; no response vectors are needed since
//! projectiles are consumed on hit and enemies route around obstacles.

use glam::Vec2;

use super::state::Obstacle;
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Whether two circles overlap (strictly).
///
/// An axis-aligned rejection runs before the squared-distance test so that
/// far-apart pairs cost two subtractions.
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    if dx.abs() > r || dy.abs() > r {
        return false;
    }
    dx * dx + dy * dy < r * r
}

/// Whether a circle overlaps an axis-aligned rectangle
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Obstacle) -> bool {
    let closest = center.clamp(rect.min(), rect.max());
    center.distance_squared(closest) < radius * radius
}

/// Whether a circle at `pos` would overlap any obstacle
pub fn blocked_by_obstacles(pos: Vec2, radius: f32, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|o| circle_rect_overlap(pos, radius, o))
}

/// Whether a point has left the arena by more than `margin`
#[inline]
pub fn outside_arena(pos: Vec2, margin: f32) -> bool {
    pos.x < -margin || pos.x > ARENA_WIDTH + margin || pos.y < -margin || pos.y > ARENA_HEIGHT + margin
}
