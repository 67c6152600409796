//! Enemy decision engine.
//!
//! Decisions run once per tick per living enemy, before movement
//! integration. The chase roll happens every tick, so a high-level enemy
//! re-aims at the nearest living player as it moves. When the roll comes up
//! random instead, the enemy keeps its wandering heading until the
//! direction cooldown expires (or it runs into something, which forces an
//! immediate re-pick on the next tick).
//!
//! The engine only writes the enemy's own state (heading, cooldown,
//! velocity). Integration and collision response live in the resolver.

use glam::Vec2;
use rand::Rng;

use crate::config::TuningConfig;
use crate::entity::components::EnemyState;
use crate::entity::EntityId;
use crate::grid::{Direction, Grid, GridPosition};

/// Probability that a decision chases rather than wanders, by AI level.
///
/// Level 1 never chases; levels above 4 are clamped to the level 4-5 value.
#[must_use]
pub fn chase_probability(ai_level: u8) -> f64 {
    match ai_level {
        0 | 1 => 0.0,
        2 => 0.3,
        3 => 0.5,
        _ => 0.7,
    }
}

/// The nearest living player by straight-line distance.
///
/// `players` is supplied in ascending id order and a strictly closer
/// candidate is required to displace the current best, so distance ties
/// resolve to the lowest id.
#[must_use]
pub(crate) fn nearest_player(from: Vec2, players: &[(EntityId, Vec2)]) -> Option<(EntityId, Vec2)> {
    let mut best: Option<((EntityId, Vec2), f32)> = None;
    for &(id, position) in players {
        let dist = from.distance_squared(position);
        if best.as_ref().map_or(true, |(_, d)| dist < *d) {
            best = Some(((id, position), dist));
        }
    }
    best.map(|(player, _)| player)
}

/// Direction of pursuit from `from` toward `target`, if any is walkable.
///
/// Prefers the axis with the larger absolute offset, horizontal before
/// vertical on ties. Falls back to the other axis if the preferred next
/// cell is blocked; returns `None` when neither works (caller wanders).
#[must_use]
pub(crate) fn chase_direction(
    from: GridPosition,
    target: GridPosition,
    grid: &Grid,
    wall_pass: bool,
) -> Option<Direction> {
    let dx = target.x - from.x;
    let dy = target.y - from.y;

    let horizontal = if dx > 0 {
        Some(Direction::Right)
    } else if dx < 0 {
        Some(Direction::Left)
    } else {
        None
    };
    let vertical = if dy > 0 {
        Some(Direction::Up)
    } else if dy < 0 {
        Some(Direction::Down)
    } else {
        None
    };

    let (first, second) = if dx.abs() >= dy.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };

    [first, second]
        .into_iter()
        .flatten()
        .find(|&d| grid.is_walkable(from.adjacent(d), wall_pass, false))
}

/// A random heading among the currently walkable directions.
fn random_direction<R: Rng>(
    from: GridPosition,
    grid: &Grid,
    wall_pass: bool,
    rng: &mut R,
) -> Option<Direction> {
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| grid.is_walkable(from.adjacent(d), wall_pass, false))
        .collect();
    if open.is_empty() {
        None
    } else {
        Some(open[rng.gen_range(0..open.len())])
    }
}

/// Runs one decision step for a living enemy and refreshes its velocity.
///
/// Dead enemies are the caller's filter; this function assumes a live one.
pub(crate) fn update_enemy<R: Rng>(
    enemy: &mut EnemyState,
    players: &[(EntityId, Vec2)],
    grid: &Grid,
    config: &TuningConfig,
    rng: &mut R,
    dt: f32,
) {
    enemy.direction_timer -= dt;
    let cell = enemy.grid_position();
    let wall_pass = enemy.kind.wall_pass();

    // The chase roll runs every tick; only the random walk is gated by the
    // direction cooldown.
    let chase = nearest_player(enemy.transform.position, players)
        .filter(|_| rng.gen::<f64>() < chase_probability(enemy.ai_level))
        .and_then(|(_, target)| {
            chase_direction(cell, GridPosition::from_world(target), grid, wall_pass)
        });

    if chase.is_some() {
        enemy.direction = chase;
    } else if enemy.direction_timer <= 0.0 || enemy.direction.is_none() {
        enemy.direction = random_direction(cell, grid, wall_pass, rng);

        let jitter = rng.gen_range(0.5..1.5);
        enemy.direction_timer = config.enemy_direction_change_interval * jitter;
    }

    enemy.transform.velocity = match enemy.direction {
        Some(direction) => direction.vector() * enemy.speed(config.enemy_base_speed),
        None => Vec2::ZERO,
    };
}
