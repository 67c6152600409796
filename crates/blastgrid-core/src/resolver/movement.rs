//! Movement phase: velocity integration with predicted-cell walkability.
//!
//! Movers travel in continuous world space but collide at cell granularity:
//! before applying a step, the destination cell is checked for walkability.
//! A blocked step stops the mover and snaps it back to its cell center.
//! Movement within the current cell is always allowed, which is what lets a
//! player step off a bomb they are standing on.

use glam::Vec2;

use crate::ai;
use crate::config::TuningConfig;
use crate::entity::components::PlayerAbilities;
use crate::entity::{Entity, EntityId, EntityTag};
use crate::grid::{Grid, GridPosition, TILE_SIZE};
use crate::registry::EntityRegistry;

/// Advances all living players by `dt` and keeps the grid index current.
pub(crate) fn advance_players(dt: f32, grid: &mut Grid, registry: &mut EntityRegistry) {
    for id in registry.ids_with_tag(EntityTag::Player) {
        let Some(player) = registry.get_mut(id).and_then(Entity::as_player_mut) else {
            continue;
        };
        if player.dead {
            continue;
        }
        player.update_timers(dt);

        player.transform.velocity = match player.facing {
            Some(direction) => direction.vector() * player.move_speed * TILE_SIZE,
            None => Vec2::ZERO,
        };

        let from = player.grid_position();
        let wall_pass = player.abilities.contains(PlayerAbilities::WALL_PASS);
        let bomb_pass = player.abilities.contains(PlayerAbilities::BOMB_PASS);

        let predicted = player.transform.position + player.transform.velocity * dt;
        let target = GridPosition::from_world(predicted);
        if target == from || grid.is_walkable(target, wall_pass, bomb_pass) {
            player.transform.position = predicted;
        } else {
            player.transform.snap_to_center();
        }

        let to = player.grid_position();
        if to != from {
            grid.move_entity(id, EntityTag::Player, from, to);
        }
    }
}

/// Runs the decision engine and integrates movement for all living enemies.
pub(crate) fn advance_enemies<R: rand::Rng>(
    dt: f32,
    grid: &mut Grid,
    registry: &mut EntityRegistry,
    config: &TuningConfig,
    rng: &mut R,
) {
    // Target snapshot in id order, so decisions never depend on how far
    // through the enemy list we are.
    let players: Vec<(EntityId, Vec2)> = registry
        .ids_with_tag(EntityTag::Player)
        .into_iter()
        .filter_map(|id| {
            registry
                .get(id)
                .and_then(Entity::as_player)
                .filter(|p| !p.dead)
                .map(|p| (id, p.transform.position))
        })
        .collect();

    for id in registry.ids_with_tag(EntityTag::Enemy) {
        let Some(enemy) = registry.get_mut(id).and_then(Entity::as_enemy_mut) else {
            continue;
        };
        if !enemy.alive {
            continue;
        }

        ai::update_enemy(enemy, &players, grid, config, rng, dt);

        let from = enemy.grid_position();
        let predicted = enemy.transform.position + enemy.transform.velocity * dt;
        let target = GridPosition::from_world(predicted);
        if target == from || grid.is_walkable(target, enemy.kind.wall_pass(), false) {
            enemy.transform.position = predicted;
        } else {
            enemy.transform.snap_to_center();
            // Blocked: force a fresh decision on the next tick.
            enemy.direction_timer = 0.0;
        }

        let to = enemy.grid_position();
        if to != from {
            grid.move_entity(id, EntityTag::Enemy, from, to);
        }
    }
}
