//! Contact phase: item pickups and enemy contact damage.

use tracing::debug;

use crate::config::TuningConfig;
use crate::entity::{Entity, EntityTag};
use crate::events::{TickEvent, TickEvents};
use crate::grid::{Grid, Tile};
use crate::registry::EntityRegistry;

/// Collects every item sharing a cell with a living player.
pub(crate) fn resolve_pickups(
    grid: &mut Grid,
    registry: &mut EntityRegistry,
    config: &TuningConfig,
    events: &mut TickEvents,
) {
    for player_id in registry.ids_with_tag(EntityTag::Player) {
        let Some(cell) = registry
            .get(player_id)
            .and_then(Entity::as_player)
            .filter(|p| !p.dead)
            .map(|p| p.grid_position())
        else {
            continue;
        };

        for item_id in grid.ids_at(cell, EntityTag::Item) {
            let kind = registry
                .get_mut(item_id)
                .and_then(Entity::as_item_mut)
                .and_then(|item| item.consume().then_some(item.kind));
            let Some(kind) = kind else {
                continue;
            };
            grid.unregister_entity(item_id, cell);
            registry.despawn(item_id);
            if grid.tile(cell) == Some(Tile::Item) {
                grid.set_tile(Tile::Empty, cell);
            }
            if let Some(player) = registry.get_mut(player_id).and_then(Entity::as_player_mut) {
                player.collect_item(kind, config);
            }
            debug!(player = %player_id, ?kind, "item collected");
            events.push(TickEvent::ItemCollected {
                item: item_id,
                kind,
                player: player_id,
            });
        }
    }
}

/// Damages living players sharing a cell with a living enemy.
///
/// One application per player per tick; a player brushing two enemies loses
/// one life, not two (the invincibility window absorbs the second).
pub(crate) fn resolve_contact_damage(
    grid: &Grid,
    registry: &mut EntityRegistry,
    config: &TuningConfig,
    events: &mut TickEvents,
) {
    for player_id in registry.ids_with_tag(EntityTag::Player) {
        let Some(cell) = registry
            .get(player_id)
            .and_then(Entity::as_player)
            .filter(|p| !p.dead)
            .map(|p| p.grid_position())
        else {
            continue;
        };

        let touching = grid.ids_at(cell, EntityTag::Enemy).into_iter().any(|id| {
            registry
                .get(id)
                .and_then(Entity::as_enemy)
                .is_some_and(|e| e.alive)
        });
        if touching {
            super::damage_player(player_id, registry, config, events);
        }
    }
}
