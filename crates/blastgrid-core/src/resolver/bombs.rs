//! Bomb lifecycle phase: fuse advancement and detonation consequences.

use tracing::debug;

use crate::blast::Explosion;
use crate::config::TuningConfig;
use crate::entity::components::ItemState;
use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::events::{TickEvent, TickEvents};
use crate::grid::{Grid, GridPosition, Tile};
use crate::registry::EntityRegistry;

/// Advances every bomb by `dt` and processes fresh detonations in id
/// (placement) order.
///
/// Chain-triggered bombs only get a countdown here; they detonate on a
/// later tick when that countdown expires, so a chain propagates one hop
/// per countdown rather than flooding a whole field of bombs at once.
pub(crate) fn advance_bombs(
    dt: f32,
    grid: &mut Grid,
    registry: &mut EntityRegistry,
    config: &TuningConfig,
    events: &mut TickEvents,
) {
    let mut detonating = Vec::new();
    for id in registry.ids_with_tag(EntityTag::Bomb) {
        if let Some(bomb) = registry.get_mut(id).and_then(Entity::as_bomb_mut) {
            if bomb.update(dt) && bomb.explode() {
                detonating.push(id);
            }
        }
    }

    for id in detonating {
        detonate(id, grid, registry, config, events);
    }
}

/// Applies one detonation's consequences.
///
/// The blast is computed against the grid as it stands when this bomb's
/// turn comes, so an earlier detonation this tick that opened a wall lets a
/// later one reach further.
fn detonate(
    bomb_id: EntityId,
    grid: &mut Grid,
    registry: &mut EntityRegistry,
    config: &TuningConfig,
    events: &mut TickEvents,
) {
    let Some((cell, power, owner)) = registry
        .get(bomb_id)
        .and_then(Entity::as_bomb)
        .map(|b| (b.cell, b.power, b.owner))
    else {
        return;
    };
    debug!(bomb = %bomb_id, ?cell, power, "bomb detonated");

    if let Some(owner_id) = owner {
        if let Some(player) = registry.get_mut(owner_id).and_then(Entity::as_player_mut) {
            player.on_bomb_exploded(bomb_id);
        }
    }
    grid.unregister_entity(bomb_id, cell);
    registry.despawn(bomb_id);

    let explosion = Explosion::at(cell, power, grid);
    events.push(TickEvent::BombExploded {
        bomb: bomb_id,
        center: cell,
        affected: explosion.affected.clone(),
    });

    // Only items already on the ground burn; drops revealed by this
    // detonation's own block pass are spared, so the snapshot comes first.
    let exposed: Vec<(GridPosition, Vec<EntityId>)> = explosion
        .affected
        .iter()
        .map(|&pos| (pos, grid.ids_at(pos, EntityTag::Item)))
        .collect();

    for &pos in &explosion.affected {
        destroy_soft_block(pos, grid, registry, events);
    }
    for &pos in &explosion.affected {
        chain_trigger(pos, grid, registry, config);
    }
    for &pos in &explosion.affected {
        for player_id in grid.ids_at(pos, EntityTag::Player) {
            super::damage_player(player_id, registry, config, events);
        }
    }
    for &pos in &explosion.affected {
        kill_enemies(pos, owner, grid, registry, events);
    }
    for (pos, items) in exposed {
        burn_items(pos, &items, grid, registry, events);
    }
}

/// Destroys the soft block at `pos`, if any, revealing its contained item.
fn destroy_soft_block(
    pos: GridPosition,
    grid: &mut Grid,
    registry: &mut EntityRegistry,
    events: &mut TickEvents,
) {
    if grid.tile(pos) != Some(Tile::SoftBlock) {
        return;
    }
    let mut revealed = None;
    for block_id in grid.ids_at(pos, EntityTag::Block) {
        let destroyed = registry
            .get_mut(block_id)
            .and_then(Entity::as_block_mut)
            .map(|block| (block.destroy(), block.contained_item));
        if let Some((true, contained)) = destroyed {
            revealed = contained;
            grid.unregister_entity(block_id, pos);
            registry.despawn(block_id);
        }
    }

    events.push(TickEvent::BlockDestroyed {
        cell: pos,
        revealed,
    });

    if let Some(kind) = revealed {
        let item = registry.spawn(EntityInner::Item(ItemState::new(kind, pos)));
        grid.register_entity(item, EntityTag::Item, pos);
        grid.set_tile(Tile::Item, pos);
        events.push(TickEvent::ItemSpawned {
            item,
            kind,
            cell: pos,
        });
    } else {
        grid.set_tile(Tile::Empty, pos);
    }
}

/// Starts the chain countdown on armed bombs at `pos`.
fn chain_trigger(
    pos: GridPosition,
    grid: &Grid,
    registry: &mut EntityRegistry,
    config: &TuningConfig,
) {
    for bomb_id in grid.ids_at(pos, EntityTag::Bomb) {
        if let Some(bomb) = registry.get_mut(bomb_id).and_then(Entity::as_bomb_mut) {
            bomb.chain_explode(config.chain_explosion_delay);
        }
    }
}

/// Kills living enemies at `pos`, crediting the bomb owner with the score.
fn kill_enemies(
    pos: GridPosition,
    owner: Option<EntityId>,
    grid: &mut Grid,
    registry: &mut EntityRegistry,
    events: &mut TickEvents,
) {
    for enemy_id in grid.ids_at(pos, EntityTag::Enemy) {
        let killed = registry
            .get_mut(enemy_id)
            .and_then(Entity::as_enemy_mut)
            .and_then(|enemy| enemy.kill().then_some(enemy.kind));
        let Some(kind) = killed else {
            continue;
        };
        grid.unregister_entity(enemy_id, pos);
        registry.despawn(enemy_id);

        let score = kind.score_value();
        if let Some(player) = owner.and_then(|id| {
            registry.get_mut(id).and_then(Entity::as_player_mut)
        }) {
            player.score += score;
        }
        debug!(enemy = %enemy_id, ?kind, score, "enemy killed by blast");
        events.push(TickEvent::EnemyKilled {
            enemy: enemy_id,
            kind,
            cell: pos,
            score,
        });
    }
}

/// Burns the uncollected items in `item_ids` at `pos`.
fn burn_items(
    pos: GridPosition,
    item_ids: &[EntityId],
    grid: &mut Grid,
    registry: &mut EntityRegistry,
    events: &mut TickEvents,
) {
    for &item_id in item_ids {
        let consumed = registry
            .get_mut(item_id)
            .and_then(Entity::as_item_mut)
            .map(ItemState::consume);
        if consumed != Some(true) {
            continue;
        }
        grid.unregister_entity(item_id, pos);
        registry.despawn(item_id);
        if grid.tile(pos) == Some(Tile::Item) {
            grid.set_tile(Tile::Empty, pos);
        }
        events.push(TickEvent::ItemDestroyed {
            item: item_id,
            cell: pos,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::components::{
        BlockState, BombState, EnemyKind, EnemyState, ItemKind, PlayerState,
    };

    fn setup() -> (Grid, EntityRegistry, TuningConfig, TickEvents) {
        (
            Grid::new(13, 11),
            EntityRegistry::new(),
            TuningConfig::default(),
            TickEvents::new(),
        )
    }

    fn place_bomb(
        grid: &mut Grid,
        registry: &mut EntityRegistry,
        owner: Option<EntityId>,
        power: u32,
        fuse: f32,
        cell: GridPosition,
    ) -> EntityId {
        let id = registry.spawn(EntityInner::Bomb(BombState::new(
            owner, power, false, fuse, cell,
        )));
        grid.register_entity(id, EntityTag::Bomb, cell);
        id
    }

    #[test]
    fn fuse_expiry_detonates_and_despawns() {
        let (mut grid, mut registry, config, mut events) = setup();
        let cell = GridPosition::new(5, 5);
        let bomb = place_bomb(&mut grid, &mut registry, None, 1, 0.5, cell);

        advance_bombs(0.3, &mut grid, &mut registry, &config, &mut events);
        assert!(registry.contains(bomb));
        assert!(events.is_empty());

        advance_bombs(0.3, &mut grid, &mut registry, &config, &mut events);
        assert!(!registry.contains(bomb));
        assert!(!grid.has_bomb(cell));
        assert!(matches!(
            events.as_slice()[0],
            TickEvent::BombExploded { center, .. } if center == cell
        ));
    }

    #[test]
    fn detonation_frees_the_owner_slot() {
        let (mut grid, mut registry, config, mut events) = setup();
        let owner = registry.spawn(EntityInner::Player(PlayerState::from_config(
            &config,
            GridPosition::new(1, 1),
        )));
        grid.register_entity(owner, EntityTag::Player, GridPosition::new(1, 1));

        let bomb = place_bomb(
            &mut grid,
            &mut registry,
            Some(owner),
            1,
            0.1,
            GridPosition::new(5, 5),
        );
        if let Some(player) = registry.get_mut(owner).and_then(Entity::as_player_mut) {
            player.on_bomb_placed(bomb);
        }

        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);
        let player = registry.get(owner).and_then(Entity::as_player).unwrap();
        assert_eq!(player.active_bombs, 0);
        assert!(player.placed_bombs.is_empty());
    }

    #[test]
    fn soft_block_destruction_reveals_the_contained_item() {
        let (mut grid, mut registry, config, mut events) = setup();
        let block_cell = GridPosition::new(6, 5);
        grid.set_tile(Tile::SoftBlock, block_cell);
        let block = registry.spawn(EntityInner::Block(BlockState::new(
            block_cell,
            Some(ItemKind::FireUp),
        )));
        grid.register_entity(block, EntityTag::Block, block_cell);

        place_bomb(&mut grid, &mut registry, None, 1, 0.1, GridPosition::new(5, 5));
        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);

        assert!(!registry.contains(block));
        assert_eq!(grid.tile(block_cell), Some(Tile::Item));
        assert_eq!(grid.ids_at(block_cell, EntityTag::Item).len(), 1);
        assert!(events.iter().any(|e| matches!(
            e,
            TickEvent::BlockDestroyed { revealed: Some(ItemKind::FireUp), .. }
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, TickEvent::ItemSpawned { .. })));
    }

    #[test]
    fn empty_soft_block_leaves_an_empty_cell() {
        let (mut grid, mut registry, config, mut events) = setup();
        let block_cell = GridPosition::new(6, 5);
        grid.set_tile(Tile::SoftBlock, block_cell);
        let block = registry.spawn(EntityInner::Block(BlockState::new(block_cell, None)));
        grid.register_entity(block, EntityTag::Block, block_cell);

        place_bomb(&mut grid, &mut registry, None, 1, 0.1, GridPosition::new(5, 5));
        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);

        assert_eq!(grid.tile(block_cell), Some(Tile::Empty));
        assert!(!events.iter().any(|e| matches!(e, TickEvent::ItemSpawned { .. })));
    }

    #[test]
    fn neighbor_bomb_gets_a_chain_countdown_not_an_instant_detonation() {
        let (mut grid, mut registry, config, mut events) = setup();
        let first = place_bomb(&mut grid, &mut registry, None, 2, 0.1, GridPosition::new(5, 5));
        let second = place_bomb(&mut grid, &mut registry, None, 2, 30.0, GridPosition::new(6, 5));

        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);
        assert!(!registry.contains(first));
        let chained = registry.get(second).and_then(Entity::as_bomb).unwrap();
        assert!(chained.is_armed());
        assert_eq!(chained.chain_delay, Some(config.chain_explosion_delay));

        // The countdown expires on a later tick.
        advance_bombs(
            config.chain_explosion_delay,
            &mut grid,
            &mut registry,
            &config,
            &mut events,
        );
        assert!(!registry.contains(second));
    }

    #[test]
    fn blast_kills_enemies_and_credits_the_owner() {
        let (mut grid, mut registry, config, mut events) = setup();
        let owner = registry.spawn(EntityInner::Player(PlayerState::from_config(
            &config,
            GridPosition::new(1, 1),
        )));
        grid.register_entity(owner, EntityTag::Player, GridPosition::new(1, 1));

        let enemy_cell = GridPosition::new(6, 5);
        let enemy = registry.spawn(EntityInner::Enemy(EnemyState::new(
            EnemyKind::Dahl,
            2,
            enemy_cell,
        )));
        grid.register_entity(enemy, EntityTag::Enemy, enemy_cell);

        place_bomb(
            &mut grid,
            &mut registry,
            Some(owner),
            2,
            0.1,
            GridPosition::new(5, 5),
        );
        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);

        assert!(!registry.contains(enemy));
        assert_eq!(
            registry.get(owner).and_then(Entity::as_player).map(|p| p.score),
            Some(EnemyKind::Dahl.score_value())
        );
        assert!(events.iter().any(|e| matches!(
            e,
            TickEvent::EnemyKilled { kind: EnemyKind::Dahl, .. }
        )));
    }

    #[test]
    fn blast_damages_a_player_once_per_tick() {
        let (mut grid, mut registry, config, mut events) = setup();
        let cell = GridPosition::new(5, 5);
        let player = registry.spawn(EntityInner::Player(PlayerState::from_config(
            &config, cell,
        )));
        grid.register_entity(player, EntityTag::Player, cell);

        // Two bombs whose blasts both cover the player's cell.
        place_bomb(&mut grid, &mut registry, None, 2, 0.1, GridPosition::new(4, 5));
        place_bomb(&mut grid, &mut registry, None, 2, 0.1, GridPosition::new(6, 5));
        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);

        let state = registry.get(player).and_then(Entity::as_player).unwrap();
        assert_eq!(state.lives, config.initial_lives - 1);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, TickEvent::PlayerDamaged { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn blast_burns_uncollected_items() {
        let (mut grid, mut registry, config, mut events) = setup();
        let item_cell = GridPosition::new(6, 5);
        grid.set_tile(Tile::Item, item_cell);
        let item = registry.spawn(EntityInner::Item(ItemState::new(
            ItemKind::SpeedUp,
            item_cell,
        )));
        grid.register_entity(item, EntityTag::Item, item_cell);

        place_bomb(&mut grid, &mut registry, None, 2, 0.1, GridPosition::new(5, 5));
        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);

        assert!(!registry.contains(item));
        assert_eq!(grid.tile(item_cell), Some(Tile::Empty));
        assert!(events
            .iter()
            .any(|e| matches!(e, TickEvent::ItemDestroyed { .. })));
    }

    #[test]
    fn revealed_items_outlive_the_blast_that_exposed_them() {
        let (mut grid, mut registry, config, mut events) = setup();
        // A drop hidden in a block at one end of the blast, a loose item
        // at the other.
        let block_cell = GridPosition::new(6, 5);
        grid.set_tile(Tile::SoftBlock, block_cell);
        let block = registry.spawn(EntityInner::Block(BlockState::new(
            block_cell,
            Some(ItemKind::RemoteControl),
        )));
        grid.register_entity(block, EntityTag::Block, block_cell);

        let loose_cell = GridPosition::new(4, 5);
        grid.set_tile(Tile::Item, loose_cell);
        let loose = registry.spawn(EntityInner::Item(ItemState::new(
            ItemKind::BombUp,
            loose_cell,
        )));
        grid.register_entity(loose, EntityTag::Item, loose_cell);

        place_bomb(&mut grid, &mut registry, None, 2, 0.1, GridPosition::new(5, 5));
        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);

        // The loose item burned; the freshly revealed one is on the ground.
        assert!(!registry.contains(loose));
        assert_eq!(grid.tile(loose_cell), Some(Tile::Empty));
        let revealed = grid.ids_at(block_cell, EntityTag::Item);
        assert_eq!(revealed.len(), 1);
        assert!(registry.contains(revealed[0]));
        assert_eq!(grid.tile(block_cell), Some(Tile::Item));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, TickEvent::ItemDestroyed { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn simultaneous_expiries_detonate_in_placement_order() {
        let (mut grid, mut registry, config, mut events) = setup();
        let first = place_bomb(&mut grid, &mut registry, None, 1, 0.1, GridPosition::new(3, 3));
        let second = place_bomb(&mut grid, &mut registry, None, 1, 0.1, GridPosition::new(9, 7));

        advance_bombs(0.2, &mut grid, &mut registry, &config, &mut events);

        let exploded: Vec<EntityId> = events
            .iter()
            .filter_map(|e| match e {
                TickEvent::BombExploded { bomb, .. } => Some(*bomb),
                _ => None,
            })
            .collect();
        assert_eq!(exploded, vec![first, second]);
    }
}
