//! Scenario setup utilities shared by the determinism and integration tests.

use crate::config::Difficulty;
use crate::entity::components::{EnemyKind, EnemyState};
use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::events::TickEvent;
use crate::grid::{GridPosition, Tile};
use crate::simulation::{PlayerAction, PlayerCommand, Simulation};

/// The fixed step the tests tick with (60 Hz).
pub const DT: f32 = 1.0 / 60.0;

/// A started Normal-difficulty match on stage 1.
pub fn new_sim(seed: u64) -> Simulation {
    let mut sim = Simulation::new(seed, Difficulty::Normal);
    sim.start_stage(1);
    sim
}

/// The (single) player of a test match.
pub fn the_player(sim: &Simulation) -> EntityId {
    sim.players()[0]
}

/// Strips a started stage down to an empty floor inside the border.
///
/// Despawns every enemy, block, item, and bomb, and clears every interior
/// tile, leaving only the player. Tests then place exactly what the
/// scenario needs.
pub fn open_arena(sim: &mut Simulation) {
    let mut doomed: Vec<(EntityId, GridPosition)> = Vec::new();
    for entity in sim.registry().iter() {
        let cell = match entity.inner() {
            EntityInner::Enemy(e) => e.grid_position(),
            EntityInner::Bomb(b) => b.cell,
            EntityInner::Item(i) => i.cell,
            EntityInner::Block(b) => b.cell,
            EntityInner::Player(_) => continue,
        };
        doomed.push((entity.id(), cell));
    }
    for (id, cell) in doomed {
        sim.grid_mut().unregister_entity(id, cell);
        sim.registry_mut().despawn(id);
    }

    let (columns, rows) = (sim.grid().columns(), sim.grid().rows());
    for x in 1..columns - 1 {
        for y in 1..rows - 1 {
            sim.grid_mut().set_tile(Tile::Empty, GridPosition::new(x, y));
        }
    }
}

/// Spawns a pinned-down slow enemy for blast scenarios.
///
/// AI level 1 never chases, so over the couple of ticks these scenarios
/// run the enemy stays in its cell.
pub fn spawn_enemy_at(sim: &mut Simulation, kind: EnemyKind, cell: GridPosition) -> EntityId {
    let id = sim
        .registry_mut()
        .spawn(EntityInner::Enemy(EnemyState::new(kind, 1, cell)));
    sim.grid_mut().register_entity(id, EntityTag::Enemy, cell);
    id
}

/// Shorthand for a one-player command slice.
pub fn cmd(player: EntityId, action: PlayerAction) -> [PlayerCommand; 1] {
    [PlayerCommand { player, action }]
}

/// Advances `ticks` steps with no input and returns every event raised.
pub fn run_idle(sim: &mut Simulation, ticks: u32) -> Vec<TickEvent> {
    let mut all = Vec::new();
    for _ in 0..ticks {
        all.extend(sim.advance(DT, &[]));
    }
    all
}

/// Advances until `ticks` have passed or an event matches `predicate`.
///
/// Returns the matching event, if one occurred.
pub fn run_until(
    sim: &mut Simulation,
    ticks: u32,
    predicate: impl Fn(&TickEvent) -> bool,
) -> Option<TickEvent> {
    for _ in 0..ticks {
        let events = sim.advance(DT, &[]);
        let found = events.iter().find(|e| predicate(e)).cloned();
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Current lives of a player, panicking if the entity is gone.
pub fn lives_of(sim: &Simulation, player: EntityId) -> u32 {
    sim.registry()
        .get(player)
        .and_then(Entity::as_player)
        .map(|p| p.lives)
        .expect("player entity missing")
}
