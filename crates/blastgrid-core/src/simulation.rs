//! Simulation orchestrator.
//!
//! [`Simulation`] owns the grid, the entity registry, the match RNG, and
//! the tuning config. Callers drive it with `start_stage` and `advance`;
//! everything observable comes back as a [`TickEvents`] batch.
//!
//! # Determinism
//!
//! All randomness flows through one `ChaCha8Rng` seeded from the master
//! seed. Given the same seed, the same stage sequence, and the same command
//! script with the same `dt` steps, the event streams are identical.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{Difficulty, StageParams, TuningConfig, ITEM_DROP_WEIGHTS};
use crate::entity::components::{
    BlockState, BombState, EnemyKind, EnemyState, ItemKind, PlayerAbilities, PlayerState,
    Transform,
};
use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::events::{TickEvent, TickEvents};
use crate::grid::{Direction, Grid, GridPosition, Tile};
use crate::registry::EntityRegistry;
use crate::resolver;

/// One player input applied at the start of a tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    /// The commanding player.
    pub player: EntityId,
    /// What they want to do.
    pub action: PlayerAction,
}

/// The actions a player can take.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// Start or keep moving in a direction.
    Move(Direction),
    /// Stop moving.
    Stop,
    /// Place a bomb on the current cell.
    PlaceBomb,
    /// Detonate all of this player's armed remote bombs, oldest first.
    DetonateRemote,
}

/// The complete simulation state for one match.
///
/// # Example
///
/// ```
/// use blastgrid_core::config::Difficulty;
/// use blastgrid_core::simulation::Simulation;
///
/// let mut sim = Simulation::new(42, Difficulty::Normal);
/// sim.start_stage(1);
/// let events = sim.advance(1.0 / 60.0, &[]);
/// assert!(!events.game_over());
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    registry: EntityRegistry,
    rng: ChaCha8Rng,
    config: TuningConfig,
    seed: u64,
    stage: u32,
    stage_params: Option<StageParams>,
    stage_time: f32,
    stage_cleared: bool,
    match_over: bool,
}

impl Simulation {
    /// Creates a simulation for one match. No stage is active until
    /// [`start_stage`](Self::start_stage) is called.
    #[must_use]
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        let config = difficulty.config();
        Self {
            grid: Grid::new(config.columns, config.rows),
            registry: EntityRegistry::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            seed,
            stage: 0,
            stage_params: None,
            stage_time: 0.0,
            stage_cleared: false,
            match_over: false,
        }
    }

    /// Generates and populates a stage.
    ///
    /// The map is regenerated, enemies and blocks are spawned fresh, and
    /// players carry their powerups, lives, and score over. The first call
    /// also creates the player.
    pub fn start_stage(&mut self, stage: u32) {
        let params = StageParams::for_stage(stage, &self.config);
        debug!(
            stage,
            enemies = params.enemy_count,
            ai_level = params.ai_level,
            density = params.soft_block_density,
            "starting stage"
        );

        // Drop everything but the players.
        let players = self.registry.ids_with_tag(EntityTag::Player);
        for id in self.registry.ids_with_tag(EntityTag::Bomb) {
            self.registry.despawn(id);
        }
        for id in self.registry.ids_with_tag(EntityTag::Enemy) {
            self.registry.despawn(id);
        }
        for id in self.registry.ids_with_tag(EntityTag::Item) {
            self.registry.despawn(id);
        }
        for id in self.registry.ids_with_tag(EntityTag::Block) {
            self.registry.despawn(id);
        }

        self.grid
            .generate_standard_map(params.soft_block_density, &mut self.rng);

        // Re-seat carried players on the corner spawns; create the player on
        // the first stage of the match.
        let spawns = self.grid.spawn_points();
        if players.is_empty() {
            let id = self
                .registry
                .spawn(EntityInner::Player(PlayerState::from_config(
                    &self.config,
                    spawns[0],
                )));
            self.grid.register_entity(id, EntityTag::Player, spawns[0]);
        } else {
            for (i, id) in players.iter().enumerate() {
                let cell = spawns[i % spawns.len()];
                if let Some(player) = self.registry.get_mut(*id).and_then(Entity::as_player_mut) {
                    player.transform = Transform::at_cell(cell);
                    player.active_bombs = 0;
                    player.placed_bombs.clear();
                    player.facing = None;
                    player.invincible_remaining = 0.0;
                }
                self.grid.register_entity(*id, EntityTag::Player, cell);
            }
        }

        // Soft-block entities with their drop pre-assigned, so what a block
        // hides is fixed at generation time.
        for x in 0..self.grid.columns() {
            for y in 0..self.grid.rows() {
                let cell = GridPosition::new(x, y);
                if self.grid.tile(cell) != Some(Tile::SoftBlock) {
                    continue;
                }
                let contained = if self.rng.gen::<f64>() < self.config.item_drop_rate {
                    Some(weighted_item_kind(&mut self.rng))
                } else {
                    None
                };
                let id = self
                    .registry
                    .spawn(EntityInner::Block(BlockState::new(cell, contained)));
                self.grid.register_entity(id, EntityTag::Block, cell);
            }
        }

        self.spawn_enemies(&params);

        self.stage = stage;
        self.stage_params = Some(params);
        self.stage_time = 0.0;
        self.stage_cleared = false;
    }

    fn spawn_enemies(&mut self, params: &StageParams) {
        let occupied: Vec<GridPosition> = self
            .registry
            .ids_with_tag(EntityTag::Player)
            .into_iter()
            .filter_map(|id| {
                self.registry
                    .get(id)
                    .and_then(Entity::as_player)
                    .map(PlayerState::grid_position)
            })
            .collect();

        // Free interior cells, away from the border ring the spawns sit on.
        let mut cells: Vec<GridPosition> = Vec::new();
        for x in 2..self.grid.columns() - 2 {
            for y in 2..self.grid.rows() - 2 {
                let cell = GridPosition::new(x, y);
                if self.grid.tile(cell) == Some(Tile::Empty) && !occupied.contains(&cell) {
                    cells.push(cell);
                }
            }
        }
        cells.shuffle(&mut self.rng);

        let pool = EnemyKind::pool_for_stage(params.stage);
        for cell in cells.into_iter().take(params.enemy_count as usize) {
            let kind = pool[self.rng.gen_range(0..pool.len())];
            let id = self.registry.spawn(EntityInner::Enemy(EnemyState::new(
                kind,
                params.ai_level,
                cell,
            )));
            self.grid.register_entity(id, EntityTag::Enemy, cell);
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Commands apply first, then the resolver phases run in their fixed
    /// order, then outcome signals are checked. Calls before the first
    /// stage or after game over are no-ops that return an empty batch.
    pub fn advance(&mut self, dt: f32, commands: &[PlayerCommand]) -> TickEvents {
        let mut events = TickEvents::new();
        if self.match_over || self.stage == 0 {
            return events;
        }

        for command in commands {
            self.apply_command(*command, &mut events);
        }

        resolver::bombs::advance_bombs(
            dt,
            &mut self.grid,
            &mut self.registry,
            &self.config,
            &mut events,
        );
        resolver::movement::advance_players(dt, &mut self.grid, &mut self.registry);
        resolver::movement::advance_enemies(
            dt,
            &mut self.grid,
            &mut self.registry,
            &self.config,
            &mut self.rng,
        );
        resolver::contact::resolve_pickups(
            &mut self.grid,
            &mut self.registry,
            &self.config,
            &mut events,
        );
        resolver::contact::resolve_contact_damage(
            &self.grid,
            &mut self.registry,
            &self.config,
            &mut events,
        );

        self.stage_time += dt;
        self.resolve_outcome(&mut events);
        events
    }

    fn apply_command(&mut self, command: PlayerCommand, events: &mut TickEvents) {
        match command.action {
            PlayerAction::Move(direction) => {
                if let Some(player) = self
                    .registry
                    .get_mut(command.player)
                    .and_then(Entity::as_player_mut)
                    .filter(|p| !p.dead)
                {
                    player.facing = Some(direction);
                }
            }
            PlayerAction::Stop => {
                if let Some(player) = self
                    .registry
                    .get_mut(command.player)
                    .and_then(Entity::as_player_mut)
                {
                    player.facing = None;
                }
            }
            PlayerAction::PlaceBomb => self.place_bomb(command.player, events),
            PlayerAction::DetonateRemote => self.detonate_remote(command.player),
        }
    }

    /// Places a bomb on the player's cell. Silently rejected when the player
    /// is dead or missing, at their concurrent cap, or the cell already
    /// holds a bomb.
    fn place_bomb(&mut self, player_id: EntityId, events: &mut TickEvents) {
        let Some((cell, power, remote)) = self
            .registry
            .get(player_id)
            .and_then(Entity::as_player)
            .filter(|p| p.can_place_bomb())
            .map(|p| {
                (
                    p.grid_position(),
                    p.fire_power,
                    p.abilities.contains(PlayerAbilities::REMOTE_DETONATE),
                )
            })
        else {
            return;
        };
        if self.grid.has_bomb(cell) {
            return;
        }

        let bomb = self.registry.spawn(EntityInner::Bomb(BombState::new(
            Some(player_id),
            power,
            remote,
            self.config.bomb_fuse,
            cell,
        )));
        self.grid.register_entity(bomb, EntityTag::Bomb, cell);
        if let Some(player) = self.registry.get_mut(player_id).and_then(Entity::as_player_mut) {
            player.on_bomb_placed(bomb);
        }
        debug!(player = %player_id, bomb = %bomb, ?cell, power, remote, "bomb placed");
        events.push(TickEvent::BombPlaced {
            bomb,
            owner: player_id,
            cell,
        });
    }

    /// Zeroes the chain countdown on the player's armed remote bombs, so
    /// they detonate in this tick's bomb phase, oldest first.
    fn detonate_remote(&mut self, player_id: EntityId) {
        let placed = match self.registry.get(player_id).and_then(Entity::as_player) {
            Some(player) => player.placed_bombs.clone(),
            None => return,
        };
        for bomb_id in placed {
            if let Some(bomb) = self
                .registry
                .get_mut(bomb_id)
                .and_then(Entity::as_bomb_mut)
                .filter(|b| b.remote)
            {
                bomb.chain_explode(0.0);
            }
        }
    }

    fn resolve_outcome(&mut self, events: &mut TickEvents) {
        let players = self.registry.ids_with_tag(EntityTag::Player);
        let any_alive = players.iter().any(|id| {
            self.registry
                .get(*id)
                .and_then(Entity::as_player)
                .is_some_and(|p| !p.dead)
        });

        if !players.is_empty() && !any_alive {
            self.end_match(events);
            return;
        }

        if let Some(limit) = self.stage_params.as_ref().and_then(|p| p.time_limit) {
            if self.stage_time >= limit {
                debug!(stage = self.stage, "stage time limit expired");
                self.end_match(events);
                return;
            }
        }

        if !self.stage_cleared && self.registry.count_with_tag(EntityTag::Enemy) == 0 {
            self.stage_cleared = true;
            let bonus = self.config.stage_clear_bonus;
            for id in players {
                if let Some(player) = self
                    .registry
                    .get_mut(id)
                    .and_then(Entity::as_player_mut)
                    .filter(|p| !p.dead)
                {
                    player.score += bonus;
                }
            }
            debug!(stage = self.stage, bonus, "stage cleared");
            events.push(TickEvent::StageCleared {
                stage: self.stage,
                bonus,
            });
        }
    }

    fn end_match(&mut self, events: &mut TickEvents) {
        self.match_over = true;
        let score = self.score();
        debug!(score, "game over");
        events.push(TickEvent::GameOver { score });
    }

    /// The arena grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The entity registry.
    #[must_use]
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Mutable access to the grid, for scenario setup.
    ///
    /// Callers editing entities or tiles directly are responsible for
    /// keeping the grid index and the registry coherent.
    #[must_use]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Mutable access to the registry, for scenario setup.
    ///
    /// Callers editing entities or tiles directly are responsible for
    /// keeping the grid index and the registry coherent.
    #[must_use]
    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// The match tuning.
    #[must_use]
    pub const fn config(&self) -> &TuningConfig {
        &self.config
    }

    /// The master seed the match RNG was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The current stage number, 0 before the first stage starts.
    #[must_use]
    pub const fn stage(&self) -> u32 {
        self.stage
    }

    /// Seconds elapsed in the current stage.
    #[must_use]
    pub const fn stage_time(&self) -> f32 {
        self.stage_time
    }

    /// Returns true once the match ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.match_over
    }

    /// Returns true once the current stage's enemies are all dead.
    #[must_use]
    pub const fn stage_cleared(&self) -> bool {
        self.stage_cleared
    }

    /// Player ids in ascending order.
    #[must_use]
    pub fn players(&self) -> Vec<EntityId> {
        self.registry.ids_with_tag(EntityTag::Player)
    }

    /// Total score across all players.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.registry
            .iter()
            .filter_map(Entity::as_player)
            .map(|p| p.score)
            .sum()
    }
}

/// Weighted pick over the fixed-order drop table.
fn weighted_item_kind<R: Rng>(rng: &mut R) -> ItemKind {
    let total: f64 = ITEM_DROP_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen::<f64>() * total;
    for (kind, weight) in ITEM_DROP_WEIGHTS {
        roll -= weight;
        if roll <= 0.0 {
            return kind;
        }
    }
    // Unreachable with positive weights; fall back to the last entry.
    ItemKind::Invincible
}
