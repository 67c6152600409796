//! Per-variant entity state.
//!
//! Each entity variant carries one concrete state struct. These structs hold
//! data plus the small local state machines the resolver drives: bomb fuses
//! and chain delays, player damage and item effects, enemy death, block
//! destruction. Anything that needs the grid or other entities lives in the
//! resolver, not here.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::config::TuningConfig;
use crate::grid::{Direction, GridPosition};

// =============================================================================
// Transform
// =============================================================================

/// Continuous position and velocity in world units.
///
/// Movers (players, enemies) travel in world space and are snapped to cells
/// only for grid queries. Velocity is world units per second.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World-space position.
    pub position: Vec2,
    /// World-space velocity.
    pub velocity: Vec2,
}

impl Transform {
    /// Creates a stationary transform at the center of `cell`.
    #[must_use]
    pub fn at_cell(cell: GridPosition) -> Self {
        Self {
            position: cell.to_world(),
            velocity: Vec2::ZERO,
        }
    }

    /// The cell currently containing this transform.
    #[must_use]
    pub fn grid_position(&self) -> GridPosition {
        GridPosition::from_world(self.position)
    }

    /// Stops and recenters on the current cell.
    pub fn snap_to_center(&mut self) {
        self.velocity = Vec2::ZERO;
        self.position = self.grid_position().to_world();
    }
}

// =============================================================================
// Player
// =============================================================================

bitflags! {
    /// Persistent player capabilities granted by items.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PlayerAbilities: u8 {
        /// Bombs no longer burn a fuse; they wait for the detonate command.
        const REMOTE_DETONATE = 1 << 0;
        /// Soft blocks become walkable.
        const WALL_PASS = 1 << 1;
        /// Bombs become walkable.
        const BOMB_PASS = 1 << 2;
    }
}

/// Outcome of applying one hit to a player.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invincible or already dead; nothing happened.
    Ignored,
    /// Lost a life, still alive, post-hit invincibility started.
    Hit,
    /// Lost the last life.
    Fatal,
}

/// Player state: movement, abilities, bomb budget, lives, score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// World-space transform.
    pub transform: Transform,
    /// Movement speed in tiles per second.
    pub move_speed: f32,
    /// Concurrent bomb cap.
    pub max_bombs: u32,
    /// Bombs currently placed and not yet exploded.
    pub active_bombs: u32,
    /// Blast radius applied to newly placed bombs.
    pub fire_power: u32,
    /// Remaining lives.
    pub lives: u32,
    /// Persistent capability flags.
    pub abilities: PlayerAbilities,
    /// Seconds of invincibility remaining (0 when vulnerable).
    pub invincible_remaining: f32,
    /// Set on the fatal hit; a dead player is inert.
    pub dead: bool,
    /// Accumulated score.
    pub score: u64,
    /// Ids of this player's unexploded bombs, in placement order.
    pub placed_bombs: Vec<EntityId>,
    /// Current movement intent, `None` when stopped.
    pub facing: Option<Direction>,
}

impl PlayerState {
    /// Creates a player at the center of `cell` with the configured
    /// starting stats.
    #[must_use]
    pub fn from_config(config: &TuningConfig, cell: GridPosition) -> Self {
        Self {
            transform: Transform::at_cell(cell),
            move_speed: config.player_base_speed,
            max_bombs: config.initial_bomb_count,
            active_bombs: 0,
            fire_power: config.initial_fire_power,
            lives: config.initial_lives,
            abilities: PlayerAbilities::empty(),
            invincible_remaining: 0.0,
            dead: false,
            score: 0,
            placed_bombs: Vec::new(),
            facing: None,
        }
    }

    /// The cell currently containing the player.
    #[must_use]
    pub fn grid_position(&self) -> GridPosition {
        self.transform.grid_position()
    }

    /// Returns true while any invincibility window is active.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.invincible_remaining > 0.0
    }

    /// Returns true if another bomb may be placed right now.
    #[must_use]
    pub fn can_place_bomb(&self) -> bool {
        !self.dead && self.active_bombs < self.max_bombs
    }

    /// Records a newly placed bomb.
    pub fn on_bomb_placed(&mut self, bomb: EntityId) {
        self.active_bombs += 1;
        self.placed_bombs.push(bomb);
    }

    /// Releases a bomb slot after the bomb exploded. Unknown ids are no-ops.
    pub fn on_bomb_exploded(&mut self, bomb: EntityId) {
        if let Some(idx) = self.placed_bombs.iter().position(|&b| b == bomb) {
            self.placed_bombs.remove(idx);
            self.active_bombs = self.active_bombs.saturating_sub(1);
        }
    }

    /// Applies one item effect, respecting the configured caps.
    pub fn collect_item(&mut self, kind: ItemKind, config: &TuningConfig) {
        match kind {
            ItemKind::FireUp => {
                self.fire_power = (self.fire_power + 1).min(config.max_fire_power);
            }
            ItemKind::BombUp => {
                self.max_bombs = (self.max_bombs + 1).min(config.max_bomb_count);
            }
            ItemKind::SpeedUp => {
                self.move_speed =
                    (self.move_speed + config.speed_up_increment).min(config.player_max_speed);
            }
            ItemKind::RemoteControl => {
                self.abilities.insert(PlayerAbilities::REMOTE_DETONATE);
            }
            ItemKind::WallPass => {
                self.abilities.insert(PlayerAbilities::WALL_PASS);
            }
            ItemKind::BombPass => {
                self.abilities.insert(PlayerAbilities::BOMB_PASS);
            }
            ItemKind::Invincible => {
                self.invincible_remaining =
                    self.invincible_remaining.max(config.invincibility_duration);
            }
        }
    }

    /// Applies one hit.
    ///
    /// At most one life is lost per tick: the first hit starts the post-hit
    /// invincibility window, so further hits in the same tick (a second blast
    /// ray, enemy contact after a blast) report [`DamageOutcome::Ignored`].
    pub fn take_damage(&mut self, config: &TuningConfig) -> DamageOutcome {
        if self.dead || self.is_invincible() {
            return DamageOutcome::Ignored;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.dead = true;
            self.transform.velocity = Vec2::ZERO;
            self.facing = None;
            DamageOutcome::Fatal
        } else {
            self.invincible_remaining = config.post_hit_invincibility;
            DamageOutcome::Hit
        }
    }

    /// Advances the invincibility timer.
    pub fn update_timers(&mut self, dt: f32) {
        if self.invincible_remaining > 0.0 {
            self.invincible_remaining = (self.invincible_remaining - dt).max(0.0);
        }
    }
}

// =============================================================================
// Enemy
// =============================================================================

/// Enemy species. Kind fixes speed, wall-pass, and score value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Slow wanderer.
    Balloon,
    /// Baseline enemy.
    Onil,
    /// Fast wanderer.
    Dahl,
    /// Wall-passing stalker.
    Minvo,
    /// Fast wall-passing stalker.
    Ovape,
}

impl EnemyKind {
    /// Multiplier applied to the stage's base enemy speed.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Balloon => 0.8,
            Self::Onil | Self::Minvo => 1.0,
            Self::Dahl => 1.3,
            Self::Ovape => 1.5,
        }
    }

    /// Whether this kind walks through soft blocks.
    #[must_use]
    pub const fn wall_pass(self) -> bool {
        matches!(self, Self::Minvo | Self::Ovape)
    }

    /// Score awarded for a kill.
    #[must_use]
    pub const fn score_value(self) -> u64 {
        match self {
            Self::Balloon => 100,
            Self::Onil => 200,
            Self::Dahl => 400,
            Self::Minvo => 800,
            Self::Ovape => 1000,
        }
    }

    /// The kinds eligible to spawn on a given stage. The pool widens as the
    /// stages progress.
    #[must_use]
    pub const fn pool_for_stage(stage: u32) -> &'static [Self] {
        match stage {
            0..=2 => &[Self::Balloon],
            3..=4 => &[Self::Balloon, Self::Onil],
            5..=6 => &[Self::Balloon, Self::Onil, Self::Dahl],
            7..=8 => &[Self::Onil, Self::Dahl, Self::Minvo],
            _ => &[Self::Balloon, Self::Onil, Self::Dahl, Self::Minvo, Self::Ovape],
        }
    }
}

/// Enemy state: species, AI level, transform, direction cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    /// Species.
    pub kind: EnemyKind,
    /// Decision aggressiveness, 1 (never chases) through 5.
    pub ai_level: u8,
    /// World-space transform.
    pub transform: Transform,
    /// Current heading, `None` before the first decision.
    pub direction: Option<Direction>,
    /// Seconds until the next free direction change. Forced to zero when
    /// the enemy runs into something.
    pub direction_timer: f32,
    /// Cleared by a blast kill.
    pub alive: bool,
}

impl EnemyState {
    /// Creates an enemy at the center of `cell`.
    #[must_use]
    pub fn new(kind: EnemyKind, ai_level: u8, cell: GridPosition) -> Self {
        Self {
            kind,
            ai_level,
            transform: Transform::at_cell(cell),
            direction: None,
            direction_timer: 0.0,
            alive: true,
        }
    }

    /// The cell currently containing the enemy.
    #[must_use]
    pub fn grid_position(&self) -> GridPosition {
        self.transform.grid_position()
    }

    /// Movement speed in world units per second.
    #[must_use]
    pub fn speed(&self, base_tiles_per_second: f32) -> f32 {
        base_tiles_per_second * self.kind.speed_multiplier() * crate::grid::TILE_SIZE
    }

    /// Marks the enemy dead. Returns true on the first transition only.
    pub fn kill(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.transform.velocity = Vec2::ZERO;
        true
    }
}

// =============================================================================
// Bomb
// =============================================================================

/// Bomb state machine: armed, then exploded, never back.
///
/// Power is frozen at placement; a fire-up collected while a bomb ticks does
/// not retroactively grow its blast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BombState {
    /// Owner id, looked up on use; despawned owners degrade to no-ops.
    pub owner: Option<EntityId>,
    /// Blast radius in cells.
    pub power: u32,
    /// Remote bombs skip fuse decay and wait for the detonate command.
    pub remote: bool,
    /// Seconds until self-detonation (untouched while `remote`).
    pub fuse: f32,
    /// Pending chain countdown, set when a neighboring blast reaches this
    /// bomb (or on the remote detonate command).
    pub chain_delay: Option<f32>,
    /// Terminal flag; transitions at most once.
    pub exploded: bool,
    /// Cell the bomb occupies. Bombs never move.
    pub cell: GridPosition,
}

impl BombState {
    /// Creates an armed bomb.
    #[must_use]
    pub const fn new(
        owner: Option<EntityId>,
        power: u32,
        remote: bool,
        fuse: f32,
        cell: GridPosition,
    ) -> Self {
        Self {
            owner,
            power,
            remote,
            fuse,
            chain_delay: None,
            exploded: false,
            cell,
        }
    }

    /// Returns true while armed (not yet exploded).
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        !self.exploded
    }

    /// Advances fuse and chain countdowns by `dt`.
    ///
    /// Returns true when the bomb should detonate this tick. The chain
    /// countdown fires regardless of the remote flag; the fuse only decays
    /// on non-remote bombs.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.exploded {
            return false;
        }
        if let Some(delay) = self.chain_delay.as_mut() {
            *delay -= dt;
            return *delay <= 0.0;
        }
        if self.remote {
            return false;
        }
        self.fuse -= dt;
        self.fuse <= 0.0
    }

    /// Marks the bomb exploded. Returns true on the first transition only;
    /// repeated calls are no-ops.
    pub fn explode(&mut self) -> bool {
        if self.exploded {
            return false;
        }
        self.exploded = true;
        true
    }

    /// Schedules a chain detonation `delay` seconds from now.
    ///
    /// Only effective while armed and not already chain-scheduled, so a bomb
    /// caught by two blasts keeps its earliest countdown.
    pub fn chain_explode(&mut self, delay: f32) {
        if self.is_armed() && self.chain_delay.is_none() {
            self.chain_delay = Some(delay);
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// Collectible power-up kinds.
///
/// Declaration order is the weighted-selection table order; keep it stable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// +1 blast radius.
    FireUp,
    /// +1 concurrent bomb.
    BombUp,
    /// Faster movement.
    SpeedUp,
    /// Grants remote detonation.
    RemoteControl,
    /// Grants soft-block walking.
    WallPass,
    /// Grants bomb walking.
    BombPass,
    /// Timed invincibility.
    Invincible,
}

impl ItemKind {
    /// All kinds in weighted-selection table order.
    pub const ALL: [Self; 7] = [
        Self::FireUp,
        Self::BombUp,
        Self::SpeedUp,
        Self::RemoteControl,
        Self::WallPass,
        Self::BombPass,
        Self::Invincible,
    ];
}

/// Item state: a kind at rest on a cell until collected or burned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    /// What the item grants.
    pub kind: ItemKind,
    /// Cell the item rests on.
    pub cell: GridPosition,
    /// Terminal flag covering both collection and blast destruction.
    pub collected: bool,
}

impl ItemState {
    /// Creates an uncollected item on `cell`.
    #[must_use]
    pub const fn new(kind: ItemKind, cell: GridPosition) -> Self {
        Self {
            kind,
            cell,
            collected: false,
        }
    }

    /// Marks the item consumed. Returns true on the first transition only.
    pub fn consume(&mut self) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        true
    }
}

// =============================================================================
// Block
// =============================================================================

/// Soft block state: breakable, with an item pre-assigned at map generation.
///
/// Hard blocks have no per-block state and exist only as tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    /// Cell the block fills.
    pub cell: GridPosition,
    /// Item revealed on destruction, decided when the map was generated.
    pub contained_item: Option<ItemKind>,
    /// Terminal flag.
    pub destroyed: bool,
}

impl BlockState {
    /// Creates an intact soft block on `cell`.
    #[must_use]
    pub const fn new(cell: GridPosition, contained_item: Option<ItemKind>) -> Self {
        Self {
            cell,
            contained_item,
            destroyed: false,
        }
    }

    /// Marks the block destroyed. Returns true on the first transition only.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
