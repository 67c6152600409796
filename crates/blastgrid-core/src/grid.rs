//! Grid module for the arena simulation.
//!
//! The grid owns two things:
//! - The tile matrix (empty / hard block / soft block / item-at-rest)
//! - A position-to-entity index so interaction code can ask "what stands on
//!   this cell" without scanning the registry
//!
//! It also provides coordinate transforms between continuous world space and
//! discrete cells, walkability queries, and the standard map generator
//! (hard border, even-coordinate lattice, density-scattered soft blocks with
//! corner safe zones).
//!
//! # Determinism
//!
//! The entity index uses a `BTreeMap` keyed by cell so that iteration over
//! occupied cells is ordered. Per-cell occupant lists preserve registration
//! order; callers that need id order sort explicitly.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityTag};

/// Default grid width in cells.
pub const DEFAULT_COLUMNS: i32 = 13;

/// Default grid height in cells.
pub const DEFAULT_ROWS: i32 = 11;

/// Side length of one cell in world units.
pub const TILE_SIZE: f32 = 48.0;

// =============================================================================
// Direction
// =============================================================================

/// One of the four cardinal movement directions.
///
/// The grid is y-up: `Up` increases the row index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing row index.
    Up,
    /// Toward decreasing row index.
    Down,
    /// Toward decreasing column index.
    Left,
    /// Toward increasing column index.
    Right,
}

impl Direction {
    /// All four directions in a fixed order (used for deterministic iteration).
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit vector in world space.
    #[must_use]
    pub const fn vector(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, 1.0),
            Self::Down => Vec2::new(0.0, -1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Cell offset as `(dx, dy)`.
    #[must_use]
    pub const fn grid_offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// =============================================================================
// GridPosition
// =============================================================================

/// A discrete cell coordinate `(x, y)` on the grid.
///
/// Positions are plain value types; they may lie outside the grid bounds
/// (for example while walking a blast ray off the edge). Bounds checking is
/// the grid's job, not the position's.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPosition {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl GridPosition {
    /// Creates a position from column and row indices.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighboring cell one step in `direction`.
    #[must_use]
    pub const fn adjacent(self, direction: Direction) -> Self {
        let (dx, dy) = direction.grid_offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Center of this cell in world space.
    #[must_use]
    pub fn to_world(self) -> Vec2 {
        Vec2::new(
            self.x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }

    /// The cell containing a world-space point.
    #[must_use]
    pub fn from_world(point: Vec2) -> Self {
        Self::new(
            (point.x / TILE_SIZE).floor() as i32,
            (point.y / TILE_SIZE).floor() as i32,
        )
    }
}

// =============================================================================
// Tile
// =============================================================================

/// The static contents of one cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    /// Open floor.
    Empty,
    /// Permanent block; stops movement and blast.
    HardBlock,
    /// Breakable block; stops movement (without wall-pass) and blast, but is
    /// destroyed by blast.
    SoftBlock,
    /// A pickup at rest on the floor; walkable.
    Item,
}

/// An entry in the grid's position-to-entity index.
///
/// The tag is carried alongside the id so occupancy queries (such as "does a
/// bomb block this cell") do not need the registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEntity {
    /// The occupant's registry id.
    pub id: EntityId,
    /// The occupant's type tag.
    pub tag: EntityTag,
}

// =============================================================================
// Grid
// =============================================================================

/// The arena's tile state and position-to-entity index.
///
/// The grid never owns entity state; it stores `(id, tag)` references for
/// lookup only. The registry remains the single owner of entity records.
///
/// # Example
///
/// ```
/// use blastgrid_core::grid::{Grid, GridPosition, Tile};
///
/// let grid = Grid::new(13, 11);
/// assert_eq!(grid.tile(GridPosition::new(0, 0)), Some(Tile::Empty));
/// assert_eq!(grid.tile(GridPosition::new(13, 0)), None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    columns: i32,
    rows: i32,
    /// Column-major tile storage: index `x * rows + y`.
    tiles: Vec<Tile>,
    /// Per-cell occupant lists, registration order preserved.
    #[serde(with = "entity_index_serde")]
    entity_index: BTreeMap<GridPosition, Vec<IndexedEntity>>,
}

/// Serializes the entity index as a sequence of `(cell, occupants)` pairs.
///
/// JSON object keys must be strings, so a struct-keyed map cannot pass
/// through a serializer's native map representation.
mod entity_index_serde {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{GridPosition, IndexedEntity};

    pub fn serialize<S>(
        index: &BTreeMap<GridPosition, Vec<IndexedEntity>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<(&GridPosition, &Vec<IndexedEntity>)> = index.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<GridPosition, Vec<IndexedEntity>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(GridPosition, Vec<IndexedEntity>)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

impl Grid {
    /// Creates an all-empty grid with the given dimensions.
    #[must_use]
    pub fn new(columns: i32, rows: i32) -> Self {
        Self {
            columns,
            rows,
            tiles: vec![Tile::Empty; (columns * rows) as usize],
            entity_index: BTreeMap::new(),
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Returns true if `pos` lies within the grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.x < self.columns && pos.y >= 0 && pos.y < self.rows
    }

    fn index_of(&self, pos: GridPosition) -> usize {
        (pos.x * self.rows + pos.y) as usize
    }

    /// The tile at `pos`, or `None` if out of bounds.
    ///
    /// Callers treat the boundary and blocked-tile cases uniformly, so an
    /// absence value here is what lets blast propagation stop at the edge
    /// without a special case.
    #[must_use]
    pub fn tile(&self, pos: GridPosition) -> Option<Tile> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.index_of(pos)])
        } else {
            None
        }
    }

    /// Sets the tile at `pos`. Out-of-bounds writes are no-ops.
    pub fn set_tile(&mut self, tile: Tile, pos: GridPosition) {
        if self.in_bounds(pos) {
            let idx = self.index_of(pos);
            self.tiles[idx] = tile;
        }
    }

    /// Walkability query.
    ///
    /// Rules: out of bounds is never walkable; hard blocks never; soft blocks
    /// only with `wall_pass`; empty cells unless a bomb occupies them and
    /// `bomb_pass` is not set; item cells always.
    #[must_use]
    pub fn is_walkable(&self, pos: GridPosition, wall_pass: bool, bomb_pass: bool) -> bool {
        let Some(tile) = self.tile(pos) else {
            return false;
        };
        match tile {
            Tile::Empty => bomb_pass || !self.has_bomb(pos),
            Tile::SoftBlock => wall_pass,
            Tile::HardBlock => false,
            Tile::Item => true,
        }
    }

    /// Returns true if a bomb entity is registered at `pos`.
    #[must_use]
    pub fn has_bomb(&self, pos: GridPosition) -> bool {
        self.entity_index
            .get(&pos)
            .is_some_and(|list| list.iter().any(|e| e.tag == EntityTag::Bomb))
    }

    /// The occupants registered at `pos`, in registration order.
    #[must_use]
    pub fn entities_at(&self, pos: GridPosition) -> &[IndexedEntity] {
        self.entity_index.get(&pos).map_or(&[], Vec::as_slice)
    }

    /// Ids of occupants at `pos` with the given tag, sorted ascending.
    ///
    /// Interaction code iterates these, so the explicit sort keeps blast and
    /// pickup processing independent of registration order.
    #[must_use]
    pub fn ids_at(&self, pos: GridPosition, tag: EntityTag) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .entities_at(pos)
            .iter()
            .filter(|e| e.tag == tag)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Registers an entity reference at `pos`.
    ///
    /// Multiple entities may share a cell (a player standing on an item, a
    /// bomb under its owner). Registering the same id twice at the same cell
    /// is the caller's bug; the index does not deduplicate.
    pub fn register_entity(&mut self, id: EntityId, tag: EntityTag, pos: GridPosition) {
        self.entity_index
            .entry(pos)
            .or_default()
            .push(IndexedEntity { id, tag });
    }

    /// Removes an entity reference from `pos`. Unknown ids are no-ops.
    pub fn unregister_entity(&mut self, id: EntityId, pos: GridPosition) {
        if let Some(list) = self.entity_index.get_mut(&pos) {
            list.retain(|e| e.id != id);
            if list.is_empty() {
                self.entity_index.remove(&pos);
            }
        }
    }

    /// Moves an entity reference between cells.
    pub fn move_entity(&mut self, id: EntityId, tag: EntityTag, from: GridPosition, to: GridPosition) {
        self.unregister_entity(id, from);
        self.register_entity(id, tag, to);
    }

    /// Neighboring cells of `pos` that are walkable for the given abilities,
    /// in `Direction::ALL` order.
    #[must_use]
    pub fn walkable_neighbors(
        &self,
        pos: GridPosition,
        wall_pass: bool,
        bomb_pass: bool,
    ) -> Vec<GridPosition> {
        Direction::ALL
            .iter()
            .map(|&d| pos.adjacent(d))
            .filter(|&p| self.is_walkable(p, wall_pass, bomb_pass))
            .collect()
    }

    /// Resets every tile to empty and drops the entity index.
    pub fn clear(&mut self) {
        self.tiles.fill(Tile::Empty);
        self.entity_index.clear();
    }

    // =========================================================================
    // Map generation
    // =========================================================================

    /// The four corner spawn cells, one tile inside the border.
    #[must_use]
    pub fn spawn_points(&self) -> [GridPosition; 4] {
        [
            GridPosition::new(1, 1),
            GridPosition::new(self.columns - 2, 1),
            GridPosition::new(1, self.rows - 2),
            GridPosition::new(self.columns - 2, self.rows - 2),
        ]
    }

    /// Cells excluded from soft-block placement: each spawn cell plus its
    /// four orthogonal neighbors.
    ///
    /// Neighbors that fall on the border are still returned; the border is
    /// laid down as hard blocks first and the scatter pass only visits
    /// interior cells, so those entries are simply never consulted.
    #[must_use]
    pub fn safe_zones(&self) -> Vec<GridPosition> {
        let mut zones = Vec::new();
        for spawn in self.spawn_points() {
            zones.push(spawn);
            for direction in Direction::ALL {
                zones.push(spawn.adjacent(direction));
            }
        }
        zones
    }

    /// Generates the standard arena layout.
    ///
    /// 1. Hard blocks around the full border.
    /// 2. Hard blocks on the interior lattice at even `(x, y)` coordinates.
    /// 3. Soft blocks scattered over the remaining interior cells with
    ///    probability `density`, skipping the corner safe zones.
    ///
    /// The previous layout and entity index are discarded.
    pub fn generate_standard_map<R: Rng>(&mut self, density: f64, rng: &mut R) {
        self.clear();

        for x in 0..self.columns {
            self.set_tile(Tile::HardBlock, GridPosition::new(x, 0));
            self.set_tile(Tile::HardBlock, GridPosition::new(x, self.rows - 1));
        }
        for y in 0..self.rows {
            self.set_tile(Tile::HardBlock, GridPosition::new(0, y));
            self.set_tile(Tile::HardBlock, GridPosition::new(self.columns - 1, y));
        }

        let mut x = 2;
        while x < self.columns - 1 {
            let mut y = 2;
            while y < self.rows - 1 {
                self.set_tile(Tile::HardBlock, GridPosition::new(x, y));
                y += 2;
            }
            x += 2;
        }

        let safe = self.safe_zones();
        for x in 1..self.columns - 1 {
            for y in 1..self.rows - 1 {
                let pos = GridPosition::new(x, y);
                if self.tile(pos) == Some(Tile::HardBlock) || safe.contains(&pos) {
                    continue;
                }
                if rng.gen::<f64>() < density {
                    self.set_tile(Tile::SoftBlock, pos);
                }
            }
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

// =============================================================================
// Tests
// =============================================================================
