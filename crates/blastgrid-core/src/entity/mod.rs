//! Entity module for the arena simulation.
//!
//! This module provides the core entity types:
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Type classification for resolver phase selection
//! - [`EntityInner`]: Type-safe storage for entity-specific state
//! - [`Entity`]: The complete entity container
//!
//! # Architecture
//!
//! `EntityTag` tells the resolver phases which entities they operate on,
//! while `EntityInner` provides type-safe access to the variant state.
//! Concrete state structs avoid runtime type checking overhead.
//!
//! # Example
//!
//! ```
//! use blastgrid_core::entity::{Entity, EntityId, EntityTag, EntityInner};
//! use blastgrid_core::entity::components::BombState;
//! use blastgrid_core::grid::GridPosition;
//!
//! let bomb = Entity::new(
//!     EntityId::new(42),
//!     EntityTag::Bomb,
//!     EntityInner::Bomb(BombState::new(None, 2, false, 3.0, GridPosition::new(1, 1))),
//! );
//!
//! assert_eq!(bomb.id().as_u64(), 42);
//! assert_eq!(bomb.tag(), EntityTag::Bomb);
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{BlockState, BombState, EnemyState, ItemState, PlayerState};

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64` that provides type safety and
/// a clear semantic meaning. Entity IDs are immutable once assigned and must
/// be unique within a registry.
///
/// # Ordering
///
/// Entity IDs are ordered by their numeric value. Because the registry hands
/// out ids monotonically, id order doubles as creation order, which is what
/// makes "bombs detonate in placement order" fall out of a plain sort.
///
/// # Example
///
/// ```
/// use blastgrid_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity type tag.
///
/// The tag is what resolver phases and the grid's occupancy index filter on,
/// decoupling "what kind of thing is this" from the storage representation
/// in [`EntityInner`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The bomb-placing protagonist.
    Player,
    /// A hostile wanderer/chaser.
    Enemy,
    /// An armed or exploded bomb.
    Bomb,
    /// A collectible power-up at rest on the floor.
    Item,
    /// A breakable soft block (hard blocks live only in the tile matrix).
    Block,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Bomb => write!(f, "Bomb"),
            Self::Item => write!(f, "Item"),
            Self::Block => write!(f, "Block"),
        }
    }
}

/// Type-safe storage for entity-specific state.
///
/// # Consistency with EntityTag
///
/// The `EntityInner` variant should always match the entity's `EntityTag`.
/// [`Entity::from_inner`] derives the tag from the variant and is the
/// preferred constructor; [`Entity::new`] trusts the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Player state (transform, abilities, bomb budget, lives, score).
    Player(PlayerState),
    /// Enemy state (kind, AI level, transform, direction cooldown).
    Enemy(EnemyState),
    /// Bomb state (owner, power, fuse, chain delay, exploded flag).
    Bomb(BombState),
    /// Item state (kind, cell, collected flag).
    Item(ItemState),
    /// Soft block state (cell, contained item, destroyed flag).
    Block(BlockState),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Player(_) => EntityTag::Player,
            Self::Enemy(_) => EntityTag::Enemy,
            Self::Bomb(_) => EntityTag::Bomb,
            Self::Item(_) => EntityTag::Item,
            Self::Block(_) => EntityTag::Block,
        }
    }
}

/// A complete entity in the arena simulation.
///
/// An `Entity` combines:
/// - A unique [`EntityId`] for identification and ordering
/// - An [`EntityTag`] that resolver phases filter on
/// - An [`EntityInner`] containing variant-specific state
///
/// # Invariants
///
/// - The `EntityId` must be unique within a registry
/// - The `EntityTag` should match the `EntityInner` variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    tag: EntityTag,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity with the given ID, tag, and inner storage.
    ///
    /// The caller is responsible for ensuring `tag` and `inner` are
    /// consistent (e.g. `EntityTag::Bomb` with `EntityInner::Bomb(_)`).
    #[must_use]
    pub const fn new(id: EntityId, tag: EntityTag, inner: EntityInner) -> Self {
        Self { id, tag, inner }
    }

    /// Creates a new entity, deriving the tag from the inner variant.
    #[must_use]
    pub fn from_inner(id: EntityId, inner: EntityInner) -> Self {
        Self::new(id, inner.tag(), inner)
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.tag
    }

    /// Returns a reference to the entity's inner state.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner state.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns the player state if this is a player, `None` otherwise.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerState> {
        match &self.inner {
            EntityInner::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Returns mutable player state if this is a player, `None` otherwise.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.inner {
            EntityInner::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Returns the enemy state if this is an enemy, `None` otherwise.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.inner {
            EntityInner::Enemy(state) => Some(state),
            _ => None,
        }
    }

    /// Returns mutable enemy state if this is an enemy, `None` otherwise.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.inner {
            EntityInner::Enemy(state) => Some(state),
            _ => None,
        }
    }

    /// Returns the bomb state if this is a bomb, `None` otherwise.
    #[must_use]
    pub const fn as_bomb(&self) -> Option<&BombState> {
        match &self.inner {
            EntityInner::Bomb(state) => Some(state),
            _ => None,
        }
    }

    /// Returns mutable bomb state if this is a bomb, `None` otherwise.
    #[must_use]
    pub fn as_bomb_mut(&mut self) -> Option<&mut BombState> {
        match &mut self.inner {
            EntityInner::Bomb(state) => Some(state),
            _ => None,
        }
    }

    /// Returns the item state if this is an item, `None` otherwise.
    #[must_use]
    pub const fn as_item(&self) -> Option<&ItemState> {
        match &self.inner {
            EntityInner::Item(state) => Some(state),
            _ => None,
        }
    }

    /// Returns mutable item state if this is an item, `None` otherwise.
    #[must_use]
    pub fn as_item_mut(&mut self) -> Option<&mut ItemState> {
        match &mut self.inner {
            EntityInner::Item(state) => Some(state),
            _ => None,
        }
    }

    /// Returns the block state if this is a block, `None` otherwise.
    #[must_use]
    pub const fn as_block(&self) -> Option<&BlockState> {
        match &self.inner {
            EntityInner::Block(state) => Some(state),
            _ => None,
        }
    }

    /// Returns mutable block state if this is a block, `None` otherwise.
    #[must_use]
    pub fn as_block_mut(&mut self) -> Option<&mut BlockState> {
        match &mut self.inner {
            EntityInner::Block(state) => Some(state),
            _ => None,
        }
    }
}
