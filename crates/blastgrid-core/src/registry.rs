//! Entity registry: the single owner of all entity records.
//!
//! Storage is a `BTreeMap` keyed by [`EntityId`] so every iteration is in
//! ascending id order. Ids are handed out monotonically and never reused,
//! which makes id order double as creation order.
//!
//! Cross-entity references (a bomb's owner, a player's placed bombs) are
//! plain ids looked up at use time; a despawned referent degrades the
//! operation to a no-op.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityInner, EntityTag};

/// Owning container for all entities in a simulation.
///
/// # Example
///
/// ```
/// use blastgrid_core::registry::EntityRegistry;
/// use blastgrid_core::entity::{EntityInner, EntityTag};
/// use blastgrid_core::entity::components::{EnemyKind, EnemyState};
/// use blastgrid_core::grid::GridPosition;
///
/// let mut registry = EntityRegistry::new();
/// let id = registry.spawn(EntityInner::Enemy(EnemyState::new(
///     EnemyKind::Balloon,
///     1,
///     GridPosition::new(5, 5),
/// )));
///
/// assert_eq!(registry.len(), 1);
/// assert!(registry.get(id).is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    next_id: u64,
    #[serde(with = "entities_serde")]
    entities: BTreeMap<EntityId, Entity>,
}

/// Serializes entity storage as a sequence of `(id, entity)` pairs.
///
/// JSON object keys must be strings, so the id-keyed map cannot pass
/// through a serializer's native map representation.
mod entities_serde {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::entity::{Entity, EntityId};

    pub fn serialize<S>(
        entities: &BTreeMap<EntityId, Entity>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<(&EntityId, &Entity)> = entities.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<EntityId, Entity>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(EntityId, Entity)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

impl EntityRegistry {
    /// Creates an empty registry. The first spawned entity gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
        }
    }

    /// Spawns a new entity, deriving its tag from the inner variant, and
    /// returns the assigned id.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::from_inner(id, inner));
        id
    }

    /// Removes an entity, returning it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Returns a reference to the entity with `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to the entity with `id`.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns true if an entity with `id` exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entities are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates all entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Iterates all entities mutably in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Collects the ids of all entities with `tag`, ascending.
    ///
    /// Resolver phases snapshot ids up front and re-fetch each entity, so
    /// entities spawned or despawned mid-phase never shift the iteration.
    #[must_use]
    pub fn ids_with_tag(&self, tag: EntityTag) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.tag() == tag)
            .map(Entity::id)
            .collect()
    }

    /// Counts live entities with `tag`.
    #[must_use]
    pub fn count_with_tag(&self, tag: EntityTag) -> usize {
        self.entities.values().filter(|e| e.tag() == tag).count()
    }

    /// Removes every entity but keeps the id counter, so ids stay unique
    /// across stage transitions.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
