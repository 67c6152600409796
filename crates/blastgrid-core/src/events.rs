//! Tick event batch.
//!
//! The simulation communicates outward exclusively through the ordered
//! event batch returned from `advance`. Event order follows processing
//! order within the tick, so a presentation layer can replay the batch as a
//! faithful account of what happened.

use serde::{Deserialize, Serialize};

use crate::entity::components::{EnemyKind, ItemKind};
use crate::entity::EntityId;
use crate::grid::GridPosition;

/// One observable consequence of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickEvent {
    /// A bomb was placed on a cell.
    BombPlaced {
        /// The new bomb's id.
        bomb: EntityId,
        /// The placing player.
        owner: EntityId,
        /// Cell the bomb occupies.
        cell: GridPosition,
    },
    /// A bomb detonated.
    BombExploded {
        /// The detonated bomb's id (already despawned).
        bomb: EntityId,
        /// The bomb's cell.
        center: GridPosition,
        /// Every cell the blast reached.
        affected: Vec<GridPosition>,
    },
    /// A soft block was destroyed by blast.
    BlockDestroyed {
        /// The block's cell.
        cell: GridPosition,
        /// The item it revealed, if any.
        revealed: Option<ItemKind>,
    },
    /// An item appeared on the floor.
    ItemSpawned {
        /// The new item's id.
        item: EntityId,
        /// What it grants.
        kind: ItemKind,
        /// Cell it rests on.
        cell: GridPosition,
    },
    /// A player walked over an item.
    ItemCollected {
        /// The collected item's id (already despawned).
        item: EntityId,
        /// What it granted.
        kind: ItemKind,
        /// The collecting player.
        player: EntityId,
    },
    /// A blast burned an uncollected item.
    ItemDestroyed {
        /// The destroyed item's id (already despawned).
        item: EntityId,
        /// Cell it rested on.
        cell: GridPosition,
    },
    /// An enemy was caught in a blast.
    EnemyKilled {
        /// The killed enemy's id (already despawned).
        enemy: EntityId,
        /// Its species.
        kind: EnemyKind,
        /// Cell it died on.
        cell: GridPosition,
        /// Score awarded.
        score: u64,
    },
    /// A player lost a life but survived.
    PlayerDamaged {
        /// The damaged player.
        player: EntityId,
        /// Lives left after the hit.
        lives_remaining: u32,
    },
    /// A player lost the last life.
    PlayerDied {
        /// The dead player.
        player: EntityId,
    },
    /// Every enemy on the stage is dead.
    StageCleared {
        /// The cleared stage number.
        stage: u32,
        /// Bonus score awarded.
        bonus: u64,
    },
    /// The match ended (player death or stage time limit).
    GameOver {
        /// Final accumulated score.
        score: u64,
    },
}

/// Ordered batch of events from one `advance` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    events: Vec<TickEvent>,
}

impl TickEvents {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: TickEvent) {
        self.events.push(event);
    }

    /// Events in processing order.
    #[must_use]
    pub fn as_slice(&self) -> &[TickEvent] {
        &self.events
    }

    /// Iterates events in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &TickEvent> {
        self.events.iter()
    }

    /// Number of events in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing happened this tick.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns true if the batch contains a stage-clear signal.
    #[must_use]
    pub fn stage_cleared(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TickEvent::StageCleared { .. }))
    }

    /// Returns true if the batch contains a game-over signal.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, TickEvent::GameOver { .. }))
    }

    /// Consumes the batch, yielding the raw event vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<TickEvent> {
        self.events
    }
}

impl IntoIterator for TickEvents {
    type Item = TickEvent;
    type IntoIter = std::vec::IntoIter<TickEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
