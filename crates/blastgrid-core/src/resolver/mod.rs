//! Interaction resolution.
//!
//! All cross-entity interaction happens here, in a fixed phase order driven
//! by the simulation once per tick:
//!
//! 1. Bomb fuses and pending chain delays advance; fresh detonations are
//!    collected and processed in id (placement) order ([`bombs`]).
//! 2. Each detonation applies its consequences: soft blocks, chains, player
//!    damage, enemy kills, item destruction ([`bombs`]).
//! 3. Players and enemies decide and integrate movement ([`movement`]).
//! 4. Item pickups ([`contact`]).
//! 5. Enemy contact damage ([`contact`]).
//!
//! Outcome signals (stage clear, game over) are the simulation's job; the
//! resolver only mutates state and records events.
//!
//! Each phase snapshots the ids it will visit before mutating anything, so
//! entities spawned or despawned mid-phase never shift iteration order.

pub(crate) mod bombs;
pub(crate) mod contact;
pub(crate) mod movement;

use tracing::debug;

use crate::config::TuningConfig;
use crate::entity::components::DamageOutcome;
use crate::entity::{Entity, EntityId};
use crate::events::{TickEvent, TickEvents};
use crate::registry::EntityRegistry;

/// Applies one hit to a player and records the outcome.
///
/// Shared by the blast phase and the contact phase. Invincibility makes the
/// hit a no-op, which is also what caps damage at one life per tick (the
/// first hit of the tick opens the post-hit window).
pub(crate) fn damage_player(
    player_id: EntityId,
    registry: &mut EntityRegistry,
    config: &TuningConfig,
    events: &mut TickEvents,
) {
    let Some(player) = registry.get_mut(player_id).and_then(Entity::as_player_mut) else {
        return;
    };
    match player.take_damage(config) {
        DamageOutcome::Ignored => {}
        DamageOutcome::Hit => {
            let lives_remaining = player.lives;
            debug!(player = %player_id, lives_remaining, "player hit");
            events.push(TickEvent::PlayerDamaged {
                player: player_id,
                lives_remaining,
            });
        }
        DamageOutcome::Fatal => {
            debug!(player = %player_id, "player killed");
            events.push(TickEvent::PlayerDamaged {
                player: player_id,
                lives_remaining: 0,
            });
            events.push(TickEvent::PlayerDied { player: player_id });
        }
    }
}
