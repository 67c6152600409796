//! Match tuning and stage parameters.
//!
//! All tuning is carried explicitly: a [`TuningConfig`] is chosen once per
//! match (usually via a [`Difficulty`] preset) and passed by reference into
//! the code that needs it. There are no global settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::components::ItemKind;
use crate::grid::{DEFAULT_COLUMNS, DEFAULT_ROWS};

/// Relative drop weights per item kind, in [`ItemKind::ALL`] order.
///
/// Selection walks this fixed-order table so that the same RNG draw always
/// lands on the same kind.
pub const ITEM_DROP_WEIGHTS: [(ItemKind, f64); 7] = [
    (ItemKind::FireUp, 1.0),
    (ItemKind::BombUp, 1.0),
    (ItemKind::SpeedUp, 0.8),
    (ItemKind::RemoteControl, 0.3),
    (ItemKind::WallPass, 0.2),
    (ItemKind::BombPass, 0.3),
    (ItemKind::Invincible, 0.1),
];

/// Per-match tuning values.
///
/// Defaults match the Normal preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Grid width in cells.
    pub columns: i32,
    /// Grid height in cells.
    pub rows: i32,
    /// Starting player speed, tiles per second.
    pub player_base_speed: f32,
    /// Speed cap, tiles per second.
    pub player_max_speed: f32,
    /// Speed gained per speed-up item.
    pub speed_up_increment: f32,
    /// Starting concurrent bomb cap.
    pub initial_bomb_count: u32,
    /// Upper bound on the concurrent bomb cap.
    pub max_bomb_count: u32,
    /// Starting blast radius.
    pub initial_fire_power: u32,
    /// Upper bound on blast radius.
    pub max_fire_power: u32,
    /// Starting lives.
    pub initial_lives: u32,
    /// Bomb fuse length in seconds.
    pub bomb_fuse: f32,
    /// Delay before a chain-triggered bomb detonates, seconds.
    pub chain_explosion_delay: f32,
    /// Probability that a destroyed soft block holds an item.
    pub item_drop_rate: f64,
    /// Invincibility window from the invincible item, seconds.
    pub invincibility_duration: f32,
    /// Grace window after a non-fatal hit, seconds.
    pub post_hit_invincibility: f32,
    /// Base enemy speed, tiles per second (scaled per kind).
    pub enemy_base_speed: f32,
    /// Base seconds between free enemy direction changes (randomized ±50%).
    pub enemy_direction_change_interval: f32,
    /// Floor for the per-stage AI level.
    pub base_ai_level: u8,
    /// Score awarded for clearing a stage.
    pub stage_clear_bonus: u64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Difficulty::Normal.config()
    }
}

/// Match difficulty preset, selected once per match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Forgiving: extra bombs, fire, lives, slow enemies.
    Easy,
    /// The reference tuning.
    Normal,
    /// Shorter fuse, faster enemies.
    Hard,
    /// One life, everything against you.
    Expert,
}

/// Error returned when parsing a [`Difficulty`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty '{0}', expected easy, normal, hard, or expert")]
pub struct ParseDifficultyError(String);

impl Difficulty {
    /// The tuning values for this preset.
    #[must_use]
    pub fn config(self) -> TuningConfig {
        let base = TuningConfig {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            player_base_speed: 3.0,
            player_max_speed: 6.0,
            speed_up_increment: 0.5,
            initial_bomb_count: 1,
            max_bomb_count: 10,
            initial_fire_power: 1,
            max_fire_power: 5,
            initial_lives: 3,
            bomb_fuse: 3.0,
            chain_explosion_delay: 0.1,
            item_drop_rate: 0.3,
            invincibility_duration: 10.0,
            post_hit_invincibility: 2.0,
            enemy_base_speed: 1.5,
            enemy_direction_change_interval: 2.0,
            base_ai_level: 2,
            stage_clear_bonus: 1000,
        };
        match self {
            Self::Normal => base,
            Self::Easy => TuningConfig {
                player_base_speed: 3.5,
                initial_bomb_count: 2,
                initial_fire_power: 2,
                initial_lives: 5,
                bomb_fuse: 3.5,
                item_drop_rate: 0.4,
                enemy_base_speed: 1.0,
                base_ai_level: 1,
                ..base
            },
            Self::Hard => TuningConfig {
                player_base_speed: 2.8,
                initial_lives: 2,
                bomb_fuse: 2.5,
                item_drop_rate: 0.25,
                enemy_base_speed: 2.0,
                base_ai_level: 3,
                ..base
            },
            Self::Expert => TuningConfig {
                player_base_speed: 2.5,
                initial_lives: 1,
                bomb_fuse: 2.0,
                item_drop_rate: 0.2,
                enemy_base_speed: 2.5,
                base_ai_level: 4,
                ..base
            },
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Normal => write!(f, "normal"),
            Self::Hard => write!(f, "hard"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            "expert" => Ok(Self::Expert),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Derived per-stage parameters.
///
/// Everything here is a pure function of the stage number and the match
/// tuning, so stages are reproducible without extra state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageParams {
    /// Stage number, starting at 1.
    pub stage: u32,
    /// Enemies to spawn.
    pub enemy_count: u32,
    /// AI level for this stage's enemies.
    pub ai_level: u8,
    /// Soft-block scatter probability.
    pub soft_block_density: f64,
    /// Optional stage time limit in seconds; expiry ends the match.
    pub time_limit: Option<f32>,
}

impl StageParams {
    /// Computes the parameters for `stage` under `config`.
    #[must_use]
    pub fn for_stage(stage: u32, config: &TuningConfig) -> Self {
        let progression = 1 + (stage / 3) as u8;
        Self {
            stage,
            enemy_count: (3 + stage).min(10),
            ai_level: config.base_ai_level.max(progression).min(5),
            soft_block_density: (0.7 - 0.02 * f64::from(stage)).max(0.4),
            time_limit: None,
        }
    }
}
