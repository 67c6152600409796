//! Determinism tests: a seed and a command script reproduce a match.

use super::{new_sim, the_player, DT};
use crate::events::TickEvent;
use crate::grid::{Direction, GridPosition};
use crate::simulation::{PlayerAction, PlayerCommand, Simulation};

const SCRIPT_TICKS: u32 = 600;

/// Runs a fixed 10-second input script: walk a rotating direction, drop a
/// bomb every four seconds.
fn scripted_run(seed: u64) -> (Simulation, Vec<TickEvent>) {
    let mut sim = new_sim(seed);
    let player = the_player(&sim);
    let directions = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    let mut all = Vec::new();
    for tick in 0..SCRIPT_TICKS {
        let mut commands = vec![PlayerCommand {
            player,
            action: PlayerAction::Move(directions[(tick / 60) as usize % 4]),
        }];
        if tick % 240 == 0 {
            commands.push(PlayerCommand {
                player,
                action: PlayerAction::PlaceBomb,
            });
        }
        all.extend(sim.advance(DT, &commands));
    }
    (sim, all)
}

#[test]
fn same_seed_and_script_reproduce_the_event_stream() {
    let (_, events_a) = scripted_run(42);
    let (_, events_b) = scripted_run(42);
    assert_eq!(events_a, events_b);
}

#[test]
fn same_seed_and_script_reproduce_the_full_state() {
    let (sim_a, _) = scripted_run(1234);
    let (sim_b, _) = scripted_run(1234);

    let state_a = serde_json::to_string(sim_a.registry()).unwrap();
    let state_b = serde_json::to_string(sim_b.registry()).unwrap();
    assert_eq!(state_a, state_b);

    let grid_a = serde_json::to_string(sim_a.grid()).unwrap();
    let grid_b = serde_json::to_string(sim_b.grid()).unwrap();
    assert_eq!(grid_a, grid_b);
}

#[test]
fn different_seeds_generate_different_layouts() {
    let sim_a = new_sim(1);
    let sim_b = new_sim(2);

    // ~49 interior cells get an independent scatter roll each, so two seeds
    // agreeing on every one of them is not a realistic outcome.
    let differs = (0..sim_a.grid().columns()).any(|x| {
        (0..sim_a.grid().rows()).any(|y| {
            let pos = GridPosition::new(x, y);
            sim_a.grid().tile(pos) != sim_b.grid().tile(pos)
        })
    });
    assert!(differs);
}

#[test]
fn stage_regeneration_is_part_of_the_seeded_stream() {
    // Consuming different amounts of randomness before a stage start must
    // change that stage, but the same history must reproduce it.
    let mut sim_a = new_sim(7);
    sim_a.start_stage(2);
    let mut sim_b = new_sim(7);
    sim_b.start_stage(2);

    let grid_a = serde_json::to_string(sim_a.grid()).unwrap();
    let grid_b = serde_json::to_string(sim_b.grid()).unwrap();
    assert_eq!(grid_a, grid_b);
}
