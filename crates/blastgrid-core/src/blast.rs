//! Explosion propagation.
//!
//! Blast geometry is a pure function over the grid: no entity state, no
//! randomness. The resolver calls [`compute_blast`] at detonation time and
//! applies the consequences; the AI calls [`is_safe_position`] to ask the
//! same question speculatively about armed bombs.

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, Grid, GridPosition, Tile};

/// A resolved detonation: where it happened and every cell it reached.
///
/// Transient value, built when a bomb detonates and dropped once its
/// consequences are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explosion {
    /// The detonated bomb's cell.
    pub center: GridPosition,
    /// Blast radius the bomb carried.
    pub power: u32,
    /// Every cell the blast reached, center first, then the four rays in
    /// `Direction::ALL` order, near to far.
    pub affected: Vec<GridPosition>,
}

impl Explosion {
    /// Computes the blast for a bomb of `power` at `center`.
    #[must_use]
    pub fn at(center: GridPosition, power: u32, grid: &Grid) -> Self {
        Self {
            center,
            power,
            affected: compute_blast(center, power, grid),
        }
    }

    /// Returns true if the blast reached `pos`.
    #[must_use]
    pub fn contains(&self, pos: GridPosition) -> bool {
        self.affected.contains(&pos)
    }
}

/// Computes the set of cells a blast reaches.
///
/// The origin cell is always included, even inside a wall. From the origin,
/// four cardinal rays extend up to `power` cells. Per cell along a ray:
///
/// - out of bounds: stop, cell excluded
/// - hard block: stop, cell excluded
/// - soft block: include the cell, then stop (the block soaks the blast)
/// - empty or item: include the cell, continue
///
/// Rays are independent; blasts never turn corners.
#[must_use]
pub fn compute_blast(origin: GridPosition, power: u32, grid: &Grid) -> Vec<GridPosition> {
    let mut affected = vec![origin];

    for direction in Direction::ALL {
        let mut cell = origin;
        for _ in 0..power {
            cell = cell.adjacent(direction);
            match grid.tile(cell) {
                None | Some(Tile::HardBlock) => break,
                Some(Tile::SoftBlock) => {
                    affected.push(cell);
                    break;
                }
                Some(Tile::Empty | Tile::Item) => affected.push(cell),
            }
        }
    }

    affected
}

/// Returns true if `pos` lies outside the blast of every given armed bomb.
///
/// `bombs` supplies `(cell, power)` pairs. Used by callers that want to
/// evaluate danger before it happens; the resolver itself only works with
/// actual detonations.
#[must_use]
pub fn is_safe_position<I>(pos: GridPosition, bombs: I, grid: &Grid) -> bool
where
    I: IntoIterator<Item = (GridPosition, u32)>,
{
    bombs
        .into_iter()
        .all(|(cell, power)| !compute_blast(cell, power, grid).contains(&pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use proptest::prelude::*;

    fn open_grid() -> Grid {
        // 13x11 with no blocks at all, so rays only stop at bounds.
        Grid::new(13, 11)
    }

    mod geometry_tests {
        use super::*;

        #[test]
        fn power_two_in_the_open_is_a_nine_cell_cross() {
            let grid = open_grid();
            let affected = compute_blast(GridPosition::new(6, 5), 2, &grid);
            assert_eq!(affected.len(), 9);
            for pos in &affected {
                let dx = (pos.x - 6).abs();
                let dy = (pos.y - 5).abs();
                assert!(dx + dy <= 2);
                assert!(dx == 0 || dy == 0, "blast turned a corner at {pos:?}");
            }
        }

        #[test]
        fn origin_is_always_first() {
            let grid = open_grid();
            let origin = GridPosition::new(3, 3);
            assert_eq!(compute_blast(origin, 4, &grid)[0], origin);
        }

        #[test]
        fn hard_block_stops_the_ray_and_is_excluded() {
            let mut grid = open_grid();
            grid.set_tile(Tile::HardBlock, GridPosition::new(7, 5));
            let affected = compute_blast(GridPosition::new(6, 5), 3, &grid);
            assert!(!affected.contains(&GridPosition::new(7, 5)));
            assert!(!affected.contains(&GridPosition::new(8, 5)));
            // The other three rays are unaffected.
            assert!(affected.contains(&GridPosition::new(3, 5)));
            assert!(affected.contains(&GridPosition::new(6, 8)));
        }

        #[test]
        fn soft_block_is_included_then_stops_the_ray() {
            let mut grid = open_grid();
            grid.set_tile(Tile::SoftBlock, GridPosition::new(7, 5));
            let affected = compute_blast(GridPosition::new(6, 5), 3, &grid);
            assert!(affected.contains(&GridPosition::new(7, 5)));
            assert!(!affected.contains(&GridPosition::new(8, 5)));
        }

        #[test]
        fn item_cells_do_not_shield_cells_behind_them() {
            let mut grid = open_grid();
            grid.set_tile(Tile::Item, GridPosition::new(7, 5));
            let affected = compute_blast(GridPosition::new(6, 5), 3, &grid);
            assert!(affected.contains(&GridPosition::new(7, 5)));
            assert!(affected.contains(&GridPosition::new(8, 5)));
        }

        #[test]
        fn rays_stop_at_the_grid_edge() {
            let grid = open_grid();
            let affected = compute_blast(GridPosition::new(1, 1), 5, &grid);
            for pos in &affected {
                assert!(grid.in_bounds(*pos));
            }
        }

        #[test]
        fn origin_inside_a_wall_is_still_included() {
            let mut grid = open_grid();
            let origin = GridPosition::new(4, 4);
            grid.set_tile(Tile::HardBlock, origin);
            let affected = compute_blast(origin, 2, &grid);
            assert!(affected.contains(&origin));
        }

        #[test]
        fn zero_power_is_just_the_origin() {
            let grid = open_grid();
            assert_eq!(
                compute_blast(GridPosition::new(5, 5), 0, &grid),
                vec![GridPosition::new(5, 5)]
            );
        }
    }

    mod safety_tests {
        use super::*;

        #[test]
        fn cell_in_a_ray_is_unsafe() {
            let grid = open_grid();
            let bombs = [(GridPosition::new(6, 5), 2)];
            assert!(!is_safe_position(GridPosition::new(8, 5), bombs, &grid));
        }

        #[test]
        fn diagonal_neighbor_is_safe() {
            let grid = open_grid();
            let bombs = [(GridPosition::new(6, 5), 2)];
            assert!(is_safe_position(GridPosition::new(7, 6), bombs, &grid));
        }

        #[test]
        fn cell_behind_a_hard_block_is_safe() {
            let mut grid = open_grid();
            grid.set_tile(Tile::HardBlock, GridPosition::new(7, 5));
            let bombs = [(GridPosition::new(6, 5), 5)];
            assert!(is_safe_position(GridPosition::new(9, 5), bombs, &grid));
        }

        #[test]
        fn no_bombs_means_everywhere_is_safe() {
            let grid = open_grid();
            assert!(is_safe_position(
                GridPosition::new(5, 5),
                std::iter::empty(),
                &grid
            ));
        }
    }

    proptest! {
        #[test]
        fn blast_never_turns_corners(
            x in 0i32..13,
            y in 0i32..11,
            power in 0u32..8,
        ) {
            let grid = open_grid();
            let origin = GridPosition::new(x, y);
            for pos in compute_blast(origin, power, &grid) {
                prop_assert!(pos.x == origin.x || pos.y == origin.y);
            }
        }

        #[test]
        fn blast_rays_stay_within_power(
            x in 0i32..13,
            y in 0i32..11,
            power in 0u32..8,
        ) {
            let grid = open_grid();
            let origin = GridPosition::new(x, y);
            for pos in compute_blast(origin, power, &grid) {
                let dist = (pos.x - origin.x).abs() + (pos.y - origin.y).abs();
                prop_assert!(dist <= power as i32);
            }
        }

        #[test]
        fn origin_membership_and_no_duplicates(
            x in 0i32..13,
            y in 0i32..11,
            power in 0u32..8,
        ) {
            let grid = open_grid();
            let origin = GridPosition::new(x, y);
            let affected = compute_blast(origin, power, &grid);
            prop_assert_eq!(affected[0], origin);

            let mut sorted = affected.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), affected.len());
        }
    }
}
