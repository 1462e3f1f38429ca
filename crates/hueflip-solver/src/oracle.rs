//! Algebraic solvability checks.
//!
//! Clicks add a fixed vector to the grid modulo the color count, so they
//! commute and a board is solvable exactly when `A·x ≡ c·1 − g (mod k)` has a
//! solution for some target color `c`, where column `j` of `A` is the effect
//! of clicking tile `j`. [`LinearOracle`] decides this by Gaussian elimination.

use std::fmt::Debug;

use hueflip_core::{Board, GridError, effect};

/// Error returned by a [`SolvabilityOracle`] that cannot decide a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum OracleError {
    /// The grid holds a color outside the board's color range.
    #[display("invalid grid: {_0}")]
    InvalidGrid(#[from] GridError),
    /// The board has more tiles than the oracle accepts.
    #[display("board with {cells} tiles exceeds the oracle limit of {max}")]
    #[from(ignore)]
    TooLarge {
        /// Tiles on the board.
        cells: usize,
        /// Largest accepted number of tiles.
        max: usize,
    },
}

/// Decides whether a board can be brought to a single color.
pub trait SolvabilityOracle: Debug + Send + Sync {
    /// Returns `true` if `board` is solvable.
    ///
    /// # Errors
    ///
    /// Returns an error if the oracle cannot decide the board.
    fn is_solvable(&self, board: &Board) -> Result<bool, OracleError>;
}

/// Solvability by modular Gaussian elimination of the click matrix.
///
/// For prime color counts the answer is exact. For composite counts the
/// system is checked modulo each prime factor, which is a necessary condition
/// only. Lock counters are ignored since they expire after a bounded number of
/// moves.
///
/// # Examples
///
/// ```
/// use hueflip_core::{Board, Grid};
/// use hueflip_solver::{LinearOracle, SolvabilityOracle as _};
///
/// let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]])?;
/// assert!(LinearOracle::new().is_solvable(&Board::new(grid, 2))?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearOracle {
    max_cells: usize,
}

impl Default for LinearOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearOracle {
    /// Creates an oracle accepting grids up to 20x20.
    #[must_use]
    pub fn new() -> Self {
        Self { max_cells: 400 }
    }

    /// Creates an oracle accepting at most `max_cells` tiles.
    #[must_use]
    pub fn with_max_cells(max_cells: usize) -> Self {
        Self { max_cells }
    }
}

impl SolvabilityOracle for LinearOracle {
    fn is_solvable(&self, board: &Board) -> Result<bool, OracleError> {
        let grid = board.grid();
        let cells = grid.cell_count();
        if cells > self.max_cells {
            return Err(OracleError::TooLarge {
                cells,
                max: self.max_cells,
            });
        }
        grid.check_colors(board.color_count())?;
        if grid.is_uniform() {
            return Ok(true);
        }

        let color_count = u32::from(board.color_count());
        Ok(prime_factors(color_count)
            .into_iter()
            .all(|p| solvable_mod_prime(board, p)))
    }
}

fn prime_factors(mut n: u32) -> Vec<u32> {
    let mut factors = vec![];
    let mut p = 2;
    while p * p <= n {
        if n % p == 0 {
            factors.push(p);
            while n % p == 0 {
                n /= p;
            }
        }
        p += 1;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

fn inverse_mod(a: u32, p: u32) -> u32 {
    (1..p).find(|&x| a * x % p == 1).unwrap_or(0)
}

/// Row-reduces `[A | B]` over GF(p), where `B` has one column per target
/// color, and reports whether any column is consistent.
fn solvable_mod_prime(board: &Board, p: u32) -> bool {
    let grid = board.grid();
    let size = grid.size();
    let n = grid.cell_count();
    let targets = usize::try_from(p).unwrap_or(usize::MAX).min(usize::from(board.color_count()));

    // Row i: tile i's equation. Columns 0..n are clicks, n.. are target colors.
    let mut matrix = vec![vec![0u32; n + targets]; n];
    for click in grid.positions() {
        let is_power = board.power().contains(click);
        for cell in effect::affected_cells(size, click, is_power) {
            matrix[cell.index(size)][click.index(size)] = 1;
        }
    }
    for (pos, color) in grid.iter() {
        let row = &mut matrix[pos.index(size)];
        for (c, value) in (0u32..).zip(&mut row[n..]) {
            *value = (c + p - u32::from(color) % p) % p;
        }
    }

    let mut pivot_row = 0;
    for col in 0..n {
        let Some(found) = (pivot_row..n).find(|&r| matrix[r][col] != 0) else {
            continue;
        };
        matrix.swap(pivot_row, found);
        let inv = inverse_mod(matrix[pivot_row][col], p);
        for value in &mut matrix[pivot_row] {
            *value = *value * inv % p;
        }
        for r in 0..n {
            if r == pivot_row || matrix[r][col] == 0 {
                continue;
            }
            let factor = matrix[r][col];
            for c in col..n + targets {
                let sub = factor * matrix[pivot_row][c] % p;
                matrix[r][c] = (matrix[r][c] + p - sub) % p;
            }
        }
        pivot_row += 1;
    }

    (n..n + targets).any(|c| matrix[pivot_row..].iter().all(|row| row[c] == 0))
}

#[cfg(test)]
mod tests {
    use hueflip_core::{Grid, LockedMap, Position, PowerSet};

    use super::*;
    use crate::{BfsSolver, SolverLimits};

    #[test]
    fn test_prime_factors() {
        assert_eq!(prime_factors(2), vec![2]);
        assert_eq!(prime_factors(4), vec![2]);
        assert_eq!(prime_factors(6), vec![2, 3]);
        assert_eq!(prime_factors(5), vec![5]);
    }

    #[test]
    fn test_scrambled_boards_are_solvable() {
        let mut grid = Grid::new(5);
        for pos in [Position::new(0, 0), Position::new(2, 3), Position::new(4, 1)] {
            effect::apply_inverse_click_in_place(&mut grid, pos, 3, false);
        }
        let board = Board::new(grid, 3);
        assert_eq!(LinearOracle::new().is_solvable(&board), Ok(true));
    }

    #[test]
    fn test_detects_unsolvable_board() {
        // 4x4 lights-out over GF(2) is singular: not every pattern can be cleared.
        let oracle = LinearOracle::new();
        let bfs = BfsSolver::with_limits(SolverLimits {
            max_states: 1 << 17,
            max_depth: 16,
        });
        let unsolvable = Position::all(4)
            .map(|pos| {
                let mut grid = Grid::new(4);
                grid[pos] = 1;
                Board::new(grid, 2)
            })
            .find(|board| !oracle.is_solvable(board).unwrap());
        let board = unsolvable.unwrap();
        let outcome = bfs.solve(&board);
        assert!(!outcome.found());
        assert!(!outcome.exhausted);
    }

    #[test]
    fn test_agrees_with_bfs_on_small_boards() {
        let oracle = LinearOracle::new();
        let bfs = BfsSolver::with_limits(SolverLimits {
            max_states: 1 << 10,
            max_depth: 10,
        });
        for bits in 0u16..(1 << 9) {
            let rows = (0..3)
                .map(|r| (0..3).map(|c| u8::from(bits >> (r * 3 + c) & 1 == 1)).collect())
                .collect();
            let board = Board::new(Grid::from_rows(rows).unwrap(), 2);
            let outcome = bfs.solve(&board);
            let bfs_solvable = board.is_solved() || outcome.found();
            assert!(!outcome.exhausted);
            assert_eq!(oracle.is_solvable(&board), Ok(bfs_solvable), "bits {bits:09b}");
        }
    }

    #[test]
    fn test_power_tiles_change_the_matrix() {
        let power = [Position::new(1, 1)].into_iter().collect::<PowerSet>();
        let mut grid = Grid::new(3);
        effect::apply_inverse_click_in_place(&mut grid, Position::new(1, 1), 2, true);
        let board = Board::with_tiles(grid, 2, power, LockedMap::new());
        assert_eq!(LinearOracle::new().is_solvable(&board), Ok(true));
    }

    #[test]
    fn test_errors() {
        let board = Board::new(Grid::filled(3, 4), 3);
        assert!(matches!(
            LinearOracle::new().is_solvable(&board),
            Err(OracleError::InvalidGrid(_))
        ));
        let board = Board::new(Grid::new(5), 2);
        assert_eq!(
            LinearOracle::with_max_cells(16).is_solvable(&board),
            Err(OracleError::TooLarge { cells: 25, max: 16 })
        );
    }
}
