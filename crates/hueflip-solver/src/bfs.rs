//! Breadth-first search for shortest solutions.

use std::collections::{HashSet, VecDeque};

use hueflip_core::{Board, Position};

/// Search bounds of [`BfsSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverLimits {
    /// Maximum number of distinct states to visit.
    pub max_states: usize,
    /// Maximum solution length to search for.
    pub max_depth: usize,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_states: 10_000,
            max_depth: 30,
        }
    }
}

/// Result of a breadth-first search.
///
/// An empty [`solution`](Self::solution) has two meanings, told apart by
/// [`exhausted`](Self::exhausted):
///
/// - `exhausted == true`: a bound was hit before a solution was found. The
///   board may still be solvable.
/// - `exhausted == false`: the board was already solved, or every reachable
///   state was visited without finding a solved one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BfsOutcome {
    /// Shortest move sequence solving the board, in play order.
    pub solution: Vec<Position>,
    /// Number of distinct states visited.
    pub explored: usize,
    /// `true` if the search stopped at a bound.
    pub exhausted: bool,
}

impl BfsOutcome {
    /// Returns `true` if a non-empty solution was found.
    #[must_use]
    pub fn found(&self) -> bool {
        !self.solution.is_empty()
    }

    /// Returns the first move of the solution, if any.
    #[must_use]
    pub fn first_move(&self) -> Option<Position> {
        self.solution.first().copied()
    }
}

#[derive(Debug)]
struct Node {
    board: Board,
    depth: usize,
    parent: Option<usize>,
    action: Option<Position>,
}

/// A bounded breadth-first solver over complete player moves.
///
/// States are boards (grid and lock counters) deduplicated by their canonical
/// key. Each expansion plays [`Board::click`] on every clickable tile, so lock
/// counters tick exactly as they do during play.
///
/// # Examples
///
/// ```
/// use hueflip_core::{Board, Grid, Position};
/// use hueflip_solver::BfsSolver;
///
/// let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]])?;
/// let board = Board::new(grid, 2);
///
/// let outcome = BfsSolver::new().solve(&board);
/// assert_eq!(outcome.solution, vec![Position::new(1, 1)]);
/// assert!(!outcome.exhausted);
/// # Ok::<(), hueflip_core::GridError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BfsSolver {
    limits: SolverLimits,
}

impl BfsSolver {
    /// Creates a solver with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver with custom limits.
    #[must_use]
    pub fn with_limits(limits: SolverLimits) -> Self {
        Self { limits }
    }

    /// Returns the search limits.
    #[must_use]
    pub fn limits(&self) -> &SolverLimits {
        &self.limits
    }

    /// Searches for a shortest solution of `board`.
    #[must_use]
    pub fn solve(&self, board: &Board) -> BfsOutcome {
        if board.is_solved() {
            return BfsOutcome::default();
        }

        let positions = board.grid().positions().collect::<Vec<_>>();
        let mut visited = HashSet::from([board.canonical_key()]);
        let mut nodes = vec![Node {
            board: board.clone(),
            depth: 0,
            parent: None,
            action: None,
        }];
        let mut queue = VecDeque::from([0]);
        let mut exhausted = false;

        while let Some(idx) = queue.pop_front() {
            if nodes[idx].depth >= self.limits.max_depth {
                exhausted = true;
                continue;
            }
            for &pos in &positions {
                let Some(next) = nodes[idx].board.clicked(pos) else {
                    continue;
                };
                if !visited.insert(next.canonical_key()) {
                    continue;
                }
                let solved = next.is_solved();
                nodes.push(Node {
                    board: next,
                    depth: nodes[idx].depth + 1,
                    parent: Some(idx),
                    action: Some(pos),
                });
                let next_idx = nodes.len() - 1;
                if solved {
                    let solution = reconstruct_path(&nodes, next_idx);
                    log::debug!(
                        "bfs found a {}-move solution after {} states",
                        solution.len(),
                        visited.len()
                    );
                    return BfsOutcome {
                        solution,
                        explored: visited.len(),
                        exhausted: false,
                    };
                }
                if visited.len() >= self.limits.max_states {
                    log::debug!("bfs stopped at the state limit ({})", visited.len());
                    return BfsOutcome {
                        solution: vec![],
                        explored: visited.len(),
                        exhausted: true,
                    };
                }
                queue.push_back(next_idx);
            }
        }

        log::debug!(
            "bfs finished without a solution after {} states (exhausted: {exhausted})",
            visited.len()
        );
        BfsOutcome {
            solution: vec![],
            explored: visited.len(),
            exhausted,
        }
    }
}

fn reconstruct_path(nodes: &[Node], goal: usize) -> Vec<Position> {
    let mut path = vec![];
    let mut idx = goal;
    while let (Some(parent), Some(action)) = (nodes[idx].parent, nodes[idx].action) {
        path.push(action);
        idx = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use hueflip_core::{Grid, LockedMap, PowerSet, effect};

    use super::*;

    fn scrambled(size: u8, color_count: u8, path: &[Position]) -> Board {
        let mut grid = Grid::new(size);
        for &pos in path.iter().rev() {
            effect::apply_inverse_click_in_place(&mut grid, pos, color_count, false);
        }
        Board::new(grid, color_count)
    }

    #[test]
    fn test_solved_board_needs_no_search() {
        let outcome = BfsSolver::new().solve(&Board::new(Grid::filled(3, 1), 2));
        assert_eq!(outcome, BfsOutcome::default());
    }

    #[test]
    fn test_finds_shortest_solution() {
        let path = [Position::new(0, 0), Position::new(2, 2)];
        let board = scrambled(3, 2, &path);
        let outcome = BfsSolver::new().solve(&board);

        assert_eq!(outcome.solution.len(), 2);
        let mut replay = board.clone();
        assert!(replay.play_all(&outcome.solution));
        assert!(replay.is_solved());
    }

    #[test]
    fn test_solution_never_longer_than_generation_path() {
        let path = [
            Position::new(0, 1),
            Position::new(1, 2),
            Position::new(2, 0),
        ];
        let board = scrambled(3, 3, &path);
        let outcome = BfsSolver::new().solve(&board);
        assert!(outcome.found());
        assert!(outcome.solution.len() <= path.len());
    }

    #[test]
    fn test_state_limit_reports_exhaustion() {
        let path = [
            Position::new(0, 0),
            Position::new(1, 2),
            Position::new(2, 1),
            Position::new(3, 3),
        ];
        let board = scrambled(4, 4, &path);
        let solver = BfsSolver::with_limits(SolverLimits {
            max_states: 20,
            max_depth: 30,
        });
        let outcome = solver.solve(&board);
        assert!(outcome.solution.is_empty());
        assert!(outcome.exhausted);
        assert_eq!(outcome.explored, 20);
    }

    #[test]
    fn test_depth_limit_reports_exhaustion() {
        let path = [Position::new(0, 0), Position::new(2, 2)];
        let board = scrambled(3, 2, &path);
        let solver = BfsSolver::with_limits(SolverLimits {
            max_states: 10_000,
            max_depth: 1,
        });
        let outcome = solver.solve(&board);
        assert!(outcome.solution.is_empty());
        assert!(outcome.exhausted);
    }

    #[test]
    fn test_locks_expire_during_search() {
        // Only (0,0) solves the board, and it stays locked for one move.
        let mut grid = Grid::new(3);
        effect::apply_inverse_click_in_place(&mut grid, Position::new(0, 0), 2, false);
        let mut locked = LockedMap::new();
        locked.lock(Position::new(0, 0), 1);
        let board = Board::with_tiles(grid, 2, PowerSet::new(), locked);

        let outcome = BfsSolver::new().solve(&board);
        assert!(outcome.found());
        assert_ne!(outcome.first_move(), Some(Position::new(0, 0)));
        let mut replay = board.clone();
        assert!(replay.play_all(&outcome.solution));
        assert!(replay.is_solved());
    }
}
