//! The click/effect model.
//!
//! A click rotates the color of a set of affected cells to the next color,
//! modulo the puzzle's color count. The affected set is the clicked cell and
//! its four orthogonal neighbors (the *cross*), or the full 3×3 neighborhood
//! when the clicked cell is a power tile. Cells outside the grid are dropped.
//!
//! Because every click adds a fixed vector modulo `color_count`, applying the
//! same click `color_count` times is the identity and clicks commute. The
//! generator relies on both properties.

use tinyvec::ArrayVec;

use crate::{Grid, LockedMap, Position};

/// Cells affected by one click. At most nine cells.
pub type AffectedCells = ArrayVec<[Position; 9]>;

const CROSS: [(i8, i8); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

const SQUARE: [(i8, i8); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Returns the in-bounds cells affected by clicking `pos` on a grid of `size`.
///
/// Out-of-bounds targets yield an empty set.
///
/// # Examples
///
/// ```
/// use hueflip_core::{Position, affected_cells};
///
/// assert_eq!(affected_cells(3, Position::new(1, 1), false).len(), 5);
/// assert_eq!(affected_cells(3, Position::new(0, 0), false).len(), 3);
/// assert_eq!(affected_cells(3, Position::new(1, 1), true).len(), 9);
/// assert_eq!(affected_cells(3, Position::new(0, 0), true).len(), 4);
/// ```
#[must_use]
pub fn affected_cells(size: u8, pos: Position, is_power: bool) -> AffectedCells {
    let offsets: &[(i8, i8)] = if is_power { &SQUARE } else { &CROSS };
    let mut cells = AffectedCells::new();
    if !pos.is_within(size) {
        return cells;
    }
    for &(dr, dc) in offsets {
        if let Some(cell) = pos.offset(dr, dc, size) {
            cells.push(cell);
        }
    }
    cells
}

/// Returns the color following `color`.
#[must_use]
pub fn next_color(color: u8, color_count: u8) -> u8 {
    debug_assert!(color_count > 0);
    (color + 1) % color_count
}

/// Returns the color preceding `color`, the inverse of [`next_color`].
#[must_use]
pub fn previous_color(color: u8, color_count: u8) -> u8 {
    debug_assert!(color_count > 0);
    (color + color_count - 1) % color_count
}

/// Returns a copy of `grid` with the click at `pos` applied.
///
/// Affected cells with a positive counter in `locked` keep their color.
///
/// # Examples
///
/// ```
/// use hueflip_core::{Grid, LockedMap, Position, apply_click};
///
/// let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]])?;
/// let next = apply_click(&grid, Position::new(0, 0), 2, false, &LockedMap::new());
/// assert_eq!(next.to_rows(), vec![vec![0, 1], vec![1, 0]]);
/// # Ok::<(), hueflip_core::GridError>(())
/// ```
#[must_use]
pub fn apply_click(
    grid: &Grid,
    pos: Position,
    color_count: u8,
    is_power: bool,
    locked: &LockedMap,
) -> Grid {
    let mut next = grid.clone();
    apply_click_in_place(&mut next, pos, color_count, is_power, locked);
    next
}

/// Applies the click at `pos` to `grid` in place.
///
/// Returns the number of cells whose color changed.
pub fn apply_click_in_place(
    grid: &mut Grid,
    pos: Position,
    color_count: u8,
    is_power: bool,
    locked: &LockedMap,
) -> usize {
    rotate_cells(grid, pos, is_power, locked, |c| next_color(c, color_count))
}

/// Applies the inverse of the click at `pos` to `grid` in place.
///
/// Locks are ignored: the inverse is only used while building puzzles, before
/// any tile is locked.
pub fn apply_inverse_click_in_place(
    grid: &mut Grid,
    pos: Position,
    color_count: u8,
    is_power: bool,
) -> usize {
    rotate_cells(grid, pos, is_power, &LockedMap::new(), |c| {
        previous_color(c, color_count)
    })
}

fn rotate_cells(
    grid: &mut Grid,
    pos: Position,
    is_power: bool,
    locked: &LockedMap,
    rotate: impl Fn(u8) -> u8,
) -> usize {
    let mut changed = 0;
    for cell in affected_cells(grid.size(), pos, is_power) {
        if locked.is_locked(cell) {
            continue;
        }
        grid[cell] = rotate(grid[cell]);
        changed += 1;
    }
    changed
}

/// Returns `true` if every cell of `grid` shows the same color.
#[must_use]
pub fn is_solved(grid: &Grid) -> bool {
    grid.is_uniform()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_two_by_two_cross_and_win() {
        let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]]).unwrap();
        let locked = LockedMap::new();

        let once = apply_click(&grid, Position::new(0, 0), 2, false, &locked);
        assert_eq!(once.to_rows(), vec![vec![0, 1], vec![1, 0]]);
        assert!(!is_solved(&once));

        // Clicking the opposite corner flips (1,1), (0,1) and (1,0).
        let twice = apply_click(&once, Position::new(1, 1), 2, false, &locked);
        assert_eq!(twice.to_rows(), vec![vec![0, 0], vec![0, 1]]);
        assert!(!is_solved(&twice));

        // The complementary corner flips exactly the three zero cells.
        let solved = apply_click(&grid, Position::new(1, 1), 2, false, &locked);
        assert_eq!(solved.to_rows(), vec![vec![1, 1], vec![1, 1]]);
        assert!(is_solved(&solved));

        // Clicking (0,0) twice cancels out, so the complementary click still wins.
        let back = apply_click(&once, Position::new(0, 0), 2, false, &locked);
        assert_eq!(back, grid);
        let won = apply_click(&back, Position::new(1, 1), 2, false, &locked);
        assert!(is_solved(&won));
    }

    #[test]
    fn test_locked_cells_keep_color() {
        let grid = Grid::new(3);
        let mut locked = LockedMap::new();
        locked.lock(Position::new(0, 1), 2);

        let next = apply_click(&grid, Position::new(1, 1), 3, false, &locked);
        assert_eq!(next[Position::new(0, 1)], 0);
        assert_eq!(next[Position::new(1, 1)], 1);
        assert_eq!(next[Position::new(2, 1)], 1);
    }

    #[test]
    fn test_out_of_bounds_click_is_noop() {
        let grid = Grid::new(3);
        let next = apply_click(&grid, Position::new(5, 5), 3, false, &LockedMap::new());
        assert_eq!(next, grid);
    }

    #[test]
    fn test_power_click_covers_square() {
        let grid = Grid::new(4);
        let next = apply_click(&grid, Position::new(1, 1), 2, true, &LockedMap::new());
        let changed = next.iter().filter(|&(_, c)| c == 1).count();
        assert_eq!(changed, 9);
        assert_eq!(next[Position::new(3, 3)], 0);
    }

    proptest! {
        #[test]
        fn prop_click_cycle_is_identity(
            size in 2u8..=8,
            color_count in 2u8..=5,
            row in 0u8..8,
            col in 0u8..8,
            is_power in any::<bool>(),
            seed_cells in proptest::collection::vec(0u8..5, 64),
        ) {
            let rows = (0..usize::from(size))
                .map(|r| {
                    (0..usize::from(size))
                        .map(|c| seed_cells[r * 8 + c] % color_count)
                        .collect()
                })
                .collect();
            let grid = Grid::from_rows(rows).unwrap();
            let pos = Position::new(row % size, col % size);
            let locked = LockedMap::new();

            let mut current = grid.clone();
            for _ in 0..color_count {
                current = apply_click(&current, pos, color_count, is_power, &locked);
            }
            prop_assert_eq!(current, grid);
        }

        #[test]
        fn prop_inverse_undoes_click(
            size in 3u8..=6,
            color_count in 2u8..=5,
            row in 0u8..6,
            col in 0u8..6,
            is_power in any::<bool>(),
        ) {
            let pos = Position::new(row % size, col % size);
            let mut grid = Grid::new(size);
            apply_inverse_click_in_place(&mut grid, pos, color_count, is_power);
            apply_click_in_place(&mut grid, pos, color_count, is_power, &LockedMap::new());
            prop_assert!(grid.is_uniform());
            prop_assert_eq!(grid[pos], 0);
        }
    }
}
