//! A grid together with everything needed to play it.

use serde::{Deserialize, Serialize};

use crate::{Grid, GridError, LockedMap, Position, PowerSet, effect};

/// Errors returned when board parts do not describe a playable board.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum BoardError {
    /// Fewer than two colors.
    #[display("color count {color_count} is below 2")]
    #[from(ignore)]
    InvalidColorCount {
        /// Color count supplied.
        color_count: u8,
    },
    /// A cell color does not fit the color count.
    #[display("{_0}")]
    Grid(#[from] GridError),
    /// A power or locked tile lies outside the grid.
    #[display("special tile {pos} is outside the {size}x{size} grid")]
    #[from(ignore)]
    TileOutOfBounds {
        /// Offending tile.
        pos: Position,
        /// Grid side length.
        size: u8,
    },
}

/// A playable board: grid, color count, power tiles and locked tiles.
///
/// [`Board::click`] applies a complete player move: the click effect followed
/// by one decrement of every lock counter. Solvers and sessions share this
/// definition of a move so that a solution found by search replays exactly
/// during play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr")]
pub struct Board {
    grid: Grid,
    color_count: u8,
    power: PowerSet,
    locked: LockedMap,
}

impl Board {
    /// Creates a board without special tiles.
    ///
    /// # Panics
    ///
    /// Panics if `color_count` is below 2.
    #[must_use]
    pub fn new(grid: Grid, color_count: u8) -> Self {
        Self::with_tiles(grid, color_count, PowerSet::new(), LockedMap::new())
    }

    /// Creates a board with power and locked tiles.
    ///
    /// # Panics
    ///
    /// Panics if `color_count` is below 2.
    #[must_use]
    pub fn with_tiles(grid: Grid, color_count: u8, power: PowerSet, locked: LockedMap) -> Self {
        assert!(color_count >= 2, "Invalid color count: {color_count}");
        Self {
            grid,
            color_count,
            power,
            locked,
        }
    }

    /// Creates a board from untrusted parts, checking that it can be played.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if `color_count` is below 2, a cell color is not
    /// below `color_count`, or a special tile lies outside the grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use hueflip_core::{Board, BoardError, Grid, LockedMap, PowerSet};
    ///
    /// let grid = Grid::from_rows(vec![vec![0, 2], vec![1, 0]])?;
    /// assert!(Board::try_new(grid.clone(), 3, PowerSet::new(), LockedMap::new()).is_ok());
    /// assert!(matches!(
    ///     Board::try_new(grid, 1, PowerSet::new(), LockedMap::new()),
    ///     Err(BoardError::InvalidColorCount { color_count: 1 })
    /// ));
    /// # Ok::<(), hueflip_core::GridError>(())
    /// ```
    pub fn try_new(
        grid: Grid,
        color_count: u8,
        power: PowerSet,
        locked: LockedMap,
    ) -> Result<Self, BoardError> {
        if color_count < 2 {
            return Err(BoardError::InvalidColorCount { color_count });
        }
        grid.check_colors(color_count)?;
        let size = grid.size();
        let outside = power
            .iter()
            .copied()
            .chain(locked.iter().map(|(pos, _)| pos))
            .find(|pos| !pos.is_within(size));
        if let Some(pos) = outside {
            return Err(BoardError::TileOutOfBounds { pos, size });
        }
        Ok(Self::with_tiles(grid, color_count, power, locked))
    }

    /// Returns the grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the number of colors.
    #[must_use]
    pub fn color_count(&self) -> u8 {
        self.color_count
    }

    /// Returns the power tiles.
    #[must_use]
    pub fn power(&self) -> &PowerSet {
        &self.power
    }

    /// Returns the locked tiles.
    #[must_use]
    pub fn locked(&self) -> &LockedMap {
        &self.locked
    }

    /// Returns the grid side length.
    #[must_use]
    pub fn size(&self) -> u8 {
        self.grid.size()
    }

    /// Returns `true` if `pos` is inside the grid and not locked.
    #[must_use]
    pub fn can_click(&self, pos: Position) -> bool {
        self.grid.contains(pos) && !self.locked.is_locked(pos)
    }

    /// Applies the click effect at `pos` without touching lock counters.
    pub fn apply_effect(&mut self, pos: Position) {
        effect::apply_click_in_place(
            &mut self.grid,
            pos,
            self.color_count,
            self.power.contains(pos),
            &self.locked,
        );
    }

    /// Decrements every lock counter once, unlocking tiles that reach zero.
    pub fn decrement_locks(&mut self) {
        self.locked.decrement();
    }

    /// Plays one move: the click effect at `pos`, then one lock decrement.
    ///
    /// Returns `false` and leaves the board unchanged when `pos` cannot be
    /// clicked (out of bounds or locked).
    pub fn click(&mut self, pos: Position) -> bool {
        if !self.can_click(pos) {
            return false;
        }
        self.apply_effect(pos);
        self.decrement_locks();
        true
    }

    /// Returns a copy of the board after playing `pos`, or `None` if it cannot
    /// be clicked.
    #[must_use]
    pub fn clicked(&self, pos: Position) -> Option<Self> {
        let mut next = self.clone();
        next.click(pos).then_some(next)
    }

    /// Plays every move of `path` in order. Returns `false` as soon as a move
    /// cannot be played.
    pub fn play_all<'a>(&mut self, path: impl IntoIterator<Item = &'a Position>) -> bool {
        path.into_iter().all(|&pos| self.click(pos))
    }

    /// Returns `true` if every tile shows the same color.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        effect::is_solved(&self.grid)
    }

    /// Returns the canonical encoding of color count, grid, power tiles and
    /// lock counters.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        format!(
            "{}#{}|{}|{}",
            self.color_count,
            self.grid.canonical_key(),
            self.power.canonical_key(),
            self.locked.canonical_key()
        )
    }

    /// Splits the board into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Grid, u8, PowerSet, LockedMap) {
        (self.grid, self.color_count, self.power, self.locked)
    }
}

#[derive(Deserialize)]
struct BoardRepr {
    grid: Grid,
    color_count: u8,
    #[serde(default)]
    power: PowerSet,
    #[serde(default)]
    locked: LockedMap,
}

impl TryFrom<BoardRepr> for Board {
    type Error = BoardError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        Self::try_new(repr.grid, repr.color_count, repr.power, repr.locked)
    }
}
