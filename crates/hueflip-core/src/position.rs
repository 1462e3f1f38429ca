//! Click targets on a grid.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// A `(row, col)` coordinate identifying a tile, and therefore a click target.
///
/// Positions are ordered row-major, which keeps sets and maps of positions in
/// reading order. The textual form is `"row-col"`, the same encoding used in
/// save files for power and locked tiles.
///
/// # Examples
///
/// ```
/// use hueflip_core::Position;
///
/// let pos: Position = "2-1".parse()?;
/// assert_eq!(pos, Position::new(2, 1));
/// assert_eq!(pos.to_string(), "2-1");
/// # Ok::<(), hueflip_core::PositionParseError>(())
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Creates a position from a row and a column.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Returns the row index.
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Returns the column index.
    #[must_use]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// Returns `true` if the position lies inside a grid of the given size.
    #[must_use]
    pub const fn is_within(self, size: u8) -> bool {
        self.row < size && self.col < size
    }

    /// Returns the position shifted by `(dr, dc)` if it stays inside a grid of
    /// the given size.
    #[must_use]
    pub fn offset(self, dr: i8, dc: i8, size: u8) -> Option<Self> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let pos = Self::new(row, col);
        pos.is_within(size).then_some(pos)
    }

    /// Returns the row-major cell index of this position in a grid of the given size.
    #[must_use]
    pub fn index(self, size: u8) -> usize {
        usize::from(self.row) * usize::from(size) + usize::from(self.col)
    }

    /// Iterates over every position of a grid of the given size in row-major order.
    pub fn all(size: u8) -> impl DoubleEndedIterator<Item = Self> + Clone {
        (0..size).flat_map(move |row| (0..size).map(move |col| Self::new(row, col)))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Error returned when parsing a [`Position`] from its `"row-col"` form fails.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid position `{input}`, expected `row-col`")]
pub struct PositionParseError {
    input: String,
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PositionParseError {
            input: s.to_owned(),
        };
        let (row, col) = s.split_once('-').ok_or_else(err)?;
        let row = row.trim().parse().map_err(|_| err())?;
        let col = col.trim().parse().map_err(|_| err())?;
        Ok(Self::new(row, col))
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.to_string()
    }
}

impl TryFrom<String> for Position {
    type Error = PositionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<(u8, u8)> for Position {
    fn from((row, col): (u8, u8)) -> Self {
        Self::new(row, col)
    }
}
