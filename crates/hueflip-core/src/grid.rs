//! Square color grids.

use std::{
    fmt::{self, Display, Write as _},
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

use crate::Position;

/// A square grid of color indices.
///
/// Cells are stored row-major. Every cell holds a color index in
/// `[0, color_count)`; the color count itself belongs to the puzzle, not the
/// grid, so [`Grid::check_colors`] validates a grid against it.
///
/// Grids serialize as a list of rows, the shape used by save files.
///
/// # Examples
///
/// ```
/// use hueflip_core::{Grid, Position};
///
/// let mut grid = Grid::new(3);
/// assert!(grid.is_uniform());
///
/// grid[Position::new(1, 1)] = 2;
/// assert!(!grid.is_uniform());
/// assert_eq!(grid.canonical_key(), "0,0,0/0,2,0/0,0,0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<u8>>", try_from = "Vec<Vec<u8>>")]
pub struct Grid {
    size: u8,
    cells: Vec<u8>,
}

/// Errors produced when building or validating a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridError {
    /// The grid has no rows or more rows than [`Grid::MAX_SIZE`].
    #[display("grid size {size} is outside 1..={}", Grid::MAX_SIZE)]
    InvalidSize {
        /// Number of rows supplied.
        size: usize,
    },
    /// A row does not have as many cells as the grid has rows.
    #[display("row {row} has {len} cells, expected {expected}")]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Length of the offending row.
        len: usize,
        /// Expected row length.
        expected: usize,
    },
    /// A cell holds a color index outside `[0, color_count)`.
    #[display("cell {pos} has color {color}, expected a value below {color_count}")]
    ColorOutOfRange {
        /// Offending cell.
        pos: Position,
        /// Color found in the cell.
        color: u8,
        /// Color count of the puzzle.
        color_count: u8,
    },
}

impl Grid {
    /// Largest supported grid side length.
    pub const MAX_SIZE: u8 = 20;

    /// Creates a grid of the given size with every cell set to color `0`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or larger than [`Grid::MAX_SIZE`].
    #[must_use]
    pub fn new(size: u8) -> Self {
        Self::filled(size, 0)
    }

    /// Creates a grid of the given size with every cell set to `color`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or larger than [`Grid::MAX_SIZE`].
    #[must_use]
    pub fn filled(size: u8, color: u8) -> Self {
        assert!(
            (1..=Self::MAX_SIZE).contains(&size),
            "Invalid grid size: {size}"
        );
        let len = usize::from(size) * usize::from(size);
        Self {
            size,
            cells: vec![color; len],
        }
    }

    /// Builds a grid from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] if there are no rows or too many, and
    /// [`GridError::NotSquare`] if a row length differs from the row count.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let size = rows.len();
        let size_u8 = u8::try_from(size)
            .ok()
            .filter(|s| (1..=Self::MAX_SIZE).contains(s))
            .ok_or(GridError::InvalidSize { size })?;
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            cells.extend(values);
        }
        Ok(Self {
            size: size_u8,
            cells,
        })
    }

    /// Returns the side length of the grid.
    #[must_use]
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the color at `pos`, or `None` if it is out of bounds.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<u8> {
        pos.is_within(self.size)
            .then(|| self.cells[pos.index(self.size)])
    }

    /// Returns `true` if `pos` lies inside the grid.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.is_within(self.size)
    }

    /// Iterates over every position of the grid in row-major order.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = Position> + Clone + use<> {
        Position::all(self.size)
    }

    /// Iterates over `(position, color)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, u8)> + '_ {
        self.positions().zip(self.cells.iter().copied())
    }

    /// Returns the raw row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Returns the grid as a list of rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(usize::from(self.size))
            .map(<[u8]>::to_vec)
            .collect()
    }

    /// Returns `true` if every cell holds the same color.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.cells.windows(2).all(|w| w[0] == w[1])
    }

    /// Checks that every cell holds a color below `color_count`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ColorOutOfRange`] for the first offending cell.
    pub fn check_colors(&self, color_count: u8) -> Result<(), GridError> {
        match self.iter().find(|&(_, color)| color >= color_count) {
            Some((pos, color)) => Err(GridError::ColorOutOfRange {
                pos,
                color,
                color_count,
            }),
            None => Ok(()),
        }
    }

    /// Returns the canonical string encoding of the grid.
    ///
    /// Rows are joined with `/` and cells with `,`. Two grids are equal exactly
    /// when their canonical keys are equal.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        let mut key = String::with_capacity(self.cells.len() * 2);
        for (i, row) in self.cells.chunks(usize::from(self.size)).enumerate() {
            if i > 0 {
                key.push('/');
            }
            for (j, color) in row.iter().enumerate() {
                if j > 0 {
                    key.push(',');
                }
                let _ = write!(key, "{color}");
            }
        }
        key
    }
}

impl Index<Position> for Grid {
    type Output = u8;

    fn index(&self, pos: Position) -> &u8 {
        assert!(pos.is_within(self.size), "Position {pos} is out of bounds");
        &self.cells[pos.index(self.size)]
    }
}

impl IndexMut<Position> for Grid {
    fn index_mut(&mut self, pos: Position) -> &mut u8 {
        assert!(pos.is_within(self.size), "Position {pos} is out of bounds");
        &mut self.cells[pos.index(self.size)]
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.chunks(usize::from(self.size)).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, color) in row.iter().enumerate() {
                if j > 0 {
                    f.write_char(' ')?;
                }
                write!(f, "{color}")?;
            }
        }
        Ok(())
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_validates_shape() {
        assert_eq!(
            Grid::from_rows(vec![]),
            Err(GridError::InvalidSize { size: 0 })
        );
        assert_eq!(
            Grid::from_rows(vec![vec![0, 0], vec![0]]),
            Err(GridError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            })
        );
        let too_big = vec![vec![0; 21]; 21];
        assert_eq!(
            Grid::from_rows(too_big),
            Err(GridError::InvalidSize { size: 21 })
        );

        let grid = Grid::from_rows(vec![vec![0, 1], vec![2, 3]]).unwrap();
        assert_eq!(grid.size(), 2);
        assert_eq!(grid[Position::new(1, 0)], 2);
        assert_eq!(grid.to_rows(), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_check_colors() {
        let grid = Grid::from_rows(vec![vec![0, 1], vec![2, 1]]).unwrap();
        assert!(grid.check_colors(3).is_ok());
        assert_eq!(
            grid.check_colors(2),
            Err(GridError::ColorOutOfRange {
                pos: Position::new(1, 0),
                color: 2,
                color_count: 2
            })
        );
    }

    #[test]
    fn test_get_out_of_bounds_is_none() {
        let grid = Grid::new(3);
        assert_eq!(grid.get(Position::new(2, 2)), Some(0));
        assert_eq!(grid.get(Position::new(3, 0)), None);
        assert!(!grid.contains(Position::new(0, 3)));
    }

    #[test]
    fn test_uniform_and_display() {
        let grid = Grid::filled(2, 1);
        assert!(grid.is_uniform());
        assert_eq!(grid.to_string(), "1 1\n1 1");

        let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]]).unwrap();
        assert!(!grid.is_uniform());
        assert_eq!(grid.canonical_key(), "1,0/0,0");
    }

    #[test]
    fn test_serde_rows() {
        let grid = Grid::from_rows(vec![vec![0, 1], vec![1, 0]]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, "[[0,1],[1,0]]");
        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        assert!(serde_json::from_str::<Grid>("[[0,1],[1]]").is_err());
    }
}
