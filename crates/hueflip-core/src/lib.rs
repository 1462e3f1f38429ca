//! Core data structures for the Hueflip puzzle engine.
//!
//! Hueflip is played on a square grid of colored tiles. Clicking a tile rotates
//! the color of that tile and its neighbors to the next color; the puzzle is
//! solved when every tile shows the same color.
//!
//! # Overview
//!
//! - [`position`]: click targets ([`Position`]), displayed as `"row-col"`.
//! - [`grid`]: the square color grid ([`Grid`]) and its validation.
//! - [`tiles`]: special tiles, power tiles ([`PowerSet`]) and locked tiles
//!   ([`LockedMap`]).
//! - [`effect`]: the click/effect model shared by generation, solving and play.
//! - [`board`]: a [`Board`] bundles a grid with its color count and special
//!   tiles, and applies complete player moves.
//!
//! # Examples
//!
//! ```
//! use hueflip_core::{Board, Grid, Position};
//!
//! let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]])?;
//! let mut board = Board::new(grid, 2);
//!
//! board.click(Position::new(0, 0));
//! assert_eq!(board.grid().to_rows(), vec![vec![0, 1], vec![1, 0]]);
//! assert!(!board.is_solved());
//! # Ok::<(), hueflip_core::GridError>(())
//! ```

pub mod board;
pub mod effect;
pub mod grid;
pub mod position;
pub mod tiles;

pub use self::{
    board::{Board, BoardError},
    effect::{
        AffectedCells, affected_cells, apply_click, apply_click_in_place,
        apply_inverse_click_in_place, is_solved, next_color, previous_color,
    },
    grid::{Grid, GridError},
    position::{Position, PositionParseError},
    tiles::{LockedMap, PowerSet},
};
