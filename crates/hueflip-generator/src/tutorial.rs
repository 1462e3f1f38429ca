//! Hand-designed tutorial levels.
//!
//! Tutorial patterns replace generation entirely for the levels they cover.
//! The set of tutorial levels also matters for scoring: hints are free there.

use std::fmt::Debug;

use hueflip_core::{Grid, Position, effect};

/// Highest level number treated as a tutorial level.
pub const LAST_TUTORIAL_LEVEL: u32 = 3;

/// Returns `true` if `level` is a tutorial level.
#[must_use]
pub fn is_tutorial_level(level: u32) -> bool {
    level <= LAST_TUTORIAL_LEVEL
}

/// A fixed puzzle with its own solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorialPattern {
    /// Grid shown to the player.
    pub initial_grid: Grid,
    /// Grid reached by playing `solution`.
    pub target_grid: Grid,
    /// Moves solving the pattern, in order.
    pub solution: Vec<Position>,
    /// Number of colors.
    pub color_count: u8,
}

impl TutorialPattern {
    /// Builds a pattern solved by `solution`, scrambled from an all-zero grid.
    #[must_use]
    pub fn from_solution(size: u8, color_count: u8, solution: Vec<Position>) -> Self {
        let target_grid = Grid::new(size);
        let mut initial_grid = target_grid.clone();
        for &pos in solution.iter().rev() {
            effect::apply_inverse_click_in_place(&mut initial_grid, pos, color_count, false);
        }
        Self {
            initial_grid,
            target_grid,
            solution,
            color_count,
        }
    }
}

/// Source of tutorial patterns consulted before generating a level.
pub trait TutorialPatterns: Debug + Send + Sync {
    /// Returns `true` if `level` has a hand-designed pattern.
    fn is_tutorial_level(&self, level: u32) -> bool {
        self.pattern(level).is_some()
    }

    /// Returns the pattern for `level`, if any.
    fn pattern(&self, level: u32) -> Option<TutorialPattern>;
}

/// The tutorial patterns shipped with the game.
///
/// Level 1 is produced by the generator itself (a single centered click);
/// levels 2 and 3 introduce multi-click solutions and a third color.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTutorials;

impl TutorialPatterns for BuiltinTutorials {
    fn pattern(&self, level: u32) -> Option<TutorialPattern> {
        match level {
            2 => Some(TutorialPattern::from_solution(
                3,
                2,
                vec![Position::new(0, 0), Position::new(2, 2)],
            )),
            3 => Some(TutorialPattern::from_solution(
                3,
                3,
                vec![Position::new(0, 1), Position::new(2, 1)],
            )),
            _ => None,
        }
    }
}

/// A tutorial source without any pattern.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTutorials;

impl TutorialPatterns for NoTutorials {
    fn pattern(&self, _level: u32) -> Option<TutorialPattern> {
        None
    }
}
