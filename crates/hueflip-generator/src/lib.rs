//! Puzzle generation for Hueflip.
//!
//! Puzzles are generated backwards: starting from a solved grid, the generator
//! applies the inverse of a number of clicks. Playing those clicks forward in
//! reverse order solves the puzzle, so every generated puzzle comes with a
//! certified solution of known length.
//!
//! # Overview
//!
//! - [`DifficultyProfile`]: grid size, color count and move count for a level.
//! - [`PuzzleGenerator`]: builds a [`GeneratedPuzzle`] for a level, optionally
//!   from a [`PuzzleSeed`] for reproducibility.
//! - [`tutorial`]: hand-designed patterns used for the first levels.
//!
//! # Examples
//!
//! ```
//! use hueflip_generator::{PuzzleGenerator, PuzzleSeed};
//!
//! let generator = PuzzleGenerator::new();
//! let seed = PuzzleSeed::from_bytes([7; 32]);
//! let puzzle = generator.generate_with_seed(12, seed)?;
//!
//! assert_eq!(puzzle.level(), 12);
//! assert_eq!(puzzle.seed, seed);
//! assert!(puzzle.verify_solution());
//! # Ok::<(), hueflip_generator::GenerateError>(())
//! ```

pub use self::{
    difficulty::DifficultyProfile,
    generator::{
        GenerateError, GeneratedPuzzle, GeneratorConfig, PuzzleGenerator, PuzzleSource,
    },
    seed::{PuzzleSeed, SeedParseError},
    tutorial::{
        BuiltinTutorials, LAST_TUTORIAL_LEVEL, NoTutorials, TutorialPattern, TutorialPatterns,
        is_tutorial_level,
    },
};

mod difficulty;
mod generator;
mod seed;
pub mod tutorial;
