//! Seeded puzzle generation by reverse moves.

use hueflip_core::{Board, Grid, LockedMap, Position, PowerSet, effect};
use rand::{
    SeedableRng as _,
    seq::{IndexedRandom as _, SliceRandom as _},
};
use rand_pcg::Pcg64;

use crate::{
    DifficultyProfile, PuzzleSeed,
    tutorial::{BuiltinTutorials, TutorialPattern, TutorialPatterns},
};

/// Where a generated puzzle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PuzzleSource {
    /// The fixed single-click introduction level.
    #[display("intro")]
    Intro,
    /// A hand-designed tutorial pattern.
    #[display("tutorial")]
    Tutorial,
    /// Reverse-move generation.
    #[display("generated")]
    Generated,
}

/// A generated puzzle with its certified solution.
///
/// Applying [`optimal_path`](Self::optimal_path) in order to
/// [`grid`](Self::grid) yields [`solved`](Self::solved). This holds by
/// construction and is re-checked before a puzzle is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPuzzle {
    /// Difficulty profile the puzzle was built for.
    pub profile: DifficultyProfile,
    /// Scrambled grid presented to the player.
    pub grid: Grid,
    /// Grid reached by the solution.
    pub solved: Grid,
    /// Number of colors.
    pub color_count: u8,
    /// Power tiles.
    pub power: PowerSet,
    /// Locked tiles and their counters.
    pub locked: LockedMap,
    /// Moves applied in reverse to the solved grid, in application order.
    pub generation_history: Vec<Position>,
    /// `generation_history` reversed: the solution in play order.
    pub optimal_path: Vec<Position>,
    /// Same as `optimal_path`.
    pub solution: Vec<Position>,
    /// Seed the puzzle was generated from.
    pub seed: PuzzleSeed,
    /// Origin of the puzzle.
    pub source: PuzzleSource,
}

impl GeneratedPuzzle {
    /// Returns the level number.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.profile.level
    }

    /// Returns the initial board of the puzzle.
    #[must_use]
    pub fn board(&self) -> Board {
        Board::with_tiles(
            self.grid.clone(),
            self.color_count,
            self.power.clone(),
            self.locked.clone(),
        )
    }

    /// Returns `true` if the optimal path solves the initial board.
    #[must_use]
    pub fn verify_solution(&self) -> bool {
        let mut board = self.board();
        board.play_all(&self.optimal_path) && board.is_solved()
    }
}

/// Error returned when no puzzle could be generated.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenerateError {
    /// Every generation attempt for the level failed.
    #[display("could not generate level {level} after {attempts} attempts")]
    AttemptsExhausted {
        /// Level being generated.
        level: u32,
        /// Number of attempts made.
        attempts: u32,
    },
}

/// Tunables of the reverse-move generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Attempts before generation fails.
    pub max_attempts: u32,
    /// Share of moves, in percent, that prefer never-used coordinates.
    pub spread_percent: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            spread_percent: 60,
        }
    }
}

/// Reverse-move puzzle generator.
///
/// Puzzles are built by applying the inverse of `required_moves` clicks to a
/// solved grid, so the reversed sequence of clicks is a solution whose length
/// is known in advance.
///
/// # Example
///
/// ```
/// use hueflip_core::Position;
/// use hueflip_generator::PuzzleGenerator;
///
/// let generator = PuzzleGenerator::new();
/// let puzzle = generator.generate(1)?;
///
/// assert_eq!(puzzle.grid.size(), 3);
/// assert_eq!(puzzle.optimal_path, vec![Position::new(1, 1)]);
/// assert!(puzzle.verify_solution());
/// # Ok::<(), hueflip_generator::GenerateError>(())
/// ```
#[derive(Debug)]
pub struct PuzzleGenerator {
    config: GeneratorConfig,
    tutorials: Box<dyn TutorialPatterns>,
}

impl Default for PuzzleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleGenerator {
    /// Creates a generator with the default configuration and built-in tutorials.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default(), Box::new(BuiltinTutorials))
    }

    /// Creates a generator with a custom configuration and tutorial source.
    #[must_use]
    pub fn with_config(config: GeneratorConfig, tutorials: Box<dyn TutorialPatterns>) -> Self {
        Self { config, tutorials }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Returns `true` if `level` is served by a tutorial pattern.
    #[must_use]
    pub fn is_tutorial_level(&self, level: u32) -> bool {
        self.tutorials.is_tutorial_level(level)
    }

    /// Generates `level` from a fresh random seed.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::AttemptsExhausted`] if every attempt failed.
    pub fn generate(&self, level: u32) -> Result<GeneratedPuzzle, GenerateError> {
        self.generate_with_seed(level, PuzzleSeed::random())
    }

    /// Generates `level` reproducibly from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::AttemptsExhausted`] if every attempt failed.
    pub fn generate_with_seed(
        &self,
        level: u32,
        seed: PuzzleSeed,
    ) -> Result<GeneratedPuzzle, GenerateError> {
        let profile = DifficultyProfile::for_level(level);

        if profile.level == 1 {
            return Ok(intro_puzzle(profile, seed));
        }

        if let Some(pattern) = self.tutorials.pattern(profile.level) {
            match tutorial_puzzle(profile, seed, pattern) {
                Some(puzzle) => return Ok(puzzle),
                None => log::warn!(
                    "tutorial pattern for level {} is not solved by its solution, generating instead",
                    profile.level
                ),
            }
        }

        self.generate_for_profile(&profile, seed)
    }

    /// Runs reverse-move generation for an explicit profile.
    ///
    /// Unlike [`generate_with_seed`](Self::generate_with_seed), no intro or
    /// tutorial special case applies.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::AttemptsExhausted`] if every attempt failed.
    pub fn generate_for_profile(
        &self,
        profile: &DifficultyProfile,
        seed: PuzzleSeed,
    ) -> Result<GeneratedPuzzle, GenerateError> {
        for attempt in 0..self.config.max_attempts {
            let mut rng = Pcg64::from_seed(*seed.for_attempt(attempt).as_bytes());
            match self.try_generate(profile, &mut rng) {
                Some((grid, power, locked, history)) => {
                    let puzzle = assemble(
                        *profile,
                        grid,
                        power,
                        locked,
                        history,
                        seed,
                        PuzzleSource::Generated,
                    );
                    if !puzzle.verify_solution() {
                        log::error!(
                            "level {} attempt {attempt}: optimal path does not solve the puzzle",
                            profile.level
                        );
                        continue;
                    }
                    log::debug!(
                        "generated level {} ({}x{}, {} colors, {} moves) on attempt {attempt}",
                        profile.level,
                        profile.grid_size,
                        profile.grid_size,
                        profile.color_count,
                        puzzle.optimal_path.len(),
                    );
                    return Ok(puzzle);
                }
                None => {
                    log::debug!("level {} attempt {attempt} rejected", profile.level);
                }
            }
        }

        Err(GenerateError::AttemptsExhausted {
            level: profile.level,
            attempts: self.config.max_attempts,
        })
    }

    fn try_generate(
        &self,
        profile: &DifficultyProfile,
        rng: &mut Pcg64,
    ) -> Option<(Grid, PowerSet, LockedMap, Vec<Position>)> {
        let size = profile.grid_size;
        let color_count = profile.color_count;
        let max_uses = color_count - 1;
        let positions = Position::all(size).collect::<Vec<_>>();

        let power = place_power_tiles(&positions, profile.power_tile_count, rng);

        let required = usize::try_from(profile.required_moves).ok()?;
        let spread_moves = (profile.required_moves * self.config.spread_percent).div_ceil(100);
        let spread_moves = usize::try_from(spread_moves).ok()?;

        let mut grid = Grid::new(size);
        let mut uses = vec![0u8; positions.len()];
        let mut history = Vec::with_capacity(required);
        let mut candidates = positions.clone();

        for i in 0..required {
            candidates.shuffle(rng);
            let usable = |pos: &&Position| uses[pos.index(size)] < max_uses;
            let unused = |pos: &&Position| uses[pos.index(size)] == 0;
            let picked = if i < spread_moves {
                candidates
                    .iter()
                    .find(unused)
                    .or_else(|| candidates.iter().find(usable))
            } else {
                candidates.iter().find(usable)
            };
            let &pos = picked?;

            uses[pos.index(size)] += 1;
            effect::apply_inverse_click_in_place(&mut grid, pos, color_count, power.contains(pos));
            history.push(pos);
        }

        if grid.is_uniform() {
            // The moves cancelled out; a puzzle must not start solved.
            return None;
        }

        let locked = place_locked_tiles(&grid, &power, &history, profile.locked_tile_count, rng);
        Some((grid, power, locked, history))
    }
}

fn place_power_tiles(positions: &[Position], count: u32, rng: &mut Pcg64) -> PowerSet {
    if count == 0 {
        return PowerSet::new();
    }
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    let mut shuffled = positions.to_vec();
    shuffled.shuffle(rng);
    shuffled.into_iter().take(count).collect()
}

/// Locks tiles that no solution click touches, with a 2 to 4 move countdown.
///
/// Locking a tile the solution touches would make the known path miss that
/// tile, so only untouched, non-power tiles qualify. Fewer tiles are locked
/// when not enough qualify.
fn place_locked_tiles(
    grid: &Grid,
    power: &PowerSet,
    history: &[Position],
    count: u32,
    rng: &mut Pcg64,
) -> LockedMap {
    if count == 0 {
        return LockedMap::new();
    }
    let size = grid.size();
    let mut touched = vec![false; grid.cell_count()];
    for &pos in history {
        for cell in effect::affected_cells(size, pos, power.contains(pos)) {
            touched[cell.index(size)] = true;
        }
    }
    let mut candidates = grid
        .positions()
        .filter(|pos| !touched[pos.index(size)] && !power.contains(*pos))
        .collect::<Vec<_>>();
    candidates.shuffle(rng);

    let count = usize::try_from(count).unwrap_or(usize::MAX);
    if candidates.len() < count {
        log::debug!(
            "only {} of {count} locked tiles could be placed",
            candidates.len()
        );
    }
    candidates
        .into_iter()
        .take(count)
        .map(|pos| (pos, *[2, 3, 4].choose(rng).unwrap_or(&2)))
        .collect()
}

fn intro_puzzle(profile: DifficultyProfile, seed: PuzzleSeed) -> GeneratedPuzzle {
    let size = profile.grid_size;
    let center = Position::new(size / 2, size / 2);
    let mut grid = Grid::new(size);
    effect::apply_inverse_click_in_place(&mut grid, center, profile.color_count, false);
    assemble(
        profile,
        grid,
        PowerSet::new(),
        LockedMap::new(),
        vec![center],
        seed,
        PuzzleSource::Intro,
    )
}

fn tutorial_puzzle(
    profile: DifficultyProfile,
    seed: PuzzleSeed,
    pattern: TutorialPattern,
) -> Option<GeneratedPuzzle> {
    let TutorialPattern {
        initial_grid,
        target_grid,
        solution,
        color_count,
    } = pattern;
    let mut board = Board::new(initial_grid.clone(), color_count);
    if !board.play_all(&solution) || !board.is_solved() {
        return None;
    }
    let profile = DifficultyProfile {
        grid_size: initial_grid.size(),
        color_count,
        required_moves: u32::try_from(solution.len()).ok()?,
        ..profile
    };
    Some(GeneratedPuzzle {
        profile,
        grid: initial_grid,
        solved: target_grid,
        color_count,
        power: PowerSet::new(),
        locked: LockedMap::new(),
        generation_history: solution.iter().rev().copied().collect(),
        optimal_path: solution.clone(),
        solution,
        seed,
        source: PuzzleSource::Tutorial,
    })
}

fn assemble(
    profile: DifficultyProfile,
    grid: Grid,
    power: PowerSet,
    locked: LockedMap,
    generation_history: Vec<Position>,
    seed: PuzzleSeed,
    source: PuzzleSource,
) -> GeneratedPuzzle {
    let optimal_path = generation_history.iter().rev().copied().collect::<Vec<_>>();
    GeneratedPuzzle {
        profile,
        solved: Grid::new(grid.size()),
        grid,
        color_count: profile.color_count,
        power,
        locked,
        generation_history,
        solution: optimal_path.clone(),
        optimal_path,
        seed,
        source,
    }
}
