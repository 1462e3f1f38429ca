//! A play session tying generation, constraints, solvability checks and
//! persistence to the [`SessionState`] machine.

use std::{collections::BTreeMap, num::NonZero};

use hueflip_core::{Board, Grid, Position};
use hueflip_generator::{
    DifficultyProfile, GenerateError, GeneratedPuzzle, PuzzleGenerator, PuzzleSeed,
};
use hueflip_solver::{BfsSolver, RecoveryStrategy, SolvabilityGuarantee, Verification};

use crate::{
    Action, ConstraintManager, Constraints, GameStats, GameStore, LevelSetup, Outcome,
    PauseReason, PerformanceRecord, Phase, ResumeSetup, SAVE_VERSION, SavedGame, SavedGameState,
    SessionState, StoreError, UndoStack, unix_now,
};

/// Tunables of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Moves between live solvability checks.
    pub live_check_interval: NonZero<u32>,
    /// Seconds between autosaves.
    pub autosave_interval: NonZero<u32>,
    /// Undo snapshots kept per level.
    pub undo_capacity: NonZero<usize>,
}

impl SessionSettings {
    /// Default moves between live solvability checks.
    pub const DEFAULT_LIVE_CHECK_INTERVAL: NonZero<u32> = NonZero::new(5).unwrap();
    /// Default seconds between autosaves.
    pub const DEFAULT_AUTOSAVE_INTERVAL: NonZero<u32> = NonZero::new(30).unwrap();
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            live_check_interval: Self::DEFAULT_LIVE_CHECK_INTERVAL,
            autosave_interval: Self::DEFAULT_AUTOSAVE_INTERVAL,
            undo_capacity: UndoStack::<()>::DEFAULT_CAPACITY,
        }
    }
}

/// Error returned by [`Session`] operations that generate or load levels.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    /// The level could not be generated.
    #[display("{_0}")]
    Generate(#[from] GenerateError),
    /// The save could not be loaded.
    #[display("{_0}")]
    Store(#[from] StoreError),
}

/// Per-level bookkeeping that the state machine does not track.
#[derive(Debug, Clone)]
struct Attempt {
    level: u32,
    attempts: u32,
    target_grid: Grid,
    constraints: Constraints,
    recorded: bool,
}

/// A run of levels for one player.
///
/// # Examples
///
/// ```
/// use hueflip_core::Position;
/// use hueflip_game::{MemoryStore, Outcome, Session};
///
/// let mut session = Session::new(Box::new(MemoryStore::new()));
/// session.start_level(1)?;
///
/// // The first level is solved by clicking the center tile.
/// let Outcome::Scored(breakdown) = session.click(Position::new(1, 1)) else {
///     panic!("level 1 should be solved by one click");
/// };
/// assert_eq!(breakdown.total_points, 270);
/// assert_eq!(session.saved_state().current_level, 2);
/// # Ok::<(), hueflip_game::SessionError>(())
/// ```
#[derive(Debug)]
pub struct Session {
    settings: SessionSettings,
    state: SessionState,
    generator: PuzzleGenerator,
    solver: BfsSolver,
    constraint_manager: ConstraintManager,
    guarantee: SolvabilityGuarantee,
    store: Box<dyn GameStore>,
    attempt: Option<Attempt>,
    level_points: BTreeMap<u32, u32>,
    stats: GameStats,
    moves_since_check: u32,
    last_verification: Option<Verification>,
}

impl Session {
    /// Creates a session with default collaborators, persisting to `store`.
    #[must_use]
    pub fn new(store: Box<dyn GameStore>) -> Self {
        Self::with_parts(
            SessionSettings::default(),
            PuzzleGenerator::new(),
            BfsSolver::new(),
            SolvabilityGuarantee::new(),
            store,
        )
    }

    /// Creates a session from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        settings: SessionSettings,
        generator: PuzzleGenerator,
        solver: BfsSolver,
        guarantee: SolvabilityGuarantee,
        store: Box<dyn GameStore>,
    ) -> Self {
        Self {
            settings,
            state: SessionState::with_undo_capacity(settings.undo_capacity),
            generator,
            solver,
            constraint_manager: ConstraintManager::new(),
            guarantee,
            store,
            attempt: None,
            level_points: BTreeMap::new(),
            stats: GameStats::default(),
            moves_since_check: 0,
            last_verification: None,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Returns the state machine.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the constraint manager.
    #[must_use]
    pub fn constraint_manager(&self) -> &ConstraintManager {
        &self.constraint_manager
    }

    /// Returns the solvability guarantee.
    #[must_use]
    pub fn guarantee(&self) -> &SolvabilityGuarantee {
        &self.guarantee
    }

    /// Returns the constraints of the current level.
    #[must_use]
    pub fn constraints(&self) -> Option<&Constraints> {
        self.attempt.as_ref().map(|a| &a.constraints)
    }

    /// Returns the number of attempts on the current level.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempt.as_ref().map_or(0, |a| a.attempts)
    }

    /// Returns the best score of every completed level.
    #[must_use]
    pub fn level_points(&self) -> &BTreeMap<u32, u32> {
        &self.level_points
    }

    /// Returns the play statistics.
    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Returns the result of the latest solvability check.
    #[must_use]
    pub fn last_verification(&self) -> Option<Verification> {
        self.last_verification
    }

    /// Starts `level` with a freshly generated puzzle.
    ///
    /// An unfinished previous level is recorded as a failed attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the level could not be generated.
    pub fn start_level(&mut self, level: u32) -> Result<Constraints, GenerateError> {
        self.start_level_with_seed(level, PuzzleSeed::random())
    }

    /// Starts `level` with the puzzle generated from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the level could not be generated.
    pub fn start_level_with_seed(
        &mut self,
        level: u32,
        seed: PuzzleSeed,
    ) -> Result<Constraints, GenerateError> {
        let puzzle = self.generator.generate_with_seed(level, seed)?;
        self.abandon_attempt();

        let attempts = match &self.attempt {
            Some(prev) if prev.level == puzzle.level() => prev.attempts + 1,
            _ => 1,
        };
        let constraints = self
            .constraint_manager
            .constraints_for_level(puzzle.level(), path_len(&puzzle.optimal_path));
        if let Some(message) = &constraints.tutorial_message {
            log::info!("level {}: {message}", puzzle.level());
        }

        let setup = LevelSetup::new(&puzzle, &constraints);
        self.state.dispatch(Action::NewGame(Box::new(setup)));
        self.begin_attempt(&puzzle, constraints.clone(), attempts);
        self.stats.games_played += 1;
        Ok(constraints)
    }

    /// Starts the level after the current one, or level 1 when idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the level could not be generated.
    pub fn next_level(&mut self) -> Result<Constraints, GenerateError> {
        let next = self.state.level().saturating_add(1).max(1);
        self.start_level(next)
    }

    /// Restores progress from the store.
    ///
    /// A level in progress is resumed as saved; otherwise the saved current
    /// level starts with a new puzzle. Returns `false` if there is no save.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be read, describes a level that
    /// cannot be played, or the level cannot be generated. A rejected save
    /// leaves the session untouched.
    pub fn continue_saved(&mut self) -> Result<bool, SessionError> {
        let Some(saved) = self.store.load()? else {
            return Ok(false);
        };
        let SavedGameState {
            current_level,
            total_points,
            level_points,
            completed_levels,
            stats,
            current_game,
            ..
        } = saved;
        let profile = DifficultyProfile::for_level(current_level);
        let current_game = current_game
            .map(|game| {
                let boards = game.boards(profile.color_count)?;
                Ok::<_, StoreError>((game, boards))
            })
            .transpose()?;
        self.level_points = level_points;
        self.stats = stats.unwrap_or_default();
        self.attempt = None;

        let resume = if let Some((game, boards)) = current_game {
            self.resume_setup(&profile, game, boards, total_points, completed_levels)
        } else {
            let puzzle = self.generator.generate(profile.level)?;
            let constraints = self
                .constraint_manager
                .constraints_for_level(puzzle.level(), path_len(&puzzle.optimal_path));
            let setup = LevelSetup::new(&puzzle, &constraints);
            self.begin_attempt(&puzzle, constraints, 1);
            self.stats.games_played += 1;
            ResumeSetup {
                board: setup.board.clone(),
                setup,
                moves: 0,
                time: 0,
                undo_count: 0,
                hints_used: 0,
                player_moves: vec![],
                total_points,
                completed_levels,
            }
        };
        self.state.dispatch(Action::ContinueGame(Box::new(resume)));
        log::info!("progress restored at level {}", self.state.level());
        Ok(true)
    }

    fn resume_setup(
        &mut self,
        profile: &DifficultyProfile,
        game: SavedGame,
        (initial, board): (Board, Board),
        total_points: u32,
        completed_levels: Vec<u32>,
    ) -> ResumeSetup {
        let SavedGame {
            target_grid,
            moves,
            time,
            optimal_path,
            hints_enabled,
            undo_count,
            player_moves,
            hints_used,
            ..
        } = game;
        let constraints = self
            .constraint_manager
            .constraints_for_level(profile.level, path_len(&optimal_path));
        let hints_allowed = if hints_enabled {
            profile.hints_default.max(hints_used.saturating_add(1))
        } else {
            hints_used
        };
        let setup = LevelSetup {
            level: profile.level,
            board: initial,
            optimal_path,
            move_limit: constraints.move_limit,
            time_limit: constraints.time_limit.or(profile.time_limit),
            undo_limit: constraints.undo_limit,
            hints_allowed,
        };
        self.attempt = Some(Attempt {
            level: profile.level,
            attempts: 1,
            target_grid,
            constraints,
            recorded: false,
        });
        self.moves_since_check = 0;
        self.last_verification = None;
        ResumeSetup {
            setup,
            board,
            moves,
            time,
            undo_count,
            hints_used,
            player_moves,
            total_points,
            completed_levels,
        }
    }

    /// Plays a move: the click, one lock decrement and, every few moves, a
    /// live solvability check. Solving the board scores the level and saves.
    pub fn click(&mut self, pos: Position) -> Outcome {
        match self.state.dispatch(Action::Click(pos)) {
            Outcome::Applied => {
                self.state.dispatch(Action::LockDecrement);
                self.moves_since_check += 1;
                if self.moves_since_check >= self.settings.live_check_interval.get() {
                    self.moves_since_check = 0;
                    if let Some(result) = self.verify()
                        && !result.solvable
                    {
                        log::warn!(
                            "level {} is no longer solvable after move {}",
                            self.state.level(),
                            self.state.moves()
                        );
                    }
                }
                Outcome::Applied
            }
            Outcome::Solved => {
                let outcome = self.state.dispatch(Action::Win);
                if let Outcome::Scored(breakdown) = outcome {
                    let best = self.level_points.entry(self.state.level()).or_default();
                    *best = (*best).max(breakdown.total_points);
                    self.finish_attempt(true);
                    self.persist();
                }
                outcome
            }
            outcome => outcome,
        }
    }

    /// Advances the clock by one second, autosaving periodically. Running out
    /// of time records a failed attempt.
    pub fn tick(&mut self) -> Outcome {
        let outcome = self.state.dispatch(Action::Tick);
        match outcome {
            Outcome::Applied => {
                if self.state.time() % self.settings.autosave_interval.get() == 0 {
                    self.persist();
                }
            }
            Outcome::TimeExpired => {
                self.finish_attempt(false);
                self.persist();
            }
            _ => {}
        }
        outcome
    }

    /// Undoes the last move.
    pub fn undo(&mut self) -> Outcome {
        self.state.dispatch(Action::Undo)
    }

    /// Restores the board as generated.
    pub fn reset(&mut self) -> Outcome {
        self.state.dispatch(Action::Reset)
    }

    /// Toggles the player pause.
    pub fn pause(&mut self) -> Outcome {
        self.state.dispatch(Action::Pause)
    }

    /// Spends a hint and returns the suggested move.
    ///
    /// Returns `None` without spending a hint when no hint is left or no move
    /// can be found.
    pub fn hint(&mut self) -> Option<Position> {
        if self.state.phase() != Phase::Active
            || self.state.hints_used() >= self.state.hints_allowed()
        {
            return None;
        }
        let pos = self.suggested_move()?;
        (self.state.dispatch(Action::UseHint) == Outcome::Applied).then_some(pos)
    }

    /// Returns a move leading towards a solution without spending a hint.
    ///
    /// While the player follows the generated solution, its next move is
    /// returned. Otherwise a bounded search runs from the current board. If
    /// the search gives up and no tile was ever locked, the remaining clicks
    /// are derived from the click counts of both move lists.
    #[must_use]
    pub fn suggested_move(&self) -> Option<Position> {
        let board = self.state.board()?;
        if board.is_solved() {
            return None;
        }
        let optimal = self.state.optimal_path();
        let played = self.state.player_moves();
        if played.len() < optimal.len() && optimal.starts_with(played) {
            return Some(optimal[played.len()]);
        }

        let outcome = self.solver.solve(board);
        if let Some(pos) = outcome.first_move() {
            return Some(pos);
        }
        let never_locked = self
            .state
            .initial_board()
            .is_some_and(|initial| initial.locked().is_empty());
        if outcome.exhausted && never_locked {
            log::debug!("search exhausted, using the residual click counts");
            return residual_move(board, optimal, played);
        }
        None
    }

    /// Checks whether the current board is still solvable.
    ///
    /// The rest of the generated solution is used as the known path while the
    /// player follows it.
    pub fn verify(&mut self) -> Option<Verification> {
        let board = self.state.board()?;
        let optimal = self.state.optimal_path();
        let played = self.state.player_moves();
        let known_path = if optimal.starts_with(played) {
            &optimal[played.len()..]
        } else {
            &[]
        };
        let result = self.guarantee.verify(board, known_path);
        self.last_verification = Some(result);
        Some(result)
    }

    /// Lists the ways back to a solvable board, most preferred first.
    #[must_use]
    pub fn recovery_strategies(&self) -> Vec<RecoveryStrategy> {
        match (self.state.board(), self.state.initial_board()) {
            (Some(current), Some(original)) => {
                self.guarantee
                    .recovery_strategies(current, original, self.state.player_moves())
            }
            _ => vec![],
        }
    }

    /// Executes a recovery strategy.
    ///
    /// Returns the suggested move for [`RecoveryStrategy::Hint`].
    ///
    /// # Errors
    ///
    /// Returns an error if a new puzzle could not be generated.
    pub fn apply_recovery(
        &mut self,
        strategy: RecoveryStrategy,
    ) -> Result<Option<Position>, GenerateError> {
        log::info!("level {}: {strategy}", self.state.level());
        match strategy {
            RecoveryStrategy::Revert => {
                self.reset();
                Ok(None)
            }
            RecoveryStrategy::Regenerate => {
                self.start_level(self.state.level())?;
                Ok(None)
            }
            RecoveryStrategy::Hint => Ok(self.hint()),
        }
    }

    /// Saves progress now. Failures are logged.
    pub fn save(&mut self) {
        self.persist();
    }

    /// Deletes the save.
    ///
    /// # Errors
    ///
    /// Returns an error if the save could not be deleted.
    pub fn clear_save(&mut self) -> Result<(), StoreError> {
        self.store.clear()
    }

    /// Returns the progress as it would be saved.
    #[must_use]
    pub fn saved_state(&self) -> SavedGameState {
        let level = self.state.level().max(1);
        let (current_level, current_game) = match self.state.phase() {
            Phase::Won(_) => (level.saturating_add(1), None),
            Phase::Active | Phase::Paused(PauseReason::Player) => (level, self.saved_game()),
            Phase::Idle | Phase::Paused(PauseReason::TimeExpired) => (level, None),
        };
        SavedGameState {
            current_level,
            total_points: self.state.total_points(),
            level_points: self.level_points.clone(),
            completed_levels: self.state.completed_levels().to_vec(),
            last_played: unix_now(),
            version: SAVE_VERSION,
            stats: Some(self.stats.clone()),
            current_game,
        }
    }

    fn saved_game(&self) -> Option<SavedGame> {
        let board = self.state.board()?;
        let initial = self.state.initial_board()?;
        let attempt = self.attempt.as_ref()?;
        Some(SavedGame {
            grid: board.grid().clone(),
            target_grid: attempt.target_grid.clone(),
            moves: self.state.moves(),
            time: self.state.time(),
            optimal_path: self.state.optimal_path().to_vec(),
            hints_enabled: self.state.hints_used() < self.state.hints_allowed(),
            undo_count: self.state.undo_count(),
            player_moves: self.state.player_moves().to_vec(),
            initial_grid: initial.grid().clone(),
            power: board.power().clone(),
            locked: board.locked().clone(),
            initial_locked: initial.locked().clone(),
            color_count: Some(board.color_count()),
            hints_used: self.state.hints_used(),
        })
    }

    fn persist(&mut self) {
        let saved = self.saved_state();
        if let Err(err) = self.store.save(&saved) {
            log::warn!("failed to save progress: {err}");
        }
    }

    fn begin_attempt(&mut self, puzzle: &GeneratedPuzzle, constraints: Constraints, attempts: u32) {
        self.attempt = Some(Attempt {
            level: puzzle.level(),
            attempts,
            target_grid: puzzle.solved.clone(),
            constraints,
            recorded: false,
        });
        self.moves_since_check = 0;
        self.last_verification = None;
    }

    fn abandon_attempt(&mut self) {
        if matches!(self.state.phase(), Phase::Active | Phase::Paused(_)) {
            self.finish_attempt(false);
        }
    }

    fn finish_attempt(&mut self, completed: bool) {
        let Some(attempt) = &mut self.attempt else {
            return;
        };
        if attempt.recorded {
            return;
        }
        attempt.recorded = true;
        let record = PerformanceRecord {
            level: attempt.level,
            attempts: attempt.attempts,
            completed,
            moves_used: self.state.moves(),
            optimal_moves: path_len(self.state.optimal_path()),
            time_used: self.state.time(),
            hints_used: self.state.hints_used(),
        };
        self.constraint_manager.record(record);

        if completed {
            self.stats.games_won += 1;
        }
        self.stats.total_moves += u64::from(record.moves_used);
        self.stats.total_time += u64::from(record.time_used);
        self.stats.hints_used += record.hints_used;
    }
}

fn path_len(path: &[Position]) -> u32 {
    u32::try_from(path.len()).unwrap_or(u32::MAX)
}

/// Returns the first cell, in row-major order, still needing clicks to reach
/// the state produced by `optimal` from the board `played` was applied to.
fn residual_move(board: &Board, optimal: &[Position], played: &[Position]) -> Option<Position> {
    let size = board.size();
    let cc = u32::from(board.color_count());
    let mut counts = vec![0u32; board.grid().cell_count()];
    for pos in optimal {
        let count = &mut counts[pos.index(size)];
        *count = (*count + 1) % cc;
    }
    for pos in played {
        let count = &mut counts[pos.index(size)];
        *count = (*count + cc - 1) % cc;
    }
    Position::all(size).find(|pos| counts[pos.index(size)] != 0)
}
