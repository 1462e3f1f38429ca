//! The per-level session state machine.
//!
//! [`SessionState::dispatch`] is the only way to change a session. Every
//! action is total: an action that does not apply in the current phase is
//! reported as [`Outcome::Ignored`] with a reason and leaves the state
//! untouched.

use std::num::NonZero;

use hueflip_core::{Board, Position};
use hueflip_generator::GeneratedPuzzle;

use crate::{Constraints, ScoreBreakdown, ScoreInput, UndoStack, score};

/// Why play is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PauseReason {
    /// The player paused.
    #[display("paused")]
    Player,
    /// The time limit was reached.
    #[display("time expired")]
    TimeExpired,
}

/// Phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    /// No level has been started.
    #[default]
    Idle,
    /// The player can make moves.
    Active,
    /// Play is suspended.
    Paused(PauseReason),
    /// The board is solved. Holds the score once it has been computed.
    Won(Option<ScoreBreakdown>),
}

/// Why an action was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IgnoreReason {
    /// The action requires an active level.
    #[display("no active level")]
    NotActive,
    /// The clicked position is outside the grid.
    #[display("position is outside the grid")]
    OutOfBounds,
    /// The clicked tile is locked.
    #[display("tile is locked")]
    Locked,
    /// The move limit has been reached.
    #[display("move limit reached")]
    MoveLimitReached,
    /// There is no move to undo.
    #[display("nothing to undo")]
    NothingToUndo,
    /// The undo limit has been reached.
    #[display("undo limit reached")]
    UndoLimitReached,
    /// Every hint has been used.
    #[display("no hints left")]
    NoHintsLeft,
    /// The board is not solved yet.
    #[display("level is not won")]
    NotWon,
    /// The score has already been computed.
    #[display("level is already scored")]
    AlreadyScored,
    /// Play cannot be resumed after the time limit.
    #[display("time has expired")]
    TimeExpired,
}

/// Result of [`SessionState::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Outcome {
    /// The action changed the state.
    Applied,
    /// The action did not apply.
    Ignored(IgnoreReason),
    /// The click solved the board.
    Solved,
    /// The time limit was reached.
    TimeExpired,
    /// The level was scored.
    Scored(ScoreBreakdown),
}

/// Everything needed to start a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSetup {
    /// Level number.
    pub level: u32,
    /// Board as generated.
    pub board: Board,
    /// Generated solution, in play order.
    pub optimal_path: Vec<Position>,
    /// Maximum number of moves.
    pub move_limit: Option<u32>,
    /// Time limit in seconds.
    pub time_limit: Option<u32>,
    /// Maximum number of undos.
    pub undo_limit: Option<u32>,
    /// Hints available.
    pub hints_allowed: u32,
}

impl LevelSetup {
    /// Builds the setup of a generated puzzle under `constraints`.
    ///
    /// The constraint time limit takes precedence over the profile's.
    #[must_use]
    pub fn new(puzzle: &GeneratedPuzzle, constraints: &Constraints) -> Self {
        Self {
            level: puzzle.level(),
            board: puzzle.board(),
            optimal_path: puzzle.optimal_path.clone(),
            move_limit: constraints.move_limit,
            time_limit: constraints.time_limit.or(puzzle.profile.time_limit),
            undo_limit: constraints.undo_limit,
            hints_allowed: puzzle.profile.hints_default,
        }
    }
}

/// A level in progress, restored from a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeSetup {
    /// The level as generated.
    pub setup: LevelSetup,
    /// Current board.
    pub board: Board,
    /// Moves made.
    pub moves: u32,
    /// Elapsed seconds.
    pub time: u32,
    /// Undos used.
    pub undo_count: u32,
    /// Hints used.
    pub hints_used: u32,
    /// Player moves since the last reset.
    pub player_moves: Vec<Position>,
    /// Accumulated points.
    pub total_points: u32,
    /// Completed levels.
    pub completed_levels: Vec<u32>,
}

/// An action applied to a [`SessionState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start a level, keeping accumulated points.
    NewGame(Box<LevelSetup>),
    /// Resume a saved level.
    ContinueGame(Box<ResumeSetup>),
    /// Click a tile.
    Click(Position),
    /// One second elapsed.
    Tick,
    /// Decrement every lock counter.
    LockDecrement,
    /// Undo the last move.
    Undo,
    /// Restore the generated board.
    Reset,
    /// Spend a hint.
    UseHint,
    /// Score a solved level.
    Win,
    /// Toggle the player pause.
    Pause,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    board: Board,
    moves: u32,
    player_moves: Vec<Position>,
}

/// State of a play session.
///
/// # Examples
///
/// ```
/// use hueflip_core::{Board, Grid, Position};
/// use hueflip_game::{Action, LevelSetup, Outcome, Phase, SessionState};
///
/// let board = Board::new(Grid::from_rows(vec![vec![1, 0], vec![0, 0]])?, 2);
/// let mut state = SessionState::new();
/// state.dispatch(Action::NewGame(Box::new(LevelSetup {
///     level: 4,
///     board,
///     optimal_path: vec![Position::new(1, 1)],
///     move_limit: None,
///     time_limit: None,
///     undo_limit: None,
///     hints_allowed: 3,
/// })));
///
/// assert_eq!(state.dispatch(Action::Click(Position::new(1, 1))), Outcome::Solved);
/// assert!(matches!(state.dispatch(Action::Win), Outcome::Scored(_)));
/// assert!(matches!(state.phase(), Phase::Won(Some(_))));
/// # Ok::<(), hueflip_core::GridError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SessionState {
    phase: Phase,
    level: u32,
    initial_board: Option<Board>,
    board: Option<Board>,
    optimal_path: Vec<Position>,
    moves: u32,
    time: u32,
    undo_history: UndoStack<Snapshot>,
    undo_count: u32,
    max_undos: Option<u32>,
    move_limit: Option<u32>,
    time_limit: Option<u32>,
    hints_used: u32,
    hints_allowed: u32,
    total_points: u32,
    completed_levels: Vec<u32>,
    player_moves: Vec<Position>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_undo_capacity(UndoStack::<Snapshot>::DEFAULT_CAPACITY)
    }

    /// Creates an idle session keeping at most `capacity` undo snapshots.
    #[must_use]
    pub fn with_undo_capacity(capacity: NonZero<usize>) -> Self {
        Self {
            phase: Phase::Idle,
            level: 0,
            initial_board: None,
            board: None,
            optimal_path: vec![],
            moves: 0,
            time: 0,
            undo_history: UndoStack::new(capacity),
            undo_count: 0,
            max_undos: None,
            move_limit: None,
            time_limit: None,
            hints_used: 0,
            hints_allowed: 0,
            total_points: 0,
            completed_levels: vec![],
            player_moves: vec![],
        }
    }

    /// Returns the phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the current level, or 0 before the first level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the current board.
    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Returns the board as generated.
    #[must_use]
    pub fn initial_board(&self) -> Option<&Board> {
        self.initial_board.as_ref()
    }

    /// Returns the generated solution.
    #[must_use]
    pub fn optimal_path(&self) -> &[Position] {
        &self.optimal_path
    }

    /// Returns the number of moves made.
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Returns the elapsed seconds.
    #[must_use]
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Returns the number of undo snapshots.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_history.len()
    }

    /// Returns the number of undos used.
    #[must_use]
    pub fn undo_count(&self) -> u32 {
        self.undo_count
    }

    /// Returns the undo limit.
    #[must_use]
    pub fn max_undos(&self) -> Option<u32> {
        self.max_undos
    }

    /// Returns the move limit.
    #[must_use]
    pub fn move_limit(&self) -> Option<u32> {
        self.move_limit
    }

    /// Returns the time limit.
    #[must_use]
    pub fn time_limit(&self) -> Option<u32> {
        self.time_limit
    }

    /// Returns the number of hints used.
    #[must_use]
    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// Returns the number of hints available for the level.
    #[must_use]
    pub fn hints_allowed(&self) -> u32 {
        self.hints_allowed
    }

    /// Returns the accumulated points.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Returns the completed levels, in completion order.
    #[must_use]
    pub fn completed_levels(&self) -> &[u32] {
        &self.completed_levels
    }

    /// Returns the player's moves since the level started or was reset.
    #[must_use]
    pub fn player_moves(&self) -> &[Position] {
        &self.player_moves
    }

    /// Returns the score of the level once computed.
    #[must_use]
    pub fn score(&self) -> Option<ScoreBreakdown> {
        match self.phase {
            Phase::Won(score) => score,
            _ => None,
        }
    }

    /// Applies `action` and reports what happened.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        match action {
            Action::NewGame(setup) => self.new_game(*setup),
            Action::ContinueGame(resume) => self.continue_game(*resume),
            Action::Click(pos) => self.click(pos),
            Action::Tick => self.tick(),
            Action::LockDecrement => self.lock_decrement(),
            Action::Undo => self.undo(),
            Action::Reset => self.reset(),
            Action::UseHint => self.use_hint(),
            Action::Win => self.win(),
            Action::Pause => self.pause(),
        }
    }

    fn new_game(&mut self, setup: LevelSetup) -> Outcome {
        let LevelSetup {
            level,
            board,
            optimal_path,
            move_limit,
            time_limit,
            undo_limit,
            hints_allowed,
        } = setup;
        log::info!("level {level} started");
        self.phase = Phase::Active;
        self.level = level;
        self.initial_board = Some(board.clone());
        self.board = Some(board);
        self.optimal_path = optimal_path;
        self.moves = 0;
        self.time = 0;
        self.undo_history.clear();
        self.undo_count = 0;
        self.max_undos = undo_limit;
        self.move_limit = move_limit;
        self.time_limit = time_limit;
        self.hints_used = 0;
        self.hints_allowed = hints_allowed;
        self.player_moves.clear();
        Outcome::Applied
    }

    fn continue_game(&mut self, resume: ResumeSetup) -> Outcome {
        let ResumeSetup {
            setup,
            board,
            moves,
            time,
            undo_count,
            hints_used,
            player_moves,
            total_points,
            completed_levels,
        } = resume;
        self.new_game(setup);
        let solved = board.is_solved();
        self.board = Some(board);
        self.moves = moves;
        self.time = time;
        self.undo_count = undo_count;
        self.hints_used = hints_used;
        self.player_moves = player_moves;
        self.total_points = total_points;
        self.completed_levels = completed_levels;
        if solved {
            self.phase = Phase::Won(None);
        }
        log::info!("level {} resumed at move {}", self.level, self.moves);
        Outcome::Applied
    }

    fn click(&mut self, pos: Position) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Ignored(IgnoreReason::NotActive);
        }
        let Some(board) = &mut self.board else {
            return Outcome::Ignored(IgnoreReason::NotActive);
        };
        if !board.grid().contains(pos) {
            return Outcome::Ignored(IgnoreReason::OutOfBounds);
        }
        if board.locked().is_locked(pos) {
            return Outcome::Ignored(IgnoreReason::Locked);
        }
        if self.move_limit.is_some_and(|limit| self.moves >= limit) {
            return Outcome::Ignored(IgnoreReason::MoveLimitReached);
        }

        self.undo_history.push(Snapshot {
            board: board.clone(),
            moves: self.moves,
            player_moves: self.player_moves.clone(),
        });
        board.apply_effect(pos);
        self.moves += 1;
        self.player_moves.push(pos);

        if board.is_solved() {
            log::info!("level {} solved in {} moves", self.level, self.moves);
            self.phase = Phase::Won(None);
            return Outcome::Solved;
        }
        Outcome::Applied
    }

    fn tick(&mut self) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Ignored(IgnoreReason::NotActive);
        }
        self.time += 1;
        if self.time_limit.is_some_and(|limit| self.time >= limit) {
            log::info!("level {} time expired after {}s", self.level, self.time);
            self.phase = Phase::Paused(PauseReason::TimeExpired);
            return Outcome::TimeExpired;
        }
        Outcome::Applied
    }

    fn lock_decrement(&mut self) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Ignored(IgnoreReason::NotActive);
        }
        if let Some(board) = &mut self.board {
            board.decrement_locks();
        }
        Outcome::Applied
    }

    fn undo(&mut self) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Ignored(IgnoreReason::NotActive);
        }
        if self.max_undos.is_some_and(|max| self.undo_count >= max) {
            return Outcome::Ignored(IgnoreReason::UndoLimitReached);
        }
        let Some(snapshot) = self.undo_history.pop() else {
            return Outcome::Ignored(IgnoreReason::NothingToUndo);
        };
        let Snapshot {
            board,
            moves,
            player_moves,
        } = snapshot;
        self.board = Some(board);
        self.moves = moves;
        self.player_moves = player_moves;
        self.undo_count += 1;
        Outcome::Applied
    }

    fn reset(&mut self) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Ignored(IgnoreReason::NotActive);
        }
        self.board.clone_from(&self.initial_board);
        self.moves = 0;
        self.player_moves.clear();
        self.undo_history.clear();
        Outcome::Applied
    }

    fn use_hint(&mut self) -> Outcome {
        if self.phase != Phase::Active {
            return Outcome::Ignored(IgnoreReason::NotActive);
        }
        if self.hints_used >= self.hints_allowed {
            return Outcome::Ignored(IgnoreReason::NoHintsLeft);
        }
        self.hints_used += 1;
        Outcome::Applied
    }

    fn win(&mut self) -> Outcome {
        match self.phase {
            Phase::Won(None) => {}
            Phase::Won(Some(_)) => return Outcome::Ignored(IgnoreReason::AlreadyScored),
            _ => return Outcome::Ignored(IgnoreReason::NotWon),
        }
        let breakdown = score(&ScoreInput {
            level: self.level,
            moves: self.moves,
            optimal_moves: u32::try_from(self.optimal_path.len()).unwrap_or(u32::MAX),
            time: self.time,
            hints_used: self.hints_used,
            undo_used: self.undo_count,
        });
        self.total_points = self.total_points.saturating_add(breakdown.total_points);
        self.completed_levels.push(self.level);
        self.phase = Phase::Won(Some(breakdown));
        log::info!(
            "level {} scored {} points (total {})",
            self.level,
            breakdown.total_points,
            self.total_points
        );
        Outcome::Scored(breakdown)
    }

    fn pause(&mut self) -> Outcome {
        match self.phase {
            Phase::Active => {
                self.phase = Phase::Paused(PauseReason::Player);
                Outcome::Applied
            }
            Phase::Paused(PauseReason::Player) => {
                self.phase = Phase::Active;
                Outcome::Applied
            }
            Phase::Paused(PauseReason::TimeExpired) => {
                Outcome::Ignored(IgnoreReason::TimeExpired)
            }
            Phase::Idle | Phase::Won(_) => Outcome::Ignored(IgnoreReason::NotActive),
        }
    }
}

#[cfg(test)]
mod tests {
    use hueflip_core::{Grid, LockedMap, PowerSet};
    use proptest::prelude::*;

    use super::*;

    fn setup(rows: Vec<Vec<u8>>, optimal_path: Vec<Position>) -> LevelSetup {
        LevelSetup {
            level: 5,
            board: Board::new(Grid::from_rows(rows).unwrap(), 2),
            optimal_path,
            move_limit: None,
            time_limit: None,
            undo_limit: None,
            hints_allowed: 2,
        }
    }

    fn started(setup: LevelSetup) -> SessionState {
        let mut state = SessionState::new();
        assert_eq!(
            state.dispatch(Action::NewGame(Box::new(setup))),
            Outcome::Applied
        );
        state
    }

    fn two_by_two() -> SessionState {
        started(setup(vec![vec![1, 0], vec![0, 0]], vec![Position::new(1, 1)]))
    }

    #[test]
    fn test_idle_ignores_play() {
        let mut state = SessionState::new();
        for action in [
            Action::Click(Position::new(0, 0)),
            Action::Tick,
            Action::Undo,
            Action::Reset,
            Action::UseHint,
            Action::Pause,
            Action::LockDecrement,
        ] {
            assert_eq!(
                state.dispatch(action),
                Outcome::Ignored(IgnoreReason::NotActive)
            );
        }
        assert_eq!(
            state.dispatch(Action::Win),
            Outcome::Ignored(IgnoreReason::NotWon)
        );
        assert!(state.phase().is_idle());
    }

    #[test]
    fn test_two_by_two_scenario() {
        let mut state = two_by_two();
        assert_eq!(
            state.dispatch(Action::Click(Position::new(0, 0))),
            Outcome::Applied
        );
        assert_eq!(
            state.board().unwrap().grid().to_rows(),
            vec![vec![0, 1], vec![1, 0]]
        );
        assert!(state.phase().is_active());

        assert_eq!(
            state.dispatch(Action::Click(Position::new(0, 0))),
            Outcome::Applied
        );
        assert_eq!(
            state.dispatch(Action::Click(Position::new(1, 1))),
            Outcome::Solved
        );
        assert_eq!(state.phase(), Phase::Won(None));
        assert_eq!(state.player_moves().len(), 3);
    }

    #[test]
    fn test_win_is_idempotent() {
        let mut state = two_by_two();
        state.dispatch(Action::Click(Position::new(1, 1)));

        let Outcome::Scored(breakdown) = state.dispatch(Action::Win) else {
            panic!("expected a score");
        };
        assert!(breakdown.total_points > 0);
        assert_eq!(state.total_points(), breakdown.total_points);
        assert_eq!(state.completed_levels(), &[5]);

        assert_eq!(
            state.dispatch(Action::Win),
            Outcome::Ignored(IgnoreReason::AlreadyScored)
        );
        assert_eq!(state.total_points(), breakdown.total_points);
        assert_eq!(state.completed_levels(), &[5]);

        // Won only leads back to Active through a new game.
        assert_eq!(
            state.dispatch(Action::Click(Position::new(0, 0))),
            Outcome::Ignored(IgnoreReason::NotActive)
        );
        assert_eq!(
            state.dispatch(Action::Reset),
            Outcome::Ignored(IgnoreReason::NotActive)
        );
        state.dispatch(Action::NewGame(Box::new(setup(
            vec![vec![1, 0], vec![0, 0]],
            vec![Position::new(1, 1)],
        ))));
        assert!(state.phase().is_active());
        assert_eq!(state.total_points(), breakdown.total_points);
    }

    #[test]
    fn test_out_of_bounds_and_locked_clicks_are_ignored() {
        let mut locked = LockedMap::new();
        locked.lock(Position::new(0, 0), 2);
        let mut state = started(LevelSetup {
            board: Board::with_tiles(Grid::new(3), 2, PowerSet::new(), locked),
            ..setup(vec![vec![0; 3]; 3], vec![])
        });

        assert_eq!(
            state.dispatch(Action::Click(Position::new(3, 0))),
            Outcome::Ignored(IgnoreReason::OutOfBounds)
        );
        assert_eq!(
            state.dispatch(Action::Click(Position::new(0, 0))),
            Outcome::Ignored(IgnoreReason::Locked)
        );
        assert_eq!(state.moves(), 0);

        state.dispatch(Action::LockDecrement);
        state.dispatch(Action::LockDecrement);
        assert!(state.board().unwrap().locked().is_empty());
        assert_eq!(
            state.dispatch(Action::Click(Position::new(0, 0))),
            Outcome::Applied
        );
    }

    #[test]
    fn test_move_limit() {
        let mut state = started(LevelSetup {
            move_limit: Some(1),
            ..setup(vec![vec![1, 0], vec![0, 0]], vec![Position::new(1, 1)])
        });
        state.dispatch(Action::Click(Position::new(0, 0)));
        assert_eq!(
            state.dispatch(Action::Click(Position::new(0, 0))),
            Outcome::Ignored(IgnoreReason::MoveLimitReached)
        );
    }

    #[test]
    fn test_undo_budget_and_empty_stack() {
        let mut state = started(LevelSetup {
            undo_limit: Some(1),
            ..setup(vec![vec![1, 0], vec![0, 0]], vec![Position::new(1, 1)])
        });
        assert_eq!(
            state.dispatch(Action::Undo),
            Outcome::Ignored(IgnoreReason::NothingToUndo)
        );
        state.dispatch(Action::Click(Position::new(0, 0)));
        state.dispatch(Action::Click(Position::new(0, 1)));
        assert_eq!(state.dispatch(Action::Undo), Outcome::Applied);
        assert_eq!(
            state.dispatch(Action::Undo),
            Outcome::Ignored(IgnoreReason::UndoLimitReached)
        );
        assert_eq!(state.undo_count(), 1);
        assert_eq!(state.moves(), 1);
    }

    #[test]
    fn test_reset_restores_generated_board() {
        let mut state = two_by_two();
        state.dispatch(Action::Click(Position::new(0, 0)));
        state.dispatch(Action::Click(Position::new(0, 1)));
        state.dispatch(Action::Undo);

        assert_eq!(state.dispatch(Action::Reset), Outcome::Applied);
        assert_eq!(state.board(), state.initial_board());
        assert_eq!(state.moves(), 0);
        assert!(state.player_moves().is_empty());
        assert_eq!(state.undo_depth(), 0);
        assert_eq!(state.undo_count(), 1);
        assert!(state.phase().is_active());
    }

    #[test]
    fn test_time_limit_pauses() {
        let mut state = started(LevelSetup {
            time_limit: Some(2),
            ..setup(vec![vec![1, 0], vec![0, 0]], vec![Position::new(1, 1)])
        });
        assert_eq!(state.dispatch(Action::Tick), Outcome::Applied);
        assert_eq!(state.dispatch(Action::Tick), Outcome::TimeExpired);
        assert_eq!(state.phase(), Phase::Paused(PauseReason::TimeExpired));
        assert_eq!(
            state.dispatch(Action::Pause),
            Outcome::Ignored(IgnoreReason::TimeExpired)
        );
        assert_eq!(
            state.dispatch(Action::Tick),
            Outcome::Ignored(IgnoreReason::NotActive)
        );
        assert_eq!(state.time(), 2);
    }

    #[test]
    fn test_pause_toggles() {
        let mut state = two_by_two();
        assert_eq!(state.dispatch(Action::Pause), Outcome::Applied);
        assert_eq!(state.phase(), Phase::Paused(PauseReason::Player));
        assert_eq!(
            state.dispatch(Action::Tick),
            Outcome::Ignored(IgnoreReason::NotActive)
        );
        assert_eq!(state.dispatch(Action::Pause), Outcome::Applied);
        assert!(state.phase().is_active());
    }

    #[test]
    fn test_hint_budget() {
        let mut state = two_by_two();
        assert_eq!(state.dispatch(Action::UseHint), Outcome::Applied);
        assert_eq!(state.dispatch(Action::UseHint), Outcome::Applied);
        assert_eq!(
            state.dispatch(Action::UseHint),
            Outcome::Ignored(IgnoreReason::NoHintsLeft)
        );
        assert_eq!(state.hints_used(), 2);
    }

    #[test]
    fn test_continue_restores_progress() {
        let base = setup(vec![vec![1, 0], vec![0, 0]], vec![Position::new(1, 1)]);
        let board = base.board.clicked(Position::new(0, 0)).unwrap();
        let mut state = SessionState::new();
        state.dispatch(Action::ContinueGame(Box::new(ResumeSetup {
            setup: base,
            board: board.clone(),
            moves: 1,
            time: 12,
            undo_count: 0,
            hints_used: 1,
            player_moves: vec![Position::new(0, 0)],
            total_points: 500,
            completed_levels: vec![1, 2, 3, 4],
        })));
        assert!(state.phase().is_active());
        assert_eq!(state.board(), Some(&board));
        assert_eq!(state.time(), 12);
        assert_eq!(state.total_points(), 500);
        assert_eq!(state.player_moves(), &[Position::new(0, 0)]);
    }

    proptest! {
        #[test]
        fn prop_click_then_undo_restores(
            cells in proptest::collection::vec(0u8..3, 9),
            clicks in proptest::collection::vec((0u8..3, 0u8..3), 0..6),
            last in (0u8..3, 0u8..3),
        ) {
            let rows = cells.chunks(3).map(<[u8]>::to_vec).collect();
            let mut state = started(LevelSetup {
                board: Board::new(Grid::from_rows(rows).unwrap(), 3),
                ..setup(vec![vec![0]], vec![])
            });
            prop_assume!(!state.board().unwrap().is_solved());
            for (r, c) in clicks {
                if state.dispatch(Action::Click(Position::new(r, c))) == Outcome::Solved {
                    return Ok(());
                }
            }
            let board = state.board().cloned();
            let moves = state.moves();
            let player_moves = state.player_moves().to_vec();

            let outcome = state.dispatch(Action::Click(Position::new(last.0, last.1)));
            prop_assume!(outcome == Outcome::Applied);
            prop_assert_eq!(state.dispatch(Action::Undo), Outcome::Applied);
            prop_assert_eq!(state.board().cloned(), board);
            prop_assert_eq!(state.moves(), moves);
            prop_assert_eq!(state.player_moves(), player_moves.as_slice());
        }
    }
}
