//! Game rules and session management for Hueflip.
//!
//! # Overview
//!
//! - [`SessionState`]: the play state machine. Every interaction is an
//!   [`Action`] dispatched to it and answered with an [`Outcome`].
//! - [`ConstraintManager`]: move, time and undo limits introduced at
//!   milestone levels, eased while the player struggles.
//! - [`score`]: the points awarded for a solved level.
//! - [`GameStore`]: persistence of [`SavedGameState`], in memory or as a
//!   JSON file.
//! - [`Session`]: drives a run of levels, combining the state machine with
//!   generation, hints, solvability checks and autosave.
//!
//! # Examples
//!
//! ```
//! use hueflip_game::{MemoryStore, Phase, Session};
//!
//! let mut session = Session::new(Box::new(MemoryStore::new()));
//! let constraints = session.start_level(3)?;
//!
//! assert!(constraints.is_unconstrained());
//! assert_eq!(session.state().phase(), Phase::Active);
//! assert!(session.hint().is_some());
//! # Ok::<(), hueflip_generator::GenerateError>(())
//! ```

pub use self::{
    constraints::{
        ConstraintManager, Constraints, MOVE_CAP_LEVEL, PerformanceRecord, TIGHT_MOVE_CAP_LEVEL,
        TIME_BONUS_LEVEL, TIMER_LEVEL, UNDO_CAP_LEVEL,
    },
    save::{
        GameStats, GameStore, JsonFileStore, MemoryStore, SAVE_VERSION, SavedGame,
        SavedGameError, SavedGameState, StoreError, unix_now,
    },
    scoring::{ScoreBreakdown, ScoreInput, score},
    session::{Session, SessionError, SessionSettings},
    session_state::{
        Action, IgnoreReason, LevelSetup, Outcome, PauseReason, Phase, ResumeSetup, SessionState,
    },
    undo_stack::UndoStack,
};

mod constraints;
mod save;
mod scoring;
mod session;
mod session_state;
mod undo_stack;
