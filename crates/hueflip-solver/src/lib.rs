//! Solving and solvability checks for Hueflip boards.
//!
//! # Overview
//!
//! - [`BfsSolver`]: bounded breadth-first search for a shortest solution,
//!   used to compute hints once the player leaves the generated path.
//! - [`SolvabilityOracle`] and [`LinearOracle`]: algebraic solvability checks.
//! - [`SolvabilityGuarantee`]: cached, measured verification during play and
//!   the [`RecoveryStrategy`] list offered when a board becomes unsolvable.
//!
//! # Examples
//!
//! ```
//! use hueflip_generator::{PuzzleGenerator, PuzzleSeed};
//! use hueflip_solver::BfsSolver;
//!
//! let puzzle = PuzzleGenerator::new().generate_with_seed(8, PuzzleSeed::from_bytes([1; 32]))?;
//! let outcome = BfsSolver::new().solve(&puzzle.board());
//!
//! // Search never returns a longer solution than the generated one.
//! assert!(outcome.exhausted || outcome.solution.len() <= puzzle.optimal_path.len());
//! # Ok::<(), hueflip_generator::GenerateError>(())
//! ```

pub use self::{
    bfs::{BfsOutcome, BfsSolver, SolverLimits},
    guarantee::{
        Confidence, GuaranteeConfig, GuaranteeMetrics, RecoveryStrategy, SolvabilityGuarantee,
        Verification, VerificationMethod,
    },
    oracle::{LinearOracle, OracleError, SolvabilityOracle},
};

mod bfs;
mod guarantee;
mod lru;
mod oracle;
