//! Solvability verification and recovery planning.
//!
//! [`SolvabilityGuarantee`] answers "can this board still be solved?" during
//! play. A known path that replays to a solved board answers with certainty;
//! otherwise a [`SolvabilityOracle`] decides. Results are cached by the
//! board's canonical key and every check feeds a small metrics window.

use std::{
    collections::VecDeque,
    num::NonZero,
    time::{Duration, Instant},
};

use hueflip_core::{Board, Position};

use crate::{LinearOracle, SolvabilityOracle, lru::LruCache};

/// How sure a [`Verification`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Confidence {
    /// Proven by replaying a solution.
    #[display("certain")]
    Certain,
    /// Decided algebraically.
    #[display("probable")]
    Probable,
    /// The oracle failed; solvability is assumed.
    #[display("assumed")]
    Assumed,
}

/// How a [`Verification`] was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum VerificationMethod {
    /// A known path was replayed.
    #[display("reverse-path")]
    ReversePath,
    /// The oracle was consulted.
    #[display("mathematical")]
    Mathematical,
}

/// Result of a solvability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// `true` if the board can be solved.
    pub solvable: bool,
    /// Confidence in `solvable`.
    pub confidence: Confidence,
    /// Method used.
    pub method: VerificationMethod,
    /// `true` if the result came from the cache.
    pub cached: bool,
}

/// A way back to a solvable board, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum RecoveryStrategy {
    /// Restore the board as generated.
    #[display("revert to the original puzzle")]
    Revert,
    /// Generate a new puzzle for the same level.
    #[display("generate a new puzzle")]
    Regenerate,
    /// Show a move computed from the current board.
    #[display("show a hint")]
    Hint,
}

/// Tunables of [`SolvabilityGuarantee`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuaranteeConfig {
    /// Maximum number of cached results.
    pub cache_capacity: NonZero<usize>,
    /// Number of recent checks kept for latency metrics.
    pub metrics_window: NonZero<usize>,
    /// Checks slower than this are logged.
    pub slow_check: Duration,
}

impl GuaranteeConfig {
    /// Default number of cached results.
    pub const DEFAULT_CACHE_CAPACITY: NonZero<usize> = NonZero::new(1000).unwrap();

    /// Default number of checks in the metrics window.
    pub const DEFAULT_METRICS_WINDOW: NonZero<usize> = NonZero::new(100).unwrap();
}

impl Default for GuaranteeConfig {
    fn default() -> Self {
        Self {
            cache_capacity: Self::DEFAULT_CACHE_CAPACITY,
            metrics_window: Self::DEFAULT_METRICS_WINDOW,
            slow_check: Duration::from_millis(100),
        }
    }
}

/// Counters and latency statistics of solvability checks.
#[derive(Debug, Clone)]
pub struct GuaranteeMetrics {
    checks: usize,
    failures: usize,
    errors: usize,
    cache_hits: usize,
    latencies: VecDeque<Duration>,
    window: NonZero<usize>,
}

impl GuaranteeMetrics {
    fn new(window: NonZero<usize>) -> Self {
        Self {
            checks: 0,
            failures: 0,
            errors: 0,
            cache_hits: 0,
            latencies: VecDeque::new(),
            window,
        }
    }

    fn record(&mut self, latency: Duration) {
        if self.latencies.len() == self.window.get() {
            self.latencies.pop_front();
        }
        self.latencies.push_back(latency);
    }

    /// Returns the number of checks performed, cache hits included.
    #[must_use]
    pub fn checks(&self) -> usize {
        self.checks
    }

    /// Returns the number of checks that found the board unsolvable.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Returns the number of oracle errors.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Returns the number of checks answered from the cache.
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Returns the number of latencies in the window.
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.latencies.len()
    }

    /// Returns the average latency over the window.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let Ok(len) = u32::try_from(self.latencies.len()) else {
            return Duration::ZERO;
        };
        if len == 0 {
            return Duration::ZERO;
        }
        self.latencies.iter().sum::<Duration>() / len
    }

    /// Returns the largest latency in the window.
    #[must_use]
    pub fn max_latency(&self) -> Duration {
        self.latencies.iter().max().copied().unwrap_or_default()
    }
}

/// Verifies solvability during play and plans recovery.
///
/// # Examples
///
/// ```
/// use hueflip_core::{Board, Grid, Position};
/// use hueflip_solver::{Confidence, SolvabilityGuarantee};
///
/// let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]])?;
/// let board = Board::new(grid, 2);
/// let mut guarantee = SolvabilityGuarantee::new();
///
/// let known = guarantee.verify(&board, &[Position::new(1, 1)]);
/// assert!(known.solvable);
/// assert_eq!(known.confidence, Confidence::Certain);
///
/// let computed = guarantee.verify(&board, &[]);
/// assert!(computed.solvable);
/// # Ok::<(), hueflip_core::GridError>(())
/// ```
#[derive(Debug)]
pub struct SolvabilityGuarantee {
    config: GuaranteeConfig,
    oracle: Box<dyn SolvabilityOracle>,
    cache: LruCache<String, Verification>,
    metrics: GuaranteeMetrics,
}

impl Default for SolvabilityGuarantee {
    fn default() -> Self {
        Self::new()
    }
}

impl SolvabilityGuarantee {
    /// Creates a guarantee with the default configuration and [`LinearOracle`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_oracle(GuaranteeConfig::default(), Box::new(LinearOracle::new()))
    }

    /// Creates a guarantee with a custom configuration and oracle.
    #[must_use]
    pub fn with_oracle(config: GuaranteeConfig, oracle: Box<dyn SolvabilityOracle>) -> Self {
        Self {
            cache: LruCache::new(config.cache_capacity),
            metrics: GuaranteeMetrics::new(config.metrics_window),
            config,
            oracle,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GuaranteeConfig {
        &self.config
    }

    /// Returns the check metrics.
    #[must_use]
    pub fn metrics(&self) -> &GuaranteeMetrics {
        &self.metrics
    }

    /// Returns the number of cached results.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached result.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Checks whether `board` can still be solved.
    ///
    /// `known_path` is a move sequence believed to solve the board, typically
    /// the rest of the generated solution. It is replayed first; when it is
    /// empty or does not solve the board, the oracle decides. Oracle errors
    /// are logged and reported as solvable with [`Confidence::Assumed`].
    pub fn verify(&mut self, board: &Board, known_path: &[Position]) -> Verification {
        let start = Instant::now();
        self.metrics.checks += 1;

        let key = board.canonical_key();
        let result = if let Some(hit) = self.cache.get(&key) {
            self.metrics.cache_hits += 1;
            Verification { cached: true, ..*hit }
        } else {
            let result = self.check(board, known_path);
            if result.confidence != Confidence::Assumed {
                self.cache.insert(key, result);
            }
            result
        };

        if !result.solvable {
            self.metrics.failures += 1;
        }
        let elapsed = start.elapsed();
        self.metrics.record(elapsed);
        if elapsed > self.config.slow_check {
            log::warn!(
                "solvability check took {elapsed:?} ({} method)",
                result.method
            );
        }
        result
    }

    fn check(&mut self, board: &Board, known_path: &[Position]) -> Verification {
        if !known_path.is_empty() {
            let mut replay = board.clone();
            if replay.play_all(known_path) && replay.is_solved() {
                return Verification {
                    solvable: true,
                    confidence: Confidence::Certain,
                    method: VerificationMethod::ReversePath,
                    cached: false,
                };
            }
            log::debug!("known path no longer solves the board, consulting the oracle");
        }

        match self.oracle.is_solvable(board) {
            Ok(solvable) => Verification {
                solvable,
                confidence: Confidence::Probable,
                method: VerificationMethod::Mathematical,
                cached: false,
            },
            Err(err) => {
                self.metrics.errors += 1;
                log::warn!("solvability oracle failed, assuming solvable: {err}");
                Verification {
                    solvable: true,
                    confidence: Confidence::Assumed,
                    method: VerificationMethod::Mathematical,
                    cached: false,
                }
            }
        }
    }

    /// Lists the recovery strategies for an unsolvable board, most preferred
    /// first.
    ///
    /// Reverting is offered only when the player has made moves and the board
    /// differs from the original.
    #[must_use]
    pub fn recovery_strategies(
        &self,
        current: &Board,
        original: &Board,
        player_moves: &[Position],
    ) -> Vec<RecoveryStrategy> {
        let mut strategies = Vec::with_capacity(3);
        if !player_moves.is_empty() && current != original {
            strategies.push(RecoveryStrategy::Revert);
        }
        strategies.push(RecoveryStrategy::Regenerate);
        strategies.push(RecoveryStrategy::Hint);
        strategies
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use hueflip_core::Grid;

    use super::*;
    use crate::OracleError;

    #[derive(Debug, Default)]
    struct CountingOracle {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl SolvabilityOracle for CountingOracle {
        fn is_solvable(&self, _board: &Board) -> Result<bool, OracleError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                Err(OracleError::TooLarge { cells: 0, max: 0 })
            } else {
                Ok(false)
            }
        }
    }

    fn board(rows: Vec<Vec<u8>>) -> Board {
        Board::new(Grid::from_rows(rows).unwrap(), 2)
    }

    fn config(capacity: usize, window: usize) -> GuaranteeConfig {
        GuaranteeConfig {
            cache_capacity: NonZero::new(capacity).unwrap(),
            metrics_window: NonZero::new(window).unwrap(),
            ..GuaranteeConfig::default()
        }
    }

    #[test]
    fn test_known_path_is_certain() {
        let mut guarantee = SolvabilityGuarantee::new();
        let result = guarantee.verify(&board(vec![vec![1, 0], vec![0, 0]]), &[Position::new(1, 1)]);
        assert_eq!(
            result,
            Verification {
                solvable: true,
                confidence: Confidence::Certain,
                method: VerificationMethod::ReversePath,
                cached: false,
            }
        );
    }

    #[test]
    fn test_stale_path_falls_back_to_oracle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let oracle = CountingOracle {
            calls: Arc::clone(&calls),
            fail: false,
        };
        let mut guarantee =
            SolvabilityGuarantee::with_oracle(GuaranteeConfig::default(), Box::new(oracle));
        let result = guarantee.verify(&board(vec![vec![1, 0], vec![0, 0]]), &[Position::new(0, 0)]);
        assert!(!result.solvable);
        assert_eq!(result.method, VerificationMethod::Mathematical);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(guarantee.metrics().failures(), 1);
    }

    #[test]
    fn test_results_are_cached_by_board() {
        let calls = Arc::new(AtomicUsize::new(0));
        let oracle = CountingOracle {
            calls: Arc::clone(&calls),
            fail: false,
        };
        let mut guarantee = SolvabilityGuarantee::with_oracle(config(2, 100), Box::new(oracle));
        let a = board(vec![vec![1, 0], vec![0, 0]]);
        let b = board(vec![vec![0, 1], vec![0, 0]]);
        let c = board(vec![vec![0, 0], vec![1, 0]]);

        assert!(!guarantee.verify(&a, &[]).cached);
        assert!(guarantee.verify(&a, &[]).cached);
        guarantee.verify(&b, &[]);
        guarantee.verify(&c, &[]);
        assert_eq!(guarantee.cache_len(), 2);
        assert_eq!(calls.load(Ordering::Relaxed), 3);

        // `a` was least recently used and has been evicted.
        assert!(!guarantee.verify(&a, &[]).cached);
        assert_eq!(calls.load(Ordering::Relaxed), 4);
        assert_eq!(guarantee.metrics().cache_hits(), 1);
        assert_eq!(guarantee.metrics().checks(), 5);
    }

    #[test]
    fn test_cache_separates_color_counts() {
        let grid = Grid::from_rows(vec![
            vec![1, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        let three = Board::new(grid.clone(), 3);
        let two = Board::new(grid, 2);
        let oracle = LinearOracle::new();

        let mut guarantee = SolvabilityGuarantee::new();
        let first = guarantee.verify(&three, &[]);
        assert_eq!(first.solvable, oracle.is_solvable(&three).unwrap());

        let second = guarantee.verify(&two, &[]);
        assert!(!second.cached);
        assert_eq!(second.solvable, oracle.is_solvable(&two).unwrap());
        assert_eq!(guarantee.cache_len(), 2);
        assert!(guarantee.verify(&three, &[]).cached);
    }

    #[test]
    fn test_oracle_error_assumes_solvable() {
        let oracle = CountingOracle {
            calls: Arc::default(),
            fail: true,
        };
        let mut guarantee =
            SolvabilityGuarantee::with_oracle(GuaranteeConfig::default(), Box::new(oracle));
        let b = board(vec![vec![1, 0], vec![0, 0]]);
        let result = guarantee.verify(&b, &[]);
        assert!(result.solvable);
        assert!(result.confidence.is_assumed());
        assert_eq!(guarantee.metrics().errors(), 1);
        assert_eq!(guarantee.cache_len(), 0);
    }

    #[test]
    fn test_metrics_window_is_bounded() {
        let mut guarantee = SolvabilityGuarantee::with_oracle(config(10, 3), Box::new(LinearOracle::new()));
        let b = board(vec![vec![1, 0], vec![0, 0]]);
        for _ in 0..5 {
            guarantee.verify(&b, &[]);
        }
        assert_eq!(guarantee.metrics().checks(), 5);
        assert_eq!(guarantee.metrics().window_len(), 3);
        assert!(guarantee.metrics().max_latency() >= guarantee.metrics().average_latency());
    }

    #[test]
    fn test_recovery_strategies_order() {
        let guarantee = SolvabilityGuarantee::new();
        let original = board(vec![vec![1, 0], vec![0, 0]]);
        let current = original.clicked(Position::new(0, 0)).unwrap();

        assert_eq!(
            guarantee.recovery_strategies(&current, &original, &[Position::new(0, 0)]),
            vec![
                RecoveryStrategy::Revert,
                RecoveryStrategy::Regenerate,
                RecoveryStrategy::Hint
            ]
        );
        assert_eq!(
            guarantee.recovery_strategies(&original, &original, &[]),
            vec![RecoveryStrategy::Regenerate, RecoveryStrategy::Hint]
        );
    }
}
