//! Level constraints and adaptive easing.
//!
//! Constraints are introduced at fixed milestone levels and stay in effect
//! from then on. A short window of recent results lets the manager ease the
//! upcoming constraints when the player keeps failing.

use std::{collections::VecDeque, num::NonZero};

/// Level introducing the soft move cap.
pub const MOVE_CAP_LEVEL: u32 = 10;
/// Level tightening the move cap.
pub const TIGHT_MOVE_CAP_LEVEL: u32 = 25;
/// Level introducing the visible timer and time limit.
pub const TIMER_LEVEL: u32 = 40;
/// Level introducing the time bonus target.
pub const TIME_BONUS_LEVEL: u32 = 60;
/// Level introducing the undo cap.
pub const UNDO_CAP_LEVEL: u32 = 75;

const MILESTONES: [u32; 5] = [
    MOVE_CAP_LEVEL,
    TIGHT_MOVE_CAP_LEVEL,
    TIMER_LEVEL,
    TIME_BONUS_LEVEL,
    UNDO_CAP_LEVEL,
];

const UNDO_CAP: u32 = 3;

/// Limits and presentation hints applied to one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    /// Maximum number of moves.
    pub move_limit: Option<u32>,
    /// Time limit in seconds.
    pub time_limit: Option<u32>,
    /// Target time in seconds shown to the player.
    ///
    /// The target is advisory: [`score`](crate::score) awards its time bonus
    /// from fixed tiers and does not read this value.
    pub time_bonus: Option<u32>,
    /// Maximum number of undos.
    pub undo_limit: Option<u32>,
    /// Whether the timer is shown.
    pub show_timer: bool,
    /// One-time message explaining a constraint introduced at this level.
    pub tutorial_message: Option<String>,
}

impl Constraints {
    /// Returns `true` if no limit applies.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.move_limit.is_none() && self.time_limit.is_none() && self.undo_limit.is_none()
    }
}

/// Outcome of one level attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceRecord {
    /// Level played.
    pub level: u32,
    /// Attempts made on the level so far.
    pub attempts: u32,
    /// Whether the level was completed.
    pub completed: bool,
    /// Moves used.
    pub moves_used: u32,
    /// Length of the generated solution.
    pub optimal_moves: u32,
    /// Elapsed seconds.
    pub time_used: u32,
    /// Hints used.
    pub hints_used: u32,
}

/// Maps levels to [`Constraints`] and eases them for struggling players.
///
/// # Examples
///
/// ```
/// use hueflip_game::{ConstraintManager, PerformanceRecord};
///
/// let mut manager = ConstraintManager::new();
/// assert!(manager.constraints_for_level(5, 4).is_unconstrained());
/// assert_eq!(manager.constraints_for_level(30, 6).move_limit, Some(12));
///
/// for _ in 0..2 {
///     manager.record(PerformanceRecord { level: 30, completed: false, ..Default::default() });
/// }
/// assert!(manager.is_struggling());
/// assert_eq!(manager.constraints_for_level(30, 6).move_limit, Some(18));
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintManager {
    history: VecDeque<PerformanceRecord>,
    window: NonZero<usize>,
}

impl Default for ConstraintManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintManager {
    /// Default number of records kept.
    pub const DEFAULT_WINDOW: NonZero<usize> = NonZero::new(5).unwrap();

    /// Creates a manager with an empty performance window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(Self::DEFAULT_WINDOW)
    }

    /// Creates a manager keeping the last `window` records.
    #[must_use]
    pub fn with_window(window: NonZero<usize>) -> Self {
        Self {
            history: VecDeque::new(),
            window,
        }
    }

    /// Returns `true` if `level` introduces a new constraint.
    #[must_use]
    pub fn has_new_constraint(level: u32) -> bool {
        MILESTONES.contains(&level)
    }

    /// Returns the constraints of `level` for a puzzle solvable in
    /// `optimal_moves` moves, eased if the player is struggling.
    #[must_use]
    pub fn constraints_for_level(&self, level: u32, optimal_moves: u32) -> Constraints {
        let eased = self.is_struggling();
        let mut constraints = Constraints::default();

        let multiplier = match level {
            l if l >= TIGHT_MOVE_CAP_LEVEL => Some(2),
            l if l >= MOVE_CAP_LEVEL => Some(3),
            _ => None,
        };
        constraints.move_limit =
            multiplier.map(|m| optimal_moves.max(1).saturating_mul(m + u32::from(eased)));

        if level >= TIMER_LEVEL {
            let limit = optimal_moves.saturating_mul(10).max(60);
            constraints.show_timer = true;
            constraints.time_limit = Some(if eased {
                limit.saturating_mul(3) / 2
            } else {
                limit
            });
        }
        if level >= TIME_BONUS_LEVEL {
            constraints.time_bonus = Some(optimal_moves.saturating_mul(5).max(30));
        }
        if level >= UNDO_CAP_LEVEL {
            constraints.undo_limit = Some(UNDO_CAP + if eased { 2 } else { 0 });
        }

        if Self::has_new_constraint(level) {
            constraints.tutorial_message = Some(tutorial_message(level, &constraints, eased));
        }
        constraints
    }

    /// Appends a performance record, dropping the oldest when the window is
    /// full.
    pub fn record(&mut self, record: PerformanceRecord) {
        if self.history.len() == self.window.get() {
            self.history.pop_front();
        }
        log::debug!(
            "level {} recorded (completed: {}, moves: {}/{})",
            record.level,
            record.completed,
            record.moves_used,
            record.optimal_moves
        );
        self.history.push_back(record);
    }

    /// Returns the recorded window, oldest first.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &PerformanceRecord> {
        self.history.iter()
    }

    /// Returns the share of completed records in percent, or `None` without
    /// records.
    #[must_use]
    pub fn completion_rate(&self) -> Option<usize> {
        if self.history.is_empty() {
            return None;
        }
        let completed = self.history.iter().filter(|r| r.completed).count();
        Some(completed * 100 / self.history.len())
    }

    /// Returns `true` if fewer than half of the recent attempts were completed
    /// or the two latest attempts both failed.
    #[must_use]
    pub fn is_struggling(&self) -> bool {
        let low_completion = self.completion_rate().is_some_and(|rate| rate < 50);
        let recent_failures = self.history.len() >= 2
            && self.history.iter().rev().take(2).all(|r| !r.completed);
        low_completion || recent_failures
    }

    /// Forgets every record.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

fn tutorial_message(level: u32, constraints: &Constraints, eased: bool) -> String {
    let message = match level {
        MOVE_CAP_LEVEL | TIGHT_MOVE_CAP_LEVEL => format!(
            "Move limit: solve the puzzle within {} moves.",
            constraints.move_limit.unwrap_or_default()
        ),
        TIMER_LEVEL => format!(
            "The clock is running: you have {} seconds.",
            constraints.time_limit.unwrap_or_default()
        ),
        TIME_BONUS_LEVEL => format!(
            "Finish within {} seconds for a time bonus.",
            constraints.time_bonus.unwrap_or_default()
        ),
        _ => format!(
            "Undo is limited to {} uses per level.",
            constraints.undo_limit.unwrap_or_default()
        ),
    };
    if eased {
        format!("No rush, take it one tile at a time. {message}")
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(level: u32) -> PerformanceRecord {
        PerformanceRecord {
            level,
            completed: false,
            ..PerformanceRecord::default()
        }
    }

    fn completed(level: u32) -> PerformanceRecord {
        PerformanceRecord {
            level,
            completed: true,
            ..PerformanceRecord::default()
        }
    }

    #[test]
    fn test_no_constraints_below_first_milestone() {
        let manager = ConstraintManager::new();
        for level in 1..MOVE_CAP_LEVEL {
            let constraints = manager.constraints_for_level(level, 5);
            assert_eq!(constraints, Constraints::default(), "level {level}");
            assert!(!constraints.show_timer);
        }
    }

    #[test]
    fn test_milestones() {
        let manager = ConstraintManager::new();
        assert_eq!(manager.constraints_for_level(10, 5).move_limit, Some(15));
        assert_eq!(manager.constraints_for_level(25, 5).move_limit, Some(10));

        let timed = manager.constraints_for_level(40, 5);
        assert!(timed.show_timer);
        assert_eq!(timed.time_limit, Some(60));
        assert_eq!(manager.constraints_for_level(41, 8).time_limit, Some(80));

        assert_eq!(manager.constraints_for_level(59, 8).time_bonus, None);
        assert_eq!(manager.constraints_for_level(60, 8).time_bonus, Some(40));
        assert_eq!(manager.constraints_for_level(60, 2).time_bonus, Some(30));

        assert_eq!(manager.constraints_for_level(74, 8).undo_limit, None);
        assert_eq!(manager.constraints_for_level(75, 8).undo_limit, Some(3));
    }

    #[test]
    fn test_has_new_constraint_only_at_milestones() {
        let milestones = (1..200)
            .filter(|&level| ConstraintManager::has_new_constraint(level))
            .collect::<Vec<_>>();
        assert_eq!(milestones, MILESTONES);

        let manager = ConstraintManager::new();
        assert!(manager.constraints_for_level(40, 5).tutorial_message.is_some());
        assert!(manager.constraints_for_level(41, 5).tutorial_message.is_none());
    }

    #[test]
    fn test_struggling_detection() {
        let mut manager = ConstraintManager::new();
        assert!(!manager.is_struggling());

        manager.record(completed(1));
        manager.record(failed(2));
        assert!(!manager.is_struggling());
        manager.record(failed(2));
        assert!(manager.is_struggling());

        manager.record(completed(2));
        manager.record(completed(3));
        assert_eq!(manager.completion_rate(), Some(60));
        assert!(!manager.is_struggling());
    }

    #[test]
    fn test_window_drops_oldest() {
        let mut manager = ConstraintManager::with_window(NonZero::new(3).unwrap());
        for level in 1..=5 {
            manager.record(completed(level));
        }
        let levels = manager.records().map(|r| r.level).collect::<Vec<_>>();
        assert_eq!(levels, vec![3, 4, 5]);
    }

    #[test]
    fn test_easing() {
        let mut manager = ConstraintManager::new();
        manager.record(failed(80));
        manager.record(failed(80));

        let eased = manager.constraints_for_level(80, 10);
        assert_eq!(eased.move_limit, Some(30));
        assert_eq!(eased.time_limit, Some(150));
        assert_eq!(eased.undo_limit, Some(5));

        let message = manager
            .constraints_for_level(75, 10)
            .tutorial_message
            .unwrap();
        assert!(message.starts_with("No rush"));
    }
}
