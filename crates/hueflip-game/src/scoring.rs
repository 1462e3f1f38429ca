//! Level score computation.

use hueflip_generator::is_tutorial_level;

/// Inputs of [`score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreInput {
    /// Level played.
    pub level: u32,
    /// Moves used.
    pub moves: u32,
    /// Length of the generated solution.
    pub optimal_moves: u32,
    /// Elapsed seconds.
    pub time: u32,
    /// Hints used.
    pub hints_used: u32,
    /// Undos used.
    pub undo_used: u32,
}

/// Points awarded for a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Points for completing the level.
    pub base_points: u32,
    /// Bonus for using few moves.
    pub move_bonus: u32,
    /// Bonus for finishing quickly.
    pub time_bonus: u32,
    /// Bonus for finishing without hints.
    pub perfect_bonus: u32,
    /// Sum of all parts after the undo penalty.
    pub total_points: u32,
}

/// Computes the score of a completed level.
///
/// Using a hint outside the tutorial levels forfeits the whole score. The
/// parts add up to the total, which is then cut to three quarters if any undo
/// was used.
///
/// # Examples
///
/// ```
/// use hueflip_game::{ScoreInput, score};
///
/// let perfect = score(&ScoreInput {
///     level: 11,
///     moves: 6,
///     optimal_moves: 6,
///     time: 25,
///     hints_used: 0,
///     undo_used: 0,
/// });
/// assert_eq!(perfect.base_points, 200);
/// assert_eq!(perfect.total_points, 200 + 100 + 40 + 200);
///
/// let hinted = score(&ScoreInput {
///     level: 4,
///     hints_used: 1,
///     ..ScoreInput::default()
/// });
/// assert_eq!(hinted.total_points, 0);
/// ```
#[must_use]
pub fn score(input: &ScoreInput) -> ScoreBreakdown {
    let level = input.level.max(1);
    if input.hints_used > 0 && !is_tutorial_level(level) {
        return ScoreBreakdown::default();
    }

    let base_points = ((level - 1) / 10 + 1).saturating_mul(100);
    let move_bonus = percent_of(base_points, move_bonus_percent(input.moves, input.optimal_moves));
    let time_bonus = match input.time {
        0..=30 => percent_of(base_points, 20),
        31..=60 => percent_of(base_points, 10),
        _ => 0,
    };
    let perfect_bonus = if input.hints_used == 0 { base_points } else { 0 };

    let mut total_points = base_points
        .saturating_add(move_bonus)
        .saturating_add(time_bonus)
        .saturating_add(perfect_bonus);
    if input.undo_used > 0 {
        total_points = percent_of(total_points, 75);
    }

    ScoreBreakdown {
        base_points,
        move_bonus,
        time_bonus,
        perfect_bonus,
        total_points,
    }
}

fn move_bonus_percent(moves: u32, optimal_moves: u32) -> u32 {
    if moves <= optimal_moves {
        (optimal_moves - moves).saturating_mul(25).saturating_add(50)
    } else {
        50u32.saturating_sub(10 * (moves - optimal_moves).min(5))
    }
}

fn percent_of(value: u32, percent: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(percent) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
