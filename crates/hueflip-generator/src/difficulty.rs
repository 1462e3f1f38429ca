//! Level-to-difficulty mapping.

/// Grid size bands: `(first level, grid size)`. The last band is open-ended.
const SIZE_BANDS: [(u32, u8); 8] = [
    (1, 3),
    (6, 4),
    (16, 5),
    (31, 6),
    (51, 7),
    (81, 8),
    (121, 9),
    (171, 10),
];

/// Length of one color cycle inside the open-ended last band.
const OPEN_BAND_COLOR_STEP: u32 = 20;

/// Lowest level with a time limit in the profile.
const TIMED_FROM_LEVEL: u32 = 50;

/// Difficulty parameters derived from a level number.
///
/// Profiles are a pure function of the level and are recomputed whenever a
/// level starts.
///
/// # Examples
///
/// ```
/// use hueflip_generator::DifficultyProfile;
///
/// let profile = DifficultyProfile::for_level(1);
/// assert_eq!(profile.grid_size, 3);
/// assert_eq!(profile.color_count, 2);
/// assert_eq!(profile.required_moves, 1);
///
/// // A new grid size starts over with two colors.
/// assert_eq!(DifficultyProfile::for_level(6).grid_size, 4);
/// assert_eq!(DifficultyProfile::for_level(6).color_count, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    /// Level number, at least 1.
    pub level: u32,
    /// Grid side length.
    pub grid_size: u8,
    /// Number of colors a tile cycles through.
    pub color_count: u8,
    /// Number of moves in the constructed solution.
    pub required_moves: u32,
    /// Number of power tiles to place.
    pub power_tile_count: u32,
    /// Number of locked tiles to place.
    pub locked_tile_count: u32,
    /// Hints available by default.
    pub hints_default: u32,
    /// Time limit in seconds, if any.
    pub time_limit: Option<u32>,
}

impl DifficultyProfile {
    /// Computes the profile of `level`. Levels below 1 are treated as level 1.
    #[must_use]
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        let grid_size = grid_size(level);
        let color_count = color_count(level);
        let required_moves = required_moves(level, grid_size, color_count);
        Self {
            level,
            grid_size,
            color_count,
            required_moves,
            // Power and locked tiles are disabled by level design.
            power_tile_count: 0,
            locked_tile_count: 0,
            hints_default: hints_default(level),
            time_limit: (level >= TIMED_FROM_LEVEL).then(|| (required_moves * 8).max(60)),
        }
    }

    /// Returns the largest number of meaningfully distinct click states:
    /// every cell clicked at most `color_count - 1` times.
    #[must_use]
    pub fn max_distinct_moves(grid_size: u8, color_count: u8) -> u32 {
        let cells = u32::from(grid_size) * u32::from(grid_size);
        cells * u32::from(color_count.saturating_sub(1))
    }
}

fn band_index(level: u32) -> usize {
    SIZE_BANDS
        .iter()
        .rposition(|&(start, _)| level >= start)
        .unwrap_or(0)
}

fn grid_size(level: u32) -> u8 {
    SIZE_BANDS[band_index(level)].1
}

fn color_count(level: u32) -> u8 {
    let i = band_index(level);
    let start = SIZE_BANDS[i].0;
    let Some(&(next_start, _)) = SIZE_BANDS.get(i + 1) else {
        let cycle = ((level - start) / OPEN_BAND_COLOR_STEP) % 4;
        return 2 + u8::try_from(cycle).unwrap_or_default();
    };
    let progress = (level - start) * 100 / (next_start - start);
    match progress {
        0..30 => 2,
        30..60 => 3,
        60..85 => 4,
        _ => 5,
    }
}

fn required_moves(level: u32, grid_size: u8, color_count: u8) -> u32 {
    let scaled = level.div_ceil(2) + u32::from(grid_size - 3);
    scaled
        .max(1)
        .min(DifficultyProfile::max_distinct_moves(grid_size, color_count))
}

fn hints_default(level: u32) -> u32 {
    match level {
        0..=10 => 3,
        11..=50 => 2,
        _ => 1,
    }
}
