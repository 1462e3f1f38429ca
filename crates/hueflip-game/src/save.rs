//! Saved progress and the stores that persist it.

use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use hueflip_core::{Board, BoardError, Grid, LockedMap, Position, PowerSet};
use serde::{Deserialize, Serialize};

/// Current version of the save format.
pub const SAVE_VERSION: u32 = 1;

/// Lifetime play statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Levels started.
    pub games_played: u32,
    /// Levels completed.
    pub games_won: u32,
    /// Moves made across all levels.
    pub total_moves: u64,
    /// Seconds played across all levels.
    pub total_time: u64,
    /// Hints used across all levels.
    pub hints_used: u32,
}

/// A level in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    /// Current grid.
    pub grid: Grid,
    /// Grid reached by the generated solution.
    pub target_grid: Grid,
    /// Moves made.
    pub moves: u32,
    /// Elapsed seconds.
    pub time: u32,
    /// Generated solution, in play order.
    pub optimal_path: Vec<Position>,
    /// Whether hints are still available.
    pub hints_enabled: bool,
    /// Undos used.
    pub undo_count: u32,
    /// Player moves since the level started or was reset.
    pub player_moves: Vec<Position>,
    /// Grid as generated.
    pub initial_grid: Grid,
    /// Power tiles.
    #[serde(default)]
    pub power: PowerSet,
    /// Current lock counters.
    #[serde(default)]
    pub locked: LockedMap,
    /// Lock counters as generated.
    #[serde(default)]
    pub initial_locked: LockedMap,
    /// Number of colors. Derived from the level when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_count: Option<u8>,
    /// Hints used.
    #[serde(default)]
    pub hints_used: u32,
}

impl SavedGame {
    /// Rebuilds the generated board and the current board of the level.
    ///
    /// `default_color_count` is used when the save does not record a color
    /// count. Returns `(initial, current)`.
    ///
    /// # Errors
    ///
    /// Returns [`SavedGameError`] if a grid does not fit the color count, the
    /// grids differ in size, or a move lies outside the grid.
    pub fn boards(&self, default_color_count: u8) -> Result<(Board, Board), SavedGameError> {
        let color_count = self.color_count.unwrap_or(default_color_count);
        let initial = Board::try_new(
            self.initial_grid.clone(),
            color_count,
            self.power.clone(),
            self.initial_locked.clone(),
        )?;
        let current = Board::try_new(
            self.grid.clone(),
            color_count,
            self.power.clone(),
            self.locked.clone(),
        )?;
        self.target_grid
            .check_colors(color_count)
            .map_err(BoardError::from)?;

        let size = initial.size();
        for found in [current.size(), self.target_grid.size()] {
            if found != size {
                return Err(SavedGameError::SizeMismatch {
                    found,
                    expected: size,
                });
            }
        }
        if let Some(&pos) = self
            .optimal_path
            .iter()
            .chain(&self.player_moves)
            .find(|pos| !pos.is_within(size))
        {
            return Err(SavedGameError::MoveOutOfBounds { pos, size });
        }
        Ok((initial, current))
    }
}

/// Reasons a saved level cannot be resumed.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum SavedGameError {
    /// A saved board is not playable.
    #[display("{_0}")]
    Board(#[from] BoardError),
    /// A grid has a different size than the generated one.
    #[display("grid is {found}x{found}, expected {expected}x{expected}")]
    #[from(ignore)]
    SizeMismatch {
        /// Size of the offending grid.
        found: u8,
        /// Size of the generated grid.
        expected: u8,
    },
    /// A recorded move lies outside the grid.
    #[display("move {pos} is outside the {size}x{size} grid")]
    #[from(ignore)]
    MoveOutOfBounds {
        /// Offending move.
        pos: Position,
        /// Grid side length.
        size: u8,
    },
}

/// Persisted progress of a player.
///
/// # Examples
///
/// ```
/// use hueflip_game::SavedGameState;
///
/// let json = r#"{
///     "currentLevel": 7,
///     "totalPoints": 1200,
///     "levelPoints": {"6": 250},
///     "completedLevels": [1, 2, 3, 4, 5, 6],
///     "lastPlayed": 1700000000,
///     "version": 1
/// }"#;
/// let state: SavedGameState = serde_json::from_str(json)?;
/// assert_eq!(state.current_level, 7);
/// assert_eq!(state.level_points.get(&6), Some(&250));
/// assert!(state.current_game.is_none());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGameState {
    /// Level to resume or start.
    pub current_level: u32,
    /// Accumulated points.
    pub total_points: u32,
    /// Best score per completed level.
    #[serde(default)]
    pub level_points: BTreeMap<u32, u32>,
    /// Completed levels, in completion order.
    #[serde(default)]
    pub completed_levels: Vec<u32>,
    /// Unix time of the last save, in seconds.
    pub last_played: u64,
    /// Save format version.
    pub version: u32,
    /// Play statistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<GameStats>,
    /// The level in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_game: Option<SavedGame>,
}

impl SavedGameState {
    /// Creates an empty save starting at level 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_level: 1,
            total_points: 0,
            level_points: BTreeMap::new(),
            completed_levels: vec![],
            last_played: unix_now(),
            version: SAVE_VERSION,
            stats: None,
            current_game: None,
        }
    }
}

impl Default for SavedGameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the current Unix time in seconds.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Error returned by a [`GameStore`].
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StoreError {
    /// Reading or writing the save failed.
    #[display("save I/O failed: {_0}")]
    Io(#[from] io::Error),
    /// The save is not valid JSON of the expected shape.
    #[display("save is malformed: {_0}")]
    Json(#[from] serde_json::Error),
    /// The save parses but describes a level that cannot be played.
    #[display("save is invalid: {_0}")]
    Invalid(#[from] SavedGameError),
    /// The save was written by a newer format.
    #[display("save version {found} is newer than supported version {supported}")]
    #[from(ignore)]
    UnsupportedVersion {
        /// Version found in the save.
        found: u32,
        /// Newest supported version.
        supported: u32,
    },
}

/// Storage of a single [`SavedGameState`].
pub trait GameStore: Debug + Send {
    /// Loads the save, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the save exists but cannot be read.
    fn load(&self) -> Result<Option<SavedGameState>, StoreError>;

    /// Replaces the save.
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be written.
    fn save(&mut self, state: &SavedGameState) -> Result<(), StoreError>;

    /// Deletes the save.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing save cannot be deleted.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Returns `true` if a save exists.
    fn has_save(&self) -> bool;
}

/// A store keeping the save in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Option<SavedGameState>,
    save_count: usize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `state`.
    #[must_use]
    pub fn with_state(state: SavedGameState) -> Self {
        Self {
            saved: Some(state),
            save_count: 0,
        }
    }

    /// Returns the number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl GameStore for MemoryStore {
    fn load(&self) -> Result<Option<SavedGameState>, StoreError> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, state: &SavedGameState) -> Result<(), StoreError> {
        self.saved = Some(state.clone());
        self.save_count += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.saved = None;
        Ok(())
    }

    fn has_save(&self) -> bool {
        self.saved.is_some()
    }
}

/// A store writing the save as pretty-printed JSON to a file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the save file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameStore for JsonFileStore {
    fn load(&self) -> Result<Option<SavedGameState>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let state: SavedGameState = serde_json::from_str(&json)?;
        if state.version > SAVE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: state.version,
                supported: SAVE_VERSION,
            });
        }
        Ok(Some(state))
    }

    fn save(&mut self, state: &SavedGameState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        log::debug!("saved progress to {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn has_save(&self) -> bool {
        self.path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        process,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("hueflip-test-{}-{n}", process::id()))
            .join(name)
    }

    fn sample_state() -> SavedGameState {
        let grid = Grid::from_rows(vec![vec![1, 0], vec![0, 0]]).unwrap();
        let mut locked = LockedMap::new();
        locked.lock(Position::new(0, 1), 3);
        SavedGameState {
            current_level: 4,
            total_points: 900,
            level_points: BTreeMap::from([(3, 300)]),
            completed_levels: vec![1, 2, 3],
            last_played: 1_700_000_000,
            version: SAVE_VERSION,
            stats: Some(GameStats {
                games_played: 4,
                games_won: 3,
                ..GameStats::default()
            }),
            current_game: Some(SavedGame {
                grid: grid.clone(),
                target_grid: Grid::new(2),
                moves: 0,
                time: 5,
                optimal_path: vec![Position::new(1, 1)],
                hints_enabled: true,
                undo_count: 0,
                player_moves: vec![],
                initial_grid: grid,
                power: PowerSet::new(),
                locked: locked.clone(),
                initial_locked: locked,
                color_count: Some(2),
                hints_used: 0,
            }),
        }
    }

    #[test]
    fn test_boards_validate_saved_level() {
        let game = sample_state().current_game.unwrap();
        let (initial, current) = game.boards(3).unwrap();
        assert_eq!(initial.color_count(), 2);
        assert_eq!(current.locked().remaining(Position::new(0, 1)), Some(3));

        let mut one_color = game.clone();
        one_color.color_count = Some(1);
        assert_eq!(
            one_color.boards(3),
            Err(SavedGameError::Board(BoardError::InvalidColorCount {
                color_count: 1
            }))
        );

        let mut bad_color = game.clone();
        bad_color.grid = Grid::from_rows(vec![vec![255, 0], vec![0, 0]]).unwrap();
        assert!(matches!(
            bad_color.boards(3),
            Err(SavedGameError::Board(BoardError::Grid(_)))
        ));

        let mut bad_target = game.clone();
        bad_target.target_grid = Grid::filled(2, 2);
        assert!(bad_target.boards(3).is_err());

        let mut resized = game.clone();
        resized.grid = Grid::new(3);
        assert_eq!(
            resized.boards(3),
            Err(SavedGameError::SizeMismatch {
                found: 3,
                expected: 2
            })
        );

        let mut far_move = game.clone();
        far_move.player_moves = vec![Position::new(0, 0), Position::new(7, 1)];
        assert_eq!(
            far_move.boards(3),
            Err(SavedGameError::MoveOutOfBounds {
                pos: Position::new(7, 1),
                size: 2
            })
        );

        let mut far_path = game;
        far_path.optimal_path = vec![Position::new(2, 0)];
        assert!(far_path.boards(3).is_err());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample_state()).unwrap();
        let game = &json["currentGame"];
        assert_eq!(json["currentLevel"], 4);
        assert_eq!(game["grid"], serde_json::json!([[1, 0], [0, 0]]));
        assert_eq!(game["optimalPath"], serde_json::json!(["1-1"]));
        assert_eq!(game["locked"], serde_json::json!({"0-1": 3}));
    }

    #[test]
    fn test_missing_tiles_default_to_empty() {
        let json = r#"{
            "grid": [[1, 0], [0, 0]],
            "targetGrid": [[0, 0], [0, 0]],
            "moves": 0,
            "time": 0,
            "optimalPath": ["1-1"],
            "hintsEnabled": true,
            "undoCount": 0,
            "playerMoves": [],
            "initialGrid": [[1, 0], [0, 0]]
        }"#;
        let game: SavedGame = serde_json::from_str(json).unwrap();
        assert!(game.power.is_empty());
        assert!(game.locked.is_empty());
        assert_eq!(game.color_count, None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(!store.has_save());
        assert_eq!(store.load().unwrap(), None);

        store.save(&sample_state()).unwrap();
        assert!(store.has_save());
        assert_eq!(store.load().unwrap(), Some(sample_state()));
        assert_eq!(store.save_count(), 1);

        store.clear().unwrap();
        assert!(!store.has_save());
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let mut store = JsonFileStore::new(temp_path("save.json"));
        assert!(!store.has_save());
        assert!(store.load().unwrap().is_none());

        store.save(&sample_state()).unwrap();
        assert!(store.has_save());
        assert_eq!(store.load().unwrap(), Some(sample_state()));

        store.clear().unwrap();
        assert!(!store.has_save());
        store.clear().unwrap();
    }

    #[test]
    fn test_json_file_store_rejects_newer_version() {
        let mut store = JsonFileStore::new(temp_path("save.json"));
        let state = SavedGameState {
            version: SAVE_VERSION + 1,
            ..sample_state()
        };
        store.save(&state).unwrap();
        assert!(matches!(
            store.load(),
            Err(StoreError::UnsupportedVersion { found, .. }) if found == SAVE_VERSION + 1
        ));
        store.clear().unwrap();
    }

    #[test]
    fn test_json_file_store_reports_malformed_json() {
        let path = temp_path("save.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        fs::remove_file(&path).unwrap();
    }
}
