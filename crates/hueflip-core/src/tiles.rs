//! Special tiles: power tiles and locked tiles.
//!
//! Both kinds are disabled by the current level design (every profile asks for
//! zero of them) but remain fully functional so they can be re-enabled from
//! the difficulty curve alone.

use std::collections::{BTreeMap, BTreeSet, btree_map, btree_set};

use serde::{Deserialize, Serialize};

use crate::Position;

/// The set of power tiles of a puzzle.
///
/// Clicking a power tile affects its full 3×3 neighborhood instead of the
/// usual cross. The set is fixed once a puzzle is generated. Serialized as a
/// list of `"row-col"` strings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PowerSet(BTreeSet<Position>);

impl PowerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `pos` is a power tile.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.0.contains(&pos)
    }

    /// Marks `pos` as a power tile. Returns `false` if it already was one.
    pub fn insert(&mut self, pos: Position) -> bool {
        self.0.insert(pos)
    }

    /// Returns the number of power tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no power tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the power tiles in row-major order.
    pub fn iter(&self) -> btree_set::Iter<'_, Position> {
        self.0.iter()
    }

    /// Returns the canonical encoding, the sorted `"row-col"` list joined by `;`.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        join_keys(self.0.iter().map(ToString::to_string))
    }
}

impl FromIterator<Position> for PowerSet {
    fn from_iter<T: IntoIterator<Item = Position>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PowerSet {
    type Item = &'a Position;
    type IntoIter = btree_set::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Locked tiles and their remaining unlock counters.
///
/// A tile with a positive counter ignores color changes. Every completed
/// player move decrements all counters by one and tiles reaching zero unlock.
/// A map never stores a zero counter.
///
/// # Examples
///
/// ```
/// use hueflip_core::{LockedMap, Position};
///
/// let pos = Position::new(0, 2);
/// let mut locked = LockedMap::new();
/// locked.lock(pos, 2);
///
/// assert!(locked.is_locked(pos));
/// locked.decrement();
/// assert!(locked.is_locked(pos));
/// locked.decrement();
/// assert!(!locked.is_locked(pos));
/// assert!(locked.is_empty());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Position, u8>",
    into = "BTreeMap<Position, u8>"
)]
pub struct LockedMap(BTreeMap<Position, u8>);

impl LockedMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks `pos` for `moves` player moves. A zero count unlocks it.
    pub fn lock(&mut self, pos: Position, moves: u8) {
        if moves == 0 {
            self.0.remove(&pos);
        } else {
            self.0.insert(pos, moves);
        }
    }

    /// Returns `true` if `pos` currently has a positive counter.
    #[must_use]
    pub fn is_locked(&self, pos: Position) -> bool {
        self.0.get(&pos).is_some_and(|&n| n > 0)
    }

    /// Returns the remaining counter of `pos`, if locked.
    #[must_use]
    pub fn remaining(&self, pos: Position) -> Option<u8> {
        self.0.get(&pos).copied()
    }

    /// Decrements every counter by one and drops the ones reaching zero.
    pub fn decrement(&mut self) {
        self.0.retain(|_, n| {
            *n = n.saturating_sub(1);
            *n > 0
        });
    }

    /// Returns the number of locked tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no tile is locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(position, counter)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, u8)> + '_ {
        self.0.iter().map(|(&pos, &n)| (pos, n))
    }

    /// Returns the canonical encoding, sorted `"row-col:count"` entries joined by `;`.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        join_keys(self.0.iter().map(|(pos, n)| format!("{pos}:{n}")))
    }
}

impl FromIterator<(Position, u8)> for LockedMap {
    fn from_iter<T: IntoIterator<Item = (Position, u8)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (pos, n) in iter {
            map.lock(pos, n);
        }
        map
    }
}

impl From<BTreeMap<Position, u8>> for LockedMap {
    fn from(map: BTreeMap<Position, u8>) -> Self {
        map.into_iter().collect()
    }
}

impl From<LockedMap> for BTreeMap<Position, u8> {
    fn from(map: LockedMap) -> Self {
        map.0
    }
}

impl IntoIterator for LockedMap {
    type Item = (Position, u8);
    type IntoIter = btree_map::IntoIter<Position, u8>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn join_keys(keys: impl Iterator<Item = String>) -> String {
    keys.collect::<Vec<_>>().join(";")
}
