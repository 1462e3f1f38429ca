//! Bounded stack of board snapshots for undo.

use std::{
    collections::{VecDeque, vec_deque},
    num::NonZero,
};

/// A bounded stack of snapshots for undo.
///
/// When full, pushing drops the oldest entry, so the most recent `capacity`
/// snapshots stay available.
#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    stack: VecDeque<T>,
    capacity: NonZero<usize>,
}

impl<T> UndoStack<T> {
    /// Default number of snapshots kept.
    pub const DEFAULT_CAPACITY: NonZero<usize> = NonZero::new(1000).unwrap();

    /// Creates an empty stack holding at most `capacity` snapshots.
    #[must_use]
    pub fn new(capacity: NonZero<usize>) -> Self {
        Self {
            stack: VecDeque::new(),
            capacity,
        }
    }

    /// Returns the maximum number of snapshots.
    #[must_use]
    pub fn capacity(&self) -> NonZero<usize> {
        self.capacity
    }

    /// Returns the number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if there is nothing to undo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the snapshots, oldest first.
    #[must_use]
    pub fn entries(&self) -> vec_deque::Iter<'_, T> {
        self.stack.iter()
    }

    /// Pushes a snapshot, dropping the oldest one when full.
    pub fn push(&mut self, item: T) {
        if self.stack.len() == self.capacity.get() {
            self.stack.pop_front();
        }
        self.stack.push_back(item);
    }

    /// Removes and returns the most recent snapshot.
    pub fn pop(&mut self) -> Option<T> {
        self.stack.pop_back()
    }

    /// Returns the most recent snapshot.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.stack.back()
    }

    /// Removes every snapshot.
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::UndoStack;

    #[test]
    fn test_push_pop_order() {
        let mut stack = UndoStack::new(NonZero::new(10).unwrap());
        stack.push(1);
        stack.push(2);
        stack.push(3);

        assert_eq!(stack.peek(), Some(&3));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut stack = UndoStack::new(NonZero::new(3).unwrap());
        for i in 1..=4 {
            stack.push(i);
        }

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.entries().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(stack.pop(), Some(4));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_clear_resets_stack() {
        let mut stack = UndoStack::<i32>::default();
        stack.push(1);
        stack.push(2);
        stack.clear();

        assert!(stack.is_empty());
        assert_eq!(stack.peek(), None);
        stack.push(3);
        assert_eq!(stack.pop(), Some(3));
    }
}
