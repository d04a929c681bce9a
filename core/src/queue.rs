//! Dispatch queues holding submitted requests until they are processed.
//!
//! Normal requests wait in a [`FifoQueue`]; expedited ones in a
//! [`PriorityQueue`] ordered by `(priority, insertion sequence)`. Neither
//! queue allows peeking or indexed access.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::types::PriorityClass;

/// Strict first-in, first-out queue
#[derive(Debug, Clone)]
pub struct FifoQueue<T> {
    entries: VecDeque<T>,
}

impl<T> FifoQueue<T> {
    /// Creates an empty queue
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Adds `value` at the back
    pub fn enqueue(&mut self, value: T) {
        self.entries.push_back(value);
    }

    /// Removes the oldest value, or `None` when empty
    pub fn dequeue(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    /// Number of waiting values
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for FifoQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Heap entry ordered so that `BinaryHeap` (a max-heap) pops the lowest
/// `(priority, sequence)` first.
#[derive(Debug, Clone)]
struct Entry<T> {
    priority: PriorityClass,
    sequence: u64,
    value: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap on priority class, FIFO among equal classes.
///
/// `push` and `pop` are O(log n); `len` is O(1). The sequence counter lives
/// as long as the queue and is never reset.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_sequence: u64,
}

impl<T> PriorityQueue<T> {
    /// Creates an empty queue
    #[must_use]
    pub const fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Inserts `value` with the given priority class
    pub fn push(&mut self, priority: PriorityClass, value: T) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Entry {
            priority,
            sequence,
            value,
        });
    }

    /// Removes the most urgent, earliest-pushed value, or `None` when empty
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.value)
    }

    /// Number of waiting values
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fifo_preserves_insertion_order() {
        let mut queue = FifoQueue::new();
        queue.enqueue("first");
        queue.enqueue("second");
        queue.enqueue("third");

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dequeue(), Some("first"));
        assert_eq!(queue.dequeue(), Some("second"));
        assert_eq!(queue.dequeue(), Some("third"));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn priority_is_stable_among_equals() {
        let mut queue = PriorityQueue::new();
        queue.push(PriorityClass::new(2), "A");
        queue.push(PriorityClass::new(0), "B");
        queue.push(PriorityClass::new(2), "C");

        assert_eq!(queue.pop(), Some("B"));
        assert_eq!(queue.pop(), Some("A"));
        assert_eq!(queue.pop(), Some("C"));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn priority_len_tracks_pushes_and_pops() {
        let mut queue = PriorityQueue::new();
        assert!(queue.is_empty());
        queue.push(PriorityClass::LOW, 1);
        queue.push(PriorityClass::URGENT, 2);
        assert_eq!(queue.len(), 2);
        queue.pop();
        assert_eq!(queue.len(), 1);
    }

    proptest! {
        #[test]
        fn priority_pops_in_key_order(priorities in prop::collection::vec(0u8..4, 0..50)) {
            let mut queue = PriorityQueue::new();
            for (index, priority) in priorities.iter().enumerate() {
                queue.push(PriorityClass::new(*priority), (*priority, index));
            }

            let mut expected: Vec<(u8, usize)> = priorities
                .iter()
                .enumerate()
                .map(|(index, priority)| (*priority, index))
                .collect();
            expected.sort_unstable();

            let mut popped = Vec::new();
            while let Some(value) = queue.pop() {
                popped.push(value);
            }
            prop_assert_eq!(popped, expected);
        }

        #[test]
        fn fifo_pops_in_push_order(values in prop::collection::vec(any::<u32>(), 0..50)) {
            let mut queue = FifoQueue::new();
            for value in &values {
                queue.enqueue(*value);
            }

            let mut popped = Vec::new();
            while let Some(value) = queue.dequeue() {
                popped.push(value);
            }
            prop_assert_eq!(popped, values);
        }
    }
}
