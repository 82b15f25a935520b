//! Bounded ring buffer of free slot indices.
//!
//! [`IndexQueue`] backs every [`SlotPool`](crate::slot_pool::SlotPool): it is
//! seeded with all slot indices at construction and hands them out in FIFO
//! order. The capacity is rounded up to a power of two so read and write
//! positions can wrap with a mask instead of a modulo.
//!
//! # Example
//!
//! ```
//! use lattice_core::index_queue::IndexQueue;
//!
//! let mut queue = IndexQueue::seeded(3);
//! assert_eq!(queue.capacity(), 4);
//! assert_eq!(queue.pull(), Some(0));
//! assert!(queue.push(0));
//! assert_eq!(queue.pull(), Some(1));
//! ```

/// Fixed-capacity FIFO of `u32` indices.
#[derive(Debug, Clone)]
pub struct IndexQueue {
    slots: Box<[u32]>,
    /// Monotonic read position, wrapped with `mask` on access.
    head: u32,
    /// Monotonic write position, wrapped with `mask` on access.
    tail: u32,
    mask: u32,
}

impl IndexQueue {
    /// Create an empty queue able to hold at least `capacity` indices.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        assert!(
            capacity <= u32::MAX as usize,
            "index queue capacity {capacity} does not fit in u32"
        );
        Self {
            slots: vec![0; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            mask: (capacity - 1) as u32,
        }
    }

    /// Create a queue pre-filled with `0..count`.
    pub fn seeded(count: usize) -> Self {
        let mut queue = Self::new(count);
        for index in 0..count as u32 {
            let pushed = queue.push(index);
            debug_assert!(pushed);
        }
        queue
    }

    /// Push an index at the back.
    ///
    /// Returns `false` if the queue is full. Callers that track slots
    /// correctly never observe this, so they treat it as fatal.
    pub fn push(&mut self, index: u32) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[(self.tail & self.mask) as usize] = index;
        self.tail = self.tail.wrapping_add(1);
        true
    }

    /// Pull the oldest index, or `None` when empty.
    pub fn pull(&mut self) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let index = self.slots[(self.head & self.mask) as usize];
        self.head = self.head.wrapping_add(1);
        Some(index)
    }

    /// Number of queued indices.
    pub fn len(&self) -> usize {
        self.tail.wrapping_sub(self.head) as usize
    }

    /// Returns true if no index is queued.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Returns true if another push would fail.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Storage capacity (always a power of two).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rounds_to_power_of_two() {
        assert_eq!(IndexQueue::new(0).capacity(), 1);
        assert_eq!(IndexQueue::new(1).capacity(), 1);
        assert_eq!(IndexQueue::new(5).capacity(), 8);
        assert_eq!(IndexQueue::new(64).capacity(), 64);
    }

    #[test]
    fn test_empty_pull_returns_none() {
        let mut queue = IndexQueue::new(4);
        assert!(queue.is_empty());
        assert_eq!(queue.pull(), None);
    }

    #[test]
    fn test_seeded_is_fifo() {
        let mut queue = IndexQueue::seeded(4);
        assert!(queue.is_full());
        assert_eq!(queue.pull(), Some(0));
        assert_eq!(queue.pull(), Some(1));
        assert!(queue.push(7));
        assert_eq!(queue.pull(), Some(2));
        assert_eq!(queue.pull(), Some(3));
        assert_eq!(queue.pull(), Some(7));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_fails_when_full() {
        let mut queue = IndexQueue::seeded(2);
        assert!(!queue.push(9));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_positions_wrap_around() {
        let mut queue = IndexQueue::new(4);
        for round in 0..100u32 {
            assert!(queue.push(round));
            assert!(queue.push(round + 1000));
            assert_eq!(queue.pull(), Some(round));
            assert_eq!(queue.pull(), Some(round + 1000));
        }
        assert!(queue.is_empty());
    }
}
