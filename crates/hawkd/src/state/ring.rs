//! Fixed-capacity FIFO that evicts its oldest element when full.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub(crate) struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty ring. A zero capacity retains nothing.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Appends an item and returns the evicted one, if any.
    pub(crate) fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: PartialEq> PartialEq for RingBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn evicts_oldest_first() {
        let mut ring = RingBuffer::new(3);
        for value in 0..3 {
            assert_eq!(ring.push(value), None);
        }
        assert_eq!(ring.push(3), Some(0));
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[rstest]
    fn zero_capacity_retains_nothing() {
        let mut ring = RingBuffer::new(0);
        assert_eq!(ring.push("x"), Some("x"));
        assert_eq!(ring.len(), 0);
    }
}
