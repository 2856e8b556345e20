//! Bounded history of recent keys with per-key counts.

use std::collections::{HashMap, VecDeque};

/// Remembers the last `capacity` keys added and how often each occurs among them.
#[derive(Debug, Clone)]
pub struct FrequencyRingBuffer {
    capacity: usize,
    history: VecDeque<u64>,
    counts: HashMap<u64, u32>,
}

impl FrequencyRingBuffer {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, history: VecDeque::with_capacity(capacity), counts: HashMap::new() }
    }

    /// Record `key`, evicting the oldest entry when full.
    pub fn add(&mut self, key: u64) {
        if self.history.len() == self.capacity {
            if let Some(evicted) = self.history.pop_front() {
                self.decrement(evicted);
            }
        }
        self.history.push_back(key);
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Occurrences of `key` in the current window.
    pub fn frequency(&self, key: u64) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct keys in the window.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.counts.clear();
    }

    fn decrement(&mut self, key: u64) {
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_within_window() {
        let mut ring = FrequencyRingBuffer::new(4);
        ring.add(1);
        ring.add(2);
        ring.add(1);
        assert_eq!(ring.frequency(1), 2);
        assert_eq!(ring.frequency(2), 1);
        assert_eq!(ring.frequency(3), 0);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.distinct(), 2);
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let mut ring = FrequencyRingBuffer::new(3);
        for key in [7, 8, 9, 10] {
            ring.add(key);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.frequency(7), 0);
        assert_eq!(ring.distinct(), 3);

        // Evicting one occurrence of a repeated key keeps the others.
        let mut ring = FrequencyRingBuffer::new(3);
        for key in [1, 1, 1, 2] {
            ring.add(key);
        }
        assert_eq!(ring.frequency(1), 2);
        assert_eq!(ring.frequency(2), 1);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut ring = FrequencyRingBuffer::new(0);
        assert_eq!(ring.capacity(), 1);
        ring.add(1);
        ring.add(2);
        assert_eq!(ring.frequency(1), 0);
        assert_eq!(ring.frequency(2), 1);
    }

    #[test]
    fn test_clear() {
        let mut ring = FrequencyRingBuffer::new(2);
        ring.add(1);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.frequency(1), 0);
    }
}
