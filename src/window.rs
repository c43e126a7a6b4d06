//! Bounded FIFO window over recent observations
//!
//! Backs the swing high/low windows, the momentum percent-change window, and
//! the oscillator smoothing window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rolling window keeping the most recent `capacity` values in arrival order.
///
/// Pushing at capacity evicts the oldest value, so `len() <= capacity` holds
/// at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingWindow<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest if the window is full.
    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Oldest-to-newest iterator
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl RollingWindow<f64> {
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().fold(None, |acc, v| {
            Some(acc.map_or(v, |m: f64| m.max(v)))
        })
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().fold(None, |acc, v| {
            Some(acc.map_or(v, |m: f64| m.min(v)))
        })
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum() / self.values.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest_at_capacity() {
        let mut w = RollingWindow::new(3);
        for v in [10.0, 12.0, 9.0, 15.0] {
            w.push(v);
        }
        assert_eq!(w.len(), 3);
        let contents: Vec<f64> = w.iter().copied().collect();
        assert_eq!(contents, vec![12.0, 9.0, 15.0]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut w = RollingWindow::new(5);
        for v in 0..100 {
            w.push(v as f64);
            assert!(w.len() <= 5);
        }
        assert!(w.is_full());
    }

    #[test]
    fn test_extremes_and_mean() {
        let mut w = RollingWindow::new(4);
        assert_eq!(w.max(), None);
        assert_eq!(w.mean(), None);

        for v in [3.0, 1.0, 2.0] {
            w.push(v);
        }
        assert_eq!(w.max(), Some(3.0));
        assert_eq!(w.min(), Some(1.0));
        assert_eq!(w.mean(), Some(2.0));
    }

    #[test]
    fn test_clear() {
        let mut w = RollingWindow::new(3);
        w.push(1.0);
        w.push(2.0);
        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.capacity(), 3);
    }
}
