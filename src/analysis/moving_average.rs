//! Weighted moving average over a fixed sample window
//!
//! The wheel sensor keeps three of these (one per axis plus one for spin
//! magnitude) to separate momentum decay from intentional scrolling. The
//! window is a ring: once full, each push evicts the oldest sample. Weights
//! grow linearly from the oldest slot to the newest (or the reverse for a
//! negative weight factor), so recent samples dominate the estimate without
//! a full low-pass filter.

use std::cell::Cell;

/// Ring-buffered moving average with optional linear weighting
///
/// `weight` controls the slope: `0.0` is a plain mean, a positive value
/// biases toward recent samples and a negative one toward old samples.
/// Pinned samples sit outside the ring and are never evicted; they
/// participate in the average at the oldest slot's weight.
#[derive(Debug)]
pub struct MovingAverage {
    size: usize,
    weight: f64,
    samples: Vec<f64>,
    cursor: usize,
    pinned: Vec<f64>,
    running_delta: f64,
    last: f64,
    cached: Cell<Option<f64>>,
}

impl MovingAverage {
    /// Create an empty window of `size` samples with the given weight slope
    pub fn new(size: usize, weight: f64) -> Self {
        Self {
            size: size.max(1),
            weight,
            samples: Vec::with_capacity(size.max(1)),
            cursor: 0,
            pinned: Vec::new(),
            running_delta: 0.0,
            last: 0.0,
            cached: Cell::new(None),
        }
    }

    /// Push a sample, evicting the oldest one once the window is full
    pub fn push(&mut self, value: f64) {
        if self.samples.len() < self.size {
            self.samples.push(value);
            self.cursor = self.samples.len() % self.size;
        } else {
            self.samples[self.cursor] = value;
            self.cursor = (self.cursor + 1) % self.size;
        }
        self.running_delta += value;
        self.last = value;
        self.cached.set(None);
    }

    /// Add a sample that persists outside the ring and is never evicted
    pub fn pin(&mut self, value: f64) {
        self.pinned.push(value);
        self.cached.set(None);
    }

    /// Weighted mean of pinned plus windowed samples; `0.0` when empty
    ///
    /// Memoized until the next push, pin, or reset.
    pub fn average(&self) -> f64 {
        if let Some(value) = self.cached.get() {
            return value;
        }
        let count = self.pinned.len() + self.samples.len();
        if count == 0 {
            return 0.0;
        }
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (index, value) in self.pinned.iter().chain(self.ordered()).enumerate() {
            let weight = self.slot_weight(index + 1, count);
            weighted_sum += value * weight;
            weight_total += weight;
        }
        let average = weighted_sum / weight_total;
        self.cached.set(Some(average));
        average
    }

    /// Absolute distance of the most recent sample from the average
    pub fn deviation(&self) -> f64 {
        (self.last - self.average()).abs()
    }

    /// Running sum of every pushed sample since the last reset
    pub fn delta(&self) -> f64 {
        self.running_delta
    }

    /// Most recently pushed sample; `0.0` before the first push
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Number of samples currently in the window (pinned excluded)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all samples, pins, and the running delta
    pub fn reset(&mut self) {
        self.samples.clear();
        self.pinned.clear();
        self.cursor = 0;
        self.running_delta = 0.0;
        self.last = 0.0;
        self.cached.set(None);
    }

    /// Window samples in age order, oldest first
    fn ordered(&self) -> impl Iterator<Item = &f64> {
        let split = if self.samples.len() < self.size {
            0
        } else {
            self.cursor
        };
        self.samples[split..].iter().chain(self.samples[..split].iter())
    }

    /// Weight of the sample at `position` (1-based, oldest first) among
    /// `count` samples
    fn slot_weight(&self, position: usize, count: usize) -> f64 {
        if self.weight == 0.0 {
            return 1.0;
        }
        let rank = if self.weight > 0.0 {
            position
        } else {
            count + 1 - position
        };
        1.0 + self.weight.abs() * (rank - 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_constant_input_yields_constant_average() {
        let mut avg = MovingAverage::new(6, 1.0);
        for _ in 0..4 {
            avg.push(2.5);
        }
        assert!((avg.average() - 2.5).abs() < EPSILON);
        assert!(avg.deviation() < EPSILON);
    }

    #[test]
    fn test_unweighted_average_is_plain_mean() {
        let mut avg = MovingAverage::new(3, 0.0);
        avg.push(1.0);
        avg.push(2.0);
        avg.push(6.0);
        assert!((avg.average() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_positive_weight_biases_toward_recent() {
        let mut avg = MovingAverage::new(2, 1.0);
        avg.push(0.0);
        avg.push(3.0);
        // weights: oldest 1, newest 2 -> (0*1 + 3*2) / 3 = 2
        assert!((avg.average() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_negative_weight_biases_toward_old() {
        let mut avg = MovingAverage::new(2, -1.0);
        avg.push(0.0);
        avg.push(3.0);
        // weights: oldest 2, newest 1 -> (0*2 + 3*1) / 3 = 1
        assert!((avg.average() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_window_evicts_oldest_sample() {
        let mut avg = MovingAverage::new(2, 0.0);
        avg.push(100.0);
        avg.push(1.0);
        avg.push(3.0);
        assert!((avg.average() - 2.0).abs() < EPSILON);
        assert_eq!(avg.len(), 2);
    }

    #[test]
    fn test_decay_after_single_spike() {
        // A spike followed by a steady trickle: the average stays above the
        // trickle while the spike is in the window and collapses onto it
        // once evicted.
        let mut avg = MovingAverage::new(6, 1.0);
        avg.push(1.0);
        for _ in 0..5 {
            avg.push(0.05);
        }
        // weights 1..=6, sum 21: (1*1 + 0.05*(2+3+4+5+6)) / 21 = 2/21
        assert!((avg.average() - 2.0 / 21.0).abs() < EPSILON);
        assert!(avg.deviation() > 0.01);

        avg.push(0.05);
        assert!((avg.average() - 0.05).abs() < EPSILON);
        assert!(avg.deviation() < EPSILON);
    }

    #[test]
    fn test_pinned_sample_survives_eviction() {
        let mut avg = MovingAverage::new(2, 0.0);
        avg.pin(9.0);
        avg.push(1.0);
        avg.push(1.0);
        avg.push(1.0);
        // pin persists: (9 + 1 + 1) / 3
        assert!((avg.average() - 11.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_delta_accumulates_across_eviction() {
        let mut avg = MovingAverage::new(2, 0.0);
        avg.push(1.0);
        avg.push(2.0);
        avg.push(3.0);
        assert!((avg.delta() - 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut avg = MovingAverage::new(3, 1.0);
        avg.pin(5.0);
        avg.push(2.0);
        avg.reset();
        assert!(avg.is_empty());
        assert_eq!(avg.average(), 0.0);
        assert_eq!(avg.delta(), 0.0);
        assert_eq!(avg.last(), 0.0);
    }

    #[test]
    fn test_average_memoized_until_next_push() {
        let mut avg = MovingAverage::new(3, 1.0);
        avg.push(1.0);
        let first = avg.average();
        assert_eq!(avg.average(), first);
        avg.push(4.0);
        assert_ne!(avg.average(), first);
    }
}
