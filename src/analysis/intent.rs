//! Gesture intent heuristics
//!
//! Pure predicates shared by every sensor: whether accumulated motion has
//! crossed the start threshold, and whether cross-axis motion should cancel
//! a candidate gesture before it starts.

use serde::{Deserialize, Serialize};

/// Gesture axis constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Decide whether accumulated deltas amount to a gesture start
///
/// A non-positive threshold starts immediately. With an orientation
/// configured, only that axis is measured; otherwise the dominant axis is.
pub fn should_gesture(orientation: Option<Axis>, threshold: f64, dx: f64, dy: f64) -> bool {
    if threshold <= 0.0 {
        return true;
    }
    let magnitude = match orientation {
        Some(Axis::Horizontal) => dx.abs(),
        Some(Axis::Vertical) => dy.abs(),
        None => dx.abs().max(dy.abs()),
    };
    magnitude > threshold
}

/// Decide whether cross-axis motion disqualifies a candidate gesture
///
/// Only meaningful when an orientation is configured along with a cancel
/// threshold: the candidate is abandoned when motion on the off axis exceeds
/// the limit while motion on the gesture axis stays below it.
pub fn should_cancel(
    orientation: Option<Axis>,
    cancel_threshold: Option<f64>,
    dx: f64,
    dy: f64,
) -> bool {
    let (Some(orientation), Some(limit)) = (orientation, cancel_threshold) else {
        return false;
    };
    let (primary, cross) = match orientation {
        Axis::Horizontal => (dx, dy),
        Axis::Vertical => (dy, dx),
    };
    cross.abs() > limit && primary.abs() < limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_threshold_always_gestures() {
        assert!(should_gesture(None, 0.0, 0.0, 0.0));
        assert!(should_gesture(Some(Axis::Vertical), 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_dominant_axis_without_orientation() {
        assert!(should_gesture(None, 5.0, 2.0, 6.0));
        assert!(!should_gesture(None, 5.0, 2.0, 4.0));
    }

    #[test]
    fn test_orientation_restricts_measured_axis() {
        // Large vertical motion must not start a horizontal gesture.
        assert!(!should_gesture(Some(Axis::Horizontal), 5.0, 2.0, 50.0));
        assert!(should_gesture(Some(Axis::Horizontal), 5.0, 6.0, 0.0));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!should_gesture(None, 5.0, 5.0, 0.0));
        assert!(should_gesture(None, 5.0, 5.01, 0.0));
    }

    #[test]
    fn test_cancel_requires_orientation_and_limit() {
        assert!(!should_cancel(None, Some(3.0), 0.0, 100.0));
        assert!(!should_cancel(Some(Axis::Vertical), None, 100.0, 0.0));
    }

    #[test]
    fn test_cancel_on_dominant_cross_axis_motion() {
        assert!(should_cancel(Some(Axis::Vertical), Some(3.0), 4.0, 1.0));
        // Primary axis already past the limit: the gesture is legitimate.
        assert!(!should_cancel(Some(Axis::Vertical), Some(3.0), 4.0, 5.0));
        assert!(!should_cancel(Some(Axis::Vertical), Some(3.0), 2.0, 1.0));
    }
}
