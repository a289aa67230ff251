//! Motion analysis primitives
//!
//! Windowed averaging and the pure intent predicates sensors use to decide
//! when raw motion becomes a gesture.

pub mod intent;
pub mod moving_average;

pub use intent::{should_cancel, should_gesture, Axis};
pub use moving_average::MovingAverage;
