//! Gesture state snapshots
//!
//! The engine's output vocabulary: each recognized input event folds the
//! previous snapshot into a new one, so every field is absolute at emission
//! time and consumers never need to diff snapshots themselves.

use serde::{Deserialize, Serialize};

use crate::input::types::KeyInfo;

/// Input device class that produced a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Mouse,
    Touch,
    Wheel,
    Keyboard,
}

/// Lifecycle phase of a candidate gesture event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Intent confirmed; gesture begins
    Start,
    /// Motion within an active gesture
    Move,
    /// Gesture over (release, key-up, or wheel settle)
    End,
}

/// One immutable snapshot of a gesture in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureState {
    /// Device class that produced this gesture
    pub kind: InputKind,
    /// Current pointer position
    pub x: f64,
    pub y: f64,
    /// Position where the gesture started
    pub x_initial: f64,
    pub y_initial: f64,
    /// Position at the previous snapshot
    pub x_prev: f64,
    pub y_prev: f64,
    /// Total displacement since the gesture started
    pub x_delta: f64,
    pub y_delta: f64,
    /// Displacement since the previous snapshot
    pub x_velocity: f64,
    pub y_velocity: f64,
    /// Accumulated wheel spin since the gesture started (wheel only)
    pub x_spin: f64,
    pub y_spin: f64,
    /// True from gesture start until (exclusive) the terminal snapshot
    pub gesturing: bool,
    /// Held key (keyboard only)
    pub key: Option<KeyInfo>,
    /// True when the current snapshot came from key auto-repeat
    pub repeat: bool,
    /// Host timestamp of the event behind this snapshot, in milliseconds
    pub time: u64,
    /// Host timestamp of the gesture start
    pub time_initial: u64,
    /// Milliseconds since the previous snapshot
    pub duration: u64,
    /// Milliseconds since the gesture started
    pub elapsed: u64,
}

impl GestureState {
    /// Idle snapshot used as the fold seed for a gesture stream
    pub fn initial(kind: InputKind) -> Self {
        Self {
            kind,
            x: 0.0,
            y: 0.0,
            x_initial: 0.0,
            y_initial: 0.0,
            x_prev: 0.0,
            y_prev: 0.0,
            x_delta: 0.0,
            y_delta: 0.0,
            x_velocity: 0.0,
            y_velocity: 0.0,
            x_spin: 0.0,
            y_spin: 0.0,
            gesturing: false,
            key: None,
            repeat: false,
            time: 0,
            time_initial: 0,
            duration: 0,
            elapsed: 0,
        }
    }
}
