//! Host input layer
//!
//! Raw event types plus the two collaborator traits the engine consumes: an
//! [`InputSurface`](surface::InputSurface) delivering named event channels
//! and a [`TimerService`](timer::TimerService) for delay scheduling. The
//! synthetic implementations back the test suites and the replay binary.

pub mod surface;
pub mod synthetic;
pub mod timer;
pub mod types;

pub use surface::{InputSurface, ListenerCallback, ListenerHandle, ListenerOptions};
pub use synthetic::{ManualTimer, SyntheticSurface};
pub use timer::{TimerHandle, TimerService};
pub use types::{
    DeltaMode, EventKind, KeyInfo, ModifierFlags, RawInputEvent, TouchPoint, WheelDelta,
};
