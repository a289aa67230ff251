//! Gesture recognition and stream composition over host input events
//!
//! The crate turns raw device events (mouse, touch, wheel, keyboard) into a
//! stream of [`GestureState`](gesture::GestureState) snapshots through a
//! synchronous, cancellable push-stream pipeline:
//!
//! 1. An [`InputSurface`](input::InputSurface) delivers raw events to a
//!    per-device [`Sensor`](sensor::Sensor), which decides when motion
//!    becomes gesture intent (thresholds, axis constraints, wheel momentum
//!    filtering).
//! 2. Candidate gesture events are folded by a pure reducer into absolute
//!    state snapshots carrying position, deltas, velocity, spin, and timing.
//! 3. Snapshot streams are shared: any number of subscribers observe one
//!    sensor attachment, and the last unsubscription detaches it.
//!
//! The [`signal`] module is the underlying stream protocol, usable on its
//! own; [`gesture`] is the high-level surface most callers want. Everything
//! is single-threaded by design: delivery happens inline on the host's
//! dispatch stack with no buffering.

pub mod analysis;
pub mod gesture;
pub mod input;
pub mod sensor;
pub mod signal;
pub mod trace;

use thiserror::Error as ThisError;

/// Errors produced by the engine
#[derive(Debug, ThisError)]
pub enum Error {
    /// The host surface does not deliver a channel a sensor requires
    #[error("unsupported surface: {0}")]
    UnsupportedSurface(String),

    /// Invalid observable or aggregate configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A candidate event arrived in an impossible order for its stream
    #[error("unexpected event: {0}")]
    UnexpectedEvent(String),

    /// Trace file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Trace serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

pub use gesture::{
    aggregate, AggregateConfig, GestureEngine, GestureHost, GestureObservable, GesturePhase,
    GestureState, InputKind, ObservableConfig, Observer, Subscription,
};
pub use input::{InputSurface, ManualTimer, RawInputEvent, SyntheticSurface, TimerService};
pub use trace::Trace;
