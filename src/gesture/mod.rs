//! Gesture recognition pipeline
//!
//! Everything downstream of the sensors: state snapshots, the pure reducer,
//! per-observable configuration, the shareable observable surface, and the
//! pooling engine.

pub mod config;
pub mod engine;
pub mod observable;
pub mod reducer;
pub mod state;

pub use config::{ObservableConfig, DEFAULT_CANCEL_THRESHOLD};
pub use engine::{aggregate, AggregateConfig, GestureEngine, GestureHost};
pub use observable::{
    keyboard, mouse, observable, raw_source, source, touch, wheel, GestureObservable, Observer,
    Subscription,
};
pub use reducer::reduce;
pub use state::{GesturePhase, GestureState, InputKind};
