//! Host input surface abstraction
//!
//! The engine never talks to a concrete platform API; it consumes a host
//! collaborator that can subscribe/unsubscribe named event channels on a
//! target and suppress an event's default platform reaction. Conformance is
//! checked at compile time through this trait, and channel availability is
//! checked eagerly at observable construction, before any subscription.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::types::{EventKind, RawInputEvent};

/// Listener mode, fixed at attach time
///
/// A passive listener promises it will not suppress default reactions; the
/// host may use that to keep its own processing responsive. Because the mode
/// cannot be altered after attachment, a configuration change that flips it
/// forces the sensor to be discarded and recreated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ListenerOptions {
    pub passive: bool,
}

/// Opaque handle identifying one attached listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// Callback invoked synchronously for each delivered event
pub type ListenerCallback = Rc<dyn Fn(&RawInputEvent)>;

/// A host target the engine can attach raw-event listeners to
pub trait InputSurface {
    /// Whether this surface delivers the given event channel at all
    fn supports(&self, kind: EventKind) -> bool;

    /// Attach a listener; the callback runs synchronously on the host's
    /// dispatch stack, in delivery order
    fn add_listener(
        &self,
        kind: EventKind,
        options: ListenerOptions,
        callback: ListenerCallback,
    ) -> ListenerHandle;

    /// Detach a listener; after this returns the callback is never invoked
    /// again
    fn remove_listener(&self, handle: ListenerHandle);

    /// Suppress the default platform reaction to the given event
    fn prevent_default(&self, event: &RawInputEvent);
}
