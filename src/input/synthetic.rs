//! Synthetic host implementations
//!
//! `SyntheticSurface` and `ManualTimer` implement the host collaborator
//! traits deterministically, with bookkeeping the tests assert against
//! (listener counts, prevented defaults, pending timers). The replay binary
//! uses them to drive recorded traces through the engine offline: advancing
//! the manual clock to each event's timestamp preserves the wheel debounce
//! semantics without wall-clock time.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::surface::{InputSurface, ListenerCallback, ListenerHandle, ListenerOptions};
use super::timer::{TimerHandle, TimerService};
use super::types::{EventKind, RawInputEvent};

struct ListenerEntry {
    handle: ListenerHandle,
    kind: EventKind,
    options: ListenerOptions,
    callback: ListenerCallback,
}

/// In-memory input surface with deterministic dispatch
pub struct SyntheticSurface {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<ListenerEntry>>,
    prevented: RefCell<Vec<EventKind>>,
    unsupported: Vec<EventKind>,
}

impl SyntheticSurface {
    /// Create a surface supporting every event channel
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            prevented: RefCell::new(Vec::new()),
            unsupported: Vec::new(),
        }
    }

    /// Create a surface that does not deliver the given channels
    pub fn without(kinds: &[EventKind]) -> Self {
        Self {
            unsupported: kinds.to_vec(),
            ..Self::new()
        }
    }

    /// Deliver an event to every listener attached to its channel
    ///
    /// Listeners are invoked in attach order. The listener list is
    /// snapshotted first, so a callback may detach listeners mid-dispatch.
    pub fn dispatch(&self, event: &RawInputEvent) {
        let callbacks: Vec<ListenerCallback> = self
            .listeners
            .borrow()
            .iter()
            .filter(|entry| entry.kind == event.kind)
            .map(|entry| Rc::clone(&entry.callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    /// Total number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of listeners attached to one channel
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Listener mode of the first listener on a channel, if any
    pub fn listener_options_for(&self, kind: EventKind) -> Option<ListenerOptions> {
        self.listeners
            .borrow()
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.options)
    }

    /// Channels of every event whose default reaction was suppressed
    pub fn prevented(&self) -> Vec<EventKind> {
        self.prevented.borrow().clone()
    }
}

impl Default for SyntheticSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSurface for SyntheticSurface {
    fn supports(&self, kind: EventKind) -> bool {
        !self.unsupported.contains(&kind)
    }

    fn add_listener(
        &self,
        kind: EventKind,
        options: ListenerOptions,
        callback: ListenerCallback,
    ) -> ListenerHandle {
        let handle = ListenerHandle(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().push(ListenerEntry {
            handle,
            kind,
            options,
            callback,
        });
        handle
    }

    fn remove_listener(&self, handle: ListenerHandle) {
        self.listeners
            .borrow_mut()
            .retain(|entry| entry.handle != handle);
    }

    fn prevent_default(&self, event: &RawInputEvent) {
        self.prevented.borrow_mut().push(event.kind);
    }
}

struct PendingTimer {
    handle: TimerHandle,
    due: u64,
    callback: Option<Box<dyn FnOnce()>>,
}

/// Manually advanced clock implementing [`TimerService`]
pub struct ManualTimer {
    now: Cell<u64>,
    next_id: Cell<u64>,
    pending: RefCell<Vec<PendingTimer>>,
}

impl ManualTimer {
    /// Create a timer starting at time zero
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a timer starting at the given millisecond timestamp
    pub fn starting_at(now: u64) -> Self {
        Self {
            now: Cell::new(now),
            next_id: Cell::new(0),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Advance the clock by `delta_ms`, firing due timers in order
    pub fn advance(&self, delta_ms: u64) {
        self.advance_to(self.now.get() + delta_ms);
    }

    /// Advance the clock to `target`, firing due timers in due order
    ///
    /// Each callback observes `now()` at its own due time, and may schedule
    /// further timeouts which fire in the same pass if they fall before
    /// `target`.
    pub fn advance_to(&self, target: u64) {
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                let index = pending
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.handle.0))
                    .map(|(index, _)| index);
                index.map(|index| {
                    let mut timer = pending.remove(index);
                    (timer.due, timer.callback.take())
                })
            };
            match next {
                Some((due, Some(callback))) => {
                    if due > self.now.get() {
                        self.now.set(due);
                    }
                    callback();
                }
                Some((_, None)) => {}
                None => break,
            }
        }
        if target > self.now.get() {
            self.now.set(target);
        }
    }

    /// Number of timers scheduled but not yet fired
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService for ManualTimer {
    fn now(&self) -> u64 {
        self.now.get()
    }

    fn set_timeout(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let handle = TimerHandle(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.pending.borrow_mut().push(PendingTimer {
            handle,
            due: self.now.get() + delay_ms,
            callback: Some(callback),
        });
        handle
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.pending
            .borrow_mut()
            .retain(|timer| timer.handle != handle);
    }
}
