//! Host timer service abstraction
//!
//! The wheel debounce is the engine's only asynchronous scheduling point;
//! everything else propagates synchronously. The host provides
//! delay-scheduling and cancellation through this trait.

/// Opaque handle identifying one scheduled timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// A host service that can schedule delayed callbacks
pub trait TimerService {
    /// Current host time in milliseconds
    fn now(&self) -> u64;

    /// Schedule a callback after `delay_ms`; the callback runs at most once
    fn set_timeout(&self, delay_ms: u64, callback: Box<dyn FnOnce()>) -> TimerHandle;

    /// Cancel a scheduled callback; a no-op if it already fired
    fn clear_timeout(&self, handle: TimerHandle);
}
