//! Cancellable synchronous push-stream protocol
//!
//! The protocol is a three-way handshake between a [`Source`] and a [`Sink`]:
//! the source calls the sink once with [`Signal::Greet`] carrying a
//! [`Talkback`] handle, zero or more times with [`Signal::Data`], and at most
//! once with [`Signal::End`] (normal completion or error termination). The
//! sink uses the talkback to request the next value or to cancel.
//!
//! All delivery is synchronous and push-based: there is no buffering and no
//! async scheduling anywhere in the protocol. Every combinator step runs
//! inline on the call stack of the event that triggered it, which is what the
//! wheel debounce/blocking logic depends on — events are reduced and observed
//! in the exact order and turn they arrive.
//!
//! The whole layer is single-threaded by construction (`Rc`/`RefCell`,
//! nothing is `Send`); the subscription pools are protected purely by the
//! cooperative execution model.

use std::rc::Rc;

use crate::Error;

pub mod combinators;

/// Request sent upstream through a [`Talkback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Ask the upstream for the next value (no-op for push-only roots)
    Pull,
    /// Cancel the subscription; the upstream must synchronously stop
    /// producing and release its resources
    End,
}

/// Handle a sink uses to talk back to its source
#[derive(Clone)]
pub struct Talkback(Rc<dyn Fn(Request)>);

impl Talkback {
    /// Wrap a request handler
    pub fn new(handler: impl Fn(Request) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// A talkback that ignores every request
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Request the next value
    pub fn pull(&self) {
        (self.0)(Request::Pull)
    }

    /// Cancel the subscription
    pub fn end(&self) {
        (self.0)(Request::End)
    }
}

impl std::fmt::Debug for Talkback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Talkback")
    }
}

/// One protocol message
#[derive(Debug)]
pub enum Signal<T> {
    /// Handshake; delivered exactly once, before any data
    Greet(Talkback),
    /// One value
    Data(T),
    /// Termination; `None` is completion, `Some` is an error
    End(Option<Rc<Error>>),
}

/// Receiving side of a subscription
pub struct Sink<T>(Rc<dyn Fn(Signal<T>)>);

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Sink<T> {
    /// Wrap a signal handler
    pub fn new(handler: impl Fn(Signal<T>) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Deliver one signal
    pub fn send(&self, signal: Signal<T>) {
        (self.0)(signal)
    }

    /// Deliver the handshake
    pub fn greet(&self, talkback: Talkback) {
        self.send(Signal::Greet(talkback))
    }

    /// Deliver one value
    pub fn data(&self, value: T) {
        self.send(Signal::Data(value))
    }

    /// Terminate normally
    pub fn complete(&self) {
        self.send(Signal::End(None))
    }

    /// Terminate with an error or normally
    pub fn end(&self, reason: Option<Rc<Error>>) {
        self.send(Signal::End(reason))
    }
}

/// Producing side: a subscribe function
///
/// Attaching a sink must synchronously greet it before delivering anything
/// else. Sources are cheaply clonable; every clone shares the same subscribe
/// behavior (but not subscriptions — see [`Source::share`] for multicast).
pub struct Source<T>(Rc<dyn Fn(Sink<T>)>);

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: 'static> Source<T> {
    /// Wrap a subscribe function
    pub fn new(subscribe: impl Fn(Sink<T>) + 'static) -> Self {
        Self(Rc::new(subscribe))
    }

    /// Subscribe a sink
    pub fn attach(&self, sink: Sink<T>) {
        (self.0)(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn test_greet_arrives_before_data() {
        let source = Source::new(|sink: Sink<i32>| {
            sink.greet(Talkback::noop());
            sink.data(1);
            sink.complete();
        });

        let log = Rc::new(RefCell::new(Vec::new()));
        let log_sink = Rc::clone(&log);
        source.attach(Sink::new(move |signal| {
            log_sink.borrow_mut().push(match signal {
                Signal::Greet(_) => "greet",
                Signal::Data(_) => "data",
                Signal::End(_) => "end",
            });
        }));

        assert_eq!(*log.borrow(), vec!["greet", "data", "end"]);
    }

    #[test]
    fn test_talkback_end_reaches_source() {
        let cancelled = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cancelled);
        let source = Source::new(move |sink: Sink<i32>| {
            let flag = Rc::clone(&flag);
            sink.greet(Talkback::new(move |request| {
                if request == Request::End {
                    flag.set(true);
                }
            }));
        });

        let talkback = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&talkback);
        source.attach(Sink::new(move |signal| {
            if let Signal::Greet(tb) = signal {
                *slot.borrow_mut() = Some(tb);
            }
        }));

        talkback.borrow().as_ref().expect("greeted").end();
        assert!(cancelled.get());
    }
}
