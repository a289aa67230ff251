//! Stream combinators
//!
//! The minimal set every other piece of the engine is built from: `map`,
//! `filter`, `scan`, `merge`, and `share`. All of them preserve the
//! protocol's synchronous, in-order delivery; none of them buffer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use super::{Request, Signal, Sink, Source, Talkback};
use crate::{Error, Result};

struct ShareState<T> {
    sinks: Vec<(u64, Sink<T>)>,
    talkback: Option<Talkback>,
    next_id: u64,
}

impl<T: 'static> Source<T> {
    /// Transform every value
    pub fn map<U: 'static>(&self, transform: impl Fn(T) -> U + 'static) -> Source<U> {
        let upstream = self.clone();
        let transform = Rc::new(transform);
        Source::new(move |sink: Sink<U>| {
            let transform = Rc::clone(&transform);
            upstream.attach(Sink::new(move |signal| match signal {
                Signal::Greet(talkback) => sink.greet(talkback),
                Signal::Data(value) => sink.data(transform(value)),
                Signal::End(reason) => sink.end(reason),
            }));
        })
    }

    /// Drop values the predicate rejects
    ///
    /// A rejected value signals `Pull` upstream: an explicit skip, not an
    /// error, so pull-aware sources keep producing.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Source<T> {
        let upstream = self.clone();
        let predicate = Rc::new(predicate);
        Source::new(move |sink: Sink<T>| {
            let predicate = Rc::clone(&predicate);
            let talkback: Rc<RefCell<Option<Talkback>>> = Rc::new(RefCell::new(None));
            let slot = Rc::clone(&talkback);
            upstream.attach(Sink::new(move |signal| match signal {
                Signal::Greet(tb) => {
                    *slot.borrow_mut() = Some(tb.clone());
                    sink.greet(tb);
                }
                Signal::Data(value) => {
                    if predicate(&value) {
                        sink.data(value);
                    } else {
                        let tb = slot.borrow().clone();
                        if let Some(tb) = tb {
                            tb.pull();
                        }
                    }
                }
                Signal::End(reason) => {
                    slot.borrow_mut().take();
                    sink.end(reason);
                }
            }));
        })
    }

    /// Stateful fold emitting every intermediate state
    ///
    /// The fold is fallible: an `Err` terminates the subscription with the
    /// error downstream and cancels upstream. This is where reducer
    /// unreachable-state violations enter the protocol.
    pub fn scan<S: Clone + 'static>(
        &self,
        seed: S,
        fold: impl Fn(&S, T) -> Result<S> + 'static,
    ) -> Source<S> {
        let upstream = self.clone();
        let fold = Rc::new(fold);
        Source::new(move |sink: Sink<S>| {
            let fold = Rc::clone(&fold);
            let state = Rc::new(RefCell::new(seed.clone()));
            let talkback: Rc<RefCell<Option<Talkback>>> = Rc::new(RefCell::new(None));
            let done = Rc::new(Cell::new(false));
            let slot = Rc::clone(&talkback);
            upstream.attach(Sink::new(move |signal| {
                if done.get() {
                    return;
                }
                match signal {
                    Signal::Greet(tb) => {
                        *slot.borrow_mut() = Some(tb.clone());
                        sink.greet(tb);
                    }
                    Signal::Data(value) => {
                        let folded = {
                            let current = state.borrow();
                            fold(&current, value)
                        };
                        match folded {
                            Ok(next) => {
                                *state.borrow_mut() = next.clone();
                                sink.data(next);
                            }
                            Err(error) => {
                                done.set(true);
                                let tb = slot.borrow_mut().take();
                                if let Some(tb) = tb {
                                    tb.end();
                                }
                                sink.end(Some(Rc::new(error)));
                            }
                        }
                    }
                    Signal::End(reason) => {
                        done.set(true);
                        slot.borrow_mut().take();
                        sink.end(reason);
                    }
                }
            }));
        })
    }

    /// Interleave several sources into one
    ///
    /// Each source's internal order is preserved; there is no cross-source
    /// ordering guarantee beyond "forwarded as delivered". The merged stream
    /// completes when every upstream has completed, fails as soon as any
    /// upstream fails, and a downstream cancel fans out to all upstreams.
    pub fn merge(sources: Vec<Source<T>>) -> Source<T> {
        Source::new(move |sink: Sink<T>| {
            let total = sources.len();
            let talkbacks: Rc<RefCell<Vec<Talkback>>> = Rc::new(RefCell::new(Vec::new()));
            let ended = Rc::new(Cell::new(0usize));
            let down_ended = Rc::new(Cell::new(false));

            sink.greet(Talkback::new({
                let talkbacks = Rc::clone(&talkbacks);
                let down_ended = Rc::clone(&down_ended);
                move |request| {
                    if down_ended.get() {
                        return;
                    }
                    match request {
                        Request::Pull => {
                            let tbs = talkbacks.borrow().clone();
                            for tb in tbs {
                                tb.pull();
                            }
                        }
                        Request::End => {
                            down_ended.set(true);
                            let tbs: Vec<Talkback> =
                                talkbacks.borrow_mut().drain(..).collect();
                            for tb in tbs {
                                tb.end();
                            }
                        }
                    }
                }
            }));

            if total == 0 {
                sink.complete();
                return;
            }

            for source in sources.iter() {
                if down_ended.get() {
                    break;
                }
                source.attach(Sink::new({
                    let sink = sink.clone();
                    let talkbacks = Rc::clone(&talkbacks);
                    let ended = Rc::clone(&ended);
                    let down_ended = Rc::clone(&down_ended);
                    move |signal| match signal {
                        Signal::Greet(tb) => {
                            if down_ended.get() {
                                tb.end();
                            } else {
                                talkbacks.borrow_mut().push(tb);
                            }
                        }
                        Signal::Data(value) => {
                            if !down_ended.get() {
                                sink.data(value);
                            }
                        }
                        Signal::End(reason) => {
                            if down_ended.get() {
                                return;
                            }
                            match reason {
                                Some(error) => {
                                    down_ended.set(true);
                                    let tbs: Vec<Talkback> =
                                        talkbacks.borrow_mut().drain(..).collect();
                                    for tb in tbs {
                                        tb.end();
                                    }
                                    sink.end(Some(error));
                                }
                                None => {
                                    ended.set(ended.get() + 1);
                                    if ended.get() == total {
                                        down_ended.set(true);
                                        sink.complete();
                                    }
                                }
                            }
                        }
                    }
                }));
            }
        })
    }

    /// Refcounted multicast of exactly one upstream subscription
    ///
    /// The first downstream subscription triggers the single upstream
    /// subscription; each subsequent one attaches without re-subscribing;
    /// the last unsubscription cancels upstream. Every current subscriber
    /// observes the same value in the same synchronous delivery. After a
    /// full teardown a new subscriber re-subscribes upstream from scratch.
    pub fn share(&self) -> Source<T>
    where
        T: Clone,
    {
        let upstream = self.clone();
        let state: Rc<RefCell<ShareState<T>>> = Rc::new(RefCell::new(ShareState {
            sinks: Vec::new(),
            talkback: None,
            next_id: 0,
        }));
        Source::new(move |sink: Sink<T>| {
            let (id, first) = {
                let mut st = state.borrow_mut();
                let id = st.next_id;
                st.next_id += 1;
                let first = st.sinks.is_empty() && st.talkback.is_none();
                st.sinks.push((id, sink.clone()));
                (id, first)
            };

            sink.greet(Talkback::new({
                let state = Rc::clone(&state);
                move |request| match request {
                    Request::Pull => {
                        let tb = state.borrow().talkback.clone();
                        if let Some(tb) = tb {
                            tb.pull();
                        }
                    }
                    Request::End => {
                        let upstream_tb = {
                            let mut st = state.borrow_mut();
                            st.sinks.retain(|(sink_id, _)| *sink_id != id);
                            if st.sinks.is_empty() {
                                st.talkback.take()
                            } else {
                                None
                            }
                        };
                        if let Some(tb) = upstream_tb {
                            debug!("share: last subscriber detached, cancelling upstream");
                            tb.end();
                        }
                    }
                }
            }));

            if first {
                debug!("share: first subscriber, attaching upstream");
                upstream.attach(Sink::new({
                    let state = Rc::clone(&state);
                    move |signal: Signal<T>| match signal {
                        Signal::Greet(tb) => {
                            state.borrow_mut().talkback = Some(tb);
                        }
                        Signal::Data(value) => {
                            // Snapshot so subscribers may unsubscribe mid-delivery.
                            let sinks: Vec<Sink<T>> = state
                                .borrow()
                                .sinks
                                .iter()
                                .map(|(_, sink)| sink.clone())
                                .collect();
                            for sink in sinks {
                                sink.data(value.clone());
                            }
                        }
                        Signal::End(reason) => {
                            let sinks: Vec<Sink<T>> = {
                                let mut st = state.borrow_mut();
                                st.talkback = None;
                                st.sinks.drain(..).map(|(_, sink)| sink).collect()
                            };
                            for sink in sinks {
                                sink.end(reason.clone());
                            }
                        }
                    }
                }));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A source that synchronously emits a fixed list, honoring cancellation
    fn list_source(values: Vec<i32>) -> Source<i32> {
        Source::new(move |sink: Sink<i32>| {
            let cancelled = Rc::new(Cell::new(false));
            let flag = Rc::clone(&cancelled);
            sink.greet(Talkback::new(move |request| {
                if request == Request::End {
                    flag.set(true);
                }
            }));
            for value in &values {
                if cancelled.get() {
                    return;
                }
                sink.data(*value);
            }
            if !cancelled.get() {
                sink.complete();
            }
        })
    }

    fn collect(source: &Source<i32>) -> (Vec<i32>, bool) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let completed = Rc::new(Cell::new(false));
        let values_sink = Rc::clone(&values);
        let completed_sink = Rc::clone(&completed);
        source.attach(Sink::new(move |signal| match signal {
            Signal::Greet(_) => {}
            Signal::Data(value) => values_sink.borrow_mut().push(value),
            Signal::End(None) => completed_sink.set(true),
            Signal::End(Some(_)) => {}
        }));
        let collected = values.borrow().clone();
        (collected, completed.get())
    }

    #[test]
    fn test_map_transforms_in_order() {
        let source = list_source(vec![1, 2, 3]).map(|v| v * 10);
        let (values, completed) = collect(&source);
        assert_eq!(values, vec![10, 20, 30]);
        assert!(completed);
    }

    #[test]
    fn test_filter_drops_rejected_values() {
        let source = list_source(vec![1, 2, 3, 4, 5]).filter(|v| v % 2 == 0);
        let (values, completed) = collect(&source);
        assert_eq!(values, vec![2, 4]);
        assert!(completed);
    }

    #[test]
    fn test_scan_emits_every_intermediate_state() {
        let source = list_source(vec![1, 2, 3]).scan(0, |acc, v| Ok(acc + v));
        let (values, completed) = collect(&source);
        assert_eq!(values, vec![1, 3, 6]);
        assert!(completed);
    }

    #[test]
    fn test_scan_error_terminates_with_error() {
        let source = list_source(vec![1, 2, 3]).scan(0, |acc, v| {
            if v == 2 {
                Err(Error::UnexpectedEvent("boom".to_string()))
            } else {
                Ok(acc + v)
            }
        });

        let values = Rc::new(RefCell::new(Vec::new()));
        let failed = Rc::new(Cell::new(false));
        let values_sink = Rc::clone(&values);
        let failed_sink = Rc::clone(&failed);
        source.attach(Sink::new(move |signal| match signal {
            Signal::Data(value) => values_sink.borrow_mut().push(value),
            Signal::End(Some(_)) => failed_sink.set(true),
            _ => {}
        }));

        assert_eq!(*values.borrow(), vec![1]);
        assert!(failed.get());
    }

    #[test]
    fn test_merge_preserves_per_source_order() {
        let merged = Source::merge(vec![list_source(vec![1, 2]), list_source(vec![10, 20])]);
        let (values, completed) = collect(&merged);
        // Synchronous sources drain one after the other; each source's
        // internal order must survive the merge.
        assert_eq!(values, vec![1, 2, 10, 20]);
        assert!(completed);
    }

    #[test]
    fn test_merge_completes_only_after_all_sources() {
        let pending: Rc<RefCell<Option<Sink<i32>>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&pending);
        let never_ending = Source::new(move |sink: Sink<i32>| {
            sink.greet(Talkback::noop());
            *slot.borrow_mut() = Some(sink);
        });

        let merged = Source::merge(vec![list_source(vec![1]), never_ending]);
        let (values, completed) = collect(&merged);
        assert_eq!(values, vec![1]);
        assert!(!completed);

        pending.borrow().as_ref().expect("subscribed").complete();
    }

    #[test]
    fn test_merge_of_nothing_completes() {
        let merged = Source::merge(Vec::<Source<i32>>::new());
        let (values, completed) = collect(&merged);
        assert!(values.is_empty());
        assert!(completed);
    }

    #[test]
    fn test_share_attaches_upstream_once() {
        let attach_count = Rc::new(Cell::new(0));
        let sinks: Rc<RefCell<Vec<Sink<i32>>>> = Rc::new(RefCell::new(Vec::new()));
        let count = Rc::clone(&attach_count);
        let pool = Rc::clone(&sinks);
        let upstream = Source::new(move |sink: Sink<i32>| {
            count.set(count.get() + 1);
            sink.greet(Talkback::noop());
            pool.borrow_mut().push(sink);
        });

        let shared = upstream.share();
        let a = Rc::new(RefCell::new(Vec::new()));
        let b = Rc::new(RefCell::new(Vec::new()));
        let a_sink = Rc::clone(&a);
        let b_sink = Rc::clone(&b);
        shared.attach(Sink::new(move |signal| {
            if let Signal::Data(v) = signal {
                a_sink.borrow_mut().push(v);
            }
        }));
        shared.attach(Sink::new(move |signal| {
            if let Signal::Data(v) = signal {
                b_sink.borrow_mut().push(v);
            }
        }));

        assert_eq!(attach_count.get(), 1);

        sinks.borrow()[0].data(7);
        assert_eq!(*a.borrow(), vec![7]);
        assert_eq!(*b.borrow(), vec![7]);
    }

    #[test]
    fn test_share_last_unsubscribe_cancels_upstream() {
        let cancelled = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cancelled);
        let upstream = Source::new(move |sink: Sink<i32>| {
            let flag = Rc::clone(&flag);
            sink.greet(Talkback::new(move |request| {
                if request == Request::End {
                    flag.set(true);
                }
            }));
        });

        let shared = upstream.share();
        let talkbacks: Rc<RefCell<Vec<Talkback>>> = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let pool = Rc::clone(&talkbacks);
            shared.attach(Sink::new(move |signal| {
                if let Signal::Greet(tb) = signal {
                    pool.borrow_mut().push(tb);
                }
            }));
        }

        talkbacks.borrow()[0].end();
        assert!(!cancelled.get());
        talkbacks.borrow()[1].end();
        assert!(cancelled.get());
    }

    #[test]
    fn test_share_resubscribes_after_full_teardown() {
        let attach_count = Rc::new(Cell::new(0));
        let count = Rc::clone(&attach_count);
        let upstream = Source::new(move |sink: Sink<i32>| {
            count.set(count.get() + 1);
            sink.greet(Talkback::noop());
        });

        let shared = upstream.share();
        let talkback: Rc<RefCell<Option<Talkback>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&talkback);
        shared.attach(Sink::new(move |signal| {
            if let Signal::Greet(tb) = signal {
                *slot.borrow_mut() = Some(tb);
            }
        }));
        talkback.borrow().as_ref().expect("greeted").end();

        shared.attach(Sink::new(|_| {}));
        assert_eq!(attach_count.get(), 2);
    }
}
