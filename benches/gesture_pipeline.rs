//! Pipeline benchmarks: averaging, reduction, and full dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gesture_stream::analysis::MovingAverage;
use gesture_stream::gesture::{mouse, reduce, GesturePhase, GestureState, ObservableConfig};
use gesture_stream::input::types::{EventKind, ModifierFlags, RawInputEvent};
use gesture_stream::input::{InputSurface, ManualTimer, SyntheticSurface, TimerService};
use gesture_stream::sensor::CandidateEvent;
use gesture_stream::InputKind;

fn bench_moving_average(c: &mut Criterion) {
    c.bench_function("moving_average_push_and_average", |b| {
        let mut avg = MovingAverage::new(6, 1.0);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            avg.push((i % 7) as f64 * 0.3);
            black_box(avg.average());
            black_box(avg.deviation());
        });
    });
}

fn bench_reducer(c: &mut Criterion) {
    let flags = ModifierFlags::default();
    let start = CandidateEvent::pointer(InputKind::Mouse, GesturePhase::Start, 0.0, 0.0, 0, flags);
    let moves: Vec<CandidateEvent> = (1..=100u64)
        .map(|i| {
            CandidateEvent::pointer(
                InputKind::Mouse,
                GesturePhase::Move,
                i as f64,
                (i / 2) as f64,
                i * 10,
                flags,
            )
        })
        .collect();

    c.bench_function("reduce_100_moves", |b| {
        b.iter(|| {
            let mut state = reduce(&GestureState::initial(InputKind::Mouse), &start).unwrap();
            for event in &moves {
                state = reduce(&state, event).unwrap();
            }
            black_box(state)
        });
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let events: Vec<RawInputEvent> = std::iter::once(RawInputEvent::mouse(
        EventKind::MouseDown,
        0,
        0.0,
        0.0,
        ModifierFlags::default(),
    ))
    .chain((1..=1000u64).map(|i| {
        RawInputEvent::mouse(
            EventKind::MouseMove,
            i * 5,
            (i % 200) as f64,
            (i % 100) as f64,
            ModifierFlags::default(),
        )
    }))
    .chain(std::iter::once(RawInputEvent::mouse(
        EventKind::MouseUp,
        5010,
        0.0,
        0.0,
        ModifierFlags::default(),
    )))
    .collect();

    c.bench_function("dispatch_1000_moves_through_pipeline", |b| {
        b.iter(|| {
            let surface = Rc::new(SyntheticSurface::new());
            let timer: Rc<dyn TimerService> = Rc::new(ManualTimer::new());
            let observable = mouse(
                &(Rc::clone(&surface) as Rc<dyn InputSurface>),
                &timer,
                &ObservableConfig::default(),
            )
            .unwrap();
            let count = Rc::new(RefCell::new(0usize));
            let counter = Rc::clone(&count);
            let subscription =
                observable.subscribe(move |_: &GestureState| *counter.borrow_mut() += 1);
            for event in &events {
                surface.dispatch(event);
            }
            subscription.unsubscribe();
            black_box(*count.borrow())
        });
    });
}

criterion_group!(
    benches,
    bench_moving_average,
    bench_reducer,
    bench_full_pipeline
);
criterion_main!(benches);
