//! Device sensors
//!
//! A sensor owns the stateful recognition for one device class: it consumes
//! raw host events and emits candidate gesture events once intent is
//! confirmed. [`sensor_source`] wires a sensor to a host surface as a
//! cancellable push stream; cancelling the stream detaches every listener
//! and resets the sensor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::gesture::config::ObservableConfig;
use crate::gesture::state::{GesturePhase, InputKind};
use crate::input::surface::{InputSurface, ListenerHandle, ListenerOptions};
use crate::input::timer::TimerService;
use crate::input::types::{EventKind, KeyInfo, ModifierFlags, RawInputEvent};
use crate::signal::{Request, Sink, Source, Talkback};

pub mod keyboard;
pub mod mouse;
pub(crate) mod pointer;
pub mod touch;
pub mod wheel;

pub use keyboard::KeyboardSensor;
pub use mouse::MouseSensor;
pub use touch::TouchSensor;
pub use wheel::{WheelSensor, WheelTuning};

/// Recognized gesture event, before state folding
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEvent {
    /// Device class that recognized the gesture
    pub kind: InputKind,
    /// Lifecycle phase
    pub phase: GesturePhase,
    /// Pointer position (or virtual scroll position for wheel)
    pub x: f64,
    pub y: f64,
    /// Wheel spin increment carried by this event
    pub x_spin: f64,
    pub y_spin: f64,
    /// Held key (keyboard only)
    pub key: Option<KeyInfo>,
    /// Host timestamp in milliseconds
    pub time: u64,
    /// Modifier flags at time of recognition
    pub modifiers: ModifierFlags,
}

impl CandidateEvent {
    pub fn pointer(
        kind: InputKind,
        phase: GesturePhase,
        x: f64,
        y: f64,
        time: u64,
        modifiers: ModifierFlags,
    ) -> Self {
        Self {
            kind,
            phase,
            x,
            y,
            x_spin: 0.0,
            y_spin: 0.0,
            key: None,
            time,
            modifiers,
        }
    }

    pub fn wheel(
        phase: GesturePhase,
        x: f64,
        y: f64,
        x_spin: f64,
        y_spin: f64,
        time: u64,
        modifiers: ModifierFlags,
    ) -> Self {
        Self {
            kind: InputKind::Wheel,
            phase,
            x,
            y,
            x_spin,
            y_spin,
            key: None,
            time,
            modifiers,
        }
    }

    pub fn keyboard(phase: GesturePhase, key: KeyInfo, time: u64, modifiers: ModifierFlags) -> Self {
        Self {
            kind: InputKind::Keyboard,
            phase,
            x: 0.0,
            y: 0.0,
            x_spin: 0.0,
            y_spin: 0.0,
            key: Some(key),
            time,
            modifiers,
        }
    }
}

/// Host handles a bound sensor may use to schedule work and emit candidates
/// outside the raw-event path (the wheel debounce termination)
#[derive(Clone)]
pub struct SensorLink {
    pub timer: Rc<dyn TimerService>,
    pub emit: Rc<dyn Fn(CandidateEvent)>,
}

/// Stateful recognizer for one device class
pub trait Sensor {
    /// Device class this sensor recognizes
    fn kind(&self) -> InputKind;

    /// Raw event channels this sensor must listen on
    fn channels(&self) -> &'static [EventKind];

    /// Listener mode to attach with
    fn listener_options(&self) -> ListenerOptions;

    /// Whether the default platform reaction to this event should be
    /// suppressed before recognition runs
    fn should_prevent_default(&self, event: &RawInputEvent) -> bool;

    /// Fold one raw event; returns a candidate when recognition advances
    fn on_data(&mut self, event: &RawInputEvent) -> Option<CandidateEvent>;

    /// Absorb a configuration change in place; returns false when the
    /// change requires reattaching listeners (the sensor must then be
    /// discarded and recreated)
    fn update_config(&mut self, config: &ObservableConfig) -> bool;

    /// Receive host handles after attachment; default sensors ignore them
    fn bind(&mut self, _link: SensorLink) {}

    /// Drop all recognition state, returning to idle
    fn reset(&mut self) {}
}

/// Attach `sensor` to `surface` as a cancellable candidate-event stream
///
/// Listeners attach on greet, one per channel, and detach when the consumer
/// sends an end request upstream. The sensor is borrowed only for the
/// duration of its own fold; candidates are delivered after the borrow is
/// released, so a downstream consumer may cancel the stream from inside its
/// data handler.
pub fn sensor_source(
    surface: Rc<dyn InputSurface>,
    timer: Rc<dyn TimerService>,
    sensor: Rc<RefCell<dyn Sensor>>,
) -> Source<CandidateEvent> {
    Source::new(move |sink: Sink<CandidateEvent>| {
        let alive = Rc::new(Cell::new(true));
        let handles: Rc<RefCell<Vec<ListenerHandle>>> = Rc::new(RefCell::new(Vec::new()));

        let talkback = {
            let alive = Rc::clone(&alive);
            let handles = Rc::clone(&handles);
            let surface = Rc::clone(&surface);
            let sensor = Rc::clone(&sensor);
            Talkback::new(move |request| {
                if request == Request::End && alive.replace(false) {
                    for handle in handles.borrow_mut().drain(..) {
                        surface.remove_listener(handle);
                    }
                    sensor.borrow_mut().reset();
                    tracing::debug!(kind = ?sensor.borrow().kind(), "sensor detached");
                }
            })
        };
        sink.greet(talkback);
        if !alive.get() {
            return;
        }

        let link = SensorLink {
            timer: Rc::clone(&timer),
            emit: {
                let alive = Rc::clone(&alive);
                let sink = sink.clone();
                Rc::new(move |candidate| {
                    if alive.get() {
                        sink.data(candidate);
                    }
                })
            },
        };
        sensor.borrow_mut().bind(link);

        let options = sensor.borrow().listener_options();
        let channels = sensor.borrow().channels();
        for &channel in channels {
            let alive = Rc::clone(&alive);
            let sensor = Rc::clone(&sensor);
            let surface_for_default = Rc::clone(&surface);
            let sink = sink.clone();
            let handle = surface.add_listener(
                channel,
                options,
                Rc::new(move |event| {
                    if !alive.get() {
                        return;
                    }
                    if sensor.borrow().should_prevent_default(event) {
                        surface_for_default.prevent_default(event);
                    }
                    let candidate = sensor.borrow_mut().on_data(event);
                    if let Some(candidate) = candidate {
                        sink.data(candidate);
                    }
                }),
            );
            handles.borrow_mut().push(handle);
        }
        tracing::debug!(
            kind = ?sensor.borrow().kind(),
            channels = channels.len(),
            "sensor attached"
        );
    })
}
