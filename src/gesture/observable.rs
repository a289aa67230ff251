//! Shareable gesture observables
//!
//! The public subscription surface: an observable wraps a shared snapshot
//! stream so any number of subscribers watch one sensor. Construction is
//! eager about preconditions (config validation, surface channel support)
//! and lazy about attachment: nothing touches the host until the first
//! subscriber arrives, and the last unsubscription detaches everything.

use std::cell::RefCell;
use std::rc::Rc;

use crate::gesture::config::ObservableConfig;
use crate::gesture::reducer::reduce;
use crate::gesture::state::{GestureState, InputKind};
use crate::input::surface::InputSurface;
use crate::input::timer::TimerService;
use crate::sensor::{
    sensor_source, CandidateEvent, KeyboardSensor, MouseSensor, Sensor, TouchSensor, WheelSensor,
};
use crate::signal::{Signal, Sink, Source, Talkback};
use crate::{Error, Result};

/// Consumer of gesture state snapshots
pub trait Observer {
    /// A new snapshot was produced
    fn next(&self, state: &GestureState);

    /// The stream terminated with an error; no further calls follow
    fn error(&self, _error: &Error) {}

    /// The stream completed normally; no further calls follow
    fn complete(&self) {}
}

impl<F: Fn(&GestureState)> Observer for F {
    fn next(&self, state: &GestureState) {
        self(state)
    }
}

/// Handle over one active subscription
pub struct Subscription {
    talkback: Rc<RefCell<Option<Talkback>>>,
}

impl Subscription {
    /// Cancel the subscription; idempotent
    pub fn unsubscribe(&self) {
        if let Some(talkback) = self.talkback.borrow_mut().take() {
            talkback.end();
        }
    }

    /// False once unsubscribed or after the stream terminated
    pub fn is_active(&self) -> bool {
        self.talkback.borrow().is_some()
    }
}

/// A shareable stream of gesture state snapshots for one device class
pub struct GestureObservable {
    source: Source<GestureState>,
}

impl GestureObservable {
    /// Wrap an already-shared snapshot stream
    pub fn from_source(source: Source<GestureState>) -> Self {
        Self { source }
    }

    /// The underlying snapshot stream, for composing with combinators
    pub fn source(&self) -> &Source<GestureState> {
        &self.source
    }

    /// Attach an observer; snapshots are delivered synchronously
    pub fn subscribe(&self, observer: impl Observer + 'static) -> Subscription {
        let talkback: Rc<RefCell<Option<Talkback>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&talkback);
        self.source.attach(Sink::new(move |signal| match signal {
            Signal::Greet(tb) => {
                *slot.borrow_mut() = Some(tb);
            }
            Signal::Data(state) => observer.next(&state),
            Signal::End(reason) => {
                slot.borrow_mut().take();
                match reason {
                    Some(error) => observer.error(&error),
                    None => observer.complete(),
                }
            }
        }));
        Subscription { talkback }
    }
}

pub(crate) fn make_sensor(kind: InputKind, config: &ObservableConfig) -> Rc<RefCell<dyn Sensor>> {
    match kind {
        InputKind::Mouse => Rc::new(RefCell::new(MouseSensor::new(config))),
        InputKind::Touch => Rc::new(RefCell::new(TouchSensor::new(config))),
        InputKind::Wheel => Rc::new(RefCell::new(WheelSensor::new(config))),
        InputKind::Keyboard => Rc::new(RefCell::new(KeyboardSensor::new(config))),
    }
}

/// Verify the surface delivers every channel the sensor needs
pub(crate) fn check_surface(
    surface: &Rc<dyn InputSurface>,
    sensor: &Rc<RefCell<dyn Sensor>>,
) -> Result<()> {
    for &channel in sensor.borrow().channels() {
        if !surface.supports(channel) {
            return Err(Error::UnsupportedSurface(format!(
                "surface does not deliver {channel:?} events"
            )));
        }
    }
    Ok(())
}

/// Shared candidate-event stream for one device class, before state folding
///
/// Mostly useful for instrumentation and tests; [`source`] is the folded
/// equivalent.
pub fn raw_source(
    surface: &Rc<dyn InputSurface>,
    timer: &Rc<dyn TimerService>,
    kind: InputKind,
    config: &ObservableConfig,
) -> Result<Source<CandidateEvent>> {
    config.validate()?;
    let sensor = make_sensor(kind, config);
    check_surface(surface, &sensor)?;
    Ok(sensor_source(Rc::clone(surface), Rc::clone(timer), sensor).share())
}

/// Shared snapshot stream for one device class
pub fn source(
    surface: &Rc<dyn InputSurface>,
    timer: &Rc<dyn TimerService>,
    kind: InputKind,
    config: &ObservableConfig,
) -> Result<Source<GestureState>> {
    config.validate()?;
    let sensor = make_sensor(kind, config);
    check_surface(surface, &sensor)?;
    Ok(sensor_source(Rc::clone(surface), Rc::clone(timer), sensor)
        .scan(GestureState::initial(kind), |state, event| {
            reduce(state, &event)
        })
        .share())
}

/// Observable over one device class
pub fn observable(
    surface: &Rc<dyn InputSurface>,
    timer: &Rc<dyn TimerService>,
    kind: InputKind,
    config: &ObservableConfig,
) -> Result<GestureObservable> {
    Ok(GestureObservable::from_source(source(
        surface, timer, kind, config,
    )?))
}

/// Mouse gesture observable
pub fn mouse(
    surface: &Rc<dyn InputSurface>,
    timer: &Rc<dyn TimerService>,
    config: &ObservableConfig,
) -> Result<GestureObservable> {
    observable(surface, timer, InputKind::Mouse, config)
}

/// Touch gesture observable
pub fn touch(
    surface: &Rc<dyn InputSurface>,
    timer: &Rc<dyn TimerService>,
    config: &ObservableConfig,
) -> Result<GestureObservable> {
    observable(surface, timer, InputKind::Touch, config)
}

/// Wheel gesture observable
pub fn wheel(
    surface: &Rc<dyn InputSurface>,
    timer: &Rc<dyn TimerService>,
    config: &ObservableConfig,
) -> Result<GestureObservable> {
    observable(surface, timer, InputKind::Wheel, config)
}

/// Keyboard gesture observable
pub fn keyboard(
    surface: &Rc<dyn InputSurface>,
    timer: &Rc<dyn TimerService>,
    config: &ObservableConfig,
) -> Result<GestureObservable> {
    observable(surface, timer, InputKind::Keyboard, config)
}
