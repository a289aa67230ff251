//! Wheel sensor
//!
//! Wheel gestures have no release event, so the sensor must decide both
//! when scrolling begins and when it ends. Three weighted moving averages
//! over the normalized spin separate intentional scrolling from trackpad
//! momentum: a burst whose spin magnitude settles low and steady is
//! inertial tail and blocks further recognition until the stream goes
//! quiet. Termination is a debounce: every wheel event re-arms a timeout,
//! and the gesture ends when no event arrives within the window.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::analysis::{should_cancel, should_gesture, MovingAverage};
use crate::gesture::config::ObservableConfig;
use crate::gesture::state::{GesturePhase, InputKind};
use crate::input::surface::ListenerOptions;
use crate::input::timer::TimerHandle;
use crate::input::types::{DeltaMode, EventKind, ModifierFlags, RawInputEvent, WheelDelta};
use crate::sensor::{CandidateEvent, Sensor, SensorLink};

const CHANNELS: [EventKind; 1] = [EventKind::Wheel];

/// Pixels per line for line-mode wheel deltas
const LINE_HEIGHT: f64 = 40.0;
/// Pixels per page for page-mode wheel deltas
const PAGE_HEIGHT: f64 = 800.0;

/// Tunable constants of the wheel intent detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelTuning {
    /// Moving-average window length in events
    pub window: usize,
    /// Weight slope of the averages; positive favors recent samples
    pub weight: f64,
    /// Spin-magnitude average below which a burst may be momentum
    pub velocity_floor: f64,
    /// Spin-magnitude deviation below which the burst is considered settled
    pub deviation_floor: f64,
    /// Quiet period after the last wheel event before the gesture ends
    pub debounce_ms: u64,
}

impl Default for WheelTuning {
    fn default() -> Self {
        Self {
            window: 6,
            weight: 1.0,
            velocity_floor: 0.1,
            deviation_floor: 0.01,
            debounce_ms: 140,
        }
    }
}

struct WheelCore {
    config: ObservableConfig,
    tuning: WheelTuning,
    x_avg: MovingAverage,
    y_avg: MovingAverage,
    v_avg: MovingAverage,
    gesturing: bool,
    canceled: bool,
    blocked: bool,
    /// Virtual scroll position accumulated from normalized pixel deltas
    position: (f64, f64),
    last_modifiers: ModifierFlags,
    timer_handle: Option<TimerHandle>,
    link: Option<SensorLink>,
}

impl WheelCore {
    fn new(config: &ObservableConfig, tuning: WheelTuning) -> Self {
        Self {
            config: config.clone(),
            x_avg: MovingAverage::new(tuning.window, tuning.weight),
            y_avg: MovingAverage::new(tuning.window, tuning.weight),
            v_avg: MovingAverage::new(tuning.window, tuning.weight),
            tuning,
            gesturing: false,
            canceled: false,
            blocked: false,
            position: (0.0, 0.0),
            last_modifiers: ModifierFlags::default(),
            timer_handle: None,
            link: None,
        }
    }

    /// Convert a wheel payload to pixel deltas plus per-axis spin
    ///
    /// Spin is the device's native notch count when reported, otherwise the
    /// sign of the pixel delta (one synthetic notch per event).
    fn normalize(delta: &WheelDelta) -> (f64, f64, f64, f64) {
        let scale = match delta.mode {
            DeltaMode::Pixel => 1.0,
            DeltaMode::Line => LINE_HEIGHT,
            DeltaMode::Page => PAGE_HEIGHT,
        };
        let px = delta.delta_x * scale;
        let py = delta.delta_y * scale;
        let fallback = |pixels: f64| {
            if pixels == 0.0 {
                0.0
            } else {
                pixels.signum()
            }
        };
        let sx = delta.spin_x.unwrap_or_else(|| fallback(px));
        let sy = delta.spin_y.unwrap_or_else(|| fallback(py));
        (px, py, sx, sy)
    }

    /// Fold one wheel event; the averages are fed before any gating so a
    /// blocked decision never starves them
    fn fold(&mut self, event: &RawInputEvent, delta: &WheelDelta) -> Option<CandidateEvent> {
        self.last_modifiers = event.modifiers;
        if self.blocked {
            return None;
        }
        let (px, py, sx, sy) = Self::normalize(delta);
        self.position.0 += px;
        self.position.1 += py;
        self.x_avg.push(sx);
        self.y_avg.push(sy);
        self.v_avg.push(sx.hypot(sy));

        if self.canceled {
            return None;
        }
        if !self.gesturing {
            let (dx, dy) = (self.x_avg.delta(), self.y_avg.delta());
            if should_cancel(
                self.config.orientation,
                self.config.effective_cancel_threshold(),
                dx,
                dy,
            ) {
                self.canceled = true;
                return None;
            }
            if should_gesture(self.config.orientation, self.config.threshold, dx, dy) {
                self.gesturing = true;
                return Some(CandidateEvent::wheel(
                    GesturePhase::Start,
                    self.position.0,
                    self.position.1,
                    sx,
                    sy,
                    event.time,
                    event.modifiers,
                ));
            }
            return None;
        }
        if self.v_avg.average() < self.tuning.velocity_floor
            && self.v_avg.deviation() < self.tuning.deviation_floor
        {
            // Spin has settled low and steady: the rest of the burst is
            // momentum. End now and ignore events until the debounce clears.
            self.gesturing = false;
            self.blocked = true;
            tracing::debug!(
                average = self.v_avg.average(),
                "wheel burst blocked as momentum"
            );
            return Some(CandidateEvent::wheel(
                GesturePhase::End,
                self.position.0,
                self.position.1,
                sx,
                sy,
                event.time,
                event.modifiers,
            ));
        }
        Some(CandidateEvent::wheel(
            GesturePhase::Move,
            self.position.0,
            self.position.1,
            sx,
            sy,
            event.time,
            event.modifiers,
        ))
    }

    /// Clear per-burst recognition state; the virtual position persists
    fn reset_burst(&mut self) {
        self.x_avg.reset();
        self.y_avg.reset();
        self.v_avg.reset();
        self.gesturing = false;
        self.canceled = false;
        self.blocked = false;
    }

    /// Re-arm the debounce timeout, replacing any pending one
    fn reschedule(shared: &Rc<RefCell<WheelCore>>) {
        let link = {
            let core = shared.borrow();
            core.link.clone()
        };
        let Some(link) = link else {
            return;
        };
        if let Some(handle) = shared.borrow_mut().timer_handle.take() {
            link.timer.clear_timeout(handle);
        }
        let delay = shared.borrow().tuning.debounce_ms;
        let core = Rc::clone(shared);
        let timer_link = link.clone();
        let handle = link.timer.set_timeout(
            delay,
            Box::new(move || WheelCore::on_debounce(&core, &timer_link)),
        );
        shared.borrow_mut().timer_handle = Some(handle);
    }

    /// Debounce fired: end an active gesture and reset for the next burst
    fn on_debounce(shared: &Rc<RefCell<WheelCore>>, link: &SensorLink) {
        let terminal = {
            let mut core = shared.borrow_mut();
            core.timer_handle = None;
            let terminal = core.gesturing.then(|| {
                CandidateEvent::wheel(
                    GesturePhase::End,
                    core.position.0,
                    core.position.1,
                    0.0,
                    0.0,
                    link.timer.now(),
                    core.last_modifiers,
                )
            });
            core.reset_burst();
            terminal
        };
        if let Some(candidate) = terminal {
            (link.emit)(candidate);
        }
    }
}

/// Recognizes scroll gestures from wheel events
pub struct WheelSensor {
    core: Rc<RefCell<WheelCore>>,
}

impl WheelSensor {
    pub fn new(config: &ObservableConfig) -> Self {
        Self::with_tuning(config, WheelTuning::default())
    }

    pub fn with_tuning(config: &ObservableConfig, tuning: WheelTuning) -> Self {
        Self {
            core: Rc::new(RefCell::new(WheelCore::new(config, tuning))),
        }
    }
}

impl Sensor for WheelSensor {
    fn kind(&self) -> InputKind {
        InputKind::Wheel
    }

    fn channels(&self) -> &'static [EventKind] {
        &CHANNELS
    }

    fn listener_options(&self) -> ListenerOptions {
        ListenerOptions {
            passive: self.core.borrow().config.effective_passive(),
        }
    }

    fn should_prevent_default(&self, event: &RawInputEvent) -> bool {
        self.core.borrow().config.prevent_default && event.kind == EventKind::Wheel
    }

    fn on_data(&mut self, event: &RawInputEvent) -> Option<CandidateEvent> {
        if event.kind != EventKind::Wheel {
            return None;
        }
        let delta = event.wheel?;
        let candidate = self.core.borrow_mut().fold(event, &delta);
        // Every wheel event re-arms the quiet-period timeout, including
        // blocked ones: the momentum tail keeps the burst alive.
        WheelCore::reschedule(&self.core);
        candidate
    }

    fn update_config(&mut self, config: &ObservableConfig) -> bool {
        let mut core = self.core.borrow_mut();
        if config.effective_passive() != core.config.effective_passive() {
            return false;
        }
        core.config = config.clone();
        true
    }

    fn bind(&mut self, link: SensorLink) {
        self.core.borrow_mut().link = Some(link);
    }

    fn reset(&mut self) {
        let link = self.core.borrow().link.clone();
        if let Some(handle) = self.core.borrow_mut().timer_handle.take() {
            if let Some(link) = link {
                link.timer.clear_timeout(handle);
            }
        }
        let mut core = self.core.borrow_mut();
        core.reset_burst();
        core.position = (0.0, 0.0);
    }
}
