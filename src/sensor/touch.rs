//! Touch sensor
//!
//! Single-pointer recognition over touch channels: the first contact drives
//! the gesture and additional contacts are ignored. Touch-end events carry
//! no contact position, so the gesture closes at the last observed one.

use crate::gesture::config::ObservableConfig;
use crate::gesture::state::InputKind;
use crate::input::surface::ListenerOptions;
use crate::input::types::{EventKind, RawInputEvent};
use crate::sensor::pointer::PointerCore;
use crate::sensor::{CandidateEvent, Sensor};

const CHANNELS: [EventKind; 3] = [
    EventKind::TouchStart,
    EventKind::TouchMove,
    EventKind::TouchEnd,
];

/// Recognizes press/drag/release gestures from touch events
pub struct TouchSensor {
    core: PointerCore,
}

impl TouchSensor {
    pub fn new(config: &ObservableConfig) -> Self {
        Self {
            core: PointerCore::new(InputKind::Touch, config),
        }
    }
}

impl Sensor for TouchSensor {
    fn kind(&self) -> InputKind {
        InputKind::Touch
    }

    fn channels(&self) -> &'static [EventKind] {
        &CHANNELS
    }

    fn listener_options(&self) -> ListenerOptions {
        ListenerOptions {
            passive: self.core.config().effective_passive(),
        }
    }

    fn should_prevent_default(&self, event: &RawInputEvent) -> bool {
        self.core.config().prevent_default && event.kind.is_touch()
    }

    fn on_data(&mut self, event: &RawInputEvent) -> Option<CandidateEvent> {
        match event.kind {
            EventKind::TouchStart => {
                let (x, y) = event.primary_position();
                self.core.press(x, y, event.time, event.modifiers)
            }
            EventKind::TouchMove => {
                let (x, y) = event.primary_position();
                self.core.motion(x, y, event.time, event.modifiers)
            }
            EventKind::TouchEnd => {
                let position = event.touches.first().map(|t| (t.x, t.y));
                self.core.release(position, event.time, event.modifiers)
            }
            _ => None,
        }
    }

    fn update_config(&mut self, config: &ObservableConfig) -> bool {
        self.core.update_config(config)
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
