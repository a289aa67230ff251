//! Mouse sensor

use crate::gesture::config::ObservableConfig;
use crate::gesture::state::InputKind;
use crate::input::surface::ListenerOptions;
use crate::input::types::{EventKind, RawInputEvent};
use crate::sensor::pointer::PointerCore;
use crate::sensor::{CandidateEvent, Sensor};

const CHANNELS: [EventKind; 3] = [
    EventKind::MouseDown,
    EventKind::MouseMove,
    EventKind::MouseUp,
];

/// Recognizes press/drag/release gestures from mouse events
pub struct MouseSensor {
    core: PointerCore,
}

impl MouseSensor {
    pub fn new(config: &ObservableConfig) -> Self {
        Self {
            core: PointerCore::new(InputKind::Mouse, config),
        }
    }
}

impl Sensor for MouseSensor {
    fn kind(&self) -> InputKind {
        InputKind::Mouse
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
        self.core.config().prevent_default && event.kind.is_mouse()
    }

    fn on_data(&mut self, event: &RawInputEvent) -> Option<CandidateEvent> {
        let (x, y) = event.position;
        match event.kind {
            EventKind::MouseDown => self.core.press(x, y, event.time, event.modifiers),
            EventKind::MouseMove => self.core.motion(x, y, event.time, event.modifiers),
            EventKind::MouseUp => self.core.release(Some((x, y)), event.time, event.modifiers),
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
