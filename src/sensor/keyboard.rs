//! Keyboard sensor
//!
//! A gesture spans one held key: key-down starts it, auto-repeats move it,
//! and the matching key-up ends it. Only navigation-style keys are
//! recognized; a second key pressed during an active gesture is ignored
//! rather than interleaved.

use crate::gesture::config::ObservableConfig;
use crate::gesture::state::{GesturePhase, InputKind};
use crate::input::surface::ListenerOptions;
use crate::input::types::{EventKind, KeyInfo, ModifierFlags, RawInputEvent};
use crate::sensor::{CandidateEvent, Sensor};

const CHANNELS: [EventKind; 2] = [EventKind::KeyDown, EventKind::KeyUp];

/// Keys that participate in keyboard gestures
const GESTURE_KEYS: [&str; 10] = [
    "ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", " ", "Enter", "PageUp", "PageDown", "Home",
    "End",
];

struct ActiveKey {
    key: String,
    modifiers: ModifierFlags,
}

/// Recognizes held-key gestures from keyboard events
pub struct KeyboardSensor {
    config: ObservableConfig,
    active: Option<ActiveKey>,
}

impl KeyboardSensor {
    pub fn new(config: &ObservableConfig) -> Self {
        Self {
            config: config.clone(),
            active: None,
        }
    }

    fn recognized(key: &str) -> bool {
        GESTURE_KEYS.contains(&key)
    }

    fn matches_active(&self, key: &KeyInfo, modifiers: ModifierFlags) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.key == key.key && active.modifiers == modifiers)
    }
}

impl Sensor for KeyboardSensor {
    fn kind(&self) -> InputKind {
        InputKind::Keyboard
    }

    fn channels(&self) -> &'static [EventKind] {
        &CHANNELS
    }

    fn listener_options(&self) -> ListenerOptions {
        ListenerOptions {
            passive: self.config.effective_passive(),
        }
    }

    fn should_prevent_default(&self, event: &RawInputEvent) -> bool {
        self.config.prevent_default
            && event
                .key
                .as_ref()
                .is_some_and(|key| Self::recognized(&key.key))
    }

    fn on_data(&mut self, event: &RawInputEvent) -> Option<CandidateEvent> {
        let key = event.key.as_ref()?;
        match event.kind {
            EventKind::KeyDown => {
                if self.matches_active(key, event.modifiers) {
                    return Some(CandidateEvent::keyboard(
                        GesturePhase::Move,
                        KeyInfo::repeated(key.key.clone()),
                        event.time,
                        event.modifiers,
                    ));
                }
                if self.active.is_some() || !Self::recognized(&key.key) {
                    return None;
                }
                self.active = Some(ActiveKey {
                    key: key.key.clone(),
                    modifiers: event.modifiers,
                });
                Some(CandidateEvent::keyboard(
                    GesturePhase::Start,
                    KeyInfo::new(key.key.clone()),
                    event.time,
                    event.modifiers,
                ))
            }
            EventKind::KeyUp => {
                if !self.matches_active(key, event.modifiers) {
                    return None;
                }
                self.active = None;
                Some(CandidateEvent::keyboard(
                    GesturePhase::End,
                    KeyInfo::new(key.key.clone()),
                    event.time,
                    event.modifiers,
                ))
            }
            _ => None,
        }
    }

    fn update_config(&mut self, config: &ObservableConfig) -> bool {
        if config.effective_passive() != self.config.effective_passive() {
            return false;
        }
        self.config = config.clone();
        true
    }

    fn reset(&mut self) {
        self.active = None;
    }
}
