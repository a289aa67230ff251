//! Shared pointer recognition core
//!
//! Mouse and touch gestures follow the same press/move/release shape; the
//! device sensors translate their raw channels onto this core and differ
//! only in how they extract positions.

use crate::analysis::{should_cancel, should_gesture};
use crate::gesture::config::ObservableConfig;
use crate::gesture::state::{GesturePhase, InputKind};
use crate::input::types::ModifierFlags;
use crate::sensor::CandidateEvent;

pub(crate) struct PointerCore {
    config: ObservableConfig,
    kind: InputKind,
    gesturing: bool,
    canceled: bool,
    initial: Option<(f64, f64)>,
    last: (f64, f64),
}

impl PointerCore {
    pub(crate) fn new(kind: InputKind, config: &ObservableConfig) -> Self {
        Self {
            config: config.clone(),
            kind,
            gesturing: false,
            canceled: false,
            initial: None,
            last: (0.0, 0.0),
        }
    }

    pub(crate) fn config(&self) -> &ObservableConfig {
        &self.config
    }

    /// Pointer pressed down; starts the gesture immediately at threshold
    /// zero, otherwise arms a candidate
    pub(crate) fn press(
        &mut self,
        x: f64,
        y: f64,
        time: u64,
        modifiers: ModifierFlags,
    ) -> Option<CandidateEvent> {
        if self.gesturing {
            return None;
        }
        self.initial = Some((x, y));
        self.last = (x, y);
        self.canceled = false;
        if self.config.threshold <= 0.0 {
            self.gesturing = true;
            return Some(CandidateEvent::pointer(
                self.kind,
                GesturePhase::Start,
                x,
                y,
                time,
                modifiers,
            ));
        }
        None
    }

    /// Pointer moved; emits moves while gesturing and watches the threshold
    /// while armed
    pub(crate) fn motion(
        &mut self,
        x: f64,
        y: f64,
        time: u64,
        modifiers: ModifierFlags,
    ) -> Option<CandidateEvent> {
        self.last = (x, y);
        if self.gesturing {
            return Some(CandidateEvent::pointer(
                self.kind,
                GesturePhase::Move,
                x,
                y,
                time,
                modifiers,
            ));
        }
        if self.canceled {
            return None;
        }
        let (ix, iy) = self.initial?;
        let (dx, dy) = (x - ix, y - iy);
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
            return Some(CandidateEvent::pointer(
                self.kind,
                GesturePhase::Start,
                x,
                y,
                time,
                modifiers,
            ));
        }
        None
    }

    /// Pointer released; closes an active gesture, discards an armed one
    pub(crate) fn release(
        &mut self,
        position: Option<(f64, f64)>,
        time: u64,
        modifiers: ModifierFlags,
    ) -> Option<CandidateEvent> {
        let was_gesturing = self.gesturing;
        self.gesturing = false;
        self.canceled = false;
        self.initial = None;
        if !was_gesturing {
            return None;
        }
        let (x, y) = position.unwrap_or(self.last);
        Some(CandidateEvent::pointer(
            self.kind,
            GesturePhase::End,
            x,
            y,
            time,
            modifiers,
        ))
    }

    pub(crate) fn update_config(&mut self, config: &ObservableConfig) -> bool {
        if config.effective_passive() != self.config.effective_passive() {
            return false;
        }
        self.config = config.clone();
        true
    }

    pub(crate) fn reset(&mut self) {
        self.gesturing = false;
        self.canceled = false;
        self.initial = None;
        self.last = (0.0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Axis;

    fn flags() -> ModifierFlags {
        ModifierFlags::default()
    }

    #[test]
    fn test_zero_threshold_starts_on_press() {
        let mut core = PointerCore::new(InputKind::Mouse, &ObservableConfig::default());
        let candidate = core.press(10.0, 20.0, 0, flags()).expect("start");
        assert_eq!(candidate.phase, GesturePhase::Start);
        assert_eq!((candidate.x, candidate.y), (10.0, 20.0));
    }

    #[test]
    fn test_threshold_withholds_until_crossed() {
        let config = ObservableConfig {
            threshold: 5.0,
            ..Default::default()
        };
        let mut core = PointerCore::new(InputKind::Mouse, &config);
        assert!(core.press(0.0, 0.0, 0, flags()).is_none());
        assert!(core.motion(3.0, 0.0, 10, flags()).is_none());
        let candidate = core.motion(6.0, 0.0, 20, flags()).expect("start");
        assert_eq!(candidate.phase, GesturePhase::Start);
        assert_eq!(candidate.x, 6.0);
        let candidate = core.motion(7.0, 0.0, 30, flags()).expect("move");
        assert_eq!(candidate.phase, GesturePhase::Move);
    }

    #[test]
    fn test_release_without_gesture_is_silent() {
        let config = ObservableConfig {
            threshold: 5.0,
            ..Default::default()
        };
        let mut core = PointerCore::new(InputKind::Mouse, &config);
        core.press(0.0, 0.0, 0, flags());
        core.motion(1.0, 0.0, 10, flags());
        assert!(core.release(None, 20, flags()).is_none());
    }

    #[test]
    fn test_cancel_on_cross_axis_motion_is_sticky() {
        let config = ObservableConfig {
            threshold: 3.0,
            orientation: Some(Axis::Horizontal),
            cancel_threshold: Some(3.0),
            ..Default::default()
        };
        let mut core = PointerCore::new(InputKind::Mouse, &config);
        core.press(0.0, 0.0, 0, flags());
        assert!(core.motion(0.0, 10.0, 10, flags()).is_none());
        // Later horizontal motion past the threshold must not resurrect the
        // canceled candidate.
        assert!(core.motion(50.0, 10.0, 20, flags()).is_none());
        assert!(core.release(None, 30, flags()).is_none());
    }

    #[test]
    fn test_release_closes_with_last_known_position() {
        let mut core = PointerCore::new(InputKind::Touch, &ObservableConfig::default());
        core.press(1.0, 1.0, 0, flags());
        core.motion(4.0, 5.0, 10, flags());
        let candidate = core.release(None, 20, flags()).expect("end");
        assert_eq!(candidate.phase, GesturePhase::End);
        assert_eq!((candidate.x, candidate.y), (4.0, 5.0));
    }

    #[test]
    fn test_passive_flip_requires_recreation() {
        let mut core = PointerCore::new(InputKind::Mouse, &ObservableConfig::default());
        let same = ObservableConfig {
            threshold: 9.0,
            ..Default::default()
        };
        assert!(core.update_config(&same));
        assert_eq!(core.config().threshold, 9.0);

        let flipped = ObservableConfig {
            prevent_default: true,
            ..Default::default()
        };
        assert!(!core.update_config(&flipped));
    }
}
