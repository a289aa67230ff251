//! Gesture state reducer
//!
//! A pure fold from candidate events onto state snapshots. Sensors guarantee
//! phase ordering for their own device, so an out-of-order phase here means
//! the stream was wired wrong and surfaces as an error rather than a
//! silently corrupt snapshot.

use crate::gesture::state::{GesturePhase, GestureState, InputKind};
use crate::sensor::CandidateEvent;
use crate::{Error, Result};

/// Fold one candidate event into the next state snapshot
pub fn reduce(prev: &GestureState, event: &CandidateEvent) -> Result<GestureState> {
    if event.kind != prev.kind {
        return Err(Error::UnexpectedEvent(format!(
            "candidate kind {:?} folded into a {:?} stream",
            event.kind, prev.kind
        )));
    }
    match event.phase {
        GesturePhase::Start => {
            if prev.gesturing {
                return Err(Error::UnexpectedEvent(
                    "gesture start while already gesturing".into(),
                ));
            }
            Ok(open(prev, event))
        }
        GesturePhase::Move => {
            if !prev.gesturing {
                return Err(Error::UnexpectedEvent(
                    "gesture move without an active gesture".into(),
                ));
            }
            Ok(advance(prev, event))
        }
        GesturePhase::End => {
            if !prev.gesturing {
                return Err(Error::UnexpectedEvent(
                    "gesture end without an active gesture".into(),
                ));
            }
            Ok(close(prev, event))
        }
    }
}

/// Open a new gesture at the event position
fn open(prev: &GestureState, event: &CandidateEvent) -> GestureState {
    GestureState {
        kind: prev.kind,
        x: event.x,
        y: event.y,
        x_initial: event.x,
        y_initial: event.y,
        x_prev: event.x,
        y_prev: event.y,
        x_delta: 0.0,
        y_delta: 0.0,
        x_velocity: 0.0,
        y_velocity: 0.0,
        x_spin: event.x_spin,
        y_spin: event.y_spin,
        gesturing: true,
        key: event.key.clone(),
        repeat: event.key.as_ref().map(|k| k.repeat).unwrap_or(false),
        time: event.time,
        time_initial: event.time,
        duration: 0,
        elapsed: 0,
    }
}

/// Advance an active gesture by one motion step
fn advance(prev: &GestureState, event: &CandidateEvent) -> GestureState {
    GestureState {
        kind: prev.kind,
        x: event.x,
        y: event.y,
        x_initial: prev.x_initial,
        y_initial: prev.y_initial,
        x_prev: prev.x,
        y_prev: prev.y,
        x_delta: event.x - prev.x_initial,
        y_delta: event.y - prev.y_initial,
        x_velocity: event.x - prev.x,
        y_velocity: event.y - prev.y,
        x_spin: prev.x_spin + event.x_spin,
        y_spin: prev.y_spin + event.y_spin,
        gesturing: true,
        key: event.key.clone().or_else(|| prev.key.clone()),
        repeat: event.key.as_ref().map(|k| k.repeat).unwrap_or(prev.repeat),
        time: event.time,
        time_initial: prev.time_initial,
        duration: event.time.saturating_sub(prev.time),
        elapsed: event.time.saturating_sub(prev.time_initial),
    }
}

/// Close an active gesture, retaining its final motion fields
fn close(prev: &GestureState, event: &CandidateEvent) -> GestureState {
    GestureState {
        gesturing: false,
        time: event.time,
        duration: event.time.saturating_sub(prev.time),
        elapsed: event.time.saturating_sub(prev.time_initial),
        ..prev.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::types::{KeyInfo, ModifierFlags};

    fn pointer(phase: GesturePhase, x: f64, y: f64, time: u64) -> CandidateEvent {
        CandidateEvent::pointer(InputKind::Mouse, phase, x, y, time, ModifierFlags::default())
    }

    #[test]
    fn test_open_advance_close_fold() {
        let idle = GestureState::initial(InputKind::Mouse);
        let started = reduce(&idle, &pointer(GesturePhase::Start, 10.0, 10.0, 100)).unwrap();
        assert!(started.gesturing);
        assert_eq!(started.x_initial, 10.0);
        assert_eq!(started.x_delta, 0.0);
        assert_eq!(started.time_initial, 100);

        let moved = reduce(&started, &pointer(GesturePhase::Move, 15.0, 8.0, 120)).unwrap();
        assert_eq!(moved.x_delta, 5.0);
        assert_eq!(moved.y_delta, -2.0);
        assert_eq!(moved.x_velocity, 5.0);
        assert_eq!(moved.x_prev, 10.0);
        assert_eq!(moved.duration, 20);
        assert_eq!(moved.elapsed, 20);

        let ended = reduce(&moved, &pointer(GesturePhase::End, 15.0, 8.0, 150)).unwrap();
        assert!(!ended.gesturing);
        // Terminal snapshot keeps the final motion fields.
        assert_eq!(ended.x_delta, 5.0);
        assert_eq!(ended.x, 15.0);
        assert_eq!(ended.elapsed, 50);
    }

    #[test]
    fn test_velocity_is_per_step_displacement() {
        let idle = GestureState::initial(InputKind::Mouse);
        let started = reduce(&idle, &pointer(GesturePhase::Start, 0.0, 0.0, 0)).unwrap();
        let a = reduce(&started, &pointer(GesturePhase::Move, 5.0, 0.0, 10)).unwrap();
        assert_eq!(a.x_velocity, 5.0);
        let b = reduce(&a, &pointer(GesturePhase::Move, 3.0, 0.0, 20)).unwrap();
        assert_eq!(b.x_velocity, -2.0);
    }

    #[test]
    fn test_wheel_spin_accumulates() {
        let idle = GestureState::initial(InputKind::Wheel);
        let flags = ModifierFlags::default();
        let started = reduce(
            &idle,
            &CandidateEvent::wheel(GesturePhase::Start, 0.0, 40.0, 0.0, 1.0, 0, flags),
        )
        .unwrap();
        assert_eq!(started.y_spin, 1.0);
        let moved = reduce(
            &started,
            &CandidateEvent::wheel(GesturePhase::Move, 0.0, 80.0, 0.0, 1.0, 20, flags),
        )
        .unwrap();
        assert_eq!(moved.y_spin, 2.0);
    }

    #[test]
    fn test_keyboard_repeat_flag_tracks_events() {
        let idle = GestureState::initial(InputKind::Keyboard);
        let flags = ModifierFlags::default();
        let started = reduce(
            &idle,
            &CandidateEvent::keyboard(GesturePhase::Start, KeyInfo::new("ArrowUp"), 0, flags),
        )
        .unwrap();
        assert!(!started.repeat);
        let repeated = reduce(
            &started,
            &CandidateEvent::keyboard(
                GesturePhase::Move,
                KeyInfo::repeated("ArrowUp"),
                30,
                flags,
            ),
        )
        .unwrap();
        assert!(repeated.repeat);
        assert_eq!(repeated.key.as_ref().unwrap().key, "ArrowUp");
        let ended = reduce(
            &repeated,
            &CandidateEvent::keyboard(GesturePhase::End, KeyInfo::new("ArrowUp"), 60, flags),
        )
        .unwrap();
        assert!(!ended.gesturing);
        assert!(ended.repeat);
    }

    #[test]
    fn test_out_of_order_phases_error() {
        let idle = GestureState::initial(InputKind::Mouse);
        assert!(reduce(&idle, &pointer(GesturePhase::Move, 0.0, 0.0, 0)).is_err());
        assert!(reduce(&idle, &pointer(GesturePhase::End, 0.0, 0.0, 0)).is_err());

        let started = reduce(&idle, &pointer(GesturePhase::Start, 0.0, 0.0, 0)).unwrap();
        assert!(reduce(&started, &pointer(GesturePhase::Start, 0.0, 0.0, 1)).is_err());
    }

    #[test]
    fn test_kind_mismatch_errors() {
        let idle = GestureState::initial(InputKind::Mouse);
        let wheel = CandidateEvent::wheel(
            GesturePhase::Start,
            0.0,
            0.0,
            0.0,
            1.0,
            0,
            ModifierFlags::default(),
        );
        assert!(matches!(
            reduce(&idle, &wheel),
            Err(Error::UnexpectedEvent(_))
        ));
    }
}
