//! Raw input event model
//!
//! Defines the device-specific events the host surface delivers to the
//! engine. Events are owned transiently: a sensor never retains one beyond a
//! single reduction step except where explicitly cached (the event that
//! opened a candidate gesture).

use serde::{Deserialize, Serialize};

/// Raw event channels delivered by a host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Mouse button pressed
    MouseDown,
    /// Mouse moved (includes drag)
    MouseMove,
    /// Mouse button released
    MouseUp,
    /// Touch began
    TouchStart,
    /// Touch point moved
    TouchMove,
    /// Touch ended
    TouchEnd,
    /// Wheel/trackpad scroll
    Wheel,
    /// Key pressed (including auto-repeat)
    KeyDown,
    /// Key released
    KeyUp,
}

impl EventKind {
    /// Check if this is a mouse event
    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            EventKind::MouseDown | EventKind::MouseMove | EventKind::MouseUp
        )
    }

    /// Check if this is a touch event
    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            EventKind::TouchStart | EventKind::TouchMove | EventKind::TouchEnd
        )
    }

    /// Check if this is a keyboard event
    pub fn is_keyboard(&self) -> bool {
        matches!(self, EventKind::KeyDown | EventKind::KeyUp)
    }
}

/// Keyboard modifier flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ModifierFlags {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl ModifierFlags {
    /// Check if any modifier is active
    pub fn any_active(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// One contact point of a touch event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Host-assigned contact identifier, stable for the contact's lifetime
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// Unit of a wheel event's delta values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeltaMode {
    /// Deltas are pixels
    #[default]
    Pixel,
    /// Deltas are text lines
    Line,
    /// Deltas are pages
    Page,
}

/// Payload of a wheel event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct WheelDelta {
    pub delta_x: f64,
    pub delta_y: f64,
    /// Unit of `delta_x`/`delta_y`
    pub mode: DeltaMode,
    /// Native notch count for the x axis, when the device reports one
    pub spin_x: Option<f64>,
    /// Native notch count for the y axis, when the device reports one
    pub spin_y: Option<f64>,
}

/// Key identity of a keyboard event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Logical key value (e.g. `"ArrowLeft"`, `" "`, `"Enter"`)
    pub key: String,
    /// True for auto-repeated key-downs
    pub repeat: bool,
}

impl KeyInfo {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            repeat: false,
        }
    }

    pub fn repeated(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            repeat: true,
        }
    }
}

/// Raw event as delivered by the host surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputEvent {
    /// Event channel
    pub kind: EventKind,
    /// Host timestamp in milliseconds
    pub time: u64,
    /// Pointer position (for touch events, mirrors the first contact)
    pub position: (f64, f64),
    /// Active contacts (touch events only)
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
    /// Modifier flags at time of event
    #[serde(default)]
    pub modifiers: ModifierFlags,
    /// Key identity (keyboard events only)
    pub key: Option<KeyInfo>,
    /// Wheel payload (wheel events only)
    pub wheel: Option<WheelDelta>,
}

impl RawInputEvent {
    /// Create a mouse event
    pub fn mouse(kind: EventKind, time: u64, x: f64, y: f64, modifiers: ModifierFlags) -> Self {
        Self {
            kind,
            time,
            position: (x, y),
            touches: Vec::new(),
            modifiers,
            key: None,
            wheel: None,
        }
    }

    /// Create a touch event
    pub fn touch(
        kind: EventKind,
        time: u64,
        touches: Vec<TouchPoint>,
        modifiers: ModifierFlags,
    ) -> Self {
        let position = touches.first().map(|t| (t.x, t.y)).unwrap_or((0.0, 0.0));
        Self {
            kind,
            time,
            position,
            touches,
            modifiers,
            key: None,
            wheel: None,
        }
    }

    /// Create a wheel event
    pub fn wheel(time: u64, x: f64, y: f64, delta: WheelDelta, modifiers: ModifierFlags) -> Self {
        Self {
            kind: EventKind::Wheel,
            time,
            position: (x, y),
            touches: Vec::new(),
            modifiers,
            key: None,
            wheel: Some(delta),
        }
    }

    /// Create a keyboard event
    pub fn keyboard(
        kind: EventKind,
        time: u64,
        key: KeyInfo,
        modifiers: ModifierFlags,
    ) -> Self {
        Self {
            kind,
            time,
            position: (0.0, 0.0),
            touches: Vec::new(),
            modifiers,
            key: Some(key),
            wheel: None,
        }
    }

    /// Position of the primary pointer: the first touch contact when one
    /// exists, the event position otherwise
    pub fn primary_position(&self) -> (f64, f64) {
        self.touches
            .first()
            .map(|t| (t.x, t.y))
            .unwrap_or(self.position)
    }
}
