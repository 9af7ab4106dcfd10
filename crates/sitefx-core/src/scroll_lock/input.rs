//! L4 Atomic Layer: Raw input normalisation for the scroll lock

use serde::{Deserialize, Serialize};

/// Key codes whose default action scrolls the page:
/// space, page up, page down, end, home, and the four arrows
pub const SCROLL_KEY_CODES: [u32; 9] = [32, 33, 34, 35, 36, 37, 38, 39, 40];

/// Input events the controller subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Wheel with signed vertical delta (positive scrolls down)
    Wheel { delta_y: f64 },
    /// First finger down at viewport y
    TouchStart { y: f64 },
    /// Finger moved to viewport y
    TouchMove { y: f64 },
    /// Key pressed
    KeyDown { key_code: u32 },
}

/// What the binding should do with the underlying browser event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputOutcome {
    pub prevent_default: bool,
}

impl InputOutcome {
    pub const PASS: Self = Self {
        prevent_default: false,
    };
    pub const CAPTURED: Self = Self {
        prevent_default: true,
    };
}

pub fn is_scroll_key(key_code: u32) -> bool {
    SCROLL_KEY_CODES.contains(&key_code)
}

/// Converts finger travel into buffer deltas
///
/// Moving the finger up scrolls content down, so the delta is inverted
/// relative to finger motion and scaled by the sensitivity.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    sensitivity: f64,
    last_y: Option<f64>,
}

impl TouchTracker {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            last_y: None,
        }
    }

    pub fn start(&mut self, y: f64) {
        self.last_y = Some(y);
    }

    /// Buffer delta for a move to `y`; the first move without a start contributes nothing
    pub fn advance(&mut self, y: f64) -> f64 {
        let delta = match self.last_y {
            Some(last) => (last - y) * self.sensitivity,
            None => 0.0,
        };
        self.last_y = Some(y);
        delta
    }
}
