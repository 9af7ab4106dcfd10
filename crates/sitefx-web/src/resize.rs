//! Resize bursts collapsed to one viewport re-evaluation per window
//!
//! A width the throttle holds back is not lost: the next navigation picks it
//! up before it starts.

use sitefx_core::motion::Throttle;

/// Minimum spacing of viewport re-evaluations during a resize burst
pub const RESIZE_THROTTLE_MS: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct ResizeTracker {
    throttle: Throttle,
    pending: Option<f64>,
}

impl Default for ResizeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeTracker {
    pub fn new() -> Self {
        Self {
            throttle: Throttle::new(RESIZE_THROTTLE_MS),
            pending: None,
        }
    }

    /// Record a resize; returns the width to apply now, if the window is open
    pub fn observe(&mut self, width: f64, now: f64) -> Option<f64> {
        self.pending = Some(width);
        if self.throttle.ready(now) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Newest width the throttle held back
    pub fn take_pending(&mut self) -> Option<f64> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_resize_applies_immediately() {
        let mut resize = ResizeTracker::new();
        assert_eq!(resize.observe(800.0, 0.0), Some(800.0));
        assert_eq!(resize.take_pending(), None);
    }

    #[test]
    fn test_burst_is_throttled_but_lands() {
        let mut resize = ResizeTracker::new();
        resize.observe(1300.0, 0.0);
        assert_eq!(resize.observe(900.0, 20.0), None);
        assert_eq!(resize.observe(700.0, 40.0), None);
        // The next navigation still gets the latest width
        assert_eq!(resize.take_pending(), Some(700.0));
        assert_eq!(resize.take_pending(), None);
    }

    #[test]
    fn test_window_reopens() {
        let mut resize = ResizeTracker::new();
        resize.observe(1300.0, 0.0);
        assert_eq!(resize.observe(600.0, 50.0), None);
        assert_eq!(resize.observe(500.0, 100.0), Some(500.0));
    }
}
