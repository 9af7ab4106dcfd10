//! L4 Atomic Layer: Element geometry relative to the viewport

use serde::{Deserialize, Serialize};

/// Bounding rectangle of an element in viewport coordinates (CSS px)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
            height,
        }
    }

    /// True when any part of the element is inside a viewport of the given height
    #[inline]
    pub fn intersects_viewport(&self, viewport_height: f64) -> bool {
        self.top < viewport_height && self.bottom > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_edges_are_exclusive() {
        assert!(Rect::new(0.0, 10.0).intersects_viewport(800.0));
        assert!(!Rect::new(800.0, 10.0).intersects_viewport(800.0));
        assert!(!Rect::new(-10.0, 10.0).intersects_viewport(800.0));
        assert!(Rect::new(-10.0, 11.0).intersects_viewport(800.0));
    }
}
