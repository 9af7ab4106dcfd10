//! Shared numeric primitives for the scroll-lock and transition engines
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `timing` - Interpolation, clamping and progress helpers
//! - `easing` - Cubic-bezier timing functions solved with Newton-Raphson
//! - `viewport` - Element rectangles and viewport intersection
//! - `throttle` - Timestamp-driven leading-edge throttle
//!
//! Everything here is pure and allocation-free so it can run on every frame.

pub mod easing;
pub mod throttle;
pub mod timing;
pub mod viewport;

pub use easing::CubicBezier;
pub use throttle::Throttle;
pub use timing::{clamp, lerp, map_range, progress};
pub use viewport::Rect;
