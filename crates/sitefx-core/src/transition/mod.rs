//! Page-transition mask
//!
//! A full-screen quadrilateral mask whose four vertices sweep between the
//! viewport corners and its center. Exit runs cover the page before content
//! is swapped; entrance runs reveal the new page afterwards.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `mask` - Vertex layouts, per-vertex tracks and frame sampling
//!
//! ## L3 Molecular Layer
//! - `animator` - Profile selection and frame-driven runs against a `MaskSurface`

// L4 Atomic Layer
pub mod mask;

// L3 Molecular Layer
pub mod animator;

pub use animator::{TransitionMaskAnimator, ViewportClass};
pub use mask::{MaskAnimation, MaskDirection, MaskFrame, VertexLayout, VertexTrack};
