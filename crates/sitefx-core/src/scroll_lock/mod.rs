//! Scroll-locked feature tabs
//!
//! Once the feature section's sticky wrapper reaches the lock offset, page
//! scrolling is captured into a virtual buffer that walks through the tabs.
//! The section releases downward when the buffer passes the last tab (once
//! per page view) or upward when the user scrolls back above the first.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `session` - Pure state machine: events in, effects out
//! - `input` - Wheel/touch/key normalisation
//!
//! ## L3 Molecular Layer
//! - `controller` - Applies session effects to a `FeatureSection`
//!
//! # Usage
//!
//! ```ignore
//! use sitefx_core::scroll_lock::{InputEvent, ScrollLockTabController};
//!
//! let bypass = config.scroll_lock.bypass_for(url.fragment(), false);
//! if let Some(mut tabs) = ScrollLockTabController::attach(page, &config.scroll_lock, bypass) {
//!     tabs.on_scroll();
//!     tabs.on_frame(now);
//!     let outcome = tabs.handle_input(InputEvent::Wheel { delta_y: 120.0 });
//! }
//! ```

// L4 Atomic Layer
pub mod input;
pub mod session;

// L3 Molecular Layer
pub mod controller;

pub use controller::ScrollLockTabController;
pub use input::{InputEvent, InputOutcome, TouchTracker, SCROLL_KEY_CODES};
pub use session::{BoundsSample, Direction, LockEffect, LockEvent, LockPhase, LockedSpan, ScrollLockSession};
