//! L3 Molecular Layer: Scroll-lock tab controller
//!
//! Wires page input and geometry into a `ScrollLockSession` and applies the
//! resulting effects to the document. Call `on_scroll()` from the scroll
//! listener and `on_frame(now)` once per animation frame.

use tracing::debug;

use super::input::{is_scroll_key, InputEvent, InputOutcome, TouchTracker};
use super::session::{BoundsSample, LockEffect, LockEvent, ScrollLockSession};
use crate::config::ScrollLockConfig;
use crate::page::{FeatureSection, ScrollBehavior, ScrollPort};

/// A panel waiting to fade in
#[derive(Debug, Clone, Copy, PartialEq)]
struct PanelReveal {
    index: usize,
    due_at: f64,
}

/// Owns the feature section's scroll capture for one page view
pub struct ScrollLockTabController<D> {
    dom: D,
    session: ScrollLockSession,
    touch: TouchTracker,
    lock_offset_px: f64,
    panel_reveal_delay_ms: f64,
    /// Set by scroll events, consumed by the next frame
    bounds_check_pending: bool,
    pending_reveal: Option<PanelReveal>,
    /// Timestamp of the latest frame
    now: f64,
}

impl<D: FeatureSection + ScrollPort> ScrollLockTabController<D> {
    /// Attach to a feature section
    ///
    /// Returns `None` without touching the page when the section has no tabs
    /// or no panels. Otherwise runs the initial bounds check immediately.
    pub fn attach(dom: D, config: &ScrollLockConfig, bypass: bool) -> Option<Self> {
        let tab_count = dom.tab_count();
        if tab_count == 0 || dom.panel_count() == 0 {
            debug!("Feature section incomplete, scroll lock not attached");
            return None;
        }

        let mut controller = Self {
            dom,
            session: ScrollLockSession::new(tab_count, config, bypass),
            touch: TouchTracker::new(config.touch_sensitivity),
            lock_offset_px: config.lock_offset_px,
            panel_reveal_delay_ms: config.panel_reveal_delay_ms,
            bounds_check_pending: false,
            pending_reveal: None,
            now: 0.0,
        };
        controller.check_bounds();
        Some(controller)
    }

    pub fn session(&self) -> &ScrollLockSession {
        &self.session
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Handle one input event; the outcome says whether to cancel its default action
    ///
    /// The finger is tracked in every phase, so a gesture that locks the
    /// section midway, or starts while it is released, is measured from its
    /// own previous position.
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        match event {
            InputEvent::TouchStart { y } => {
                self.touch.start(y);
                return InputOutcome::PASS;
            }
            InputEvent::TouchMove { y } if !self.session.is_locked() => {
                self.touch.advance(y);
                return InputOutcome::PASS;
            }
            _ => {}
        }
        if !self.session.is_locked() {
            return InputOutcome::PASS;
        }

        match event {
            InputEvent::Wheel { delta_y } => {
                self.dispatch(LockEvent::Scroll(delta_y));
                InputOutcome::CAPTURED
            }
            InputEvent::TouchStart { .. } => InputOutcome::PASS,
            InputEvent::TouchMove { y } => {
                let delta = self.touch.advance(y);
                self.dispatch(LockEvent::Scroll(delta));
                InputOutcome::CAPTURED
            }
            InputEvent::KeyDown { key_code } => {
                if is_scroll_key(key_code) {
                    InputOutcome::CAPTURED
                } else {
                    InputOutcome::PASS
                }
            }
        }
    }

    /// A tab was clicked
    pub fn select_tab(&mut self, index: usize) {
        self.dispatch(LockEvent::SelectTab(index));
    }

    /// The page scrolled; geometry is re-read on the next frame
    pub fn on_scroll(&mut self) {
        self.bounds_check_pending = true;
    }

    /// Advance to the frame at `now`
    pub fn on_frame(&mut self, now: f64) {
        self.now = now;
        if self.bounds_check_pending {
            self.bounds_check_pending = false;
            self.check_bounds();
        }
        self.flush_reveal();
    }

    /// Tear down, leaving the wrapper in its natural sticky state
    pub fn detach(mut self) -> D {
        if self.session.is_locked() {
            self.dom.set_wrapper_locked(false);
        }
        self.dom
    }

    fn check_bounds(&mut self) {
        let section = self.dom.section_rect();
        let wrapper = self.dom.wrapper_rect();
        let viewport_height = self.dom.viewport_height();

        let sample = BoundsSample {
            in_viewport: section.intersects_viewport(viewport_height),
            at_lock_position: wrapper.top <= self.lock_offset_px,
            scroll_y: self.dom.scroll_y(),
            scroll_distance: section.height - viewport_height,
        };
        self.dispatch(LockEvent::Bounds(sample));
    }

    fn dispatch(&mut self, event: LockEvent) {
        for effect in self.session.handle(event) {
            match effect {
                LockEffect::Lock => self.dom.set_wrapper_locked(true),
                LockEffect::Release { .. } => self.dom.set_wrapper_locked(false),
                LockEffect::ScrollTo { top } => self.dom.scroll_to(top, ScrollBehavior::Instant),
                LockEffect::ActivateTab { index } => self.activate_tab(index),
            }
        }
    }

    /// Mark one tab active now and schedule its panel's fade-in
    fn activate_tab(&mut self, index: usize) {
        for i in 0..self.dom.tab_count() {
            self.dom.set_tab_active(i, i == index);
        }
        for i in 0..self.dom.panel_count() {
            if i != index {
                self.dom.set_panel_active(i, false);
            }
        }

        // A newer activation replaces any reveal still waiting.
        self.pending_reveal = Some(PanelReveal {
            index,
            due_at: self.now + self.panel_reveal_delay_ms,
        });
        if self.panel_reveal_delay_ms <= 0.0 {
            self.flush_reveal();
        }
    }

    fn flush_reveal(&mut self) {
        if let Some(reveal) = self.pending_reveal {
            if self.now >= reveal.due_at {
                self.pending_reveal = None;
                if reveal.index < self.dom.panel_count() {
                    self.dom.set_panel_active(reveal.index, true);
                }
            }
        }
    }
}
