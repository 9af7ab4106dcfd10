//! L4 Atomic Layer: The scroll-lock state machine
//!
//! `ScrollLockSession` is pure: it consumes `LockEvent`s and returns the
//! `LockEffect`s the controller must apply to the page. It never reads or
//! writes the document itself.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ScrollLockConfig;
use crate::motion::{clamp, map_range};

/// Direction of a release from Locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Scroll capture state while the section is locked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockedSpan {
    /// Accumulated virtual scroll, clamped to `[0, span]` after every event
    pub buffer: f64,
    /// Real page offset captured when the lock engaged
    pub origin_y: f64,
    /// Pixel distance the full buffer span maps onto
    pub scroll_distance: f64,
}

/// Phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum LockPhase {
    Idle,
    Approaching,
    Locked(LockedSpan),
    Unlocked,
}

impl LockPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Approaching => "approaching",
            Self::Locked(_) => "locked",
            Self::Unlocked => "unlocked",
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

/// Section geometry sampled for one bounds check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsSample {
    /// Section intersects the viewport
    pub in_viewport: bool,
    /// Sticky wrapper top is at or above the lock offset
    pub at_lock_position: bool,
    /// Current page scroll offset
    pub scroll_y: f64,
    /// Section height minus viewport height
    pub scroll_distance: f64,
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockEvent {
    /// Geometry re-evaluated after a scroll
    Bounds(BoundsSample),
    /// Signed virtual scroll delta from wheel or touch
    Scroll(f64),
    /// Tab chosen directly by the user
    SelectTab(usize),
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum LockEffect {
    /// Freeze the wrapper and start capturing input
    Lock,
    /// Unfreeze the wrapper
    Release { direction: Direction },
    /// Immediate, non-animated scroll to a page offset
    ScrollTo { top: f64 },
    /// Mark exactly this tab and panel active
    ActivateTab { index: usize },
}

/// One page view's scroll-lock state
#[derive(Debug, Clone)]
pub struct ScrollLockSession {
    phase: LockPhase,
    tab_count: usize,
    current_tab: usize,
    has_completed_once: bool,
    units_per_tab: f64,
    upward_unlock_threshold: f64,
}

impl ScrollLockSession {
    /// Create a session for `tab_count` tabs
    ///
    /// With `bypass` set the lock is already spent and will never engage.
    pub fn new(tab_count: usize, config: &ScrollLockConfig, bypass: bool) -> Self {
        if bypass {
            debug!("Scroll lock bypassed for this page view");
        }
        Self {
            phase: LockPhase::Idle,
            tab_count,
            current_tab: 0,
            has_completed_once: bypass,
            units_per_tab: config.units_per_tab,
            upward_unlock_threshold: config.upward_unlock_threshold,
        }
    }

    pub fn phase(&self) -> &LockPhase {
        &self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase.is_locked()
    }

    pub fn current_tab(&self) -> usize {
        self.current_tab
    }

    pub fn tab_count(&self) -> usize {
        self.tab_count
    }

    pub fn has_completed_once(&self) -> bool {
        self.has_completed_once
    }

    /// Buffer value while locked
    pub fn scroll_buffer(&self) -> Option<f64> {
        match self.phase {
            LockPhase::Locked(span) => Some(span.buffer),
            _ => None,
        }
    }

    /// Full buffer span: reaching it releases downward
    pub fn span(&self) -> f64 {
        self.units_per_tab * self.tab_count as f64
    }

    /// Apply one event and return the effects to perform, in order
    pub fn handle(&mut self, event: LockEvent) -> Vec<LockEffect> {
        let mut effects = Vec::new();
        let span = self.span();

        match (self.phase, event) {
            (LockPhase::Idle, LockEvent::Bounds(bounds)) => {
                if bounds.in_viewport && !bounds.at_lock_position {
                    self.enter(LockPhase::Approaching);
                }
            }
            (LockPhase::Approaching, LockEvent::Bounds(bounds)) => {
                if !bounds.in_viewport {
                    self.enter(LockPhase::Idle);
                } else if bounds.at_lock_position && !self.has_completed_once {
                    self.lock(bounds, &mut effects);
                }
            }
            // Locked waits for an unlock threshold; Unlocked never re-locks.
            (LockPhase::Locked(_), LockEvent::Bounds(_))
            | (LockPhase::Unlocked, LockEvent::Bounds(_)) => {}

            (LockPhase::Locked(mut locked), LockEvent::Scroll(delta)) => {
                let buffer = locked.buffer + delta;

                // Upward release is tested first; both are pre-clamp.
                if buffer < self.upward_unlock_threshold {
                    self.release_upward(&mut effects);
                } else if buffer >= span {
                    self.release_downward(&mut effects);
                } else {
                    locked.buffer = clamp(buffer, 0.0, span);
                    self.phase = LockPhase::Locked(locked);
                    effects.push(LockEffect::ScrollTo {
                        top: Self::virtual_scroll_top(&locked, span),
                    });

                    let tab = self.tab_for(locked.buffer);
                    if tab != self.current_tab {
                        self.activate(tab, &mut effects);
                    }
                }
            }
            (_, LockEvent::Scroll(_)) => {}

            (phase, LockEvent::SelectTab(index)) => {
                if index >= self.tab_count {
                    return effects;
                }
                self.activate(index, &mut effects);
                if let LockPhase::Locked(mut locked) = phase {
                    locked.buffer = index as f64 * self.units_per_tab;
                    self.phase = LockPhase::Locked(locked);
                    effects.push(LockEffect::ScrollTo {
                        top: Self::virtual_scroll_top(&locked, span),
                    });
                }
            }
        }

        effects
    }

    fn enter(&mut self, phase: LockPhase) {
        debug!(from = self.phase.name(), to = phase.name(), "Scroll lock transition");
        self.phase = phase;
    }

    fn lock(&mut self, bounds: BoundsSample, effects: &mut Vec<LockEffect>) {
        info!(scroll_y = bounds.scroll_y, "Feature section locked");
        self.enter(LockPhase::Locked(LockedSpan {
            buffer: 0.0,
            origin_y: bounds.scroll_y,
            scroll_distance: bounds.scroll_distance.max(0.0),
        }));
        effects.push(LockEffect::Lock);
        self.activate(0, effects);
    }

    fn release_downward(&mut self, effects: &mut Vec<LockEffect>) {
        info!("Feature section released downward");
        self.has_completed_once = true;
        self.enter(LockPhase::Unlocked);
        effects.push(LockEffect::Release {
            direction: Direction::Down,
        });
    }

    fn release_upward(&mut self, effects: &mut Vec<LockEffect>) {
        info!("Feature section released upward");
        self.enter(LockPhase::Approaching);
        effects.push(LockEffect::Release {
            direction: Direction::Up,
        });
        if self.current_tab != 0 {
            self.activate(0, effects);
        }
    }

    fn activate(&mut self, index: usize, effects: &mut Vec<LockEffect>) {
        debug!(tab = index, "Activating feature tab");
        self.current_tab = index;
        effects.push(LockEffect::ActivateTab { index });
    }

    fn tab_for(&self, buffer: f64) -> usize {
        let index = (buffer / self.units_per_tab).floor() as usize;
        index.min(self.tab_count.saturating_sub(1))
    }

    fn virtual_scroll_top(locked: &LockedSpan, span: f64) -> f64 {
        locked.origin_y + map_range(locked.buffer, 0.0, span, 0.0, locked.scroll_distance)
    }
}
