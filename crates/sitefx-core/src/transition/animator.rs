//! L3 Molecular Layer: Transition mask animator
//!
//! Owns the mask element for the lifetime of the page and plays one exit
//! (cover) or entrance (reveal) run at a time. Runs can be awaited on a
//! `FrameClock`, or stepped by a host via `begin` / `apply` / `finish`.

use tracing::{debug, info};

use super::mask::{MaskAnimation, MaskDirection, MaskFrame};
use crate::config::{TimingProfile, TransitionConfig};
use crate::frame::{wait_ms, FrameClock};
use crate::page::{MaskPhase, MaskSurface, VertexId};

/// Viewport size class that selects the timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Desktop,
    Compact,
}

pub struct TransitionMaskAnimator<M> {
    mask: M,
    config: TransitionConfig,
    viewport: ViewportClass,
    phase: MaskPhase,
}

impl<M: MaskSurface> TransitionMaskAnimator<M> {
    /// Take ownership of a freshly created mask, initially revealed
    pub fn new(mut mask: M, config: TransitionConfig, viewport_width: f64) -> Self {
        mask.set_phase(MaskPhase::Revealed);
        let viewport = Self::classify(&config, viewport_width);
        Self {
            mask,
            config,
            viewport,
            phase: MaskPhase::Revealed,
        }
    }

    pub fn mask(&self) -> &M {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut M {
        &mut self.mask
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn viewport_class(&self) -> ViewportClass {
        self.viewport
    }

    pub fn phase(&self) -> MaskPhase {
        self.phase
    }

    /// Re-evaluate the size class; only runs started afterwards are affected
    pub fn set_viewport_width(&mut self, width: f64) {
        let class = Self::classify(&self.config, width);
        if class != self.viewport {
            debug!(width, ?class, "Transition viewport class changed");
            self.viewport = class;
        }
    }

    /// Timing profile the next run will use
    pub fn profile(&self) -> TimingProfile {
        match self.viewport {
            ViewportClass::Desktop => self.config.desktop,
            ViewportClass::Compact => self.config.compact,
        }
    }

    /// Start a run at frame time `now` and put the mask in its running phase
    pub fn begin(&mut self, direction: MaskDirection, now: f64) -> MaskAnimation {
        self.set_phase(match direction {
            MaskDirection::Cover => MaskPhase::Covering,
            MaskDirection::Reveal => MaskPhase::Revealing,
        });
        MaskAnimation::new(direction, self.profile(), &self.config, now)
    }

    /// Write one sampled frame to the mask
    pub fn apply(&mut self, frame: &MaskFrame) {
        for vertex in VertexId::ALL {
            self.mask.set_vertex(vertex, frame.points[vertex.index()]);
        }
    }

    /// Settle the mask after a completed run
    pub fn finish(&mut self, direction: MaskDirection) {
        self.set_phase(match direction {
            MaskDirection::Cover => MaskPhase::Covered,
            MaskDirection::Reveal => MaskPhase::Revealed,
        });
    }

    /// Show content immediately with no animation (initial page load)
    pub fn snap_revealed(&mut self) {
        self.set_phase(MaskPhase::Revealed);
    }

    /// Classes are only touched when the phase actually changes
    fn set_phase(&mut self, phase: MaskPhase) {
        if phase != self.phase {
            self.phase = phase;
            self.mask.set_phase(phase);
        }
    }

    /// Cover the screen; resolves once all four vertices have arrived
    pub async fn play_exit<C: FrameClock + ?Sized>(&mut self, clock: &C) -> usize {
        self.run(MaskDirection::Cover, clock).await
    }

    /// Reveal the new page after the entrance delay
    ///
    /// The screen is held covered during the delay, so a freshly loaded page
    /// never flashes before its entrance.
    pub async fn play_entrance<C: FrameClock + ?Sized>(&mut self, clock: &C) -> usize {
        self.set_phase(MaskPhase::Covered);
        wait_ms(clock, self.config.entrance_delay_ms).await;
        self.run(MaskDirection::Reveal, clock).await
    }

    /// Run one phase to completion, returning the number of frames drawn
    async fn run<C: FrameClock + ?Sized>(&mut self, direction: MaskDirection, clock: &C) -> usize {
        let started_at = clock.next_frame().await;
        let animation = self.begin(direction, started_at);
        info!(
            ?direction,
            duration_ms = self.profile().duration_ms,
            "Transition mask run started"
        );

        let mut frames = 0;
        loop {
            let now = clock.next_frame().await;
            let frame = animation.sample(now);
            self.apply(&frame);
            frames += 1;
            if frame.complete {
                break;
            }
        }

        self.finish(direction);
        debug!(?direction, frames, "Transition mask run finished");
        frames
    }

    fn classify(config: &TransitionConfig, width: f64) -> ViewportClass {
        if config.is_compact(width) {
            ViewportClass::Compact
        } else {
            ViewportClass::Desktop
        }
    }
}
