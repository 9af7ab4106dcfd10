//! L4 Atomic Layer: Mask vertex layouts and per-vertex timing
//!
//! Each vertex travels from its start layout position to its end layout
//! position with its own delay and easing. Progress is linear time clamped
//! to `[0, 1]` and eased through a cubic bezier, so no vertex overshoots.

use serde::{Deserialize, Serialize};

use crate::config::{TimingProfile, TransitionConfig};
use crate::motion::{lerp, progress, CubicBezier};
use crate::page::{Point, VertexId};

/// Which way the mask moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskDirection {
    /// Center to corners: the screen ends fully covered (exit)
    Cover,
    /// Corners to center: content ends fully visible (entrance)
    Reveal,
}

impl MaskDirection {
    pub fn start_layout(self) -> VertexLayout {
        match self {
            Self::Cover => VertexLayout::Center,
            Self::Reveal => VertexLayout::Corners,
        }
    }

    pub fn end_layout(self) -> VertexLayout {
        match self {
            Self::Cover => VertexLayout::Corners,
            Self::Reveal => VertexLayout::Center,
        }
    }
}

/// Canonical vertex positions in percent of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexLayout {
    Corners,
    Center,
}

impl VertexLayout {
    pub fn points(self) -> [Point; 4] {
        match self {
            Self::Corners => [
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            Self::Center => [Point::new(50.0, 50.0); 4],
        }
    }

    pub fn point(self, vertex: VertexId) -> Point {
        self.points()[vertex.index()]
    }
}

/// Timing and path of one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexTrack {
    pub vertex: VertexId,
    pub delay_ms: f64,
    pub easing: CubicBezier,
    pub from: Point,
    pub to: Point,
}

impl VertexTrack {
    /// Linear progress at `elapsed` ms after the phase started
    pub fn progress(&self, elapsed: f64, duration_ms: f64) -> f64 {
        progress(elapsed - self.delay_ms, duration_ms)
    }

    /// Position at linear progress `t`
    pub fn position(&self, t: f64) -> Point {
        let eased = self.easing.solve(t);
        Point::new(
            lerp(self.from.x, self.to.x, eased),
            lerp(self.from.y, self.to.y, eased),
        )
    }
}

/// Vertex positions at one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskFrame {
    /// Milliseconds since the phase started
    pub elapsed_ms: f64,
    pub points: [Point; 4],
    pub progress: [f64; 4],
    /// Every vertex has reached progress 1
    pub complete: bool,
}

/// One exit or entrance run of the four vertices
#[derive(Debug, Clone, PartialEq)]
pub struct MaskAnimation {
    direction: MaskDirection,
    started_at: f64,
    duration_ms: f64,
    tracks: [VertexTrack; 4],
}

impl MaskAnimation {
    /// Build a run starting at frame time `started_at`
    ///
    /// The diagonals move as pairs: top-left with bottom-right on the leading
    /// curve, top-right with bottom-left delayed on the trailing curve.
    pub fn new(
        direction: MaskDirection,
        profile: TimingProfile,
        config: &TransitionConfig,
        started_at: f64,
    ) -> Self {
        let from = direction.start_layout();
        let to = direction.end_layout();
        let tracks = VertexId::ALL.map(|vertex| {
            let leading = matches!(vertex, VertexId::Point1 | VertexId::Point3);
            VertexTrack {
                vertex,
                delay_ms: if leading { 0.0 } else { profile.pair_delay_ms },
                easing: if leading {
                    config.leading_easing
                } else {
                    config.trailing_easing
                },
                from: from.point(vertex),
                to: to.point(vertex),
            }
        });

        Self {
            direction,
            started_at,
            duration_ms: profile.duration_ms,
            tracks,
        }
    }

    pub fn direction(&self) -> MaskDirection {
        self.direction
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn tracks(&self) -> &[VertexTrack; 4] {
        &self.tracks
    }

    /// Frame time by which every vertex has arrived
    pub fn settles_at(&self) -> f64 {
        let max_delay = self
            .tracks
            .iter()
            .map(|t| t.delay_ms)
            .fold(0.0_f64, f64::max);
        self.started_at + max_delay + self.duration_ms
    }

    /// Vertex positions at frame time `now`
    pub fn sample(&self, now: f64) -> MaskFrame {
        let elapsed = now - self.started_at;
        let mut points = [Point::default(); 4];
        let mut progress = [0.0; 4];

        for (i, track) in self.tracks.iter().enumerate() {
            progress[i] = track.progress(elapsed, self.duration_ms);
            points[i] = track.position(progress[i]);
        }

        MaskFrame {
            elapsed_ms: elapsed,
            points,
            progress,
            complete: progress.iter().all(|p| *p >= 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animation(direction: MaskDirection) -> MaskAnimation {
        let config = TransitionConfig::default();
        MaskAnimation::new(direction, config.desktop, &config, 1000.0)
    }

    #[test]
    fn test_cover_runs_center_to_corners() {
        let anim = animation(MaskDirection::Cover);
        assert_eq!(anim.sample(1000.0).points, VertexLayout::Center.points());
        let end = anim.sample(anim.settles_at());
        assert!(end.complete);
        assert_eq!(end.points, VertexLayout::Corners.points());
    }

    #[test]
    fn test_reveal_runs_corners_to_center() {
        let anim = animation(MaskDirection::Reveal);
        assert_eq!(anim.sample(1000.0).points, VertexLayout::Corners.points());
        assert_eq!(
            anim.sample(anim.settles_at()).points,
            VertexLayout::Center.points()
        );
    }

    #[test]
    fn test_trailing_pair_waits_for_delay() {
        let anim = animation(MaskDirection::Cover);
        let frame = anim.sample(1000.0 + 200.0);
        assert!(frame.progress[0] > 0.0);
        assert!(frame.progress[2] > 0.0);
        assert_eq!(frame.progress[1], 0.0);
        assert_eq!(frame.progress[3], 0.0);
        assert_eq!(frame.points[1], Point::new(50.0, 50.0));
    }

    #[test]
    fn test_completion_is_delay_skewed() {
        let anim = animation(MaskDirection::Cover);
        // Leading pair done at 1200ms, trailing pair still moving
        let frame = anim.sample(1000.0 + 1300.0);
        assert_eq!(frame.progress[0], 1.0);
        assert!(frame.progress[1] < 1.0);
        assert!(!frame.complete);
        assert_eq!(anim.settles_at(), 1000.0 + 1450.0);
        assert!(anim.sample(anim.settles_at()).complete);
    }

    #[test]
    fn test_vertices_never_leave_their_path() {
        let anim = animation(MaskDirection::Cover);
        let mut prev = anim.sample(1000.0).points;
        let mut now = 1000.0;
        while now <= anim.settles_at() + 32.0 {
            let frame = anim.sample(now);
            for (i, p) in frame.points.iter().enumerate() {
                assert!((0.0..=100.0).contains(&p.x) && (0.0..=100.0).contains(&p.y));
                // Monotonic travel away from the center
                assert!((p.x - 50.0).abs() + 1e-4 >= (prev[i].x - 50.0).abs());
                assert!((p.y - 50.0).abs() + 1e-4 >= (prev[i].y - 50.0).abs());
            }
            prev = frame.points;
            now += 16.0;
        }
    }
}
