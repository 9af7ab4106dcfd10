//! L4 Atomic Layer: Cubic-bezier timing functions
//!
//! Evaluates CSS-style `cubic-bezier(x1, y1, x2, y2)` curves: find the
//! parameter `t` whose X equals the linear progress, then return Y at `t`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const EPSILON: f64 = 1e-6;
const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 64;

/// Cubic-bezier curve anchored at (0,0) and (1,1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// Polynomial coefficients of one axis: `((a*t + b)*t + c)*t`
#[derive(Debug, Clone, Copy)]
struct Axis {
    a: f64,
    b: f64,
    c: f64,
}

impl Axis {
    #[inline]
    fn new(p1: f64, p2: f64) -> Self {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        Self { a, b, c }
    }

    #[inline]
    fn sample(&self, t: f64) -> f64 {
        ((self.a * t + self.b) * t + self.c) * t
    }

    #[inline]
    fn derivative(&self, t: f64) -> f64 {
        (3.0 * self.a * t + 2.0 * self.b) * t + self.c
    }
}

impl CubicBezier {
    /// CSS `ease`
    pub const EASE: Self = Self::new(0.25, 0.1, 0.25, 1.0);
    /// Material standard curve, also the leading mask vertices' curve
    pub const STANDARD: Self = Self::new(0.4, 0.0, 0.2, 1.0);
    pub const DECELERATE: Self = Self::new(0.0, 0.0, 0.2, 1.0);
    pub const ACCELERATE: Self = Self::new(0.4, 0.0, 1.0, 1.0);
    pub const SMOOTH: Self = Self::new(0.22, 1.0, 0.36, 1.0);
    /// Trailing mask vertices' curve
    pub const TRAILING: Self = Self::new(0.45, 0.0, 0.25, 1.0);

    /// Build a curve without validation; prefer `try_new` for untrusted input
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a curve, rejecting X control points outside `[0, 1]`
    ///
    /// X outside that range makes the curve non-monotonic in time.
    pub fn try_new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        let finite = [x1, y1, x2, y2].iter().all(|v| v.is_finite());
        if !finite || !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(Error::InvalidEasing(format!(
                "cubic-bezier({}, {}, {}, {})",
                x1, y1, x2, y2
            )));
        }
        Ok(Self::new(x1, y1, x2, y2))
    }

    pub fn control_points(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Eased value at linear progress `x`
    ///
    /// Progress at or beyond the ends returns exactly 0 or 1.
    pub fn solve(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let x_axis = Axis::new(self.x1, self.x2);
        let y_axis = Axis::new(self.y1, self.y2);
        y_axis.sample(Self::solve_t(&x_axis, x))
    }

    /// Find `t` with `x_axis(t) == x`: Newton-Raphson first, bisection if it stalls
    fn solve_t(x_axis: &Axis, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let error = x_axis.sample(t) - x;
            if error.abs() < EPSILON {
                return t;
            }
            let slope = x_axis.derivative(t);
            if slope.abs() < EPSILON {
                break;
            }
            t -= error / slope;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        t = x;
        for _ in 0..BISECTION_ITERATIONS {
            let sampled = x_axis.sample(t);
            if (sampled - x).abs() < EPSILON {
                break;
            }
            if x > sampled {
                lo = t;
            } else {
                hi = t;
            }
            t = lo + (hi - lo) * 0.5;
        }
        t
    }
}

impl TryFrom<[f64; 4]> for CubicBezier {
    type Error = Error;

    fn try_from(points: [f64; 4]) -> Result<Self> {
        Self::try_new(points[0], points[1], points[2], points[3])
    }
}

impl From<CubicBezier> for [f64; 4] {
    fn from(curve: CubicBezier) -> Self {
        curve.control_points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESETS: [CubicBezier; 6] = [
        CubicBezier::EASE,
        CubicBezier::STANDARD,
        CubicBezier::DECELERATE,
        CubicBezier::ACCELERATE,
        CubicBezier::SMOOTH,
        CubicBezier::TRAILING,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for curve in PRESETS {
            assert_eq!(curve.solve(0.0), 0.0, "{:?} at 0", curve);
            assert_eq!(curve.solve(1.0), 1.0, "{:?} at 1", curve);
            assert_eq!(curve.solve(-0.5), 0.0);
            assert_eq!(curve.solve(1.5), 1.0);
        }
    }

    #[test]
    fn test_ease_midpoint() {
        let mid = CubicBezier::EASE.solve(0.5);
        assert!(mid > 0.0 && mid < 1.0);
        // Reference value for CSS `ease` at 50%
        assert!((mid - 0.8024).abs() < 1e-3, "ease(0.5) = {}", mid);
    }

    #[test]
    fn test_linear_curve_is_identity() {
        let linear = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
        for i in 1..10 {
            let x = i as f64 / 10.0;
            assert!((linear.solve(x) - x).abs() < 1e-5);
        }
    }

    #[test]
    fn test_monotonic_for_monotonic_y() {
        for curve in [CubicBezier::STANDARD, CubicBezier::TRAILING, CubicBezier::EASE] {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = curve.solve(i as f64 / 100.0);
                assert!(v + 1e-7 >= prev, "{:?} not monotonic at {}", curve, i);
                prev = v;
            }
        }
    }

    #[test]
    fn test_flat_start_falls_back_to_bisection() {
        // X(t) = t^3 is flat at the origin; Newton overshoots and bisection takes over.
        let curve = CubicBezier::new(0.0, 0.0, 0.0, 1.0);
        let x = 0.001;
        let y = curve.solve(x);
        assert!((0.0..=1.0).contains(&y));
    }

    #[test]
    fn test_try_new_rejects_out_of_range_x() {
        assert!(CubicBezier::try_new(1.2, 0.0, 0.2, 1.0).is_err());
        assert!(CubicBezier::try_new(0.2, 0.0, -0.1, 1.0).is_err());
        assert!(CubicBezier::try_new(0.2, f64::NAN, 0.3, 1.0).is_err());
        // Y may overshoot
        assert!(CubicBezier::try_new(0.2, -0.5, 0.3, 1.5).is_ok());
    }
}
