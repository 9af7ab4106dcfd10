//! L4 Atomic Layer: Time and interpolation helpers
//!
//! All times are milliseconds on the frame clock's timeline.

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Clamp a value into `[min, max]`
///
/// Unlike `f64::clamp` this never panics when `min > max`; the lower bound wins.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Map a value from one range onto another
#[inline]
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    if in_max == in_min {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Linear progress (0.0 to 1.0) of `elapsed` over `duration`
///
/// Negative elapsed time counts as not started; a zero duration is complete.
#[inline]
pub fn progress(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed.max(0.0) / duration).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(50.0, 0.0, 1.0) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_clamp_inverted_bounds() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(3.0, 4.0, 2.0), 4.0);
    }

    #[test]
    fn test_map_range() {
        assert!((map_range(150.0, 0.0, 300.0, 0.0, 1.0) - 0.5).abs() < 1e-9);
        assert_eq!(map_range(7.0, 1.0, 1.0, 2.0, 3.0), 2.0);
    }

    #[test]
    fn test_progress_bounds() {
        assert_eq!(progress(-20.0, 400.0), 0.0);
        assert_eq!(progress(200.0, 400.0), 0.5);
        assert_eq!(progress(900.0, 400.0), 1.0);
        assert_eq!(progress(0.0, 0.0), 1.0);
    }
}
