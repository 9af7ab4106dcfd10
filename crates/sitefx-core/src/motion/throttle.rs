//! L4 Atomic Layer: Leading-edge throttle on caller-supplied timestamps

/// Lets one call through, then rejects calls until `limit_ms` has passed
#[derive(Debug, Clone)]
pub struct Throttle {
    limit_ms: f64,
    last_fired: Option<f64>,
}

impl Throttle {
    pub fn new(limit_ms: f64) -> Self {
        Self {
            limit_ms,
            last_fired: None,
        }
    }

    /// Returns true if the caller should run now, and records the firing
    pub fn ready(&mut self, now: f64) -> bool {
        match self.last_fired {
            Some(last) if now - last < self.limit_ms => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_window() {
        let mut throttle = Throttle::new(16.0);
        assert!(throttle.ready(0.0));
        assert!(!throttle.ready(8.0));
        assert!(!throttle.ready(15.9));
        assert!(throttle.ready(16.0));
        assert!(!throttle.ready(20.0));
    }

    #[test]
    fn test_reset_reopens() {
        let mut throttle = Throttle::new(100.0);
        assert!(throttle.ready(0.0));
        throttle.reset();
        assert!(throttle.ready(1.0));
    }
}
