//! Cooperative frame clocks
//!
//! An animation awaits `next_frame()` once per frame and re-checks its
//! completion predicate, mirroring a `requestAnimationFrame` loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use async_trait::async_trait;

/// Yields once per frame and reports the frame timestamp in milliseconds
#[async_trait(?Send)]
pub trait FrameClock {
    async fn next_frame(&self) -> f64;
}

/// Wait at least `ms` milliseconds of frame time
pub async fn wait_ms<C: FrameClock + ?Sized>(clock: &C, ms: f64) -> f64 {
    let start = clock.next_frame().await;
    let mut now = start;
    while now - start < ms {
        now = clock.next_frame().await;
    }
    now
}

/// Returns `Pending` once so other tasks run between frames
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Deterministic clock that advances a fixed step per frame without sleeping
///
/// Each frame still yields to the executor once, so concurrent work
/// interleaves with animations the way it would between real frames.
#[derive(Debug)]
pub struct SteppedClock {
    step_ms: f64,
    now: Mutex<f64>,
}

impl SteppedClock {
    pub fn new(step_ms: f64) -> Self {
        Self::starting_at(0.0, step_ms)
    }

    /// A clock at the given frame rate
    pub fn at_fps(fps: u32) -> Self {
        Self::new(1000.0 / fps.max(1) as f64)
    }

    pub fn starting_at(start_ms: f64, step_ms: f64) -> Self {
        Self {
            step_ms,
            now: Mutex::new(start_ms),
        }
    }

    /// Timestamp of the most recent frame
    pub fn now(&self) -> f64 {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait(?Send)]
impl FrameClock for SteppedClock {
    async fn next_frame(&self) -> f64 {
        YieldOnce(false).await;
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += self.step_ms;
        *now
    }
}

#[cfg(feature = "native")]
pub use interval::IntervalClock;

#[cfg(feature = "native")]
mod interval {
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use tokio::time::{interval, Interval, MissedTickBehavior};

    use super::FrameClock;

    /// Wall-clock frames from a tokio interval
    pub struct IntervalClock {
        origin: Instant,
        ticker: Mutex<Interval>,
    }

    impl IntervalClock {
        /// Must be created inside a tokio runtime
        pub fn new(fps: u32) -> Self {
            let period = Duration::from_micros(1_000_000 / fps.max(1) as u64);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            Self {
                origin: Instant::now(),
                ticker: Mutex::new(ticker),
            }
        }
    }

    #[async_trait(?Send)]
    impl FrameClock for IntervalClock {
        async fn next_frame(&self) -> f64 {
            self.ticker.lock().await.tick().await;
            self.origin.elapsed().as_secs_f64() * 1000.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stepped_clock_advances() {
        let clock = SteppedClock::new(10.0);
        assert_eq!(clock.next_frame().await, 10.0);
        assert_eq!(clock.next_frame().await, 20.0);
        assert_eq!(clock.now(), 20.0);
    }

    #[tokio::test]
    async fn test_wait_ms_spans_requested_time() {
        let clock = SteppedClock::new(16.0);
        let end = wait_ms(&clock, 100.0).await;
        // first frame at 16, stops at the first frame >= 116
        assert_eq!(end, 128.0);
    }

    #[tokio::test]
    async fn test_at_fps() {
        let clock = SteppedClock::at_fps(50);
        assert_eq!(clock.next_frame().await, 20.0);
    }

    #[cfg(feature = "native")]
    #[tokio::test(start_paused = true)]
    async fn test_interval_clock_is_monotonic() {
        let clock = IntervalClock::new(60);
        let a = clock.next_frame().await;
        let b = clock.next_frame().await;
        assert!(b >= a);
    }
}
