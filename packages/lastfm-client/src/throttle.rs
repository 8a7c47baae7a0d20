//! Fixed minimum interval between outbound requests

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::trace;

/// Blocks the caller until at least `min_interval` has passed since the
/// previous call
///
/// The clock starts when the throttle is created, so the first request made
/// right after construction is also spaced out.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_call: Mutex<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(Instant::now()),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Sleep for whatever is left of the interval, then record this call
    ///
    /// Returns how long the caller was held back.
    pub fn wait(&self) -> Duration {
        // A poisoned lock only means another caller panicked mid-wait; the
        // stored instant is still valid.
        let mut last_call = self
            .last_call
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let elapsed = last_call.elapsed();
        let delay = self.min_interval.saturating_sub(elapsed);
        if !delay.is_zero() {
            trace!(delay_ms = delay.as_millis() as u64, "Throttling Last.fm request");
            std::thread::sleep(delay);
        }

        *last_call = Instant::now();
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_never_sleeps() {
        let throttle = Throttle::new(Duration::ZERO);
        for _ in 0..5 {
            assert_eq!(throttle.wait(), Duration::ZERO);
        }
    }

    #[test]
    fn test_first_call_is_spaced_from_construction() {
        let interval = Duration::from_millis(40);
        let throttle = Throttle::new(interval);
        let started = Instant::now();
        throttle.wait();
        assert!(started.elapsed() >= interval - Duration::from_millis(5));
    }

    #[test]
    fn test_consecutive_calls_respect_interval() {
        let interval = Duration::from_millis(30);
        let throttle = Throttle::new(interval);
        throttle.wait();

        let mut previous = Instant::now();
        for _ in 0..3 {
            throttle.wait();
            let now = Instant::now();
            // `previous` is read just after the throttle stamps its own clock
            assert!(now.duration_since(previous) >= interval - Duration::from_millis(1));
            previous = now;
        }
    }

    #[test]
    fn test_no_delay_after_interval_elapsed() {
        let interval = Duration::from_millis(10);
        let throttle = Throttle::new(interval);
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(throttle.wait(), Duration::ZERO);
    }
}
