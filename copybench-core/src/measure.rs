//! Wall-Clock Timing
//!
//! A trial spans a whole child process lifetime and is timed with the
//! monotonic `std::time::Instant`.

use std::time::{Duration, Instant};

/// Timer for measuring one trial
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time since start; monotonic, never negative
    #[inline(always)]
    pub fn stop(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.stop();

        // Should be at least 10ms
        assert!(elapsed >= Duration::from_millis(10));
        // Generous upper bound for loaded CI machines
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_timer_monotonic() {
        let timer = Timer::start();
        let a = timer.stop();
        let b = timer.stop();
        assert!(b >= a);
    }
}
