//! Elapsed-time measurement for instrumenting batch steps.

use std::time::{Duration, Instant};

/// A monotonic stopwatch, running from the moment it is constructed.
#[derive(Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Elapsed time since the start (or the previous lap), restarting the
    /// watch.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now - self.start;
        self.start = now;
        elapsed
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Stopwatch::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwatch_measures_elapsed_time() {
        let watch = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(watch.elapsed() >= Duration::from_millis(5));
        assert!(watch.elapsed_millis() >= 5);
    }

    #[test]
    fn test_lap_restarts_the_watch() {
        let mut watch = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(5));
        let first = watch.lap();
        assert!(first >= Duration::from_millis(5));
        assert!(watch.elapsed() < first);
    }
}
