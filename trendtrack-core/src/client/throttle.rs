//! Fixed-interval request throttle.
//!
//! The source penalizes rapid querying, so the pipeline inserts a minimum
//! delay between successive fetches. Fixed delay only — no backoff and no
//! adaptivity; a rejected request is a skip, not a reschedule.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Enforces a minimum interval between successive calls.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Create a throttle with the given minimum interval between calls.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// A throttle that never waits (single-shot modes with few items).
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until at least the minimum interval has passed since the
    /// previous `wait` returned, then stamp the current instant.
    ///
    /// The first call never blocks.
    pub fn wait(&self) {
        let mut last = self.last_call.lock().unwrap();
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}
