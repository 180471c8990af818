use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Keeps consecutive requests at least `interval` apart. Time spent between
/// calls counts towards the interval, so a slow caller is never delayed twice.
pub struct RateLimiter {
    interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            last_request: None,
        }
    }

    pub async fn wait(&mut self) {
        if let Some(next) = self.next_slot() {
            sleep_until(next).await;
        }
        self.last_request = Some(Instant::now());
    }

    pub fn reset(&mut self) {
        self.last_request = None;
    }

    fn next_slot(&self) -> Option<Instant> {
        self.last_request.map(|last| last + self.interval)
    }
}
