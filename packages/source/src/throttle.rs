//! Global request spacing for the public Overpass instance.

use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};

/// Delay between request starts when none is configured.
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Enforces a minimum interval between consecutive request starts.
///
/// Callers that share one throttle are serialized through it, so the
/// interval holds across every query of a run.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Mutex::const_new(None),
        }
    }

    #[must_use]
    pub const fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// The configured minimum interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request may start, then records the start.
    pub async fn wait(&self) {
        let mut last_start = self.last_start.lock().await;

        if let Some(previous) = *last_start {
            let ready_at = previous + self.interval;
            if ready_at > Instant::now() {
                log::trace!("Throttling for {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_start = Some(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DELAY_MS)
    }
}
