//! Rate limiter for polite scraping.

use crate::config::ScrapeConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Enforces a concurrency cap and a minimum delay between requests.
///
/// The pipeline itself is sequential, but fetches may be parallelized later;
/// the semaphore keeps that extension safe without touching call sites.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    min_delay: Duration,
    last_request: tokio::sync::Mutex<Instant>,
}

impl RateLimiter {
    /// - `max_concurrent`: maximum in-flight requests
    /// - `min_delay_ms`: minimum milliseconds between request starts
    pub fn new(max_concurrent: usize, min_delay_ms: u64) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            min_delay: Duration::from_millis(min_delay_ms),
            last_request: tokio::sync::Mutex::new(Instant::now()),
        }
    }

    /// Build a limiter for a sequential scrape run.
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(1, config.min_delay_ms)
    }

    /// Acquire permission to make a request. Waits until the rate limit
    /// allows.
    pub async fn acquire(&self) -> RateLimitGuard {
        // The semaphore is never closed, so acquire cannot fail.
        let permit = self.semaphore.clone().acquire_owned().await.unwrap();

        {
            let mut last = self.last_request.lock().await;
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                tokio::time::sleep(self.min_delay - elapsed).await;
            }
            *last = Instant::now();
        }

        RateLimitGuard { _permit: permit }
    }
}

/// Releases the concurrency permit when dropped.
pub struct RateLimitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
