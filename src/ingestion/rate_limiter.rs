// ============================================================================
// Rate Limiter
// ============================================================================
//
// Token bucket admission gate for outbound publishes:
// - Bucket starts full (`capacity` tokens)
// - Refills continuously at `refill_rate` tokens/second, capped at `capacity`
// - `acquire()` consumes one token, polling with a short sleep while empty
//
// State is local to one limiter instance (one per bulk submission).
// ============================================================================

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Sleep between refill checks while the bucket is empty
const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct RateLimiterState {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl RateLimiterState {
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
            self.last_refill = now;
        }
    }
}

pub struct TokenBucketLimiter {
    state: Mutex<RateLimiterState>,
    poll_interval: Duration,
}

impl TokenBucketLimiter {
    /// Create a limiter admitting `rate` acquisitions per second with bursts up
    /// to `capacity` (defaults to `rate`).
    ///
    /// `rate` must be positive. A capacity below one token would never admit
    /// anything, so it is raised to one.
    pub fn new(rate: f64, capacity: Option<f64>) -> Self {
        debug_assert!(rate > 0.0, "rate must be positive");
        let capacity = capacity.unwrap_or(rate).max(1.0);

        Self {
            state: Mutex::new(RateLimiterState {
                tokens: capacity,
                capacity,
                refill_rate: rate,
                last_refill: Instant::now(),
            }),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Wait until a token is available and consume it
    pub async fn acquire(&self) {
        while !self.try_acquire().await {
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Consume a token if one is available right now
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        state.refill(Instant::now());
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
