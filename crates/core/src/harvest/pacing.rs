use std::time::Duration;

/// Inter-product pacing policy, a seam so the adaptive policy can be swapped
/// (e.g. for a token bucket) without touching selection or harvesting.
pub trait RateLimiter: Send + Sync {
    /// Delay to apply before the next product, given the batch so far.
    fn next_delay(&self, products_attempted: usize, products_succeeded: usize) -> Duration;
}

/// Adaptive pacing on the rolling success rate: a healthy source is polled
/// faster, a struggling one is backed off to respect rate limits and cost.
#[derive(Debug, Clone)]
pub struct AdaptiveDelay {
    pub fast: Duration,
    pub medium: Duration,
    pub slow: Duration,
}

impl Default for AdaptiveDelay {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(1200),
            medium: Duration::from_millis(1800),
            slow: Duration::from_millis(2500),
        }
    }
}

impl RateLimiter for AdaptiveDelay {
    fn next_delay(&self, products_attempted: usize, products_succeeded: usize) -> Duration {
        if products_attempted == 0 {
            return self.fast;
        }
        let rate = products_succeeded as f64 / products_attempted as f64;
        if rate > 0.7 {
            self.fast
        } else if rate > 0.4 {
            self.medium
        } else {
            self.slow
        }
    }
}

/// No pacing at all; for tests and local dry runs against fakes.
#[derive(Debug, Clone, Default)]
pub struct NoDelay;

impl RateLimiter for NoDelay {
    fn next_delay(&self, _products_attempted: usize, _products_succeeded: usize) -> Duration {
        Duration::ZERO
    }
}
