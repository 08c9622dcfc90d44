//! Configuration for remote access and delivery pacing.

use std::time::Duration;

/// Configuration for talking to the server.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Server base URL.
    pub server_url: String,
    /// Static API key sent with every request, if any.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Timeout for the liveness probe.
    pub probe_timeout: Duration,
    /// Pacing of outbound delivery retries.
    pub retry: RetryConfig,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_key: None,
            timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(1),
            retry: RetryConfig::default(),
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the liveness probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

/// Pacing for repeated delivery attempts made by the caller.
///
/// The outbound queue never sleeps on its own; this only shapes how often
/// [`OutboundQueue::drain_paced`](crate::OutboundQueue::drain_paced) tries
/// again after consecutive failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Consecutive failed attempts before giving up for this round.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub initial_delay: Duration,
    /// Upper bound on any delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Creates a new retry configuration.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    /// Creates a configuration that stops after the first failure.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay after `failures` consecutive failures.
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let base_delay = self.initial_delay.as_secs_f64()
            * self
                .backoff_multiplier
                .powi(failures.saturating_sub(1).min(i32::MAX as u32) as i32);

        // `min` also maps NaN to the cap; negative products clamp to zero.
        let capped = base_delay.min(self.max_delay.as_secs_f64()).max(0.0);
        Duration::from_secs_f64(capped)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_config_builder() {
        let config = SyncConfig::new("https://central.example.com")
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.server_url, "https://central.example.com");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
    }

    #[test]
    fn retry_config_no_retry() {
        let config = RetryConfig::no_retry();
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.delay_for_attempt(1), Duration::ZERO);
    }

    #[test]
    fn retry_delay_calculation() {
        let config = RetryConfig::new(5)
            .with_initial_delay(Duration::from_millis(100))
            .with_backoff_multiplier(2.0);

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn retry_delay_respects_max() {
        let config = RetryConfig::new(10)
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_backoff_multiplier(10.0);

        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(5));
    }

    #[test]
    fn retry_delay_with_degenerate_multiplier() {
        let negative = RetryConfig::new(5)
            .with_initial_delay(Duration::from_secs(1))
            .with_backoff_multiplier(-2.0);
        assert_eq!(negative.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(negative.delay_for_attempt(2), Duration::ZERO);
        assert_eq!(negative.delay_for_attempt(3), Duration::from_secs(4));

        let nan = RetryConfig::new(5)
            .with_max_delay(Duration::from_secs(7))
            .with_backoff_multiplier(f64::NAN);
        assert_eq!(nan.delay_for_attempt(2), Duration::from_secs(7));
    }
}
