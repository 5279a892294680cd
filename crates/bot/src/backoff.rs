//! Retry delay for failed fetches: exponential, capped, reset on success.

use std::time::Duration;

use readlater_config::BackoffConfig;

/// Exponent ceiling; beyond this every multiplier >= 2 has long hit the cap.
const MAX_EXPONENT: u32 = 64;

#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    attempts: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self {
            initial,
            max: max.max(initial),
            multiplier: if multiplier.is_finite() {
                multiplier.max(1.0)
            } else {
                1.0
            },
            attempts: 0,
        }
    }

    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_ms),
            Duration::from_millis(config.max_ms),
            config.multiplier,
        )
    }

    /// Delay before the next retry. Each call counts as one failed attempt.
    pub fn next_delay(&mut self) -> Duration {
        let exponent = self.attempts.min(MAX_EXPONENT);
        self.attempts = self.attempts.saturating_add(1);

        if self.initial.is_zero() {
            return Duration::ZERO;
        }

        let millis = self.initial.as_millis() as f64 * self.multiplier.powi(exponent as i32);
        if millis >= self.max.as_millis() as f64 {
            self.max
        } else {
            Duration::from_millis(millis as u64)
        }
    }

    /// Forget past failures.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Consecutive failures since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn grows_exponentially_then_caps() {
        let mut backoff = Backoff::new(ms(500), ms(3000), 2.0);
        let delays: Vec<_> = (0..6).map(|_| backoff.next_delay()).collect();
        assert_eq!(
            delays,
            vec![ms(500), ms(1000), ms(2000), ms(3000), ms(3000), ms(3000)]
        );
        assert_eq!(backoff.attempts(), 6);
    }

    #[test]
    fn reset_starts_over() {
        let mut backoff = Backoff::new(ms(100), ms(10_000), 3.0);
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.next_delay(), ms(900));

        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), ms(100));
    }

    #[test]
    fn zero_initial_retries_immediately() {
        let mut backoff = Backoff::new(Duration::ZERO, ms(30_000), 2.0);
        for _ in 0..100 {
            assert_eq!(backoff.next_delay(), Duration::ZERO);
        }
    }

    #[test]
    fn many_failures_stay_at_cap() {
        let mut backoff = Backoff::new(ms(1), ms(30_000), 10.0);
        for _ in 0..1000 {
            assert!(backoff.next_delay() <= ms(30_000));
        }
        assert_eq!(backoff.next_delay(), ms(30_000));
    }

    #[test]
    fn multiplier_one_is_constant() {
        let mut backoff = Backoff::new(ms(250), ms(30_000), 1.0);
        assert_eq!(backoff.next_delay(), ms(250));
        assert_eq!(backoff.next_delay(), ms(250));
    }

    #[test]
    fn from_default_config() {
        let mut backoff = Backoff::from_config(&BackoffConfig::default());
        assert_eq!(backoff.next_delay(), ms(500));
        assert_eq!(backoff.next_delay(), ms(1000));
    }
}
