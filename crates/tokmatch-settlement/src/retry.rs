//! Bounded retry with exponential backoff for settlement calls.
//!
//! Mirrors the platform's on-chain transaction policy: a small retry
//! budget, backoff doubling per attempt, capped at a ceiling. The policy
//! controls pacing only; whether an attempt runs at all is the worker's
//! decision.

use std::time::Duration;

use tokmatch_types::SettlementConfig;

/// Pacing for settlement retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first. Zero means one attempt total.
    pub max_retries: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
    /// Multiplier applied per attempt.
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Build a policy from the engine's settlement configuration.
    #[must_use]
    pub fn from_config(config: &SettlementConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            backoff_factor: config.backoff_factor,
        }
    }

    /// Backoff to wait after a failed attempt (0-based), exponentially
    /// increased and capped at `max_backoff`.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt.min(i32::MAX as u32) as i32);
        let backoff = self.initial_backoff.as_secs_f64() * factor;
        Duration::from_secs_f64(backoff.min(self.max_backoff.as_secs_f64()))
    }

    /// Total number of attempts this policy allows.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SettlementConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            backoff_factor: 2.0,
        };
        assert_eq!(policy.backoff_for(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(4));
    }

    #[test]
    fn backoff_caps_at_ceiling() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            backoff_factor: 2.0,
        };
        assert_eq!(policy.backoff_for(9), Duration::from_secs(30));
        assert_eq!(policy.backoff_for(20), Duration::from_secs(30));
    }

    #[test]
    fn defaults_come_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_backoff, Duration::from_secs(1));
        assert_eq!(policy.max_backoff, Duration::from_secs(30));
        assert_eq!(policy.total_attempts(), 4);
    }
}
