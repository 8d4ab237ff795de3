use std::time::Duration;

use crate::MetaError;

/// What to do after a failed generation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait this long, then try again
    Retry(Duration),
    /// Stop and report failure
    GiveUp,
}

/// Backoff schedule for generation attempts.
///
/// Delays are expressed in `unit`s: rate limiting waits `2^attempt * 2` units, any
/// other service failure waits one unit, an unparseable answer is retried at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    unit: Duration,
}

impl RetryPolicy {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// No waiting at all; for tests and dry runs
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Decide how to continue after `failure` on the zero-based `attempt`
    pub fn decide(&self, failure: &MetaError, attempt: u32, max_retries: u32) -> RetryDecision {
        let is_last = attempt + 1 >= max_retries;
        if is_last {
            return RetryDecision::GiveUp;
        }

        match failure {
            MetaError::RateLimited(_) => {
                let factor = 2u32.saturating_pow(attempt).saturating_mul(2);
                RetryDecision::Retry(self.unit.saturating_mul(factor))
            }
            MetaError::GenerationFailed(_) => RetryDecision::Retry(self.unit),
            MetaError::ParseFailed(_) => RetryDecision::Retry(Duration::ZERO),
            _ => RetryDecision::GiveUp,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited() -> MetaError {
        MetaError::RateLimited("429".to_string())
    }

    #[test]
    fn test_rate_limit_backoff_is_exponential() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.decide(&rate_limited(), 0, 5),
            RetryDecision::Retry(Duration::from_secs(2))
        );
        assert_eq!(
            policy.decide(&rate_limited(), 1, 5),
            RetryDecision::Retry(Duration::from_secs(4))
        );
        assert_eq!(
            policy.decide(&rate_limited(), 3, 5),
            RetryDecision::Retry(Duration::from_secs(16))
        );
    }

    #[test]
    fn test_last_attempt_always_gives_up() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.decide(&rate_limited(), 2, 3), RetryDecision::GiveUp);
        assert_eq!(
            policy.decide(&MetaError::GenerationFailed("boom".into()), 2, 3),
            RetryDecision::GiveUp
        );
        assert_eq!(
            policy.decide(&MetaError::ParseFailed("junk".into()), 0, 1),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_other_failures_wait_one_unit() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(&MetaError::GenerationFailed("500".into()), 0, 3),
            RetryDecision::Retry(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_parse_failures_retry_without_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(&MetaError::ParseFailed("junk".into()), 1, 3),
            RetryDecision::Retry(Duration::ZERO)
        );
    }

    #[test]
    fn test_non_generation_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(&MetaError::Config("bad".into()), 0, 3),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_immediate_policy_never_sleeps() {
        let policy = RetryPolicy::immediate();
        assert_eq!(
            policy.decide(&rate_limited(), 1, 3),
            RetryDecision::Retry(Duration::ZERO)
        );
    }
}
