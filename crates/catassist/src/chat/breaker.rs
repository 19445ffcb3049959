//! Guards the completion API after repeated upstream failures.
//!
//! Once `threshold` consecutive retryable failures are seen, calls are refused
//! for `cooldown`. After the cooldown one trial call is let through: success
//! closes the breaker, another failure reopens it straight away.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::AssistantError;

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trips: u64,
}

pub struct UpstreamBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    cooldown: Duration,
}

/// Snapshot of the breaker for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerStats {
    pub open: bool,
    pub consecutive_failures: u32,
    pub trips: u64,
    pub retry_after_secs: u64,
}

impl UpstreamBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: threshold.max(1),
            cooldown,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remaining(&self, state: &BreakerState) -> Option<Duration> {
        let opened_at = state.opened_at?;
        self.cooldown
            .checked_sub(opened_at.elapsed())
            .filter(|left| !left.is_zero())
    }

    /// Refuses the call while the breaker is open.
    pub fn check(&self) -> Result<(), AssistantError> {
        match self.remaining(&self.lock()) {
            Some(left) => Err(AssistantError::CircuitBreakerOpen {
                retry_after_secs: left.as_secs().max(1),
            }),
            None => Ok(()),
        }
    }

    /// Records the outcome of a call. Only retryable errors count as failures.
    pub fn record<T>(&self, outcome: &Result<T, AssistantError>) {
        let mut state = self.lock();
        match outcome {
            Ok(_) => {
                state.consecutive_failures = 0;
                state.opened_at = None;
            }
            Err(e) if e.is_retryable() => {
                state.consecutive_failures += 1;
                if state.consecutive_failures >= self.threshold {
                    state.opened_at = Some(Instant::now());
                    state.trips += 1;
                }
            }
            Err(_) => {}
        }
    }

    pub fn stats(&self) -> BreakerStats {
        let state = self.lock();
        let remaining = self.remaining(&state);

        BreakerStats {
            open: remaining.is_some(),
            consecutive_failures: state.consecutive_failures,
            trips: state.trips,
            retry_after_secs: remaining.map(|d| d.as_secs().max(1)).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_failure() -> Result<(), AssistantError> {
        Err(AssistantError::UnexpectedResponse {
            message: "status 500".into(),
        })
    }

    #[test]
    fn test_opens_after_consecutive_failures() {
        let breaker = UpstreamBreaker::new(3, Duration::from_secs(60));

        for _ in 0..2 {
            breaker.record(&upstream_failure());
            assert!(breaker.check().is_ok());
        }
        breaker.record(&upstream_failure());

        let err = breaker.check().unwrap_err();
        assert!(matches!(
            err,
            AssistantError::CircuitBreakerOpen { retry_after_secs } if retry_after_secs > 0
        ));

        let stats = breaker.stats();
        assert!(stats.open);
        assert_eq!(stats.consecutive_failures, 3);
        assert_eq!(stats.trips, 1);
    }

    #[test]
    fn test_success_resets_failure_run() {
        let breaker = UpstreamBreaker::new(2, Duration::from_secs(60));

        breaker.record(&upstream_failure());
        breaker.record(&Ok::<_, AssistantError>(()));
        breaker.record(&upstream_failure());

        assert!(breaker.check().is_ok());
        assert_eq!(breaker.stats().consecutive_failures, 1);
    }

    #[test]
    fn test_caller_errors_are_not_counted() {
        let breaker = UpstreamBreaker::new(1, Duration::from_secs(60));

        breaker.record(&Err::<(), _>(AssistantError::InvalidRequest {
            message: "empty".into(),
        }));
        breaker.record(&Err::<(), _>(AssistantError::NotConfigured));

        assert!(breaker.check().is_ok());
        assert_eq!(breaker.stats().consecutive_failures, 0);
    }

    #[test]
    fn test_failed_trial_reopens_immediately() {
        let breaker = UpstreamBreaker::new(2, Duration::ZERO);

        breaker.record(&upstream_failure());
        breaker.record(&upstream_failure());
        // Zero cooldown: the trial call is allowed right away
        assert!(breaker.check().is_ok());

        breaker.record(&upstream_failure());
        let stats = breaker.stats();
        assert_eq!(stats.trips, 2);
        assert_eq!(stats.consecutive_failures, 3);

        breaker.record(&Ok::<_, AssistantError>(()));
        let stats = breaker.stats();
        assert!(!stats.open);
        assert_eq!(stats.consecutive_failures, 0);
        assert_eq!(stats.trips, 2);
    }
}
