//! Capped exponential backoff for status polling.

use std::time::Duration;

/// Delay schedule between successive status queries.
///
/// Immutable once a poll sequence starts. The cap is deliberately not
/// optional: an uncapped schedule doubles into multi-hour sleeps on a
/// slow job. Delays are deterministic, so the sequence strictly
/// increases until it holds at the cap.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffSchedule {
    /// Delay before the first query.
    pub initial_delay: Duration,
    /// Factor applied after each non-terminal reply.
    pub multiplier: f64,
    /// Ceiling for the delay between queries.
    pub max_delay: Duration,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl BackoffSchedule {
    /// Calculates the delay before a given attempt number (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exp);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}
