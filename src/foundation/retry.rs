//! Bounded retry with backoff.
//!
//! Only transient I/O (image fetch/decode) goes through here; scene generation and encoding
//! are never retried.

use std::time::Duration;

use tracing::warn;

/// Delay schedule between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Backoff {
    /// `base * attempt` after the n-th failed attempt (1-based).
    Linear { base_ms: u64 },
    /// `base * 2^(attempt-1)`, capped at `max_ms`.
    Exponential { base_ms: u64, max_ms: u64 },
}

impl Backoff {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let ms = match self {
            Backoff::Linear { base_ms } => base_ms.saturating_mul(u64::from(attempt)),
            Backoff::Exponential { base_ms, max_ms } => {
                let shift = (attempt - 1).min(32);
                base_ms.saturating_mul(1u64 << shift).min(max_ms)
            }
        };
        Duration::from_millis(ms)
    }
}

/// How many times to try and how long to wait in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Must be at least 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Linear { base_ms: 1000 },
        }
    }
}

impl RetryPolicy {
    /// Policy with no waiting, mostly useful in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear { base_ms: 0 },
        }
    }
}

/// Returned when every attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Attempts actually made.
    pub attempts: u32,
    /// Error of the final attempt.
    pub last: E,
}

/// Run `op` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. The delay is only slept between attempts, never
/// after the last one.
pub fn retry_with_backoff<T, E, F>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, Exhausted<E>>
where
    E: std::fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) if attempt >= max_attempts => {
                return Err(Exhausted {
                    attempts: attempt,
                    last: e,
                });
            }
            Err(e) => {
                let delay = policy.backoff.delay_after(attempt);
                warn!(
                    target: "slidereel::retry",
                    label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "attempt failed, retrying: {e}"
                );
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/retry.rs"]
mod tests;
