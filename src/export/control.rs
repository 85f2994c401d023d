use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::foundation::error::{ReelError, ReelResult};

/// Cooperative cancellation flag shared between an export and whoever may stop it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> ReelResult<()> {
        if self.is_cancelled() {
            Err(ReelError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// How often the frame loop stops to report progress, check for cancellation and yield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldPolicy {
    /// After every `n` rendered frames.
    EveryFrames(u32),
    /// Whenever at least this much wall time passed since the last yield point.
    EveryInterval(#[serde(with = "millis")] Duration),
}

impl Default for YieldPolicy {
    fn default() -> Self {
        Self::EveryFrames(8)
    }
}

impl YieldPolicy {
    pub fn validate(self) -> ReelResult<()> {
        match self {
            Self::EveryFrames(0) => Err(ReelError::validation(
                "yield policy must yield at least every frame (got every 0 frames)",
            )),
            Self::EveryInterval(d) if d.is_zero() => Err(ReelError::validation(
                "yield interval must be greater than zero",
            )),
            _ => Ok(()),
        }
    }
}

mod millis {
    use std::time::Duration;

    pub(super) fn serialize<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = <u64 as serde::Deserialize>::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

/// Decides when the frame loop reaches a yield point.
#[derive(Debug)]
pub(crate) struct YieldClock {
    policy: YieldPolicy,
    last: Instant,
}

impl YieldClock {
    pub(crate) fn new(policy: YieldPolicy) -> Self {
        Self {
            policy,
            last: Instant::now(),
        }
    }

    /// `frames_done` counts frames rendered so far (1-based after the first frame).
    pub(crate) fn due(&mut self, frames_done: u64) -> bool {
        match self.policy {
            YieldPolicy::EveryFrames(n) => frames_done.is_multiple_of(u64::from(n.max(1))),
            YieldPolicy::EveryInterval(every) => {
                let now = Instant::now();
                if now.duration_since(self.last) >= every {
                    self.last = now;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Holds an exporter's busy flag for the lifetime of one export.
#[derive(Debug)]
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> ReelResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ReelError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/control.rs"]
mod tests;
