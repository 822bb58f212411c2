//! Fixed-interval polling with an optional timeout

use std::time::Duration;

use crate::error::{Result, SpmError};

/// Blocks the calling thread between polls
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How often to poll and when to give up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Zero waits forever
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn from_secs(interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.timeout.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Done(T),
    TimedOut { elapsed: Duration, polls: u32 },
}

/// Sleep, check, repeat until `check` yields a value or the timeout passes.
///
/// Elapsed time is the sum of the configured intervals, not wall-clock
/// time, and is compared after each unsuccessful check: with a 5s interval
/// and a 12s timeout the third check (elapsed 15s) is the last. Errors from
/// `check` end polling immediately.
///
/// A zero interval with a bounded timeout could never time out and is
/// rejected before the first check.
pub fn poll_until<T>(
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
    mut check: impl FnMut() -> Result<Option<T>>,
) -> Result<PollOutcome<T>> {
    if policy.interval.is_zero() && !policy.is_unbounded() {
        return Err(SpmError::InvalidPollInterval);
    }
    let mut elapsed = Duration::ZERO;
    let mut polls: u32 = 0;
    loop {
        sleeper.sleep(policy.interval);
        polls = polls.saturating_add(1);
        if let Some(value) = check()? {
            return Ok(PollOutcome::Done(value));
        }
        if !policy.is_unbounded() {
            elapsed += policy.interval;
            if elapsed > policy.timeout {
                return Ok(PollOutcome::TimedOut { elapsed, polls });
            }
        }
    }
}
