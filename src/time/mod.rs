//! Sleep scheduling
//!
//! Low-power suspension is a capability the protocol consumes, not something
//! it implements: a node computes how long its next inactive window lasts and
//! hands the duration to a [`SleepCapability`]. Under a paused tokio clock the
//! suspensions resolve in virtual time, so tests fast-forward instead of
//! sleeping for real.

use std::future::Future;
use std::time::Duration;

/// Suspends execution for a requested duration, then resumes
///
/// Once entered, a sleep runs to completion; the protocol never cancels one.
pub trait SleepCapability {
    /// Suspends the caller for the requested duration
    fn sleep_for(&mut self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Timer-backed sleeper used on a live node
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerSleep;

impl SleepCapability for TimerSleep {
    fn sleep_for(&mut self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Sleeper that records every requested duration before suspending
///
/// Lets a test harness assert the exact sleep windows a node computed.
#[derive(Debug, Default)]
pub struct RecordingSleep {
    pub slept: Vec<Duration>,
}

impl RecordingSleep {
    /// Creates an empty recording sleeper
    pub fn new() -> Self {
        RecordingSleep { slept: Vec::new() }
    }
}

impl SleepCapability for RecordingSleep {
    fn sleep_for(&mut self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.slept.push(duration);
        tokio::time::sleep(duration)
    }
}
