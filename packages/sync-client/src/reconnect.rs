//! Reconnect scheduling for a lost or failed connection
//!
//! Every reconnect waits the same fixed delay; the server is on the
//! local network and either comes back quickly or the user gives up.
//! The scheduler only decides *when* the next attempt may start. The
//! connection actor owns the sleep and the attempt itself, and the
//! several paths that notice a dead connection all funnel into
//! [`connection_lost`](ReconnectScheduler::connection_lost), which
//! arms at most one pending attempt.

use std::time::{Duration, Instant};

/// How long to wait between losing a connection and redialing
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Where the scheduler is in the reconnect cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No attempt pending or running
    Idle,
    /// An attempt is armed for `until`
    Waiting { until: Instant },
    /// An attempt is connecting right now
    Attempting,
}

/// Decides when the next connection attempt may start
#[derive(Debug, Clone)]
pub struct ReconnectScheduler {
    delay: Duration,
    state: SchedulerState,
}

impl ReconnectScheduler {
    /// Create an idle scheduler with the given fixed delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: SchedulerState::Idle,
        }
    }

    /// Report a lost connection
    ///
    /// Arms an attempt for `now + delay` and returns that instant, or
    /// returns `None` when an attempt is already armed or running. Every
    /// observer of a dead connection may call this; only the first call
    /// schedules anything.
    pub fn connection_lost(&mut self, now: Instant) -> Option<Instant> {
        match self.state {
            SchedulerState::Idle => {
                let until = now + self.delay;
                self.state = SchedulerState::Waiting { until };
                Some(until)
            }
            SchedulerState::Waiting { .. } | SchedulerState::Attempting => None,
        }
    }

    /// Mark the armed attempt as started
    pub fn begin_attempt(&mut self) {
        self.state = SchedulerState::Attempting;
    }

    /// Mark the running attempt as connected; the scheduler goes idle
    /// until the connection is lost again
    pub fn attempt_succeeded(&mut self) {
        self.state = SchedulerState::Idle;
    }

    /// Mark the running attempt as failed and arm the next one
    ///
    /// Returns when the next attempt may start.
    pub fn attempt_failed(&mut self, now: Instant) -> Instant {
        let until = now + self.delay;
        self.state = SchedulerState::Waiting { until };
        until
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }
}

impl Default for ReconnectScheduler {
    fn default() -> Self {
        Self::new(RECONNECT_DELAY)
    }
}
