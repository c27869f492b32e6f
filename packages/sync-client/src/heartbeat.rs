//! Liveness detection for an open connection
//!
//! The client pings on a fixed cadence and expects a pong within a
//! deadline. [`HeartbeatMonitor`] tracks the outstanding ping and the
//! deadline; the connection actor owns the actual timers and closes the
//! socket when a deadline passes unanswered. Keeping the state machine
//! free of timer handles makes the missed-pong and unsolicited-pong
//! cases unit testable without a runtime.

use std::time::{Duration, Instant};

/// How often the client pings an open connection
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// How long a ping may stay unanswered before the connection is
/// considered dead
pub const PONG_TIMEOUT: Duration = Duration::from_secs(5);

/// Tracks the single in-flight ping on one connection
///
/// At most one ping is outstanding at a time: while a ping awaits its
/// pong, [`arm_ping`](HeartbeatMonitor::arm_ping) refuses to arm another
/// one, so a server answering late is never asked to answer twice over.
#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    pong_timeout: Duration,
    outstanding_since: Option<Instant>,
    last_pong: Option<Instant>,
}

impl HeartbeatMonitor {
    /// Create a monitor with no ping outstanding
    pub fn new(pong_timeout: Duration) -> Self {
        Self {
            pong_timeout,
            outstanding_since: None,
            last_pong: None,
        }
    }

    /// Record that a ping is about to be sent
    ///
    /// Returns the deadline by which the pong must arrive, or `None` if a
    /// ping is already outstanding, in which case the caller must not
    /// send another.
    pub fn arm_ping(&mut self, now: Instant) -> Option<Instant> {
        if self.outstanding_since.is_some() {
            return None;
        }
        self.outstanding_since = Some(now);
        Some(now + self.pong_timeout)
    }

    /// Record an incoming pong
    ///
    /// Returns `true` if it answered the outstanding ping. An unsolicited
    /// pong returns `false` and changes nothing.
    pub fn pong_received(&mut self, now: Instant) -> bool {
        if self.outstanding_since.take().is_some() {
            self.last_pong = Some(now);
            true
        } else {
            false
        }
    }

    /// Whether a ping is awaiting its pong
    pub fn has_outstanding_ping(&self) -> bool {
        self.outstanding_since.is_some()
    }

    /// When the most recent pong arrived, if any has
    pub fn last_pong(&self) -> Option<Instant> {
        self.last_pong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_ping_returns_deadline() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_secs(5));
        let now = Instant::now();

        let deadline = monitor.arm_ping(now);
        assert_eq!(deadline, Some(now + Duration::from_secs(5)));
        assert!(monitor.has_outstanding_ping());
    }

    #[test]
    fn test_only_one_ping_outstanding() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_secs(5));
        let now = Instant::now();

        assert!(monitor.arm_ping(now).is_some());
        assert_eq!(monitor.arm_ping(now + Duration::from_secs(1)), None);
        assert_eq!(monitor.arm_ping(now + Duration::from_secs(2)), None);
    }

    #[test]
    fn test_pong_clears_outstanding_ping() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_secs(5));
        let now = Instant::now();
        monitor.arm_ping(now);

        let answered = monitor.pong_received(now + Duration::from_secs(1));
        assert!(answered);
        assert!(!monitor.has_outstanding_ping());
        assert_eq!(monitor.last_pong(), Some(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_pong_allows_next_ping() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_secs(5));
        let now = Instant::now();

        monitor.arm_ping(now);
        monitor.pong_received(now + Duration::from_secs(1));

        let next = now + Duration::from_secs(10);
        assert_eq!(monitor.arm_ping(next), Some(next + Duration::from_secs(5)));
    }

    #[test]
    fn test_unsolicited_pong_is_ignored() {
        let mut monitor = HeartbeatMonitor::new(Duration::from_secs(5));
        let now = Instant::now();

        assert!(!monitor.pong_received(now));
        assert_eq!(monitor.last_pong(), None);

        // A second pong after the first one already answered is
        // unsolicited too.
        monitor.arm_ping(now);
        monitor.pong_received(now + Duration::from_secs(1));
        assert!(!monitor.pong_received(now + Duration::from_secs(2)));
        assert_eq!(monitor.last_pong(), Some(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_outstanding_ping_survives_past_deadline() {
        // The monitor records state; the connection actor decides when
        // the deadline has passed. An expired ping stays outstanding
        // until the actor acts on it.
        let mut monitor = HeartbeatMonitor::new(Duration::from_secs(5));
        let now = Instant::now();

        monitor.arm_ping(now);
        assert!(monitor.has_outstanding_ping());
    }
}
