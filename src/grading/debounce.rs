//! Supersede-on-arrival scheduling for recomputation requests.
//!
//! Each request replaces any request still waiting, so a burst of drag steps
//! produces one recomputation once the burst has been quiet for `window`.
//! Time is passed in explicitly, which keeps the scheduler deterministic
//! under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    due: Instant,
    version: u64,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pending>,
    superseded: u64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            superseded: 0,
        }
    }

    /// Request a recomputation for `version`, replacing any waiting request.
    pub fn schedule(&mut self, now: Instant, version: u64) {
        if self.pending.is_some() {
            self.superseded += 1;
        }
        self.pending = Some(Pending {
            due: now + self.window,
            version,
        });
    }

    /// Drop the waiting request, if any. Returns whether one was waiting.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// Number of requests replaced before they ran.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    /// Take the waiting request if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<u64> {
        match self.pending {
            Some(p) if now >= p.due => {
                self.pending = None;
                Some(p.version)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_request_supersedes_older() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(50));
        d.schedule(t0, 1);
        d.schedule(t0 + Duration::from_millis(30), 2);

        // The first deadline has passed, but it was replaced.
        assert_eq!(d.take_due(t0 + Duration::from_millis(60)), None);
        assert_eq!(d.take_due(t0 + Duration::from_millis(80)), Some(2));
        assert!(!d.is_pending());
        assert_eq!(d.superseded(), 1);
    }

    #[test]
    fn cancel_clears_pending() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        assert!(!d.cancel());
        d.schedule(t0, 7);
        assert_eq!(d.deadline(), Some(t0));
        assert!(d.cancel());
        assert_eq!(d.take_due(t0), None);
    }
}
