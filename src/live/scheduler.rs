use std::time::{Duration, Instant};

/// Cadence of a cooperative refresh cycle.
///
/// The scheduler does not run anything itself. The render loop asks whether a cycle is due, runs
/// it, and reports completion. The interval is measured from the end of one cycle to the start of
/// the next, so a slow fetch can never cause two cycles to overlap or run back to back.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval: Duration,
    last_completed: Option<Instant>,
    cancelled: bool,
}

impl RefreshScheduler {
    /// A new scheduler starts cancelled, call [`RefreshScheduler::start`] to arm it.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_completed: None,
            cancelled: true,
        }
    }

    /// Arm the scheduler. The first cycle is due one interval after `now`.
    pub fn start(&mut self, now: Instant) {
        self.cancelled = false;
        self.last_completed = Some(now);
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.last_completed = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.cancelled && self.time_until_due(now) == Some(Duration::ZERO)
    }

    pub fn mark_completed(&mut self, at: Instant) {
        self.last_completed = Some(at);
    }

    /// Time left before the next cycle is due, `None` when cancelled.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.cancelled {
            return None;
        }
        match self.last_completed {
            Some(last) => Some(
                self.interval
                    .saturating_sub(now.saturating_duration_since(last)),
            ),
            None => Some(Duration::ZERO),
        }
    }
}
