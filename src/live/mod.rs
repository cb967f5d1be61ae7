pub mod scheduler;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::session::SessionRecord;
use crate::store::SessionStore;
use crate::telemetry::{LastSampleReadout, SessionStats};

pub use scheduler::RefreshScheduler;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_ENDED_DISPLAY: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The store reports the session with a status other than live
    Finished,
    /// The session is no longer in the store
    Vanished,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiveState {
    Idle,
    Monitoring {
        session_id: String,
    },
    Ended {
        session_id: String,
        reason: EndReason,
        ended_at: Instant,
    },
}

/// What a call to [`LiveRefreshController::poll`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Nothing is monitored
    Idle,
    /// Monitoring, but the next tick is not due yet
    NotDue,
    /// Fresh data for the live session was fetched
    Updated,
    /// The fetch failed, the last known data is still served
    FetchFailed,
    /// The monitored session stopped being live during this tick
    Ended(EndReason),
    /// Still showing the end of session notice
    ShowingEnded,
    /// The end of session notice expired and the controller went idle. The catalog no longer
    /// reflects the session correctly and should be fetched again.
    ReturnedToIdle,
}

/// Follows one live session, re-fetching only that session's record on a fixed cadence.
///
/// # States
///
/// * `Idle` - nothing monitored.
/// * `Monitoring` - every tick fetches the session directly from the store, never through the
///   catalog cache, and publishes the new record and statistics.
/// * `Ended` - the session finished or disappeared. A notice is shown for a short while before
///   going back to `Idle`. A session that ended is never monitored again.
///
/// The controller is driven by the render loop through [`LiveRefreshController::poll`]; it never
/// blocks or spawns threads of its own.
pub struct LiveRefreshController {
    store: Arc<dyn SessionStore>,
    scheduler: RefreshScheduler,
    ended_display: Duration,
    state: LiveState,
    latest: Option<SessionRecord>,
    last_error: Option<String>,
    finished: HashSet<String>,
}

impl LiveRefreshController {
    pub fn new(store: Arc<dyn SessionStore>, tick_interval: Duration, ended_display: Duration) -> Self {
        Self {
            store,
            scheduler: RefreshScheduler::new(tick_interval),
            ended_display,
            state: LiveState::Idle,
            latest: None,
            last_error: None,
            finished: HashSet::new(),
        }
    }

    /// Start monitoring `record`, the live session found in the catalog. Its catalog copy is shown
    /// until the first tick replaces it.
    ///
    /// Returns false when the record is not live or its session already ended once.
    pub fn start(&mut self, record: &SessionRecord, now: Instant) -> bool {
        if !record.is_live() {
            debug!("Not monitoring {}, session is not live", record.id);
            return false;
        }
        if self.finished.contains(&record.id) {
            debug!("Not monitoring {}, session already ended", record.id);
            return false;
        }
        if let LiveState::Monitoring { session_id } = &self.state {
            if *session_id == record.id {
                return true;
            }
            info!("Switching live monitoring from {} to {}", session_id, record.id);
        }

        info!("Monitoring live session {}", record.id);
        self.state = LiveState::Monitoring {
            session_id: record.id.clone(),
        };
        self.latest = Some(record.clone());
        self.last_error = None;
        self.scheduler.start(now);
        true
    }

    /// Stop monitoring, e.g. when the user navigates away from the live view.
    pub fn stop(&mut self) {
        if self.state != LiveState::Idle {
            debug!("Live monitoring stopped");
        }
        self.scheduler.cancel();
        self.state = LiveState::Idle;
        self.latest = None;
        self.last_error = None;
    }

    /// Run whatever is due at `now`: a refresh tick while monitoring, or the return to idle once
    /// the end of session notice has been shown long enough.
    pub fn poll(&mut self, now: Instant) -> TickOutcome {
        match &self.state {
            LiveState::Idle => TickOutcome::Idle,
            LiveState::Monitoring { session_id } => {
                if !self.scheduler.is_due(now) {
                    return TickOutcome::NotDue;
                }
                let session_id = session_id.clone();
                self.tick(session_id, now)
            }
            LiveState::Ended { ended_at, .. } => {
                if now.saturating_duration_since(*ended_at) < self.ended_display {
                    return TickOutcome::ShowingEnded;
                }
                info!("Live view closed, returning to session history");
                self.state = LiveState::Idle;
                self.latest = None;
                TickOutcome::ReturnedToIdle
            }
        }
    }

    fn tick(&mut self, session_id: String, now: Instant) -> TickOutcome {
        let fetch_started = Instant::now();
        let result = self.store.fetch_session(&session_id);
        let completed_at = now + fetch_started.elapsed();
        self.scheduler.mark_completed(completed_at);

        match result {
            Ok(Some(raw)) => {
                let record = SessionRecord::from_raw(&session_id, raw);
                let still_live = record.is_live();
                debug!(
                    "Live tick for {}: {} samples",
                    session_id,
                    record.telemetry.as_ref().map_or(0, |t| t.len())
                );
                self.latest = Some(record);
                self.last_error = None;
                if still_live {
                    TickOutcome::Updated
                } else {
                    info!("Session {} finished", session_id);
                    self.end(session_id, EndReason::Finished, completed_at)
                }
            }
            Ok(None) => {
                warn!("Live session {} disappeared from the store", session_id);
                self.end(session_id, EndReason::Vanished, completed_at)
            }
            Err(e) => {
                warn!("Live refresh of {} failed, keeping last data: {}", session_id, e);
                self.last_error = Some(e.to_string());
                TickOutcome::FetchFailed
            }
        }
    }

    fn end(&mut self, session_id: String, reason: EndReason, at: Instant) -> TickOutcome {
        self.scheduler.cancel();
        self.finished.insert(session_id.clone());
        self.last_error = None;
        self.state = LiveState::Ended {
            session_id,
            reason,
            ended_at: at,
        };
        TickOutcome::Ended(reason)
    }

    pub fn state(&self) -> &LiveState {
        &self.state
    }

    pub fn is_monitoring(&self) -> bool {
        matches!(self.state, LiveState::Monitoring { .. })
    }

    pub fn is_idle(&self) -> bool {
        self.state == LiveState::Idle
    }

    /// Session being monitored or whose end is being shown.
    pub fn session_id(&self) -> Option<&str> {
        match &self.state {
            LiveState::Idle => None,
            LiveState::Monitoring { session_id } | LiveState::Ended { session_id, .. } => {
                Some(session_id)
            }
        }
    }

    pub fn has_finished(&self, session_id: &str) -> bool {
        self.finished.contains(session_id)
    }

    /// Freshest known record of the monitored session.
    pub fn latest(&self) -> Option<&SessionRecord> {
        self.latest.as_ref()
    }

    /// Statistics of the freshest record, `None` while no telemetry has arrived.
    pub fn stats(&self) -> Option<SessionStats> {
        self.latest.as_ref().and_then(|r| r.stats())
    }

    pub fn last_sample(&self) -> Option<LastSampleReadout> {
        self.latest
            .as_ref()
            .and_then(|r| r.telemetry.as_ref())
            .and_then(|t| t.last())
            .map(LastSampleReadout::from)
    }

    /// Error of the last tick, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// How long the render loop may sleep before polling again, `None` when idle.
    pub fn time_until_next_poll(&self, now: Instant) -> Option<Duration> {
        match &self.state {
            LiveState::Idle => None,
            LiveState::Monitoring { .. } => self.scheduler.time_until_due(now),
            LiveState::Ended { ended_at, .. } => Some(
                self.ended_display
                    .saturating_sub(now.saturating_duration_since(*ended_at)),
            ),
        }
    }
}
