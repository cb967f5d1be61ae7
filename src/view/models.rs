//! Presentation models. Everything the rendering layer needs, computed up front so that drawing
//! code does no statistics of its own.

use crate::live::{EndReason, LiveRefreshController, LiveState};
use crate::session::{
    ActivityBucket, CategoryAggregate, SeasonBest, SessionCatalog, SessionRecord, SessionStatus,
    aggregate,
};
use crate::telemetry::{Distance, LastSampleReadout, PedalUsage, Sample, SessionStats};

pub const ACTIVITY_BINS: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct OverviewModel {
    pub total_sessions: usize,
    pub season_best: Option<SeasonBest>,
    pub active_categories: usize,
    pub sessions_by_type: Vec<(String, usize)>,
    pub activity: Vec<ActivityBucket>,
}

impl OverviewModel {
    pub fn build(catalog: &SessionCatalog) -> Self {
        Self {
            total_sessions: catalog.len(),
            season_best: catalog.season_best(),
            active_categories: catalog.distinct_types().len(),
            sessions_by_type: catalog.count_by_type(),
            activity: catalog.activity_timeline(ACTIVITY_BINS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_sessions == 0
    }
}

/// Everything shown for one selected session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionDetail {
    pub session_id: String,
    pub label: String,
    pub status: SessionStatus,
    /// `None` when no telemetry was recorded yet
    pub stats: Option<SessionStats>,
    pub distance: Option<Distance>,
    pub pedals: Option<PedalUsage>,
    pub speed_points: Vec<[f64; 2]>,
    pub throttle_points: Vec<[f64; 2]>,
    pub brake_points: Vec<[f64; 2]>,
    pub samples: Vec<Sample>,
    /// Configured speed limit and the number of samples above it
    pub over_limit: Option<(f64, usize)>,
}

impl SessionDetail {
    pub fn from_record(record: &SessionRecord) -> Self {
        let mut detail = Self {
            session_id: record.id.clone(),
            label: record.selector_label(),
            status: record.status,
            stats: None,
            distance: None,
            pedals: None,
            speed_points: Vec::new(),
            throttle_points: Vec::new(),
            brake_points: Vec::new(),
            samples: Vec::new(),
            over_limit: None,
        };
        let Some(series) = &record.telemetry else {
            return detail;
        };
        // an empty series means no telemetry yet, not a failure
        let Ok(stats) = series.stats() else {
            return detail;
        };

        detail.distance = Some(Distance::for_series(series, &stats));
        detail.stats = Some(stats);
        detail.pedals = PedalUsage::for_series(series);
        detail.speed_points = series.plot_points(|s| s.speed_kph);
        detail.throttle_points = series.plot_points(|s| s.throttle);
        detail.brake_points = series.plot_points(|s| s.brake);
        detail.samples = series.samples().to_vec();
        detail.over_limit = record
            .max_speed_limit
            .map(|limit| (limit, series.count_over_limit(limit)));
        detail
    }

    pub fn has_telemetry(&self) -> bool {
        self.stats.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionOption {
    pub id: String,
    pub label: String,
}

/// One category of the session history.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveModel {
    pub category: String,
    pub aggregate: CategoryAggregate,
    /// Most recent first
    pub sessions: Vec<SessionOption>,
    pub selected: Option<SessionDetail>,
}

impl ArchiveModel {
    /// Build the archive of `category`. The requested session is selected when it belongs to the
    /// category, otherwise the most recent one.
    pub fn build(catalog: &SessionCatalog, category: &str, selected_id: Option<&str>) -> Self {
        let records = catalog.filter_by_type(category);
        let selected = selected_id
            .and_then(|id| records.iter().find(|r| r.id == id))
            .or_else(|| records.first())
            .map(|record| SessionDetail::from_record(record));

        Self {
            category: category.to_string(),
            aggregate: aggregate(catalog, category),
            sessions: records
                .iter()
                .map(|r| SessionOption {
                    id: r.id.clone(),
                    label: r.selector_label(),
                })
                .collect(),
            selected,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivePhase {
    Monitoring,
    Ended(EndReason),
}

/// The live session as last fetched by the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveModel {
    pub session_id: String,
    pub category: String,
    pub phase: LivePhase,
    pub detail: SessionDetail,
    pub last_sample: Option<LastSampleReadout>,
    /// Set while refreshes fail and older data is displayed
    pub error_banner: Option<String>,
}

impl LiveModel {
    pub fn build(controller: &LiveRefreshController) -> Option<Self> {
        let phase = match controller.state() {
            LiveState::Idle => return None,
            LiveState::Monitoring { .. } => LivePhase::Monitoring,
            LiveState::Ended { reason, .. } => LivePhase::Ended(*reason),
        };
        let record = controller.latest()?;
        Some(Self {
            session_id: record.id.clone(),
            category: record.category.clone(),
            phase,
            detail: SessionDetail::from_record(record),
            last_sample: controller.last_sample(),
            error_banner: controller.last_error().map(|e| e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::RawSessionRecord;
    use crate::store::InMemoryStore;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn samples(speeds: &[f64]) -> Vec<Sample> {
        speeds
            .iter()
            .enumerate()
            .map(|(i, speed)| Sample {
                timestamp: 1000. + i as f64,
                speed_kph: *speed,
                throttle: 80.,
                brake: 10.,
                ..Sample::default()
            })
            .collect()
    }

    fn record(id: &str, category: &str, status: SessionStatus, speeds: &[f64]) -> SessionRecord {
        SessionRecord::from_raw(
            id,
            RawSessionRecord::new(category, status).with_samples(samples(speeds)),
        )
    }

    #[test]
    fn test_overview_model() {
        let catalog = SessionCatalog::from_records(vec![
            record("1", "A", SessionStatus::Finished, &[10., 50.]),
            record("2", "A", SessionStatus::Finished, &[]),
            record("3", "B", SessionStatus::Live, &[70.]),
        ]);
        let model = OverviewModel::build(&catalog);
        assert_eq!(model.total_sessions, 3);
        assert_eq!(model.active_categories, 2);
        assert_eq!(model.season_best.as_ref().unwrap().category, "B");
        assert_eq!(model.sessions_by_type[0], ("A".to_string(), 2));
        assert!(!model.is_empty());
        assert!(OverviewModel::build(&SessionCatalog::default()).is_empty());
    }

    #[test]
    fn test_session_detail_without_telemetry() {
        let detail = SessionDetail::from_record(&record("1", "A", SessionStatus::Live, &[]));
        assert!(!detail.has_telemetry());
        assert!(detail.speed_points.is_empty());
        assert!(detail.distance.is_none());
    }

    #[test]
    fn test_session_detail_with_limit() {
        let mut r = record("1", "A", SessionStatus::Finished, &[10., 60., 90.]);
        r.max_speed_limit = Some(50.);
        let detail = SessionDetail::from_record(&r);
        let stats = detail.stats.unwrap();
        assert_eq!(stats.max_speed, 90.);
        assert_eq!(detail.over_limit, Some((50., 2)));
        assert_eq!(detail.speed_points[0], [0., 10.]);
        assert_eq!(detail.samples.len(), 3);
        assert_eq!(detail.pedals.unwrap().avg_brake, 10.);
        assert!(detail.distance.unwrap().is_estimate());
    }

    #[test]
    fn test_archive_model_selection() {
        let catalog = SessionCatalog::from_records(vec![
            record("2024-01-01", "A", SessionStatus::Finished, &[10.]),
            record("2024-01-02", "A", SessionStatus::Finished, &[20.]),
            record("2024-01-03", "B", SessionStatus::Finished, &[30.]),
        ]);
        let model = ArchiveModel::build(&catalog, "A", None);
        assert_eq!(model.sessions.len(), 2);
        assert_eq!(model.sessions[0].id, "2024-01-02");
        assert_eq!(model.selected.as_ref().unwrap().session_id, "2024-01-02");
        assert_eq!(model.aggregate.mean_of_means, 15.);

        let model = ArchiveModel::build(&catalog, "A", Some("2024-01-01"));
        assert_eq!(model.selected.unwrap().session_id, "2024-01-01");

        // a session of another category is not selectable here
        let model = ArchiveModel::build(&catalog, "A", Some("2024-01-03"));
        assert_eq!(model.selected.unwrap().session_id, "2024-01-02");

        let model = ArchiveModel::build(&catalog, "C", None);
        assert!(model.is_empty());
        assert!(model.selected.is_none());
        assert!(!model.aggregate.has_data());
    }

    #[test]
    fn test_live_model() {
        let store = Arc::new(InMemoryStore::new());
        let mut controller =
            LiveRefreshController::new(store.clone(), Duration::from_secs(1), Duration::from_secs(3));
        assert!(LiveModel::build(&controller).is_none());

        let live = record("1", "ENDURANCE", SessionStatus::Live, &[10., 20.]);
        controller.start(&live, Instant::now());
        let model = LiveModel::build(&controller).unwrap();
        assert_eq!(model.phase, LivePhase::Monitoring);
        assert_eq!(model.last_sample.unwrap().speed_kph, 20.);
        assert!(model.error_banner.is_none());
        assert_eq!(model.detail.stats.unwrap().avg_speed, 15.);
    }
}
