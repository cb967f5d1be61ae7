// End to end tests of the dashboard flow, without the UI
//
// This test suite drives the same sequence the dashboard runs on each frame:
// 1. Take the catalog snapshot from the cache
// 2. Resolve the navigation choice into a view
// 3. Start, tick and end live monitoring
// 4. Build the presentation models shown on screen

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use racewatch::{
    LiveRefreshController, SessionCatalog, SnapshotCache, TickOutcome,
    session::{RawSessionRecord, SessionRecord, SessionStatus, aggregate},
    store::{FileSessionStore, InMemoryStore, SessionStore},
    telemetry::{Distance, Sample},
    view::{ArchiveModel, LiveModel, LivePhase, NavSelection, OverviewModel, View, select_view},
    writer,
};
use tempfile::TempDir;

const TICK: Duration = Duration::from_secs(1);
const ENDED_DISPLAY: Duration = Duration::from_secs(3);
const TTL: Duration = Duration::from_secs(5);
// room for the time the store takes to answer a tick
const SLACK: Duration = Duration::from_millis(100);

fn recorded_store() -> FileSessionStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/races.json");
    FileSessionStore::new(path).expect("fixture should exist")
}

fn samples(speeds: &[f64]) -> Vec<Sample> {
    speeds
        .iter()
        .enumerate()
        .map(|(i, speed)| Sample {
            timestamp: 1_715_000_000. + i as f64,
            speed_kph: *speed,
            throttle: 70.,
            ..Sample::default()
        })
        .collect()
}

/// Two AUTOX runs and a live ENDURANCE session.
fn race_day() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert(
        "2024-06-01_10-00-00",
        RawSessionRecord::new("AUTOX", SessionStatus::Finished)
            .with_start_time("2024-06-01T10:00:00")
            .with_samples(samples(&[40., 60.])),
    );
    store.insert(
        "2024-06-01_11-00-00",
        RawSessionRecord::new("AUTOX", SessionStatus::Finished)
            .with_start_time("2024-06-01T11:00:00")
            .with_samples(samples(&[20., 30., 40.])),
    );
    store.insert(
        "2024-06-01_14-00-00",
        RawSessionRecord::new("ENDURANCE", SessionStatus::Live)
            .with_start_time("2024-06-01T14:00:00")
            .with_samples(samples(&[30., 50.])),
    );
    store
}

#[test]
fn test_recorded_file_overview() {
    let store = recorded_store();
    let catalog = SessionCatalog::from_raw(store.fetch_all().unwrap());
    let overview = OverviewModel::build(&catalog);

    assert_eq!(overview.total_sessions, 4);
    assert_eq!(overview.active_categories, 3);
    let best = overview.season_best.unwrap();
    assert_eq!(best.speed_kph, 68.5);
    assert_eq!(best.category, "ACCELERATION");
    assert_eq!(best.session_id, "2024-05-11_09-30-00");
    assert_eq!(overview.sessions_by_type[0], ("ACCELERATION".to_string(), 2));
    assert!(!overview.activity.is_empty());

    let live = catalog.find_live().unwrap();
    assert_eq!(live.category, "SKIDPAD");
    assert!(!live.has_telemetry());
}

#[test]
fn test_recorded_file_category_statistics() {
    let store = recorded_store();
    let catalog = SessionCatalog::from_raw(store.fetch_all().unwrap());

    // array telemetry with a hole, out of order: 0, 30, 54
    let second = catalog.get("2024-05-11_10-15-00").unwrap();
    assert_eq!(second.telemetry.as_ref().unwrap().len(), 3);
    assert_eq!(second.mean_speed(), Some(28.));

    let acceleration = aggregate(&catalog, "ACCELERATION");
    assert_eq!(acceleration.session_count, 2);
    assert_eq!(acceleration.mean_of_means, 32.5);
    assert_eq!(acceleration.best_mean, 37.);
    assert_eq!(acceleration.record_max, 68.5);

    let skidpad = aggregate(&catalog, "SKIDPAD");
    assert_eq!(skidpad.run_count, 1);
    assert!(!skidpad.has_data());

    let archive = ArchiveModel::build(&catalog, "ENDURANCE", None);
    let detail = archive.selected.unwrap();
    assert_eq!(detail.over_limit, Some((60., 1)));
    assert_eq!(detail.distance, Some(Distance::Measured { km: 0.42 }));
    assert_eq!(detail.stats.unwrap().avg_speed, 47.);
}

#[test]
fn test_live_session_lifecycle() {
    let store = race_day();
    let mut cache = SnapshotCache::new(store.clone(), TTL);
    let mut live = LiveRefreshController::new(store.clone(), TICK, ENDED_DISPLAY);
    let start = Instant::now();

    let catalog = cache.get_snapshot_at(start).unwrap();
    let overview = OverviewModel::build(&catalog);
    assert_eq!(overview.total_sessions, 3);
    assert_eq!(overview.active_categories, 2);
    assert_eq!(catalog.find_live().unwrap().id, "2024-06-01_14-00-00");

    let view = select_view(&NavSelection::Live, &catalog, &live);
    assert_eq!(view, View::LiveMonitor("2024-06-01_14-00-00".to_string()));
    let record = catalog.find_live().unwrap();
    assert!(live.start(record, start));

    // new samples arrive while live
    store.insert(
        "2024-06-01_14-00-00",
        RawSessionRecord::new("ENDURANCE", SessionStatus::Live)
            .with_start_time("2024-06-01T14:00:00")
            .with_samples(samples(&[30., 50., 70.])),
    );
    assert_eq!(live.poll(start + TICK + SLACK), TickOutcome::Updated);
    let model = LiveModel::build(&live).unwrap();
    assert_eq!(model.phase, LivePhase::Monitoring);
    assert_eq!(model.last_sample.unwrap().speed_kph, 70.);
    assert_eq!(model.detail.stats.unwrap().max_speed, 70.);

    store.set_status("2024-06-01_14-00-00", SessionStatus::Finished);
    let outcome = live.poll(start + TICK * 2 + SLACK * 2);
    assert!(matches!(outcome, TickOutcome::Ended(_)));
    assert!(matches!(
        LiveModel::build(&live).unwrap().phase,
        LivePhase::Ended(_)
    ));
    // the notice stays on the live view
    assert_eq!(
        select_view(&NavSelection::Live, &catalog, &live),
        View::LiveMonitor("2024-06-01_14-00-00".to_string())
    );

    let later = start + TICK * 2 + ENDED_DISPLAY + SLACK * 3;
    assert_eq!(live.poll(later), TickOutcome::ReturnedToIdle);
    cache.clear();
    let refreshed = cache.get_snapshot_at(later).unwrap();
    assert!(refreshed.find_live().is_none());
    assert_eq!(
        select_view(&NavSelection::Live, &refreshed, &live),
        View::Overview
    );
}

#[test]
fn test_live_ticks_do_not_refetch_catalog() {
    let store = race_day();
    let mut cache = SnapshotCache::new(store.clone(), TTL);
    let mut live = LiveRefreshController::new(store.clone(), TICK, ENDED_DISPLAY);
    let start = Instant::now();

    let first = cache.get_snapshot_at(start).unwrap();
    live.start(first.find_live().unwrap(), start);
    for i in 1..=4u32 {
        let now = start + TICK * i + SLACK * i;
        assert_eq!(live.poll(now), TickOutcome::Updated);
        let again = cache.get_snapshot_at(now).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert_eq!(store.full_fetches(), 1);
    assert_eq!(store.session_fetches(), 4);
}

#[test]
fn test_outage_keeps_last_good_state() {
    let store = race_day();
    let mut cache = SnapshotCache::new(store.clone(), TTL);
    let mut live = LiveRefreshController::new(store.clone(), TICK, ENDED_DISPLAY);
    let start = Instant::now();

    let catalog = cache.get_snapshot_at(start).unwrap();
    live.start(catalog.find_live().unwrap(), start);
    store.set_unreachable(true);

    let error = cache.get_snapshot_at(start + TTL * 2).unwrap_err();
    assert!(error.is_retrieval());
    assert_eq!(cache.last_good().unwrap().len(), 3);

    assert_eq!(live.poll(start + TICK + SLACK), TickOutcome::FetchFailed);
    let model = LiveModel::build(&live).unwrap();
    assert!(model.error_banner.is_some());
    assert_eq!(model.last_sample.unwrap().speed_kph, 50.);
}

#[test]
fn test_export_recorded_session() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("endurance.jsonl");
    let store = recorded_store();
    let raw = store.fetch_session("2024-05-12_14-00-00").unwrap().unwrap();
    let record = SessionRecord::from_raw("2024-05-12_14-00-00", raw);

    assert_eq!(writer::write_session(&output, &record).unwrap(), 4);
    let exported = serde_jsonlines::json_lines::<Sample, _>(&output)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(exported.len(), 4);
    assert_eq!(exported.last().unwrap().distance_m, Some(420.));
}
