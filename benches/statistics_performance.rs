use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use racewatch::session::{RawSessionRecord, SessionCatalog, SessionRecord, SessionStatus, aggregate};
use racewatch::telemetry::{Sample, TelemetrySeries, compute_session_stats};
use std::time::Duration;

const CATEGORIES: [&str; 4] = ["SKIDPAD", "ACCELERATION", "AUTOX", "ENDURANCE"];

fn create_sample(point_no: usize) -> Sample {
    Sample {
        timestamp: 1_715_000_000. + point_no as f64 * 0.1, // 10Hz logger
        speed_kph: 40. + (point_no as f64 * 0.05).sin() * 25.,
        throttle: 80.,
        brake: 5.,
        g_force_x: 0.4,
        distance_m: Some(point_no as f64 * 1.2),
    }
}

fn create_samples(count: usize) -> Vec<Sample> {
    // the store hands out samples keyed by push id, not in time order
    (0..count).rev().map(create_sample).collect()
}

fn create_catalog(sessions: usize, samples_per_session: usize) -> SessionCatalog {
    SessionCatalog::from_records((0..sessions).map(|i| {
        SessionRecord::from_raw(
            &format!("2024-06-{:02}_{:04}", i % 28 + 1, i),
            RawSessionRecord::new(CATEGORIES[i % CATEGORIES.len()], SessionStatus::Finished)
                .with_samples(create_samples(samples_per_session)),
        )
    }))
}

fn bench_session_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_stats");

    for count in [100, 1000, 10_000] {
        let series = TelemetrySeries::from_unordered(create_samples(count));
        group.bench_with_input(BenchmarkId::new("compute", count), &series, |b, series| {
            b.iter(|| black_box(compute_session_stats(series).unwrap()));
        });
    }

    group.bench_function("sort_1000_unordered_samples", |b| {
        let samples = create_samples(1000);
        b.iter(|| black_box(TelemetrySeries::from_unordered(samples.clone())));
    });

    group.finish();
}

fn bench_category_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("category_aggregate");

    for sessions in [10, 100] {
        let catalog = create_catalog(sessions, 600);
        group.bench_with_input(
            BenchmarkId::new("aggregate", sessions),
            &catalog,
            |b, catalog| {
                b.iter(|| black_box(aggregate(catalog, "AUTOX")));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("season_best", sessions),
            &catalog,
            |b, catalog| {
                b.iter(|| black_box(catalog.season_best()));
            },
        );
    }

    group.finish();
}

fn bench_deserialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialization");

    let raw = RawSessionRecord::new("ENDURANCE", SessionStatus::Live).with_samples(create_samples(1000));
    let json = serde_json::to_string(&raw).unwrap();
    group.bench_function("parse_session_record", |b| {
        b.iter(|| {
            let raw: RawSessionRecord = serde_json::from_str(black_box(&json)).unwrap();
            black_box(SessionRecord::from_raw("live", raw))
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets = bench_session_stats, bench_category_aggregate, bench_deserialization
}
criterion_main!(benches);
