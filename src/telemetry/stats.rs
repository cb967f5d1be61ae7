use crate::RacewatchError;

use super::{Sample, TelemetrySeries};

/// Statistics over all currently known samples of a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionStats {
    pub max_speed: f64,
    pub min_speed: f64,
    pub avg_speed: f64,
    /// Timestamp span of the known samples, in seconds. Grows while a session is live.
    pub duration_s: f64,
    pub sample_count: usize,
}

impl SessionStats {
    /// Rough distance in km from the average speed and the session duration. Only an estimate,
    /// prefer a measured distance when the logger provides one.
    pub fn distance_estimate_km(&self) -> f64 {
        self.avg_speed * self.duration_s / 3600.
    }
}

/// Distance covered by a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Distance {
    /// Reported by the car logger
    Measured { km: f64 },
    /// Derived from average speed and duration
    Estimated { km: f64 },
}

impl Distance {
    pub fn for_series(series: &TelemetrySeries, stats: &SessionStats) -> Self {
        match series.last().and_then(|s| s.distance_m) {
            Some(meters) => Distance::Measured { km: meters / 1000. },
            None => Distance::Estimated {
                km: stats.distance_estimate_km(),
            },
        }
    }

    pub fn km(&self) -> f64 {
        match self {
            Distance::Measured { km } | Distance::Estimated { km } => *km,
        }
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, Distance::Estimated { .. })
    }
}

/// Average pedal application over a session, in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PedalUsage {
    pub avg_throttle: f64,
    pub avg_brake: f64,
}

impl PedalUsage {
    pub fn for_series(series: &TelemetrySeries) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let count = series.len() as f64;
        let (throttle, brake) = series
            .samples()
            .iter()
            .fold((0., 0.), |(t, b), s| (t + s.throttle, b + s.brake));
        Some(Self {
            avg_throttle: throttle / count,
            avg_brake: brake / count,
        })
    }
}

/// Instantaneous readout of the most recent sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LastSampleReadout {
    pub speed_kph: f64,
    pub throttle: f64,
    pub brake: f64,
    pub distance_m: Option<f64>,
}

impl From<&Sample> for LastSampleReadout {
    fn from(sample: &Sample) -> Self {
        Self {
            speed_kph: sample.speed_kph,
            throttle: sample.throttle,
            brake: sample.brake,
            distance_m: sample.distance_m,
        }
    }
}

/// Compute max, min and average speed plus duration for a series.
///
/// Everything is recomputed from scratch on each call. A session carries at most a few thousand
/// samples so a single pass is cheap, and it keeps the numbers consistent when the live fetch
/// returns samples that were not seen before.
///
/// # Errors
///
/// Returns [`RacewatchError::EmptySeries`] when the series has no samples.
pub fn compute_session_stats(series: &TelemetrySeries) -> Result<SessionStats, RacewatchError> {
    let samples = series.samples();
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Err(RacewatchError::EmptySeries);
    };

    let mut max_speed = f64::MIN;
    let mut min_speed = f64::MAX;
    let mut total = 0.;
    for sample in samples {
        max_speed = max_speed.max(sample.speed_kph);
        min_speed = min_speed.min(sample.speed_kph);
        total += sample.speed_kph;
    }
    // rounding can push the mean a hair outside the observed range
    let avg_speed = (total / samples.len() as f64).clamp(min_speed, max_speed);

    Ok(SessionStats {
        max_speed,
        min_speed,
        avg_speed,
        duration_s: last.timestamp - first.timestamp,
        sample_count: samples.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(points: &[(f64, f64)]) -> TelemetrySeries {
        TelemetrySeries::from_unordered(points.iter().map(|(timestamp, speed_kph)| Sample {
            timestamp: *timestamp,
            speed_kph: *speed_kph,
            ..Sample::default()
        }))
    }

    #[test]
    fn test_stats_basic() {
        let stats = compute_session_stats(&series(&[(10., 20.), (12., 60.), (11., 40.)])).unwrap();
        assert_eq!(stats.max_speed, 60.);
        assert_eq!(stats.min_speed, 20.);
        assert_eq!(stats.avg_speed, 40.);
        assert_eq!(stats.duration_s, 2.);
        assert_eq!(stats.sample_count, 3);
    }

    #[test]
    fn test_empty_series_fails() {
        match compute_session_stats(&TelemetrySeries::default()) {
            Err(RacewatchError::EmptySeries) => {}
            other => panic!("Expected EmptySeries, got {:?}", other),
        }
    }

    #[test]
    fn test_single_sample_has_zero_duration() {
        let stats = compute_session_stats(&series(&[(5., 33.)])).unwrap();
        assert_eq!(stats.duration_s, 0.);
        assert_eq!(stats.avg_speed, 33.);
        assert_eq!(stats.distance_estimate_km(), 0.);
    }

    #[test]
    fn test_duration_grows_with_new_samples() {
        let mut points = vec![(100., 10.), (101., 20.)];
        let before = compute_session_stats(&series(&points)).unwrap();
        points.push((105., 30.));
        let after = compute_session_stats(&series(&points)).unwrap();
        assert!(after.duration_s > before.duration_s);
        assert_eq!(after.duration_s, 5.);
    }

    #[test]
    fn test_distance_estimate() {
        // one hour at 100 km/h
        let stats = compute_session_stats(&series(&[(0., 100.), (3600., 100.)])).unwrap();
        assert_eq!(stats.distance_estimate_km(), 100.);
    }

    #[test]
    fn test_measured_distance_preferred() {
        let mut s = series(&[(0., 100.), (3600., 100.)]);
        let stats = compute_session_stats(&s).unwrap();
        assert!(Distance::for_series(&s, &stats).is_estimate());

        s = TelemetrySeries::from_unordered(vec![
            Sample {
                timestamp: 0.,
                speed_kph: 100.,
                distance_m: Some(0.),
                ..Sample::default()
            },
            Sample {
                timestamp: 3600.,
                speed_kph: 100.,
                distance_m: Some(98_500.),
                ..Sample::default()
            },
        ]);
        let distance = Distance::for_series(&s, &stats);
        assert_eq!(distance, Distance::Measured { km: 98.5 });
        assert!(!distance.is_estimate());
    }

    #[test]
    fn test_pedal_usage() {
        let s = TelemetrySeries::from_unordered(vec![
            Sample {
                timestamp: 0.,
                throttle: 100.,
                brake: 0.,
                ..Sample::default()
            },
            Sample {
                timestamp: 1.,
                throttle: 0.,
                brake: 50.,
                ..Sample::default()
            },
        ]);
        let usage = PedalUsage::for_series(&s).unwrap();
        assert_eq!(usage.avg_throttle, 50.);
        assert_eq!(usage.avg_brake, 25.);
        assert!(PedalUsage::for_series(&TelemetrySeries::default()).is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_avg_within_speed_range(
            points in prop::collection::vec((0f64..10_000f64, 0f64..400f64), 1..200),
        ) {
            let s = series(&points);
            let stats = compute_session_stats(&s).unwrap();

            prop_assert!(stats.max_speed >= stats.avg_speed);
            prop_assert!(stats.avg_speed >= stats.min_speed);
            prop_assert!(stats.duration_s >= 0.);
            prop_assert_eq!(stats.sample_count, points.len());
        }

        #[test]
        fn prop_stats_independent_of_input_order(
            points in prop::collection::vec((0f64..10_000f64, 0f64..400f64), 1..50),
        ) {
            let mut reversed = points.clone();
            reversed.reverse();
            let forward = compute_session_stats(&series(&points)).unwrap();
            let backward = compute_session_stats(&series(&reversed)).unwrap();

            prop_assert_eq!(forward.max_speed, backward.max_speed);
            prop_assert_eq!(forward.duration_s, backward.duration_s);
            prop_assert!((forward.avg_speed - backward.avg_speed).abs() < 1e-9);
        }
    }
}
