pub mod stats;

use chrono::DateTime;
use log::warn;
use serde::{Deserialize, Serialize};

pub use stats::{Distance, LastSampleReadout, PedalUsage, SessionStats, compute_session_stats};

/// A single telemetry sample as recorded by the car logger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Seconds, monotonic within a session. Usually unix time.
    pub timestamp: f64,
    /// Current speed in km/h
    pub speed_kph: f64,
    /// Throttle use. 0=off throttle to 100=full throttle
    #[serde(default)]
    pub throttle: f64,
    /// Brake use. 0=brake released to 100=max pedal force
    #[serde(default)]
    pub brake: f64,
    /// Lateral acceleration in G
    #[serde(default)]
    pub g_force_x: f64,
    /// Meters traveled since the session start, when the logger knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            timestamp: 0.,
            speed_kph: 0.,
            throttle: 0.,
            brake: 0.,
            g_force_x: 0.,
            distance_m: None,
        }
    }
}

impl Sample {
    /// Samples with a non-finite timestamp or a negative speed cannot be placed on a chart.
    pub fn is_plausible(&self) -> bool {
        self.timestamp.is_finite() && self.speed_kph.is_finite() && self.speed_kph >= 0.
    }

    /// Wall clock label for the sample, `HH:MM:SS` in UTC. Falls back to the raw seconds when the
    /// timestamp is outside the representable range.
    pub fn time_label(&self) -> String {
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1e9) as u32;
        match DateTime::from_timestamp(secs as i64, nanos) {
            Some(dt) => dt.format("%H:%M:%S").to_string(),
            None => format!("{:.1}s", self.timestamp),
        }
    }
}

/// Samples of one session, always ordered by timestamp ascending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TelemetrySeries {
    samples: Vec<Sample>,
}

impl TelemetrySeries {
    /// Build a series from samples in arbitrary order. The store keys samples by opaque ids so
    /// nothing can be assumed about the order they arrive in.
    pub fn from_unordered(samples: impl IntoIterator<Item = Sample>) -> Self {
        let mut samples: Vec<Sample> = samples
            .into_iter()
            .filter(|s| {
                let plausible = s.is_plausible();
                if !plausible {
                    warn!("Dropping implausible telemetry sample: {:?}", s);
                }
                plausible
            })
            .collect();
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn stats(&self) -> Result<SessionStats, crate::RacewatchError> {
        compute_session_stats(self)
    }

    /// Mean speed over the whole series, `None` when there are no samples.
    pub fn mean_speed(&self) -> Option<f64> {
        self.stats().ok().map(|s| s.avg_speed)
    }

    /// `[seconds since first sample, value]` pairs ready to be plotted.
    pub fn plot_points(&self, value: impl Fn(&Sample) -> f64) -> Vec<[f64; 2]> {
        let Some(origin) = self.first().map(|s| s.timestamp) else {
            return Vec::new();
        };
        self.samples
            .iter()
            .map(|s| [s.timestamp - origin, value(s)])
            .collect()
    }

    /// Number of samples faster than `limit_kph`.
    pub fn count_over_limit(&self, limit_kph: f64) -> usize {
        self.samples
            .iter()
            .filter(|s| s.speed_kph > limit_kph)
            .count()
    }
}
