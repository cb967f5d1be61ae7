pub mod aggregate;
pub mod catalog;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::telemetry::{Sample, SessionStats, TelemetrySeries};

pub use aggregate::{CategoryAggregate, aggregate};
pub use catalog::{ActivityBucket, SeasonBest, SessionCatalog};

/// Category assigned to records stored without a `type`.
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

const DATE_DISPLAY_FORMAT: &str = "%d/%m %H:%M";
const START_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Live,
    Finished,
}

impl SessionStatus {
    /// Anything but `LIVE` is a finished session, including a missing status.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("LIVE") => SessionStatus::Live,
            Some(s) if s.eq_ignore_ascii_case("FINISHED") => SessionStatus::Finished,
            Some(other) => {
                debug!("Unknown session status '{}', treating as finished", other);
                SessionStatus::Finished
            }
            None => SessionStatus::Finished,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Live => "LIVE",
            SessionStatus::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Telemetry as the store returns it. Sample ids are usually push keys, but a store that
/// received sequential integer ids answers with an array instead, holes included.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTelemetry {
    Keyed(BTreeMap<String, serde_json::Value>),
    Indexed(Vec<serde_json::Value>),
}

impl RawTelemetry {
    pub fn into_samples(self) -> Vec<Sample> {
        let values: Box<dyn Iterator<Item = serde_json::Value>> = match self {
            RawTelemetry::Keyed(map) => Box::new(map.into_values()),
            RawTelemetry::Indexed(values) => Box::new(values.into_iter()),
        };
        values
            .filter(|v| !v.is_null())
            .filter_map(|v| match serde_json::from_value::<Sample>(v) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    warn!("Skipping unreadable telemetry sample: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// A session record exactly as stored. Every field is optional, defaults are applied when the
/// record is turned into a [`SessionRecord`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RawSessionRecord {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<RawTelemetry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed_limit: Option<f64>,
}

impl RawSessionRecord {
    pub fn new(category: &str, status: SessionStatus) -> Self {
        Self {
            category: Some(category.to_string()),
            status: Some(status.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn with_start_time(mut self, start_time: &str) -> Self {
        self.start_time = Some(serde_json::Value::String(start_time.to_string()));
        self
    }

    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    /// Store samples keyed by zero padded sequence numbers.
    pub fn with_samples(mut self, samples: impl IntoIterator<Item = Sample>) -> Self {
        let keyed = samples
            .into_iter()
            .enumerate()
            .filter_map(|(i, sample)| {
                serde_json::to_value(sample)
                    .ok()
                    .map(|v| (format!("{:06}", i), v))
            })
            .collect();
        self.telemetry = Some(RawTelemetry::Keyed(keyed));
        self
    }
}

/// Metadata and telemetry of one session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    /// Store key. Expected to sort chronologically.
    pub id: String,
    pub category: String,
    pub status: SessionStatus,
    pub started_at: Option<NaiveDateTime>,
    /// `dd/mm HH:MM` of the start time, or the id when the start time is unknown
    pub date_display: String,
    /// `None` when the store holds no samples for this session
    pub telemetry: Option<TelemetrySeries>,
    pub max_speed_limit: Option<f64>,
}

impl SessionRecord {
    pub fn from_raw(id: &str, raw: RawSessionRecord) -> Self {
        let category = match raw.category {
            Some(category) if !category.is_empty() => category,
            _ => {
                debug!("Session {} has no type, using {}", id, UNKNOWN_CATEGORY);
                UNKNOWN_CATEGORY.to_string()
            }
        };
        let started_at = raw.start_time.as_ref().and_then(parse_start_time);
        let date_display = match started_at {
            Some(dt) => dt.format(DATE_DISPLAY_FORMAT).to_string(),
            None => id.to_string(),
        };
        let telemetry = raw
            .telemetry
            .map(|t| TelemetrySeries::from_unordered(t.into_samples()))
            .filter(|series| !series.is_empty());

        Self {
            id: id.to_string(),
            category,
            status: SessionStatus::from_raw(raw.status.as_deref()),
            started_at,
            date_display,
            telemetry,
            max_speed_limit: raw.max_speed_limit,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == SessionStatus::Live
    }

    pub fn has_telemetry(&self) -> bool {
        self.telemetry.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Session statistics, `None` when no telemetry was recorded yet.
    pub fn stats(&self) -> Option<SessionStats> {
        self.telemetry.as_ref().and_then(|t| t.stats().ok())
    }

    pub fn mean_speed(&self) -> Option<f64> {
        self.stats().map(|s| s.avg_speed)
    }

    /// Label used when picking a session from a list.
    pub fn selector_label(&self) -> String {
        format!("{} (Status: {})", self.date_display, self.status)
    }
}

/// Read a start time written either as an ISO-8601 string or as unix seconds.
pub fn parse_start_time(value: &serde_json::Value) -> Option<NaiveDateTime> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_local());
            }
            START_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        }
        serde_json::Value::Number(n) => {
            let secs = n.as_f64()?;
            DateTime::from_timestamp(secs.floor() as i64, 0).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}
