use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDateTime, TimeDelta};
use itertools::Itertools;
use log::warn;

use super::{RawSessionRecord, SessionRecord};

/// Fastest speed recorded across all sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonBest {
    pub speed_kph: f64,
    pub category: String,
    pub session_id: String,
}

/// Sessions started within one slice of the activity timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityBucket {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub count_by_category: BTreeMap<String, usize>,
}

impl ActivityBucket {
    pub fn total(&self) -> usize {
        self.count_by_category.values().sum()
    }
}

/// Every session known at one point in time. Immutable once built, a refresh builds a new one.
///
/// Records are kept in ascending id order, which is the order the store hands out its mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionCatalog {
    records: Vec<SessionRecord>,
}

impl SessionCatalog {
    pub fn from_raw(raw: BTreeMap<String, RawSessionRecord>) -> Self {
        Self::from_records(
            raw.into_iter()
                .map(|(id, record)| SessionRecord::from_raw(&id, record)),
        )
    }

    pub fn from_records(records: impl IntoIterator<Item = SessionRecord>) -> Self {
        let mut records: Vec<SessionRecord> = records.into_iter().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Self { records }
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SessionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Sessions of one category, most recent first.
    ///
    /// Recency is inferred from the id, so ids have to sort chronologically as strings
    /// (date-prefixed or zero padded). Other id schemes come out in the wrong order.
    pub fn filter_by_type(&self, category: &str) -> Vec<&SessionRecord> {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .sorted_by(|a, b| b.id.cmp(&a.id))
            .collect()
    }

    /// The first live session in catalog order.
    ///
    /// Only one session is expected to be live at a time. When the store reports more, the first
    /// one wins and the rest are logged.
    pub fn find_live(&self) -> Option<&SessionRecord> {
        let mut live = self.records.iter().filter(|r| r.is_live());
        let first = live.next()?;
        let others = live.map(|r| r.id.as_str()).collect_vec();
        if !others.is_empty() {
            warn!(
                "Multiple live sessions found, following {} and ignoring {:?}",
                first.id, others
            );
        }
        Some(first)
    }

    pub fn distinct_types(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.category.clone()).collect()
    }

    /// Number of sessions per category, largest first. Ties are ordered by name.
    pub fn count_by_type(&self) -> Vec<(String, usize)> {
        self.records
            .iter()
            .counts_by(|r| r.category.clone())
            .into_iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .collect()
    }

    /// Highest max speed over all sessions with telemetry.
    pub fn season_best(&self) -> Option<SeasonBest> {
        self.records
            .iter()
            .filter_map(|r| r.stats().map(|s| (r, s.max_speed)))
            .fold(None, |best: Option<(&SessionRecord, f64)>, (record, speed)| match best {
                Some((_, best_speed)) if best_speed >= speed => best,
                _ => Some((record, speed)),
            })
            .map(|(record, speed)| SeasonBest {
                speed_kph: speed,
                category: record.category.clone(),
                session_id: record.id.clone(),
            })
    }

    /// Split the span between the first and the last session start into `bins` equal buckets and
    /// count the sessions started in each, per category. Sessions without a start time are left
    /// out.
    pub fn activity_timeline(&self, bins: usize) -> Vec<ActivityBucket> {
        let starts = self
            .records
            .iter()
            .filter_map(|r| r.started_at.map(|t| (t, r.category.as_str())))
            .sorted_by_key(|(t, _)| *t)
            .collect_vec();
        let (Some((first, _)), Some((last, _))) = (starts.first(), starts.last()) else {
            return Vec::new();
        };
        let bins = bins.max(1);
        let span = *last - *first;
        if span.is_zero() {
            let mut bucket = ActivityBucket {
                start: *first,
                end: *last,
                count_by_category: BTreeMap::new(),
            };
            for (_, category) in &starts {
                *bucket
                    .count_by_category
                    .entry(category.to_string())
                    .or_insert(0) += 1;
            }
            return vec![bucket];
        }

        let bin_ms = (span.num_milliseconds() as f64 / bins as f64).ceil().max(1.) as i64;
        let width = TimeDelta::milliseconds(bin_ms);
        // rounded up bins may reach past the last start, clamp them to it
        let bound = |i: usize| {
            i32::try_from(i)
                .ok()
                .and_then(|i| width.checked_mul(i))
                .and_then(|offset| first.checked_add_signed(offset))
                .map_or(*last, |t| t.min(*last))
        };
        let mut buckets = (0..bins)
            .map(|i| ActivityBucket {
                start: bound(i),
                end: bound(i + 1),
                count_by_category: BTreeMap::new(),
            })
            .collect_vec();
        for (start, category) in &starts {
            let offset = (*start - *first).num_milliseconds() / bin_ms;
            let index = (offset as usize).min(bins - 1);
            *buckets[index]
                .count_by_category
                .entry(category.to_string())
                .or_insert(0) += 1;
        }
        buckets
    }
}
