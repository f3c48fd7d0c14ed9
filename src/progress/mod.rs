use std::{
    collections::HashSet,
    sync::Arc,
};

use chrono::{Days, Local, NaiveDate, TimeZone};

use crate::{
    error::StoreError,
    models::{ProgressStats, StudyRecord},
    store::SessionStore,
};

const DEFAULT_SUBJECT: &str = "General";

/// Compute summary statistics over a user's full session history.
///
/// Pure: same records, date, and zone in, same stats out. Records carry UTC
/// instants; calendar bucketing happens in the caller's zone.
///
/// The streak scan deliberately mirrors the original client: it counts one
/// per record examined (several sessions logged on `as_of` each add one)
/// and stops at the first record dated the previous day without scanning
/// further back. It is not a distinct-consecutive-day count.
pub fn compute_stats<Tz: TimeZone>(
    records: &[StudyRecord],
    as_of: NaiveDate,
    tz: &Tz,
) -> ProgressStats {
    let mut stats = ProgressStats::default();

    if records.is_empty() {
        return stats;
    }

    // Total time, subject distribution, and the set of active days.
    let mut days = HashSet::new();
    for record in records {
        stats.total_time_minutes += record.duration_minutes;

        let subject = if record.subject.is_empty() {
            DEFAULT_SUBJECT
        } else {
            record.subject.as_str()
        };
        *stats.subject_totals.entry(subject.to_string()).or_insert(0.0) +=
            record.duration_minutes;

        days.insert(record.timestamp.with_timezone(tz).date_naive());
    }

    stats.daily_average_minutes = stats.total_time_minutes / days.len() as f64;

    // Streak: newest record first. A record on `as_of` counts and the scan
    // continues; a record on the previous day counts once and ends the
    // scan; anything older ends it immediately.
    let mut sorted: Vec<&StudyRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let previous_day = as_of - Days::new(1);
    for record in &sorted {
        let date = record.timestamp.with_timezone(tz).date_naive();
        if date == as_of {
            stats.streak_days += 1;
        } else if date == previous_day {
            stats.streak_days += 1;
            break;
        } else {
            break;
        }
    }

    stats
}

/// On-demand aggregation over a `SessionStore`, the way a progress screen
/// consumes it: pull the full snapshot, compute, discard.
pub struct ProgressService {
    store: Arc<dyn SessionStore>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Stats for today in the local time zone. A query failure surfaces to
    /// the caller as `StoreError` ("stats unavailable"); there is no
    /// partial-aggregation retry.
    pub async fn stats_for(&self, user_id: &str) -> Result<ProgressStats, StoreError> {
        let records = self.store.query(user_id).await?;
        let now = Local::now();
        Ok(compute_stats(&records, now.date_naive(), &now.timezone()))
    }
}
