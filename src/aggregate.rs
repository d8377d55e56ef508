//! Weekly counters and derived stats.

use jira_api::IssueList;

use crate::sink::{absorb, FaultKind, FaultSink};
use crate::store::Store;
use crate::week::WeekBucket;

/// Store key namespace.
pub mod keys {
    pub const DEVELOPERS: &str = "data:developers";
    pub const TEAMS: &str = "data:teams";

    pub fn team_developers(team: &str) -> String {
        format!("data:team:{}:developers", team)
    }

    pub fn velocity_log(developer: &str) -> String {
        format!("data:velocityLogs:developer:{}", developer)
    }

    pub fn work_log(developer: &str) -> String {
        format!("data:workLogs:developer:{}", developer)
    }

    pub fn velocity_data(developer: &str) -> String {
        format!("data:velocity:developer:{}", developer)
    }

    pub fn velocity_stats(developer: &str) -> String {
        format!("stats:velocity:developer:{}", developer)
    }

    pub fn meeting_stats(developer: &str) -> String {
        format!("stats:meetings:developer:{}", developer)
    }

    pub fn developer_defect_ratio(developer: &str) -> String {
        format!("stats:defectRatio:developer:{}", developer)
    }

    pub fn team_defect_ratio(team: &str) -> String {
        format!("stats:defectRatio:team:{}", team)
    }
}

pub const FINISHED: &str = "Finished";
pub const ACCEPTED: &str = "Accepted";
pub const REJECTED: &str = "Rejected";

/// Integer mean. `None` when there are no entries.
pub fn average(total: i64, entries: i64) -> Option<i64> {
    if entries <= 0 {
        None
    } else {
        Some(total / entries)
    }
}

/// Rejected over delivered. `None` when nothing was delivered.
pub fn defect_ratio(rejected: u64, delivered: u64) -> Option<f64> {
    if delivered == 0 {
        None
    } else {
        Some(rejected as f64 / delivered as f64)
    }
}

/// Running `TOTAL`/`ENTRIES` counters and the derived average for one developer.
pub struct VelocityCounters<'a, S: Store> {
    store: &'a S,
    developer: String,
    data_key: String,
    stats_key: String,
}

impl<'a, S: Store> VelocityCounters<'a, S> {
    pub fn new(store: &'a S, developer: &str) -> Self {
        Self {
            store,
            developer: developer.to_string(),
            data_key: keys::velocity_data(developer),
            stats_key: keys::velocity_stats(developer),
        }
    }

    fn total_field(bucket: WeekBucket) -> String {
        format!("{}:TOTAL", bucket)
    }

    fn entries_field(bucket: WeekBucket) -> String {
        format!("{}:ENTRIES", bucket)
    }

    /// Adds one finished issue worth `time` to the bucket. `false` when either
    /// increment failed.
    pub fn record(&self, bucket: WeekBucket, time: i64, sink: &dyn FaultSink) -> bool {
        let total = self
            .store
            .hincrby(&self.data_key, &Self::total_field(bucket), time);
        let total_ok = total.is_ok();
        absorb(
            sink,
            FaultKind::Store,
            format!("could not increment total for {} {}", self.developer, bucket),
            total.map(|_| ()),
        );
        let entries = self
            .store
            .hincrby(&self.data_key, &Self::entries_field(bucket), 1);
        let entries_ok = entries.is_ok();
        absorb(
            sink,
            FaultKind::Store,
            format!("could not increment entries for {} {}", self.developer, bucket),
            entries.map(|_| ()),
        );
        total_ok && entries_ok
    }

    /// `(total, entries)` for the bucket; unreadable counters read as 0.
    pub fn read(&self, bucket: WeekBucket, sink: &dyn FaultSink) -> (i64, i64) {
        let total = absorb(
            sink,
            FaultKind::Store,
            format!("could not get the total for {} {}", self.developer, bucket),
            self.store.hget_int(&self.data_key, &Self::total_field(bucket)),
        );
        let entries = absorb(
            sink,
            FaultKind::Store,
            format!("could not get the entries for {} {}", self.developer, bucket),
            self.store
                .hget_int(&self.data_key, &Self::entries_field(bucket)),
        );
        (total, entries)
    }

    /// Overwrites the derived average for the bucket.
    pub fn publish(&self, bucket: WeekBucket, average: i64, sink: &dyn FaultSink) -> bool {
        let written = self
            .store
            .hset(&self.stats_key, &bucket.to_string(), &average.to_string());
        let ok = written.is_ok();
        absorb(
            sink,
            FaultKind::Store,
            format!("could not write velocity for {} {}", self.developer, bucket),
            written,
        );
        ok
    }
}

/// Accumulated meeting minutes for one developer.
pub struct MeetingCounters<'a, S: Store> {
    store: &'a S,
    developer: String,
    stats_key: String,
}

impl<'a, S: Store> MeetingCounters<'a, S> {
    pub fn new(store: &'a S, developer: &str) -> Self {
        Self {
            store,
            developer: developer.to_string(),
            stats_key: keys::meeting_stats(developer),
        }
    }

    pub fn add_minutes(&self, bucket: WeekBucket, minutes: i64, sink: &dyn FaultSink) -> bool {
        let added = self
            .store
            .hincrby(&self.stats_key, &bucket.to_string(), minutes);
        let ok = added.is_ok();
        absorb(
            sink,
            FaultKind::Store,
            format!("could not add meeting minutes for {} {}", self.developer, bucket),
            added.map(|_| ()),
        );
        ok
    }
}

/// Status transitions relevant to the defect ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionTally {
    /// Transitions into `Accepted`.
    pub delivered: u64,
    /// Transitions from `Accepted` to `Rejected`.
    pub rejected: u64,
}

impl TransitionTally {
    pub fn ratio(&self) -> Option<f64> {
        defect_ratio(self.rejected, self.delivered)
    }
}

pub fn count_transitions(issues: &IssueList) -> TransitionTally {
    let mut tally = TransitionTally::default();
    for issue in &issues.issues {
        for history in &issue.changelog.histories {
            for item in &history.items {
                if item.is_status_change(ACCEPTED, REJECTED) {
                    tally.rejected += 1;
                }
                if item.is_status_to(ACCEPTED) {
                    tally.delivered += 1;
                }
            }
        }
    }
    tally
}
