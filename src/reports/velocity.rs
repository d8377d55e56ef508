//! Average logged time per finished issue, per week.

use jira_api::{Issue, SearchQuery};
use log::debug;

use super::{Context, TIMESTAMP_DELIMITER};
use crate::aggregate::{average, VelocityCounters, FINISHED};
use crate::ledger::Ledger;
use crate::remote;
use crate::sink::{Fault, FaultKind, FaultSink};
use crate::store::Store;
use crate::week::{self, WeekBucket};

/// One developer's unit of work: fold every unseen finished issue into the
/// weekly counters and refresh the weekly average.
pub async fn developer_velocity<S: Store>(ctx: Context<S>, developer: String) {
    let sink = ctx.sink.as_ref();
    let query = SearchQuery::assignee(&developer).with_history();
    let issues = remote::search(&ctx.client, &query, sink).await;
    debug!("velocity: {} issues for {}", issues.issues.len(), developer);

    let ledger = Ledger::velocity(&ctx.store, &developer);
    let counters = VelocityCounters::new(&ctx.store, &developer);
    for issue in &issues.issues {
        if ledger.is_processed(&issue.id, sink) {
            continue;
        }
        fold_issue(issue, &developer, &ledger, &counters, sink);
    }
}

/// Records the issue's `Finished` transitions and marks the issue once every
/// increment landed. The average is then refreshed for the bucket of the last
/// history, which may differ from the buckets that were incremented.
///
/// An issue with no countable transition stays unmarked, so it is counted
/// once it finishes.
pub fn fold_issue<S: Store>(
    issue: &Issue,
    developer: &str,
    ledger: &Ledger<'_, S>,
    counters: &VelocityCounters<'_, S>,
    sink: &dyn FaultSink,
) {
    let time_spent = issue.time_spent();
    let mut last_bucket: Option<WeekBucket> = None;
    let mut recorded = false;
    let mut intact = true;
    for history in &issue.changelog.histories {
        let bucket = week::bucket(&history.created, TIMESTAMP_DELIMITER, sink);
        last_bucket = Some(bucket);
        for item in &history.items {
            if item.is_status_to(FINISHED) && time_spent > 0 {
                recorded = true;
                intact &= counters.record(bucket, time_spent, sink);
            }
        }
    }
    if recorded && intact {
        ledger.mark_processed(&issue.id, sink);
    }

    let Some(bucket) = last_bucket else {
        return;
    };
    let (total, entries) = counters.read(bucket, sink);
    if total <= 0 {
        return;
    }
    match average(total, entries) {
        Some(velocity) => {
            counters.publish(bucket, velocity, sink);
        }
        None => sink.report(Fault::new(
            FaultKind::Arithmetic,
            format!("velocity for {} {}", developer, bucket),
            format!("total {} over {} entries", total, entries),
        )),
    }
}
