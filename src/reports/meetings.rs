//! Minutes logged against in-progress meeting issues, per week.

use jira_api::{SearchQuery, WorklogList};
use log::debug;

use super::{Context, TIMESTAMP_DELIMITER};
use crate::aggregate::MeetingCounters;
use crate::ledger::Ledger;
use crate::remote;
use crate::sink::FaultSink;
use crate::store::Store;
use crate::week;

pub const MEETING_ISSUE_TYPE: &str = "Meeting";
pub const ACTIVE_STATUS: &str = "Doing";

pub fn meetings_query(developer: &str) -> SearchQuery {
    SearchQuery::assignee(developer)
        .issue_type(MEETING_ISSUE_TYPE)
        .status(ACTIVE_STATUS)
}

pub async fn developer_meetings<S: Store>(ctx: Context<S>, developer: String) {
    let sink = ctx.sink.as_ref();
    let issues = remote::search(&ctx.client, &meetings_query(&developer), sink).await;
    debug!("meetings: {} meeting issues for {}", issues.issues.len(), developer);

    for issue in &issues.issues {
        let worklogs = remote::worklogs(&ctx.client, &issue.key, sink).await;
        fold_worklogs(&ctx.store, &developer, &worklogs, sink);
    }
}

/// Adds each unseen worklog's whole minutes to its week, then marks it.
pub fn fold_worklogs<S: Store>(
    store: &S,
    developer: &str,
    worklogs: &WorklogList,
    sink: &dyn FaultSink,
) {
    let ledger = Ledger::worklogs(store, developer);
    let meetings = MeetingCounters::new(store, developer);
    for worklog in &worklogs.worklogs {
        if ledger.is_processed(&worklog.id, sink) {
            continue;
        }
        let bucket = week::bucket(&worklog.created, TIMESTAMP_DELIMITER, sink);
        if meetings.add_minutes(bucket, worklog.minutes(), sink) {
            ledger.mark_processed(&worklog.id, sink);
        }
    }
}
