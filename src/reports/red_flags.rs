//! Read-only hygiene checks. Findings are logged, nothing is stored.

use chrono::{Duration, Local, NaiveDate};
use jira_api::{IssueList, SearchQuery};
use log::{info, warn};
use std::fmt;

use super::{Context, TIMESTAMP_DELIMITER};
use crate::config::Config;
use crate::coordinator::TaskGroup;
use crate::remote;
use crate::sink::{Fault, FaultKind, FaultSink};
use crate::store::Store;

const ACTIVE_STATUS: &str = "Doing";
const FINISHED_STATUS: &str = "Finished";
const ESTIMATE_FIELD: &str = "cf[10004]";
const EDIT_WINDOW_DAYS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Active stories without a story-point estimate.
    NoEstimate,
    /// Finished stories with no time logged.
    NoLoggedTime,
    /// Active stories not scheduled into a release.
    NoFixVersion,
}

impl Check {
    pub const ALL: [Check; 3] = [Check::NoEstimate, Check::NoLoggedTime, Check::NoFixVersion];

    pub fn query(&self, developer: &str) -> SearchQuery {
        let base = SearchQuery::assignee(developer);
        match self {
            Check::NoEstimate => base.status(ACTIVE_STATUS).field_empty(ESTIMATE_FIELD),
            Check::NoLoggedTime => base.status(FINISHED_STATUS).field_empty("timespent"),
            Check::NoFixVersion => base.status(ACTIVE_STATUS).field_empty("fixVersion"),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Check::NoEstimate => "active story with no estimate",
            Check::NoLoggedTime => "finished story with no logged time",
            Check::NoFixVersion => "active story with no fix version",
        };
        f.write_str(label)
    }
}

/// Runs one check for one developer and returns the offending issue keys.
pub async fn developer_check<S: Store>(ctx: Context<S>, developer: String, check: Check) -> Vec<String> {
    let issues = remote::search(&ctx.client, &check.query(&developer), ctx.sink.as_ref()).await;
    let keys: Vec<String> = issues.issues.into_iter().map(|issue| issue.key).collect();
    for key in &keys {
        warn!("red flag: {}: {} ({})", check, key, developer);
    }
    keys
}

pub fn story_edits_query(project: &str) -> SearchQuery {
    SearchQuery::project(project)
        .status(ACTIVE_STATUS)
        .updated_within_days(EDIT_WINDOW_DAYS)
        .expand_changelog()
}

/// `(issue key, edited field)` for every non-status change made to an issue
/// on or after `since`. Entries with an unreadable date are reported and skipped.
pub fn story_edits(issues: &IssueList, since: NaiveDate, sink: &dyn FaultSink) -> Vec<(String, String)> {
    let mut edits = Vec::new();
    for issue in &issues.issues {
        for entry in issue.change_log_entries() {
            if entry.field == "status" {
                continue;
            }
            let date = entry.timestamp.split(TIMESTAMP_DELIMITER).next().unwrap_or_default();
            match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(date) if date >= since => edits.push((issue.key.clone(), entry.field)),
                Ok(_) => {}
                Err(err) => sink.report(Fault::new(
                    FaultKind::Parse,
                    format!("could not date the {} edit on {}", entry.field, issue.key),
                    format!("{:?}: {}", entry.timestamp, err),
                )),
            }
        }
    }
    edits
}

/// Lists stories that were edited while already in progress.
pub async fn project_story_edits<S: Store>(ctx: Context<S>, project: String) -> Vec<(String, String)> {
    let sink = ctx.sink.as_ref();
    let issues = remote::search(&ctx.client, &story_edits_query(&project), sink).await;
    let since = Local::now().date_naive() - Duration::days(i64::from(EDIT_WINDOW_DAYS));
    let edits = story_edits(&issues, since, sink);
    for (key, field) in &edits {
        warn!("red flag: active story edited: {} changed {} ({})", key, field, project);
    }
    edits
}

/// Three units per developer, then one unit per project.
pub async fn run<S: Store>(config: &Config, ctx: &Context<S>) {
    let mut developers = TaskGroup::new("redFlags", config.developer_count() * Check::ALL.len());
    for developer in config.developers() {
        for check in Check::ALL {
            developers.spawn(developer_check(ctx.clone(), developer.to_string(), check));
        }
    }
    let flagged: usize = developers.wait().await.outputs.iter().map(Vec::len).sum();

    let mut projects = TaskGroup::new("storyEdits", config.projects.len());
    for project in &config.projects {
        projects.spawn(project_story_edits(ctx.clone(), project.clone()));
    }
    let edited: usize = projects.wait().await.outputs.iter().map(Vec::len).sum();

    info!("red flags: {} flagged stories, {} in-progress edits", flagged, edited);
}
