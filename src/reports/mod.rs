//! The `--report` pipelines and the fan-out that drives them.

pub mod defect_ratio;
pub mod meetings;
pub mod red_flags;
pub mod velocity;

use chrono::Local;
use clap::ValueEnum;
use jira_api::JiraClient;
use log::info;
use std::fmt;

use crate::aggregate::keys;
use crate::config::Config;
use crate::coordinator::TaskGroup;
use crate::sink::{absorb, FaultKind, FaultSink, SharedSink};
use crate::store::Store;
use crate::week::WeekBucket;

/// Delimiter between the date and time parts of Jira timestamps.
pub const TIMESTAMP_DELIMITER: &str = "T";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Report {
    #[value(name = "velocity")]
    Velocity,
    #[value(name = "meetings")]
    Meetings,
    #[value(name = "defectRatio")]
    DefectRatio,
    #[value(name = "redFlags")]
    RedFlags,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Report::Velocity => "velocity",
            Report::Meetings => "meetings",
            Report::DefectRatio => "defectRatio",
            Report::RedFlags => "redFlags",
        };
        f.write_str(name)
    }
}

/// What one unit of work needs. Each unit gets its own clone, and with it its
/// own store handle.
#[derive(Clone)]
pub struct Context<S: Store> {
    pub client: JiraClient,
    pub store: S,
    pub sink: SharedSink,
}

impl<S: Store> Context<S> {
    pub fn new(client: JiraClient, store: S, sink: SharedSink) -> Self {
        Self {
            client,
            store,
            sink,
        }
    }
}

/// Appends configured teams and developers to the known-member sets.
pub fn register_membership<S: Store>(config: &Config, store: &S, sink: &dyn FaultSink) {
    for team in &config.teams {
        absorb(
            sink,
            FaultKind::Store,
            format!("could not register team {}", team.name),
            store.sadd(keys::TEAMS, &team.name).map(|_| ()),
        );
        let team_key = keys::team_developers(&team.name);
        for developer in &team.members {
            absorb(
                sink,
                FaultKind::Store,
                format!("could not register developer {}", developer),
                store.sadd(keys::DEVELOPERS, developer).map(|_| ()),
            );
            absorb(
                sink,
                FaultKind::Store,
                format!("could not add {} to {}", developer, team_key),
                store.sadd(&team_key, developer).map(|_| ()),
            );
        }
    }
}

/// Runs one report to completion. Never fails: every fault goes to the sink.
pub async fn run<S: Store>(report: Report, config: &Config, ctx: &Context<S>) {
    info!(
        "running {} report for {} developers in {} teams",
        report,
        config.developer_count(),
        config.teams.len()
    );
    register_membership(config, &ctx.store, ctx.sink.as_ref());

    match report {
        Report::Velocity => {
            let mut group = TaskGroup::new("velocity", config.developer_count());
            for developer in config.developers() {
                group.spawn(velocity::developer_velocity(ctx.clone(), developer.to_string()));
            }
            group.wait().await;
        }
        Report::Meetings => {
            let mut group = TaskGroup::new("meetings", config.developer_count());
            for developer in config.developers() {
                group.spawn(meetings::developer_meetings(ctx.clone(), developer.to_string()));
            }
            group.wait().await;
        }
        Report::DefectRatio => {
            let today = Local::now().date_naive();
            defect_ratio::run(config, ctx, WeekBucket::from_date(today), today).await;
        }
        Report::RedFlags => {
            red_flags::run(config, ctx).await;
        }
    }
    info!("{} report finished", report);
}
