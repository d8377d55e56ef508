//! Rejected-after-accepted over accepted, per developer and per team.
//!
//! No ledger: every run recomputes the ratio from the full history and
//! overwrites the current period's value.

use chrono::NaiveDate;
use std::collections::HashMap;
use jira_api::SearchQuery;
use log::info;

use super::Context;
use crate::aggregate::{count_transitions, keys};
use crate::config::Config;
use crate::coordinator::TaskGroup;
use crate::remote;
use crate::sink::{absorb, Fault, FaultKind, FaultSink};
use crate::store::Store;
use crate::week::WeekBucket;

/// `MM/DD/YYYY`, the field format of team ratios.
pub fn team_field(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Computes and stores one developer's ratio. Undefined ratios are stored as 0.
pub async fn developer_defect_ratio<S: Store>(
    ctx: Context<S>,
    developer: String,
    bucket: WeekBucket,
) -> f64 {
    let sink = ctx.sink.as_ref();
    let query = SearchQuery::assignee(&developer).with_history();
    let issues = remote::search(&ctx.client, &query, sink).await;
    let tally = count_transitions(&issues);

    let ratio = tally.ratio().unwrap_or_else(|| {
        sink.report(Fault::new(
            FaultKind::Arithmetic,
            format!("defect ratio for {}", developer),
            format!("{} rejected over 0 delivered, reporting 0", tally.rejected),
        ));
        0.0
    });

    absorb(
        sink,
        FaultKind::Store,
        format!("could not write defect ratio for {}", developer),
        ctx.store.hset(
            &keys::developer_defect_ratio(&developer),
            &bucket.to_string(),
            &ratio.to_string(),
        ),
    );
    ratio
}

/// Mean of the members' ratios. A team without members reports 0.
pub fn team_average(team: &str, ratios: &[f64], sink: &dyn FaultSink) -> f64 {
    if ratios.is_empty() {
        sink.report(Fault::new(
            FaultKind::Arithmetic,
            format!("defect ratio for team {}", team),
            "team has no members, reporting 0",
        ));
        return 0.0;
    }
    ratios.iter().sum::<f64>() / ratios.len() as f64
}

/// Fans out one unit per developer, then writes each team's average.
pub async fn run<S: Store>(config: &Config, ctx: &Context<S>, bucket: WeekBucket, today: NaiveDate) {
    let developers = config.developers();
    let mut group = TaskGroup::new("defectRatio", developers.len());
    for developer in developers {
        let developer = developer.to_string();
        let unit = developer_defect_ratio(ctx.clone(), developer.clone(), bucket);
        group.spawn(async move { (developer, unit.await) });
    }
    let ratios: HashMap<String, f64> = group.wait().await.outputs.into_iter().collect();

    let sink = ctx.sink.as_ref();
    let field = team_field(today);
    for team in &config.teams {
        let members: Vec<f64> = team
            .members
            .iter()
            .filter_map(|member| ratios.get(member).copied())
            .collect();
        let average = team_average(&team.name, &members, sink);
        info!("defect ratio for team {}: {}", team.name, average);
        absorb(
            sink,
            FaultKind::Store,
            format!("could not write defect ratio for team {}", team.name),
            ctx.store.hset(
                &keys::team_defect_ratio(&team.name),
                &field,
                &average.to_string(),
            ),
        );
    }
}
