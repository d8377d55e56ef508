use serde::Deserialize;

use super::id::deserialize_id;

/// Body of a `search` response.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IssueList {
    pub issues: Vec<Issue>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Issue {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub key: String,
    pub fields: IssueFields,
    pub changelog: ChangeLog,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueFields {
    pub summary: Option<String>,
    /// Logged time in seconds.
    #[serde(rename = "timespent")]
    pub time_spent: Option<i64>,
    /// Story-point estimate.
    #[serde(rename = "customfield_10004")]
    pub estimate: Option<f64>,
    pub status: Option<NamedRef>,
    pub fix_versions: Vec<NamedRef>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ChangeLog {
    pub histories: Vec<History>,
}

/// One changelog history: a timestamp and the field transitions made at that moment.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct History {
    pub created: String,
    pub items: Vec<ChangeItem>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ChangeItem {
    pub field: String,
    #[serde(rename = "fromString")]
    pub from: Option<String>,
    #[serde(rename = "toString")]
    pub to: Option<String>,
}

impl ChangeItem {
    /// True for a `status` transition into `status`.
    pub fn is_status_to(&self, status: &str) -> bool {
        self.field == "status" && self.to.as_deref() == Some(status)
    }

    pub fn is_status_change(&self, from: &str, to: &str) -> bool {
        self.is_status_to(to) && self.from.as_deref() == Some(from)
    }
}

/// A flattened transition event: one changelog item with its history timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogEntry {
    pub timestamp: String,
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Issue {
    pub fn time_spent(&self) -> i64 {
        self.fields.time_spent.unwrap_or(0)
    }

    /// Changelog items in decode order, each paired with its history timestamp.
    pub fn change_log_entries(&self) -> Vec<ChangeLogEntry> {
        self.changelog
            .histories
            .iter()
            .flat_map(|history| {
                history.items.iter().map(move |item| ChangeLogEntry {
                    timestamp: history.created.clone(),
                    field: item.field.clone(),
                    from: item.from.clone(),
                    to: item.to.clone(),
                })
            })
            .collect()
    }
}
