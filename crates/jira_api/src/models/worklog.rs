use serde::Deserialize;

use super::id::deserialize_id;

/// Body of an `issue/<key>/worklog` response.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct WorklogList {
    pub worklogs: Vec<Worklog>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Worklog {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub created: String,
    pub started: Option<String>,
    pub time_spent_seconds: i64,
}

impl Worklog {
    /// Whole minutes logged, truncated.
    pub fn minutes(&self) -> i64 {
        self.time_spent_seconds / 60
    }
}

#[cfg(test)]
mod tests {
    use super::WorklogList;

    #[test]
    fn decodes_worklog_page() {
        let list: WorklogList = serde_json::from_str(
            r#"{"startAt":0,"total":1,"worklogs":[
                {"id":"100","created":"2024-03-04T10:00:00.000+0000","timeSpentSeconds":1800}
            ]}"#,
        )
        .expect("valid payload");
        assert_eq!(list.worklogs[0].id, "100");
        assert_eq!(list.worklogs[0].minutes(), 30);
    }

    #[test]
    fn partial_minutes_truncate() {
        let list: WorklogList =
            serde_json::from_str(r#"{"worklogs":[{"id":7,"timeSpentSeconds":119}]}"#)
                .expect("valid payload");
        assert_eq!(list.worklogs[0].id, "7");
        assert_eq!(list.worklogs[0].minutes(), 1);
    }
}
