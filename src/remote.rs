//! Fetching and decoding with zero-value fallthrough.
//!
//! A failed request yields an empty body and a malformed body yields an empty
//! list, so a broken remote just looks like a developer with no issues.

use jira_api::{IssueList, JiraClient, SearchQuery, WorklogList};
use serde::de::DeserializeOwned;

use crate::sink::{absorb, Fault, FaultKind, FaultSink};

pub async fn fetch_search(client: &JiraClient, query: &SearchQuery, sink: &dyn FaultSink) -> String {
    let result = client.search_raw(query).await;
    absorb(
        sink,
        FaultKind::Transport,
        format!("search failed for [{}]", query.jql()),
        result,
    )
}

pub async fn fetch_worklogs(client: &JiraClient, issue_key: &str, sink: &dyn FaultSink) -> String {
    let result = client.worklogs_raw(issue_key).await;
    absorb(
        sink,
        FaultKind::Transport,
        format!("worklog fetch failed for {}", issue_key),
        result,
    )
}

pub fn decode_issues(raw: &str, sink: &dyn FaultSink) -> IssueList {
    decode(raw, "issue list", sink)
}

pub fn decode_worklogs(raw: &str, sink: &dyn FaultSink) -> WorklogList {
    decode(raw, "worklog list", sink)
}

/// An empty body already had its transport failure reported and decodes to
/// the default silently.
fn decode<T>(raw: &str, what: &str, sink: &dyn FaultSink) -> T
where
    T: DeserializeOwned + Default,
{
    if raw.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            sink.report(Fault::new(
                FaultKind::Decode,
                format!("could not decode {}", what),
                err,
            ));
            T::default()
        }
    }
}

pub async fn search(client: &JiraClient, query: &SearchQuery, sink: &dyn FaultSink) -> IssueList {
    let raw = fetch_search(client, query, sink).await;
    decode_issues(&raw, sink)
}

pub async fn worklogs(client: &JiraClient, issue_key: &str, sink: &dyn FaultSink) -> WorklogList {
    let raw = fetch_worklogs(client, issue_key, sink).await;
    decode_worklogs(&raw, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use jira_api::JiraConfig;
    use mockito::Matcher;

    #[test]
    fn malformed_json_decodes_to_empty_list() {
        let sink = MemorySink::new();
        let issues = decode_issues("{\"issues\": [", &sink);
        assert!(issues.issues.is_empty());
        assert_eq!(sink.count(FaultKind::Decode), 1);
    }

    #[test]
    fn wrong_shape_decodes_to_empty_list() {
        let sink = MemorySink::new();
        let worklogs = decode_worklogs("[1, 2, 3]", &sink);
        assert!(worklogs.worklogs.is_empty());
        assert_eq!(sink.count(FaultKind::Decode), 1);
    }

    #[test]
    fn empty_body_is_silent() {
        let sink = MemorySink::new();
        assert!(decode_issues("", &sink).issues.is_empty());
        assert!(sink.snapshot().is_empty());
    }

    #[tokio::test]
    async fn unreachable_remote_yields_empty_body() {
        let sink = MemorySink::new();
        // Nothing listens on the discard port.
        let client = JiraClient::new(JiraConfig::new("http://127.0.0.1:9/rest/api/2", "u", "p"))
            .expect("client builds");

        let issues = search(&client, &SearchQuery::assignee("jdoe"), &sink).await;

        assert!(issues.issues.is_empty());
        assert_eq!(sink.count(FaultKind::Transport), 1);
        assert_eq!(sink.count(FaultKind::Decode), 0);
    }

    #[tokio::test]
    async fn http_error_status_counts_as_transport_fault() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;
        let client = JiraClient::new(JiraConfig::new(server.url(), "u", "p")).expect("client builds");
        let sink = MemorySink::new();

        let raw = fetch_search(&client, &SearchQuery::assignee("jdoe"), &sink).await;

        assert_eq!(raw, "");
        let faults = sink.snapshot();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].kind, FaultKind::Transport);
        assert!(faults[0].context.contains("assignee = \"jdoe\""));
    }
}
