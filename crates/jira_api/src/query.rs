//! Structured builder for Jira `search` requests.
//!
//! Values are quoted and escaped at the JQL level here; URL encoding is left to
//! the HTTP client's query serializer.

use crate::config::DEFAULT_MAX_RESULTS;

/// One `AND`-joined JQL clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Equals { field: String, value: String },
    Empty { field: String },
    UpdatedWithinDays(u32),
}

impl Clause {
    fn render(&self) -> String {
        match self {
            Clause::Equals { field, value } => format!("{} = {}", field, quote(value)),
            Clause::Empty { field } => format!("{} is EMPTY", field),
            Clause::UpdatedWithinDays(days) => format!("updated >= -{}d", days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    clauses: Vec<Clause>,
    max_results: Option<u32>,
    expand_changelog: bool,
    order_by: Option<String>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            max_results: None,
            expand_changelog: false,
            order_by: None,
        }
    }

    pub fn assignee(developer: impl Into<String>) -> Self {
        Self::new().equals("assignee", developer)
    }

    pub fn project(project: impl Into<String>) -> Self {
        Self::new().equals("project", project)
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause::Equals {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn issue_type(self, issue_type: impl Into<String>) -> Self {
        self.equals("issueType", issue_type)
    }

    pub fn status(self, status: impl Into<String>) -> Self {
        self.equals("status", status)
    }

    pub fn field_empty(mut self, field: impl Into<String>) -> Self {
        self.clauses.push(Clause::Empty {
            field: field.into(),
        });
        self
    }

    pub fn updated_within_days(mut self, days: u32) -> Self {
        self.clauses.push(Clause::UpdatedWithinDays(days));
        self
    }

    pub fn max_results(mut self, max: u32) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Full-history search: default page size, changelog expanded, oldest first.
    pub fn with_history(self) -> Self {
        self.max_results(DEFAULT_MAX_RESULTS)
            .expand_changelog()
            .order_by("created")
    }

    pub fn expand_changelog(mut self) -> Self {
        self.expand_changelog = true;
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn jql(&self) -> String {
        self.clauses
            .iter()
            .map(Clause::render)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Query-string parameters for the `search` endpoint, unencoded.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("jql", self.jql())];
        if let Some(max) = self.max_results {
            params.push(("maxResults", max.to_string()));
        }
        if self.expand_changelog {
            params.push(("expand", "changelog".to_string()));
        }
        if let Some(order) = &self.order_by {
            params.push(("orderby", order.clone()));
        }
        params
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::SearchQuery;

    #[test]
    fn assignee_history_query_matches_search_parameters() {
        let query = SearchQuery::assignee("jdoe").with_history();
        assert_eq!(
            query.params(),
            vec![
                ("jql", "assignee = \"jdoe\"".to_string()),
                ("maxResults", "2000".to_string()),
                ("expand", "changelog".to_string()),
                ("orderby", "created".to_string()),
            ]
        );
    }

    #[test]
    fn clauses_join_with_and() {
        let query = SearchQuery::assignee("jdoe").issue_type("Meeting").status("Doing");
        assert_eq!(
            query.jql(),
            "assignee = \"jdoe\" AND issueType = \"Meeting\" AND status = \"Doing\""
        );
        assert_eq!(query.params().len(), 1);
    }

    #[test]
    fn values_are_quoted_and_escaped() {
        let query = SearchQuery::assignee("o\"brien\\x OR 1=1");
        assert_eq!(query.jql(), "assignee = \"o\\\"brien\\\\x OR 1=1\"");
    }

    #[test]
    fn empty_and_recency_clauses_render() {
        let query = SearchQuery::project("CORE")
            .field_empty("fixVersion")
            .updated_within_days(1);
        assert_eq!(
            query.jql(),
            "project = \"CORE\" AND fixVersion is EMPTY AND updated >= -1d"
        );
    }
}
