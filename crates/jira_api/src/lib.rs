//! Typed Jira REST client used by the metrics collector.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use models::{ChangeItem, ChangeLogEntry, History, Issue, IssueList, Worklog, WorklogList};
pub use query::{Clause, SearchQuery};
