mod id;
mod issue;
mod worklog;

pub use issue::{ChangeItem, ChangeLog, ChangeLogEntry, History, Issue, IssueFields, IssueList, NamedRef};
pub use worklog::{Worklog, WorklogList};
