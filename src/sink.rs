//! Non-fatal fault reporting.
//!
//! Every stage of a report run swallows its errors: the error is handed to a
//! [`FaultSink`] and the stage continues with a zero value. Nothing here ever
//! aborts a unit of work.

use log::{debug, warn};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Connection, authentication or read failure against the remote API.
    Transport,
    /// Response body that does not decode into the expected shape.
    Decode,
    /// Timestamp that cannot be bucketed.
    Parse,
    /// Key-value store command failure.
    Store,
    /// Division with a zero denominator.
    Arithmetic,
    /// Unreadable or unparsable configuration file.
    Config,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FaultKind::Transport => "transport",
            FaultKind::Decode => "decode",
            FaultKind::Parse => "parse",
            FaultKind::Store => "store",
            FaultKind::Arithmetic => "arithmetic",
            FaultKind::Config => "config",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub kind: FaultKind,
    pub context: String,
    pub detail: String,
}

impl Fault {
    pub fn new(kind: FaultKind, context: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            kind,
            context: context.into(),
            detail: detail.to_string(),
        }
    }
}

pub trait FaultSink: Send + Sync {
    fn report(&self, fault: Fault);
}

/// Shared handle passed into every component.
pub type SharedSink = Arc<dyn FaultSink>;

/// Reports `result`'s error to `sink` and falls through to `T::default()`.
pub fn absorb<T, E>(
    sink: &dyn FaultSink,
    kind: FaultKind,
    context: impl Into<String>,
    result: Result<T, E>,
) -> T
where
    T: Default,
    E: fmt::Display,
{
    match result {
        Ok(value) => value,
        Err(err) => {
            sink.report(Fault::new(kind, context, err));
            T::default()
        }
    }
}

/// Logs faults: a redacted summary at `warn`, the raw detail at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl FaultSink for LogSink {
    fn report(&self, fault: Fault) {
        warn!(
            "{} fault: {}: {}",
            fault.kind,
            fault.context,
            redact_log_details(&fault.detail)
        );
        debug!("{} fault details: {}", fault.kind, fault.detail);
    }
}

/// Records faults in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    faults: Arc<Mutex<Vec<Fault>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Fault> {
        match self.faults.lock() {
            Ok(faults) => faults.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, kind: FaultKind) -> usize {
        self.snapshot().iter().filter(|f| f.kind == kind).count()
    }
}

impl FaultSink for MemorySink {
    fn report(&self, fault: Fault) {
        match self.faults.lock() {
            Ok(mut faults) => faults.push(fault),
            Err(poisoned) => poisoned.into_inner().push(fault),
        }
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_text(value: &str, limit: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    if limit <= 1 {
        return "…".to_string();
    }
    let mut truncated: String = trimmed.chars().take(limit - 1).collect();
    truncated.push('…');
    truncated
}

/// Collapses and truncates an error detail, hiding it entirely when it looks
/// like it carries credentials.
pub fn redact_log_details(value: &str) -> String {
    let collapsed = collapse_whitespace(value);
    let category = collapsed
        .split(':')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .unwrap_or("error");
    let lowered = collapsed.to_lowercase();
    let has_sensitive_hint = ["password", "authorization", "basic ", "token", "set-cookie"]
        .iter()
        .any(|hint| lowered.contains(hint));

    if has_sensitive_hint {
        return format!(
            "{}: <redacted-sensitive-details>",
            truncate_text(category, 64)
        );
    }

    truncate_text(&collapsed, 180)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_passes_through_ok_values() {
        let sink = MemorySink::new();
        let value: i64 = absorb(&sink, FaultKind::Store, "hget", Ok::<_, String>(7));
        assert_eq!(value, 7);
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn absorb_reports_and_returns_default() {
        let sink = MemorySink::new();
        let value: String = absorb(&sink, FaultKind::Transport, "search", Err("refused"));
        assert_eq!(value, "");
        let faults = sink.snapshot();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].kind, FaultKind::Transport);
        assert_eq!(faults[0].context, "search");
        assert_eq!(faults[0].detail, "refused");
    }

    #[test]
    fn redaction_hides_credential_details() {
        let redacted = redact_log_details("http 401: Authorization: Basic abc==");
        assert_eq!(redacted, "http 401: <redacted-sensitive-details>");
    }

    #[test]
    fn redaction_collapses_and_truncates() {
        let long = format!("network error:\n  {}", "x".repeat(400));
        let redacted = redact_log_details(&long);
        assert!(redacted.starts_with("network error: x"));
        assert_eq!(redacted.chars().count(), 180);
        assert!(redacted.ends_with('…'));
    }
}
