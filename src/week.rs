//! ISO week bucketing of Jira timestamps.

use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

use crate::sink::{Fault, FaultKind, FaultSink};

/// `(ISO week, ISO year)` aggregation key. Renders as `<week>:<year>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekBucket {
    pub week: u32,
    pub year: i32,
}

impl WeekBucket {
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            week: iso.week(),
            year: iso.year(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }
}

impl fmt::Display for WeekBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.week, self.year)
    }
}

/// Buckets the date prefix of `timestamp` (text before the first `delimiter`).
///
/// An unparsable date is reported and bucketed as `0:0`; callers keep going
/// with that key.
pub fn bucket(timestamp: &str, delimiter: &str, sink: &dyn FaultSink) -> WeekBucket {
    let date_part = timestamp.split(delimiter).next().unwrap_or_default();
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => WeekBucket::from_date(date),
        Err(err) => {
            sink.report(Fault::new(
                FaultKind::Parse,
                format!("could not parse time string {:?}", timestamp),
                err,
            ));
            WeekBucket::default()
        }
    }
}
