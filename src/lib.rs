//! Weekly delivery metrics collected from Jira.
//!
//! A report run pulls each configured developer's issue history, folds it into
//! per-week counters in a durable key-value store and derives stats from
//! them. Runs are best effort: every failure is reported to a [`FaultSink`]
//! and the run continues with zero values.

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod ledger;
pub mod remote;
pub mod reports;
pub mod sink;
pub mod store;
pub mod week;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, ConfigManager, Team};
pub use reports::{run, Context, Report};
pub use sink::{Fault, FaultKind, FaultSink, LogSink, MemorySink, SharedSink};
pub use store::{MemoryStore, RedbStore, Store, StoreError};
pub use week::WeekBucket;
