//! Per-developer sets of remote ids that already contributed to an aggregate.
//!
//! Callers must update counters first and mark second. A crash between the
//! two leaves the id unmarked, so it is counted again on the next run:
//! at-least-once, not exactly-once.

use crate::aggregate::keys;
use crate::sink::{absorb, FaultKind, FaultSink};
use crate::store::Store;

pub struct Ledger<'a, S: Store> {
    store: &'a S,
    key: String,
}

impl<'a, S: Store> Ledger<'a, S> {
    /// Issues already folded into the velocity counters.
    pub fn velocity(store: &'a S, developer: &str) -> Self {
        Self {
            store,
            key: keys::velocity_log(developer),
        }
    }

    /// Worklogs already folded into the meeting minutes.
    pub fn worklogs(store: &'a S, developer: &str) -> Self {
        Self {
            store,
            key: keys::work_log(developer),
        }
    }

    /// A store failure reads as "not processed".
    pub fn is_processed(&self, id: &str, sink: &dyn FaultSink) -> bool {
        absorb(
            sink,
            FaultKind::Store,
            format!("could not match {} against {}", id, self.key),
            self.store.sismember(&self.key, id),
        )
    }

    pub fn mark_processed(&self, id: &str, sink: &dyn FaultSink) {
        absorb(
            sink,
            FaultKind::Store,
            format!("could not add {} to {}", id, self.key),
            self.store.sadd(&self.key, id).map(|_| ()),
        )
    }
}
