use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{parse_counter, Store, StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    sets: HashMap<String, BTreeSet<String>>,
    hashes: HashMap<String, BTreeMap<String, String>>,
}

/// Process-local store. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn sadd(&self, key: &str, member: &str) -> StoreResult<bool> {
        let mut state = self.lock()?;
        Ok(state
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        let state = self.lock()?;
        Ok(state
            .sets
            .get(key)
            .map(|set| set.contains(member))
            .unwrap_or(false))
    }

    fn scard(&self, key: &str) -> StoreResult<u64> {
        let state = self.lock()?;
        Ok(state.sets.get(key).map(|set| set.len() as u64).unwrap_or(0))
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        let state = self.lock()?;
        Ok(state
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn hincrby(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        let mut state = self.lock()?;
        let hash = state.hashes.entry(key.to_string()).or_default();
        let current = match hash.get(field) {
            Some(value) => parse_counter(key, field, value)?,
            None => 0,
        };
        let updated = current + delta;
        hash.insert(field.to_string(), updated.to_string());
        Ok(updated)
    }

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let state = self.lock()?;
        Ok(state
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field))
            .cloned())
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut state = self.lock()?;
        state
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        let state = self.lock()?;
        Ok(state
            .hashes
            .get(key)
            .map(|hash| {
                hash.iter()
                    .map(|(field, value)| (field.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::store::{contract, Store};

    #[test]
    fn set_primitives() {
        contract::sets(&MemoryStore::new());
    }

    #[test]
    fn hash_primitives() {
        contract::hashes(&MemoryStore::new());
    }

    #[test]
    fn hgetall_reads_only_the_requested_hash() {
        contract::hgetall_stays_within_one_hash(&MemoryStore::new());
    }

    #[test]
    fn non_integer_counters_are_rejected() {
        contract::non_integer_counters_are_rejected(&MemoryStore::new());
    }

    #[test]
    fn clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.sadd("data:teams", "core").unwrap();
        assert!(store.sismember("data:teams", "core").unwrap());
    }
}
