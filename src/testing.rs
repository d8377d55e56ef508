//! Shared test doubles.

use crate::store::{Store, StoreError, StoreResult};

/// A store whose every command fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingStore;

fn refused<T>() -> StoreResult<T> {
    Err(StoreError::Backend("connection refused".to_string()))
}

impl Store for FailingStore {
    fn sadd(&self, _key: &str, _member: &str) -> StoreResult<bool> {
        refused()
    }

    fn sismember(&self, _key: &str, _member: &str) -> StoreResult<bool> {
        refused()
    }

    fn scard(&self, _key: &str) -> StoreResult<u64> {
        refused()
    }

    fn smembers(&self, _key: &str) -> StoreResult<Vec<String>> {
        refused()
    }

    fn hincrby(&self, _key: &str, _field: &str, _delta: i64) -> StoreResult<i64> {
        refused()
    }

    fn hget(&self, _key: &str, _field: &str) -> StoreResult<Option<String>> {
        refused()
    }

    fn hset(&self, _key: &str, _field: &str, _value: &str) -> StoreResult<()> {
        refused()
    }

    fn hgetall(&self, _key: &str) -> StoreResult<Vec<(String, String)>> {
        refused()
    }
}
