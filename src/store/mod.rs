//! Key-value storage for aggregates and dedup sets.
//!
//! The pipeline only needs a handful of Redis-style primitives over string
//! sets and string hashes; [`Store`] names exactly those. Handles are cheap to
//! clone and every unit of work gets its own.

mod embedded;
mod memory;

pub use embedded::RedbStore;
pub use memory::MemoryStore;

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("hash value is not an integer: {key} {field} = {value:?}")]
    InvalidCounter {
        key: String,
        field: String,
        value: String,
    },
}

pub(crate) fn backend<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Backend(err.to_string())
}

pub(crate) fn parse_counter(key: &str, field: &str, value: &str) -> StoreResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| StoreError::InvalidCounter {
            key: key.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })
}

pub trait Store: Clone + Send + Sync + 'static {
    /// Adds `member` to the set at `key`. Returns true when it was not yet present.
    fn sadd(&self, key: &str, member: &str) -> StoreResult<bool>;

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool>;

    fn scard(&self, key: &str) -> StoreResult<u64>;

    /// Members in ascending order.
    fn smembers(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Adds `delta` to the integer at `key`/`field` (missing counts as 0) and returns the new value.
    fn hincrby(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64>;

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// All fields of the hash at `key`, ordered by field.
    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>>;

    /// Integer read of a hash field; a missing field reads as 0.
    fn hget_int(&self, key: &str, field: &str) -> StoreResult<i64> {
        match self.hget(key, field)? {
            Some(value) => parse_counter(key, field, &value),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every backend must share.

    use super::{Store, StoreError};

    pub fn sets<S: Store>(store: &S) {
        assert!(store.sadd("data:developers", "jdoe").unwrap());
        assert!(!store.sadd("data:developers", "jdoe").unwrap());
        assert!(store.sadd("data:developers", "asmith").unwrap());
        assert!(store.sadd("data:teams", "core").unwrap());

        assert!(store.sismember("data:developers", "jdoe").unwrap());
        assert!(!store.sismember("data:developers", "core").unwrap());
        assert!(!store.sismember("missing", "jdoe").unwrap());
        assert_eq!(store.scard("data:developers").unwrap(), 2);
        assert_eq!(store.scard("missing").unwrap(), 0);
        assert_eq!(
            store.smembers("data:developers").unwrap(),
            vec!["asmith".to_string(), "jdoe".to_string()]
        );
    }

    pub fn hashes<S: Store>(store: &S) {
        let key = "data:velocity:developer:jdoe";
        assert_eq!(store.hget(key, "10:2024:TOTAL").unwrap(), None);
        assert_eq!(store.hget_int(key, "10:2024:TOTAL").unwrap(), 0);
        assert_eq!(store.hincrby(key, "10:2024:TOTAL", 3600).unwrap(), 3600);
        assert_eq!(store.hincrby(key, "10:2024:TOTAL", 1800).unwrap(), 5400);
        assert_eq!(store.hincrby(key, "10:2024:ENTRIES", 1).unwrap(), 1);
        assert_eq!(store.hget_int(key, "10:2024:TOTAL").unwrap(), 5400);

        store.hset("stats:defectRatio:team:core", "03/04/2024", "0.5").unwrap();
        store.hset("stats:defectRatio:team:core", "03/04/2024", "0.25").unwrap();
        assert_eq!(
            store.hget("stats:defectRatio:team:core", "03/04/2024").unwrap(),
            Some("0.25".to_string())
        );
        assert_eq!(
            store.hgetall(key).unwrap(),
            vec![
                ("10:2024:ENTRIES".to_string(), "1".to_string()),
                ("10:2024:TOTAL".to_string(), "5400".to_string()),
            ]
        );
    }

    pub fn hgetall_stays_within_one_hash<S: Store>(store: &S) {
        store.hset("stats:velocity:developer:jdo", "10:2024", "1").unwrap();
        store.hset("stats:velocity:developer:jdoe", "10:2024", "2").unwrap();
        store.hset("stats:velocity:developer:jdoe", "", "empty").unwrap();
        store.hset("stats:velocity:developer:jdoe2", "10:2024", "3").unwrap();
        assert_eq!(
            store.hgetall("stats:velocity:developer:jdoe").unwrap(),
            vec![
                ("".to_string(), "empty".to_string()),
                ("10:2024".to_string(), "2".to_string()),
            ]
        );
        assert!(store.hgetall("stats:velocity:developer:j").unwrap().is_empty());
    }

    pub fn non_integer_counters_are_rejected<S: Store>(store: &S) {
        store.hset("h", "f", "0.25").unwrap();
        let err = store.hincrby("h", "f", 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidCounter { .. }));
        assert_eq!(store.hget("h", "f").unwrap(), Some("0.25".to_string()));
        assert!(store.hget_int("h", "f").is_err());
    }
}
