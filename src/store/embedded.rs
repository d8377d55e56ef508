//! Durable store on an embedded redb database.
//!
//! Two tables back the whole keyspace:
//! ```text
//! sets    multimap  key            -> member
//! hashes  table     (key, field)   -> value (string)
//! ```
//! Every primitive runs in its own transaction, so a counter increment is
//! atomic but a counter update followed by a set insert is not.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, MultimapTableDefinition, ReadableTable, TableDefinition};

use super::{backend, parse_counter, Store, StoreResult};

const SETS: MultimapTableDefinition<&str, &str> = MultimapTableDefinition::new("sets");
const HASHES: TableDefinition<(&str, &str), &str> = TableDefinition::new("hashes");

/// Handle to a redb file. Clones are independent handles onto the same database.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Opens or creates the database at `path` and makes sure both tables exist.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(backend)?;
            }
        }
        let db = Database::create(path).map_err(backend)?;
        let wt = db.begin_write().map_err(backend)?;
        {
            wt.open_multimap_table(SETS).map_err(backend)?;
            wt.open_table(HASHES).map_err(backend)?;
        }
        wt.commit().map_err(backend)?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl Store for RedbStore {
    fn sadd(&self, key: &str, member: &str) -> StoreResult<bool> {
        let wt = self.db.begin_write().map_err(backend)?;
        let existed = {
            let mut table = wt.open_multimap_table(SETS).map_err(backend)?;
            table.insert(key, member).map_err(backend)?
        };
        wt.commit().map_err(backend)?;
        Ok(!existed)
    }

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        let rt = self.db.begin_read().map_err(backend)?;
        let table = rt.open_multimap_table(SETS).map_err(backend)?;
        for value in table.get(key).map_err(backend)? {
            if value.map_err(backend)?.value() == member {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn scard(&self, key: &str) -> StoreResult<u64> {
        Ok(self.smembers(key)?.len() as u64)
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        let rt = self.db.begin_read().map_err(backend)?;
        let table = rt.open_multimap_table(SETS).map_err(backend)?;
        let mut members = Vec::new();
        for value in table.get(key).map_err(backend)? {
            members.push(value.map_err(backend)?.value().to_string());
        }
        Ok(members)
    }

    fn hincrby(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
        let wt = self.db.begin_write().map_err(backend)?;
        let updated = {
            let mut table = wt.open_table(HASHES).map_err(backend)?;
            let current = match table.get((key, field)).map_err(backend)? {
                Some(value) => parse_counter(key, field, value.value())?,
                None => 0,
            };
            let updated = current + delta;
            table
                .insert((key, field), updated.to_string().as_str())
                .map_err(backend)?;
            updated
        };
        wt.commit().map_err(backend)?;
        Ok(updated)
    }

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let rt = self.db.begin_read().map_err(backend)?;
        let table = rt.open_table(HASHES).map_err(backend)?;
        let value = table.get((key, field)).map_err(backend)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let wt = self.db.begin_write().map_err(backend)?;
        {
            let mut table = wt.open_table(HASHES).map_err(backend)?;
            table.insert((key, field), value).map_err(backend)?;
        }
        wt.commit().map_err(backend)?;
        Ok(())
    }

    fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        let rt = self.db.begin_read().map_err(backend)?;
        let table = rt.open_table(HASHES).map_err(backend)?;
        let mut fields = Vec::new();
        // Fields of one hash are contiguous, starting at (key, "").
        for entry in table.range((key, "")..).map_err(backend)? {
            let (k, v) = entry.map_err(backend)?;
            let (hash_key, field) = k.value();
            if hash_key != key {
                break;
            }
            fields.push((field.to_string(), v.value().to_string()));
        }
        Ok(fields)
    }
}
