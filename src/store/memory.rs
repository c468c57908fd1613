//! # In-Memory Backend
//!
//! Keeps one collection in insertion order behind a lock. Each operation
//! holds the lock for its whole duration, so every call is atomic with
//! respect to the others.
//!
//! Clones share the same collection. A backend can be switched offline to
//! make every operation fail the way an unreachable server would.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::backend::{DocumentBackend, Query, Record, UpdateCounts};
use super::document::{merge_fields, Projection, ID_FIELD};
use super::errors::{StoreError, StoreResult};
use super::query::{values_equal, FilterSet};

#[derive(Debug)]
struct CollectionData {
    records: Vec<Record>,
    online: bool,
}

/// Collection held in process memory
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<CollectionData>>,
}

impl MemoryBackend {
    /// Create an empty, online collection
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(CollectionData {
                records: Vec::new(),
                online: true,
            })),
        }
    }

    /// Create a collection pre-loaded with records
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> StoreResult<Self> {
        let backend = Self::new();
        for record in records {
            backend.insert_one(record)?;
        }
        Ok(backend)
    }

    /// Simulate losing or regaining the server
    pub fn set_online(&self, online: bool) {
        match self.data.write() {
            Ok(mut data) => data.online = online,
            Err(poisoned) => poisoned.into_inner().online = online,
        }
    }

    /// Number of stored records, regardless of connectivity
    pub fn len(&self) -> usize {
        match self.data.read() {
            Ok(data) => data.records.len(),
            Err(poisoned) => poisoned.into_inner().records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_online(&self) -> StoreResult<RwLockReadGuard<'_, CollectionData>> {
        let data = self
            .data
            .read()
            .map_err(|_| StoreError::backend("collection lock poisoned"))?;
        if !data.online {
            return Err(StoreError::backend("server selection timed out: no reachable servers"));
        }
        Ok(data)
    }

    fn write_online(&self) -> StoreResult<RwLockWriteGuard<'_, CollectionData>> {
        let data = self
            .data
            .write()
            .map_err(|_| StoreError::backend("collection lock poisoned"))?;
        if !data.online {
            return Err(StoreError::backend("server selection timed out: no reachable servers"));
        }
        Ok(data)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn insert_one(&self, mut record: Record) -> StoreResult<Value> {
        let mut data = self.write_online()?;

        let id = match record.get(ID_FIELD) {
            Some(id) => {
                let taken = data
                    .records
                    .iter()
                    .any(|r| r.get(ID_FIELD).is_some_and(|existing| values_equal(existing, id)));
                if taken {
                    return Err(StoreError::backend(format!(
                        "duplicate key error: {} {}",
                        ID_FIELD, id
                    )));
                }
                id.clone()
            }
            None => {
                let id = Value::String(Uuid::new_v4().to_string());
                record.insert(ID_FIELD.to_string(), id.clone());
                id
            }
        };

        data.records.push(record);
        Ok(id)
    }

    fn find(
        &self,
        query: &Query,
        projection: Option<&Map<String, Value>>,
        limit: u64,
    ) -> StoreResult<Vec<Record>> {
        let filters = FilterSet::parse(query)?;
        let projection = projection.map(Projection::parse).transpose()?;
        let data = self.read_online()?;

        let take = if limit == 0 {
            usize::MAX
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        };
        Ok(data
            .records
            .iter()
            .filter(|r| filters.matches(r))
            .take(take)
            .map(|r| match &projection {
                Some(p) => p.apply(r),
                None => r.clone(),
            })
            .collect())
    }

    fn update_many(&self, query: &Query, fields: &Record) -> StoreResult<UpdateCounts> {
        let filters = FilterSet::parse(query)?;
        let mut data = self.write_online()?;

        // Stage the changes so a failing record leaves the collection untouched.
        let mut staged = Vec::new();
        for (index, record) in data.records.iter().enumerate() {
            if filters.matches(record) {
                let mut updated = record.clone();
                let changed = merge_fields(&mut updated, fields)?;
                staged.push((index, changed, updated));
            }
        }

        let mut counts = UpdateCounts::default();
        for (index, changed, updated) in staged {
            counts.matched += 1;
            if changed {
                counts.modified += 1;
                data.records[index] = updated;
            }
        }
        Ok(counts)
    }

    fn delete_many(&self, query: &Query) -> StoreResult<u64> {
        let filters = FilterSet::parse(query)?;
        let mut data = self.write_online()?;

        let before = data.records.len();
        data.records.retain(|r| !filters.matches(r));
        Ok((before - data.records.len()) as u64)
    }

    fn ping(&self) -> StoreResult<Record> {
        let _data = self.read_online()?;
        let mut reply = Map::new();
        reply.insert("ok".to_string(), json!(1.0));
        Ok(reply)
    }
}
