//! # Document Backend
//!
//! The seam between [`RecordStore`](super::RecordStore) and a concrete
//! document database client. Backends report every failure as
//! [`StoreError::Backend`](super::StoreError::Backend); deciding whether a
//! failure reaches the caller is the store's job.

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::StoreResult;

/// One document, keyed by field name
pub type Record = Map<String, Value>;

/// Field-to-condition mapping selecting records
pub type Query = Map<String, Value>;

/// Outcome of a multi-record update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateCounts {
    /// Records selected by the query
    pub matched: u64,
    /// Records whose stored values actually changed
    pub modified: u64,
}

/// Primitive operations of a document collection
pub trait DocumentBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Insert one record, returning the identifier the backend assigned
    fn insert_one(&self, record: Record) -> StoreResult<Value>;

    /// Find matching records in natural order; `limit` 0 means unbounded
    fn find(&self, query: &Query, projection: Option<&Map<String, Value>>, limit: u64)
        -> StoreResult<Vec<Record>>;

    /// Merge `fields` into every matching record
    fn update_many(&self, query: &Query, fields: &Record) -> StoreResult<UpdateCounts>;

    /// Remove every matching record, returning how many were removed
    fn delete_many(&self, query: &Query) -> StoreResult<u64>;

    /// Round-trip liveness probe returning the server's reply
    fn ping(&self) -> StoreResult<Record>;
}

impl<B: DocumentBackend + ?Sized> DocumentBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn insert_one(&self, record: Record) -> StoreResult<Value> {
        (**self).insert_one(record)
    }

    fn find(
        &self,
        query: &Query,
        projection: Option<&Map<String, Value>>,
        limit: u64,
    ) -> StoreResult<Vec<Record>> {
        (**self).find(query, projection, limit)
    }

    fn update_many(&self, query: &Query, fields: &Record) -> StoreResult<UpdateCounts> {
        (**self).update_many(query, fields)
    }

    fn delete_many(&self, query: &Query) -> StoreResult<u64> {
        (**self).delete_many(query)
    }

    fn ping(&self) -> StoreResult<Record> {
        (**self).ping()
    }
}
