//! # Record Store
//!
//! Authenticated, connection-checked access to one collection.
//!
//! # Failure policy
//!
//! - Construction either proves connectivity or fails.
//! - Contract violations (empty credentials, empty or non-mapping inputs)
//!   are returned as errors from every operation.
//! - Backend failures are logged and turned into the operation's empty
//!   value: `false`, no records, zero, or an empty mapping. The `try_*`
//!   variants return them as [`StoreError::Backend`] instead.
//!
//! Nothing is retried.

mod backend;
mod config;
mod document;
mod errors;
mod memory;
mod mongo;
mod query;

pub use backend::{DocumentBackend, Query, Record, UpdateCounts};
pub use config::{StoreConfig, DEFAULT_SERVER_SELECTION_TIMEOUT_MS, SERVER_SELECTION_TIMEOUT_OPTION};
pub use document::{Projection, ID_FIELD};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryBackend;
pub use mongo::MongoBackend;
pub use query::{FilterExpr, FilterOperator, FilterSet, QueryExpr};

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::observability::Event;

/// Façade over one collection of a document database
pub struct RecordStore<B: DocumentBackend = MongoBackend> {
    backend: B,
    database: String,
    collection: String,
}

impl RecordStore<MongoBackend> {
    /// Connect to the configured MongoDB deployment and probe it.
    ///
    /// Credentials are checked before any network traffic.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let backend = MongoBackend::connect(config)?;
        Self::with_backend(config, backend)
    }
}

impl<B: DocumentBackend> RecordStore<B> {
    /// Build a store over an existing backend and probe it
    pub fn with_backend(config: &StoreConfig, backend: B) -> StoreResult<Self> {
        config.validate()?;

        if let Err(e) = backend.ping() {
            let cause = match e {
                StoreError::Backend(reason) => reason,
                other => other.to_string(),
            };
            error!(
                event = %Event::StoreConnectFailed,
                uri = %config.connection_uri_redacted(),
                backend = backend.name(),
                error = %cause,
                "{}",
                Event::StoreConnectFailed.message()
            );
            return Err(StoreError::Connection(cause));
        }

        info!(
            event = %Event::StoreConnected,
            uri = %config.connection_uri_redacted(),
            backend = backend.name(),
            collection = %config.collection,
            "{}",
            Event::StoreConnected.message()
        );

        Ok(Self {
            backend,
            database: config.database.clone(),
            collection: config.collection.clone(),
        })
    }

    /// Database this store is bound to
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Collection this store is bound to
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Backend this store delegates to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ==================
    // Create
    // ==================

    /// Insert one record, returning the identifier assigned to it
    pub fn try_create(&self, record: Value) -> StoreResult<Value> {
        let record = match record {
            Value::Object(map) if !map.is_empty() => map,
            _ => return Err(self.reject("Record must be a non-empty mapping")),
        };
        self.backend.insert_one(record)
    }

    /// Insert one record. `Ok(false)` means the backend did not accept it.
    pub fn create(&self, record: Value) -> StoreResult<bool> {
        self.absorb(self.try_create(record).map(|_| true), Event::InsertFailed, false)
    }

    // ==================
    // Read
    // ==================

    /// Find matching records; `limit` 0 means unbounded
    pub fn try_read(
        &self,
        query: &Value,
        projection: Option<&Value>,
        limit: u64,
    ) -> StoreResult<Vec<Record>> {
        let query = self.mapping(query, "Query must be provided as a mapping")?;
        let projection = projection
            .map(|p| self.mapping(p, "Projection must be provided as a mapping"))
            .transpose()?;
        self.backend.find(query, projection, limit)
    }

    /// Find matching records. Backend failures read as no records.
    pub fn read(
        &self,
        query: &Value,
        projection: Option<&Value>,
        limit: u64,
    ) -> StoreResult<Vec<Record>> {
        self.absorb(self.try_read(query, projection, limit), Event::ReadFailed, Vec::new())
    }

    // ==================
    // Update
    // ==================

    /// Merge `fields` into every matching record
    pub fn try_update(&self, query: &Value, fields: &Value) -> StoreResult<UpdateCounts> {
        let query = self.non_empty_mapping(query, "Both query and update fields are required")?;
        let fields = self.non_empty_mapping(fields, "Both query and update fields are required")?;
        self.backend.update_many(query, fields)
    }

    /// Merge `fields` into every matching record, returning how many changed.
    ///
    /// Records that matched but already held the new values are not counted.
    pub fn update(&self, query: &Value, fields: &Value) -> StoreResult<u64> {
        self.absorb(
            self.try_update(query, fields).map(|counts| counts.modified),
            Event::UpdateFailed,
            0,
        )
    }

    // ==================
    // Delete
    // ==================

    /// Remove every matching record. An empty query is rejected.
    pub fn try_delete(&self, query: &Value) -> StoreResult<u64> {
        let query = self.non_empty_mapping(query, "Delete query cannot be empty")?;
        self.backend.delete_many(query)
    }

    /// Remove every matching record, returning how many were removed
    pub fn delete(&self, query: &Value) -> StoreResult<u64> {
        self.absorb(self.try_delete(query), Event::DeleteFailed, 0)
    }

    // ==================
    // Ping
    // ==================

    /// Run the liveness probe
    pub fn try_ping(&self) -> StoreResult<Record> {
        self.backend.ping()
    }

    /// Run the liveness probe; an empty mapping means it failed
    pub fn ping(&self) -> Record {
        match self.try_ping() {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    event = %Event::PingFailed,
                    collection = %self.collection,
                    error = %e,
                    "{}",
                    Event::PingFailed.message()
                );
                Map::new()
            }
        }
    }

    // ==================
    // Helpers
    // ==================

    fn absorb<T>(&self, result: StoreResult<T>, event: Event, empty: T) -> StoreResult<T> {
        match result {
            Err(StoreError::Backend(reason)) => {
                error!(
                    event = %event,
                    database = %self.database,
                    collection = %self.collection,
                    error = %reason,
                    "{}",
                    event.message()
                );
                Ok(empty)
            }
            other => other,
        }
    }

    fn reject(&self, reason: &str) -> StoreError {
        warn!(
            event = %Event::InputRejected,
            collection = %self.collection,
            reason,
            "{}",
            Event::InputRejected.message()
        );
        StoreError::validation(reason)
    }

    fn mapping<'a>(&self, value: &'a Value, reason: &str) -> StoreResult<&'a Map<String, Value>> {
        value.as_object().ok_or_else(|| self.reject(reason))
    }

    fn non_empty_mapping<'a>(
        &self,
        value: &'a Value,
        reason: &str,
    ) -> StoreResult<&'a Map<String, Value>> {
        match value.as_object() {
            Some(map) if !map.is_empty() => Ok(map),
            _ => Err(self.reject(reason)),
        }
    }
}
