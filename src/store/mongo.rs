//! # MongoDB Backend
//!
//! Thin adapter over the driver's blocking API. Records cross the boundary
//! as relaxed extended JSON, so an ObjectId reads back as
//! `{"$oid": "<hex>"}` and the same shape can be used in a query.

use mongodb::bson::{doc, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::sync::{Client, Collection};
use serde_json::{Map, Value};

use super::backend::{DocumentBackend, Query, Record, UpdateCounts};
use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};

/// Database the liveness probe runs against
const ADMIN_DATABASE: &str = "admin";

/// Collection in a MongoDB deployment
pub struct MongoBackend {
    client: Client,
    collection: Collection<Document>,
}

impl MongoBackend {
    /// Build a client for the configured deployment.
    ///
    /// The driver connects lazily; nothing here touches the network.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let client = Client::with_uri_str(config.connection_uri())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        Ok(Self { client, collection })
    }
}

impl DocumentBackend for MongoBackend {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    fn insert_one(&self, record: Record) -> StoreResult<Value> {
        let document = to_document(record)?;
        let result = self
            .collection
            .insert_one(document, None)
            .map_err(StoreError::backend)?;
        Ok(result.inserted_id.into_relaxed_extjson())
    }

    fn find(
        &self,
        query: &Query,
        projection: Option<&Map<String, Value>>,
        limit: u64,
    ) -> StoreResult<Vec<Record>> {
        let filter = to_document(query.clone())?;

        let mut options = FindOptions::default();
        options.projection = projection.cloned().map(to_document).transpose()?;
        if limit > 0 {
            options.limit = Some(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let cursor = self
            .collection
            .find(filter, options)
            .map_err(StoreError::backend)?;

        cursor
            .map(|document| document.map(from_document).map_err(StoreError::backend))
            .collect()
    }

    fn update_many(&self, query: &Query, fields: &Record) -> StoreResult<UpdateCounts> {
        let filter = to_document(query.clone())?;
        let update = doc! { "$set": to_document(fields.clone())? };

        let result = self
            .collection
            .update_many(filter, update, None)
            .map_err(StoreError::backend)?;

        Ok(UpdateCounts {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    fn delete_many(&self, query: &Query) -> StoreResult<u64> {
        let filter = to_document(query.clone())?;
        let result = self
            .collection
            .delete_many(filter, None)
            .map_err(StoreError::backend)?;
        Ok(result.deleted_count)
    }

    fn ping(&self) -> StoreResult<Record> {
        let reply = self
            .client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "ping": 1 }, None)
            .map_err(StoreError::backend)?;
        Ok(from_document(reply))
    }
}

/// Parse a JSON object, honouring extended JSON such as `{"$oid": ...}`
fn to_document(map: Map<String, Value>) -> StoreResult<Document> {
    match Bson::try_from(Value::Object(map)).map_err(StoreError::backend)? {
        Bson::Document(document) => Ok(document),
        other => Err(StoreError::backend(format!(
            "expected a document, found {:?}",
            other.element_type()
        ))),
    }
}

fn from_document(document: Document) -> Record {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
