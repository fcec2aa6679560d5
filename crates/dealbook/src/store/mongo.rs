//! MongoDB-backed document store
//!
//! Documents cross the boundary as extended JSON, so `{"$oid": ..}` and
//! `{"$date": ..}` values become native BSON types on the way in and come
//! back in the same shape on the way out.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document as BsonDocument};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde_json::Value;

use super::{Condition, Document, DocumentKey, DocumentStore, Filter, StoreError, Update};

/// Application name reported to the cluster
pub const APP_NAME: &str = "dealbook";

pub struct MongoStore {
  database: Database,
  collection: Collection<BsonDocument>,
}

impl MongoStore {
  /// Connect to the cluster at `uri` and verify it answers a ping
  pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
    let mut options = ClientOptions::parse(uri)
      .await
      .map_err(|e| StoreError::Connection { message: e.to_string() })?;
    options.app_name = Some(APP_NAME.to_string());

    let client =
      Client::with_options(options).map_err(|e| StoreError::Connection { message: e.to_string() })?;

    let db = client.database(database);
    db.run_command(doc! { "ping": 1 })
      .await
      .map_err(|e| StoreError::Connection { message: e.to_string() })?;

    tracing::info!(database, collection, "connected to MongoDB");
    Ok(Self { collection: db.collection(collection), database: db })
  }

  /// Another collection in the same database, sharing the connection pool
  pub fn sibling(&self, collection: &str) -> Self {
    Self { database: self.database.clone(), collection: self.database.collection(collection) }
  }
}

fn query_error(e: mongodb::error::Error) -> StoreError {
  StoreError::Query { message: e.to_string() }
}

fn to_bson_document(doc: Document) -> Result<BsonDocument, StoreError> {
  match Bson::try_from(Value::Object(doc)) {
    Ok(Bson::Document(converted)) => Ok(converted),
    Ok(other) => {
      Err(StoreError::InvalidDocument { message: format!("expected a document, got {other}") })
    }
    Err(e) => Err(StoreError::Conversion { message: e.to_string() }),
  }
}

fn to_bson_value(value: Value) -> Result<Bson, StoreError> {
  Bson::try_from(value).map_err(|e| StoreError::Conversion { message: e.to_string() })
}

fn from_bson_document(doc: BsonDocument) -> Result<Document, StoreError> {
  match Bson::Document(doc).into_relaxed_extjson() {
    Value::Object(map) => Ok(map),
    other => {
      Err(StoreError::Conversion { message: format!("expected a JSON object, got {other}") })
    }
  }
}

fn filter_document(filter: &Filter) -> Result<BsonDocument, StoreError> {
  let mut query = BsonDocument::new();
  for (field, condition) in filter.conditions() {
    let test = match condition {
      Condition::Eq(value) => to_bson_value(value.clone())?,
      Condition::Present => Bson::Document(doc! { "$exists": true, "$ne": Bson::Null }),
    };
    query.insert(field.clone(), test);
  }
  Ok(query)
}

fn update_document(update: Update) -> Result<BsonDocument, StoreError> {
  match update {
    Update::Set(fields) => {
      let set = to_bson_document(fields)?;
      Ok(doc! { "$set": set })
    }
    Update::Push { field, value } => {
      let mut push = BsonDocument::new();
      push.insert(field, to_bson_value(value)?);
      Ok(doc! { "$push": push })
    }
  }
}

fn key_from_bson(id: Bson) -> Result<DocumentKey, StoreError> {
  let value = id.into_relaxed_extjson();
  DocumentKey::from_value(&value)
    .ok_or_else(|| StoreError::Conversion { message: format!("unsupported inserted id: {value}") })
}

#[async_trait]
impl DocumentStore for MongoStore {
  async fn insert_one(&self, doc: Document) -> Result<DocumentKey, StoreError> {
    let result = self.collection.insert_one(to_bson_document(doc)?).await.map_err(query_error)?;
    key_from_bson(result.inserted_id)
  }

  async fn insert_many(&self, docs: Vec<Document>) -> Result<usize, StoreError> {
    if docs.is_empty() {
      return Ok(0);
    }
    let converted = docs.into_iter().map(to_bson_document).collect::<Result<Vec<_>, _>>()?;
    let result = self.collection.insert_many(converted).await.map_err(query_error)?;
    Ok(result.inserted_ids.len())
  }

  async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
    let cursor = self.collection.find(filter_document(filter)?).await.map_err(query_error)?;
    let docs: Vec<BsonDocument> = cursor.try_collect().await.map_err(query_error)?;
    docs.into_iter().map(from_bson_document).collect()
  }

  async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
    let found = self.collection.find_one(filter_document(filter)?).await.map_err(query_error)?;
    found.map(from_bson_document).transpose()
  }

  async fn update_one(&self, filter: &Filter, update: Update) -> Result<bool, StoreError> {
    let result = self
      .collection
      .update_one(filter_document(filter)?, update_document(update)?)
      .await
      .map_err(query_error)?;
    Ok(result.matched_count > 0)
  }

  async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
    self.collection.count_documents(filter_document(filter)?).await.map_err(query_error)
  }
}
