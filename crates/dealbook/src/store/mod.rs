//! Document store abstraction
//!
//! One collection of loosely-typed JSON documents. Queries are exact-match
//! filters on named fields, mutations are single-document updates. The
//! backends (in-memory, MongoDB) can be swapped without touching the
//! services built on top.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

pub mod key;
pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;

pub use key::DocumentKey;
pub use memory::MemoryStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;

/// A stored record
pub type Document = Map<String, Value>;

/// Store handle shared between services
pub type SharedStore = Arc<dyn DocumentStore>;

/// Field holding the document key
pub const KEY_FIELD: &str = "_id";

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Failed to connect to document store: {message}")]
  Connection { message: String },

  #[error("Document store query failed: {message}")]
  Query { message: String },

  #[error("Failed to convert document: {message}")]
  Conversion { message: String },

  #[error("Invalid document: {message}")]
  InvalidDocument { message: String },
}

/// Test applied to one field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  Eq(Value),
  /// Field exists and is not null
  Present,
}

impl Condition {
  fn holds(&self, found: Option<&Value>) -> bool {
    match self {
      Self::Eq(expected) => found == Some(expected),
      Self::Present => found.is_some_and(|v| !v.is_null()),
    }
  }
}

/// Field filter; every condition must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
  conditions: Vec<(String, Condition)>,
}

impl Filter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Match documents by key
  pub fn by_key(key: &DocumentKey) -> Self {
    Self::new().eq(KEY_FIELD, key.to_value())
  }

  /// Require `field` to equal `value`
  pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
    self.conditions.push((field.to_string(), Condition::Eq(value.into())));
    self
  }

  /// Require `field` to be set to something other than null
  pub fn present(mut self, field: &str) -> Self {
    self.conditions.push((field.to_string(), Condition::Present));
    self
  }

  /// Add the condition only when a non-empty value is given
  pub fn eq_opt(self, field: &str, value: Option<&str>) -> Self {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
      Some(v) => self.eq(field, v),
      None => self,
    }
  }

  pub fn conditions(&self) -> &[(String, Condition)] {
    &self.conditions
  }

  /// Whether `doc` satisfies every condition
  pub fn matches(&self, doc: &Document) -> bool {
    self.conditions.iter().all(|(field, condition)| condition.holds(doc.get(field)))
  }
}

/// Single-document mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
  /// Merge the given top-level fields into the document
  Set(Document),
  /// Append `value` to the array at `field`, creating the array if missing
  Push { field: String, value: Value },
}

impl Update {
  pub fn set(fields: impl IntoIterator<Item = (String, Value)>) -> Self {
    Self::Set(fields.into_iter().collect())
  }

  pub fn push(field: &str, value: Value) -> Self {
    Self::Push { field: field.to_string(), value }
  }
}

/// Document store interface
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Insert one document, assigning an object key when `_id` is absent
  async fn insert_one(&self, doc: Document) -> Result<DocumentKey, StoreError>;

  /// Insert a batch of documents unmodified, returning how many were written
  async fn insert_many(&self, docs: Vec<Document>) -> Result<usize, StoreError>;

  /// All documents matching the filter, in insertion order
  async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StoreError>;

  /// First document matching the filter
  async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError>;

  /// Apply an update to the first matching document. Returns whether one matched.
  async fn update_one(&self, filter: &Filter, update: Update) -> Result<bool, StoreError>;

  /// Number of matching documents
  async fn count(&self, filter: &Filter) -> Result<u64, StoreError>;
}

/// Decode a stored document into a typed model
pub fn decode<T: serde::de::DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
  serde_json::from_value(Value::Object(doc))
    .map_err(|e| StoreError::Conversion { message: e.to_string() })
}

/// Encode a typed model into a storable document
pub fn encode<T: serde::Serialize>(model: &T) -> Result<Document, StoreError> {
  match serde_json::to_value(model) {
    Ok(Value::Object(doc)) => Ok(doc),
    Ok(other) => {
      Err(StoreError::InvalidDocument { message: format!("expected a JSON object, got {other}") })
    }
    Err(e) => Err(StoreError::Conversion { message: e.to_string() }),
  }
}
