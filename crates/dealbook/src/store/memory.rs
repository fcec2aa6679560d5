//! In-process document store
//!
//! Keeps documents in insertion order behind an async RwLock. Used by the
//! test suite and by `--store memory` for local runs without a database.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Document, DocumentKey, DocumentStore, Filter, StoreError, Update, KEY_FIELD};

#[derive(Default)]
pub struct MemoryStore {
  documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Ensure the document has a key, generating an object key when absent
  fn assign_key(doc: &mut Document) -> Result<DocumentKey, StoreError> {
    match doc.get(KEY_FIELD) {
      Some(value) => DocumentKey::from_value(value).ok_or_else(|| StoreError::InvalidDocument {
        message: format!("unsupported _id value: {value}"),
      }),
      None => {
        let key = DocumentKey::generate();
        doc.insert(KEY_FIELD.to_string(), key.to_value());
        Ok(key)
      }
    }
  }

  fn apply(doc: &mut Document, update: Update) -> Result<(), StoreError> {
    match update {
      Update::Set(fields) => {
        for (field, value) in fields {
          doc.insert(field, value);
        }
        Ok(())
      }
      Update::Push { field, value } => {
        let slot = doc.entry(field.clone()).or_insert_with(|| Value::Array(Vec::new()));
        match slot {
          Value::Array(items) => {
            items.push(value);
            Ok(())
          }
          _ => Err(StoreError::Query {
            message: format!("cannot push to non-array field '{field}'"),
          }),
        }
      }
    }
  }
}

#[async_trait]
impl DocumentStore for MemoryStore {
  async fn insert_one(&self, mut doc: Document) -> Result<DocumentKey, StoreError> {
    let key = Self::assign_key(&mut doc)?;
    let mut documents = self.documents.write().await;
    if documents.iter().any(|existing| existing.get(KEY_FIELD) == Some(&key.to_value())) {
      return Err(StoreError::Query { message: format!("duplicate key: {key}") });
    }
    documents.push(doc);
    Ok(key)
  }

  async fn insert_many(&self, docs: Vec<Document>) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for doc in docs {
      self.insert_one(doc).await?;
      inserted += 1;
    }
    Ok(inserted)
  }

  async fn find(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
    let documents = self.documents.read().await;
    Ok(documents.iter().filter(|doc| filter.matches(doc)).cloned().collect())
  }

  async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
    let documents = self.documents.read().await;
    Ok(documents.iter().find(|doc| filter.matches(doc)).cloned())
  }

  async fn update_one(&self, filter: &Filter, update: Update) -> Result<bool, StoreError> {
    let mut documents = self.documents.write().await;
    match documents.iter_mut().find(|doc| filter.matches(doc)) {
      Some(doc) => {
        Self::apply(doc, update)?;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
    let documents = self.documents.read().await;
    Ok(documents.iter().filter(|doc| filter.matches(doc)).count() as u64)
  }
}
