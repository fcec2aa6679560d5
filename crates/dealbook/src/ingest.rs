//! Bulk loader for the listings dataset
//!
//! Documents are read from a JSON Lines file or from the Hugging Face
//! datasets-server rows API and inserted unmodified in fixed-size batches.
//! There is no checkpointing; a failed batch aborts the run.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::store::{Document, DocumentStore, StoreError};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_ROWS_URL: &str = "https://datasets-server.huggingface.co/rows";
pub const DEFAULT_DATASET: &str = "MongoDB/airbnb_embeddings";

/// The rows API serves at most this many rows per request
const MAX_ROWS_PER_REQUEST: usize = 100;

#[derive(Debug, Error)]
pub enum IngestError {
  #[error("Failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Line {line}: {message}")]
  Parse { line: usize, message: String },

  #[error("Dataset request failed: {0}")]
  Fetch(#[from] reqwest::Error),

  #[error("Dataset API returned {status}: {message}")]
  Remote { status: u16, message: String },

  #[error("Batch insert failed: {0}")]
  Store(#[from] StoreError),

  #[error("Batch size must be at least 1")]
  InvalidBatchSize,
}

/// A stream of documents, pulled one batch at a time
#[async_trait]
pub trait DocumentSource: Send {
  /// Up to `max` documents; an empty batch means the source is exhausted
  async fn next_batch(&mut self, max: usize) -> Result<Vec<Document>, IngestError>;
}

/// One JSON object per line; blank lines are skipped
pub struct JsonlSource {
  path: PathBuf,
  lines: Lines<BufReader<File>>,
  line_number: usize,
}

impl JsonlSource {
  pub async fn open(path: &Path) -> Result<Self, IngestError> {
    let file = File::open(path).await.map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
    Ok(Self { path: path.to_path_buf(), lines: BufReader::new(file).lines(), line_number: 0 })
  }
}

#[async_trait]
impl DocumentSource for JsonlSource {
  async fn next_batch(&mut self, max: usize) -> Result<Vec<Document>, IngestError> {
    let mut batch = Vec::with_capacity(max.min(DEFAULT_BATCH_SIZE));

    while batch.len() < max {
      let line = self
        .lines
        .next_line()
        .await
        .map_err(|source| IngestError::Io { path: self.path.clone(), source })?;
      let Some(line) = line else { break };
      self.line_number += 1;

      if line.trim().is_empty() {
        continue;
      }

      match serde_json::from_str::<Value>(&line) {
        Ok(Value::Object(doc)) => batch.push(doc),
        Ok(_) => {
          return Err(IngestError::Parse { line: self.line_number, message: "expected a JSON object".to_string() })
        }
        Err(e) => return Err(IngestError::Parse { line: self.line_number, message: e.to_string() }),
      }
    }

    Ok(batch)
  }
}

#[derive(Debug, Clone)]
pub struct RowsConfig {
  pub base_url: String,
  pub dataset: String,
  pub config: String,
  pub split: String,
  pub timeout_secs: u64,
}

impl Default for RowsConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_ROWS_URL.to_string(),
      dataset: DEFAULT_DATASET.to_string(),
      config: "default".to_string(),
      split: "train".to_string(),
      timeout_secs: 60,
    }
  }
}

#[derive(Debug, Deserialize)]
struct RowsPage {
  #[serde(default)]
  rows: Vec<RowEntry>,
  num_rows_total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
  row: Document,
}

/// Hugging Face datasets-server rows API, paged over `offset`/`length`
pub struct HfRowsSource {
  client: Client,
  config: RowsConfig,
  offset: usize,
  total: Option<usize>,
  exhausted: bool,
}

impl HfRowsSource {
  pub fn new(config: RowsConfig) -> Result<Self, IngestError> {
    let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
    Ok(Self { client, config, offset: 0, total: None, exhausted: false })
  }

  async fn fetch_page(&mut self, length: usize) -> Result<Vec<Document>, IngestError> {
    let offset = self.offset.to_string();
    let length = length.to_string();
    let response = self
      .client
      .get(&self.config.base_url)
      .query(&[
        ("dataset", self.config.dataset.as_str()),
        ("config", self.config.config.as_str()),
        ("split", self.config.split.as_str()),
        ("offset", offset.as_str()),
        ("length", length.as_str()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(IngestError::Remote { status: status.as_u16(), message });
    }

    let page: RowsPage = response.json().await?;
    if page.num_rows_total.is_some() {
      self.total = page.num_rows_total;
    }
    tracing::debug!(offset = self.offset, rows = page.rows.len(), total = ?self.total, "fetched dataset rows");

    Ok(page.rows.into_iter().map(|entry| entry.row).collect())
  }
}

#[async_trait]
impl DocumentSource for HfRowsSource {
  async fn next_batch(&mut self, max: usize) -> Result<Vec<Document>, IngestError> {
    let mut batch = Vec::with_capacity(max.min(DEFAULT_BATCH_SIZE));

    while batch.len() < max && !self.exhausted {
      let length = (max - batch.len()).min(MAX_ROWS_PER_REQUEST);
      let rows = self.fetch_page(length).await?;

      self.offset += rows.len();
      let past_end = self.total.is_some_and(|total| self.offset >= total);
      if rows.is_empty() || past_end {
        self.exhausted = true;
      }
      batch.extend(rows);
    }

    Ok(batch)
  }
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSummary {
  pub batches: usize,
  pub records: usize,
}

/// Drain `source` into `store` in batches of `batch_size`, stopping after
/// `limit` records when given. `on_batch` sees the size of every inserted batch.
pub async fn ingest(
  store: &dyn DocumentStore,
  source: &mut dyn DocumentSource,
  batch_size: usize,
  limit: Option<usize>,
  mut on_batch: impl FnMut(usize) + Send,
) -> Result<IngestSummary, IngestError> {
  if batch_size == 0 {
    return Err(IngestError::InvalidBatchSize);
  }

  let mut summary = IngestSummary::default();
  loop {
    let remaining = limit.map_or(batch_size, |limit| limit.saturating_sub(summary.records).min(batch_size));
    if remaining == 0 {
      break;
    }

    let batch = source.next_batch(remaining).await?;
    if batch.is_empty() {
      break;
    }

    let inserted = store.insert_many(batch).await?;
    summary.batches += 1;
    summary.records += inserted;
    tracing::info!(batch = summary.batches, inserted, total = summary.records, "inserted batch");
    on_batch(inserted);
  }

  Ok(summary)
}
