//! Command-line and environment configuration shared by the binaries
//!
//! Every option can come from a flag or an environment variable; a `.env`
//! file in the working directory is loaded first.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::services::llm::{self, ChatCompletionsClient, LlmConfig, LlmError, StructuredSummary, Summarizer};
use crate::services::maps::{self, DistanceMatrixClient, DistanceService, MapsConfig, MapsError, TravelEstimate};
use crate::store::{MemoryStore, SharedStore};

/// Load `.env` if present. A missing file is not an error.
pub fn load_dotenv() {
  if let Err(e) = dotenvy::dotenv() {
    if !e.not_found() {
      eprintln!("warning: failed to read .env: {e}");
    }
  }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the defaults.
pub fn init_logging(verbose: bool, quiet_default: &str) {
  let default = if verbose { "dealbook=debug,tower_http=debug,mongodb=info,info" } else { quiet_default };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
  /// MongoDB (requires the `mongo` feature)
  Mongo,
  /// In-process store, lost on exit
  Memory,
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
  /// Document store backend
  #[arg(long, value_enum, env = "DEALBOOK_STORE", default_value = "mongo")]
  pub store: StoreBackend,

  /// MongoDB connection string
  #[arg(long, env = "MONGODB_ATLAS_URI", hide_env_values = true)]
  pub mongodb_uri: Option<String>,

  /// Database name
  #[arg(long, env = "DB_NAME", default_value = "dealbook")]
  pub db_name: String,

  /// Collection holding user-submitted deals
  #[arg(long, env = "COLLECTION_NAME", default_value = "deals")]
  pub collection_name: String,

  /// Collection holding the ingested listings
  #[arg(long, env = "LISTINGS_COLLECTION", default_value = "listings")]
  pub listings_collection: String,
}

/// Store handles for the two collections
#[derive(Clone)]
pub struct Stores {
  pub deals: SharedStore,
  pub listings: SharedStore,
}

impl StoreArgs {
  /// Open the configured backend. The handles live for the rest of the process.
  pub async fn open(&self) -> Result<Stores> {
    match self.store {
      StoreBackend::Memory => {
        tracing::warn!("using in-memory store; data is lost on exit");
        Ok(Stores { deals: Arc::new(MemoryStore::new()), listings: Arc::new(MemoryStore::new()) })
      }
      StoreBackend::Mongo => self.open_mongo().await,
    }
  }

  #[cfg(feature = "mongo")]
  async fn open_mongo(&self) -> Result<Stores> {
    let uri = self
      .mongodb_uri
      .as_deref()
      .ok_or_else(|| anyhow!("MONGODB_ATLAS_URI must be set (or pass --mongodb-uri)"))?;
    let deals = crate::store::MongoStore::connect(uri, &self.db_name, &self.collection_name).await?;
    let listings = deals.sibling(&self.listings_collection);
    Ok(Stores { deals: Arc::new(deals), listings: Arc::new(listings) })
  }

  #[cfg(not(feature = "mongo"))]
  async fn open_mongo(&self) -> Result<Stores> {
    Err(anyhow!("built without the `mongo` feature; use --store memory"))
  }
}

#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
  /// Google Maps API key for distance lookups
  #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
  pub maps_api_key: Option<String>,

  /// Distance Matrix endpoint
  #[arg(long, env = "GOOGLE_MAPS_URL", default_value = maps::DEFAULT_MAPS_URL)]
  pub maps_url: String,

  /// API key for the chat-completions endpoint
  #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
  pub llm_api_key: Option<String>,

  /// Base URL of an OpenAI-compatible API
  #[arg(long, env = "OPENAI_BASE_URL", default_value = llm::DEFAULT_LLM_URL)]
  pub llm_url: String,

  /// Model used for summaries
  #[arg(long, env = "OPENAI_MODEL", default_value = llm::DEFAULT_LLM_MODEL)]
  pub llm_model: String,
}

impl ServiceArgs {
  pub fn distance_service(&self) -> Result<Arc<dyn DistanceService>> {
    match &self.maps_api_key {
      Some(key) => {
        let mut config = MapsConfig::new(key);
        config.base_url = self.maps_url.clone();
        Ok(Arc::new(DistanceMatrixClient::new(config)?))
      }
      None => {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set; distance lookups will fail");
        Ok(Arc::new(Unconfigured))
      }
    }
  }

  pub fn summarizer(&self) -> Result<Arc<dyn Summarizer>> {
    match &self.llm_api_key {
      Some(key) => {
        let mut config = LlmConfig::new(key);
        config.base_url = self.llm_url.clone();
        config.model = self.llm_model.clone();
        Ok(Arc::new(ChatCompletionsClient::new(config)?))
      }
      None => {
        tracing::warn!("OPENAI_API_KEY not set; summaries will fail");
        Ok(Arc::new(Unconfigured))
      }
    }
  }
}

/// Stand-in for an external service whose credentials were not supplied
struct Unconfigured;

#[async_trait]
impl DistanceService for Unconfigured {
  async fn distance(&self, _origin: &str, _destination: &str) -> Result<Option<TravelEstimate>, MapsError> {
    Err(MapsError::NotConfigured)
  }
}

#[async_trait]
impl Summarizer for Unconfigured {
  async fn summarize(&self, _prompt: &str) -> Result<String, LlmError> {
    Err(LlmError::NotConfigured)
  }

  async fn summarize_structured(&self, _prompt: &str) -> Result<StructuredSummary, LlmError> {
    Err(LlmError::NotConfigured)
  }

  fn model(&self) -> String {
    "unconfigured".to_string()
  }
}
