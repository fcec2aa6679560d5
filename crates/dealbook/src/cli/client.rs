//! HTTP client for the dealbook REST API
//!
//! The terminal client holds no business logic; every command is one call
//! against a running `dealbook_server`.

use anyhow::Result;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::timeout;

use crate::models::{AiSummary, Deal, NewDeal, NewReview, Review, ReviewPage};
use crate::server::types::{
  ApiError, BaseResponse, DealResponse, DistanceRequest, DistanceResponse, ListDealsResponse,
  ListingData, ListingResponse, ListingSummaryRequest, ListingSummaryResponse, ReviewResponse,
  StatusResponse, SummaryRequest, SummaryResponse,
};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Configuration for the dealbook HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the server (e.g., "http://localhost:3000")
  pub base_url: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_SERVER_URL.to_string(), timeout_secs: 30 }
  }
}

/// Failures reported by the server or the transport
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
  #[error("{message} (HTTP {status})")]
  Api { status: u16, key: String, message: String },

  #[error("Request to {url} timed out after {secs}s")]
  Timeout { url: String, secs: u64 },
}

impl ClientError {
  /// Error key reported by the server, if the failure came from it
  pub fn key(&self) -> Option<&str> {
    match self {
      Self::Api { key, .. } => Some(key),
      Self::Timeout { .. } => None,
    }
  }
}

/// Error half of the response envelope
#[derive(Debug, Deserialize)]
struct ErrorBody {
  #[serde(default)]
  errors: Vec<ApiError>,
}

/// HTTP client for the dealbook REST API
pub struct DealbookClient {
  client: Client,
  config: ClientConfig,
}

impl DealbookClient {
  /// Create a new client with custom configuration
  pub fn with_config(config: ClientConfig) -> Result<Self> {
    let parsed = url::Url::parse(&config.base_url)
      .map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {e}", config.base_url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(anyhow::anyhow!("Server URL must use http or https, got '{}'", parsed.scheme()));
    }

    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("dealbook-cli/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send a request and unwrap the response envelope
  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: String) -> Result<T> {
    let secs = self.config.timeout_secs;
    let response = match timeout(Duration::from_secs(secs), request.send()).await {
      Ok(result) => result?,
      Err(_) => return Err(ClientError::Timeout { url, secs }.into()),
    };

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await?;
      let (key, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) if !body.errors.is_empty() => (body.errors[0].key.clone(), body.errors[0].message.clone()),
        _ => ("http_error".to_string(), text),
      };
      return Err(ClientError::Api { status: status.as_u16(), key, message }.into());
    }

    let result: BaseResponse<T> = response.json().await?;
    Ok(result.data)
  }

  pub async fn add_deal(&self, deal: &NewDeal) -> Result<Deal> {
    let url = self.url("/deals");
    let response: DealResponse = self.send(self.client.post(&url).json(deal), url).await?;
    Ok(response.deal)
  }

  pub async fn list_deals(&self, location: Option<&str>, category: Option<&str>) -> Result<Vec<Deal>> {
    let url = self.url("/deals");
    let mut query = Vec::new();
    if let Some(location) = location {
      query.push(("location", location));
    }
    if let Some(category) = category {
      query.push(("category", category));
    }
    let response: ListDealsResponse = self.send(self.client.get(&url).query(&query), url).await?;
    Ok(response.deals)
  }

  pub async fn get_deal(&self, id: &str) -> Result<Deal> {
    let url = self.url(&format!("/deals/{id}"));
    let response: DealResponse = self.send(self.client.get(&url), url).await?;
    Ok(response.deal)
  }

  pub async fn deal_distance(&self, id: &str, origin: &str) -> Result<DistanceResponse> {
    let url = self.url(&format!("/deals/{id}/distance"));
    let request = DistanceRequest { origin: origin.to_string() };
    self.send(self.client.post(&url).json(&request), url).await
  }

  pub async fn deal_summary(&self, id: &str) -> Result<String> {
    let url = self.url("/summary");
    let request = SummaryRequest { deal_id: id.to_string() };
    let response: SummaryResponse = self.send(self.client.post(&url).json(&request), url).await?;
    Ok(response.summary)
  }

  pub async fn get_listing(&self, id: &str) -> Result<ListingData> {
    let url = self.url(&format!("/listings/{id}"));
    let response: ListingResponse = self.send(self.client.get(&url), url).await?;
    Ok(response.listing)
  }

  pub async fn list_reviews(&self, id: &str, page: usize, page_size: usize) -> Result<ReviewPage> {
    let url = self.url(&format!("/listings/{id}/reviews"));
    let query = [("page", page), ("page_size", page_size)];
    self.send(self.client.get(&url).query(&query), url).await
  }

  pub async fn add_review(&self, id: &str, review: &NewReview) -> Result<Review> {
    let url = self.url(&format!("/listings/{id}/reviews"));
    let response: ReviewResponse = self.send(self.client.post(&url).json(review), url).await?;
    Ok(response.review)
  }

  pub async fn listing_summary(&self, id: &str, force: bool) -> Result<AiSummary> {
    let url = self.url(&format!("/listings/{id}/summary"));
    let request = ListingSummaryRequest { force };
    let response: ListingSummaryResponse = self.send(self.client.post(&url).json(&request), url).await?;
    Ok(response.ai_summary)
  }

  pub async fn status(&self) -> Result<StatusResponse> {
    let url = self.url("/status");
    self.send(self.client.get(&url), url).await
  }
}
