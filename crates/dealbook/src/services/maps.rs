//! Travel distance lookups
//!
//! Wraps the Google Distance Matrix JSON API. A route the service cannot
//! resolve is `Ok(None)`; only transport and API-level failures are errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAPS_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

#[derive(Debug, Error)]
pub enum MapsError {
  #[error("Distance request failed: {message}")]
  Request { message: String },

  #[error("Distance service returned {status}: {message}")]
  Api { status: String, message: String },

  #[error("Failed to parse distance response: {message}")]
  Parse { message: String },

  #[error("Distance lookups are not configured (set GOOGLE_MAPS_API_KEY)")]
  NotConfigured,
}

/// Human-readable travel distance and time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelEstimate {
  pub distance: String,
  pub duration: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DistanceService: Send + Sync {
  async fn distance(&self, origin: &str, destination: &str)
    -> Result<Option<TravelEstimate>, MapsError>;
}

#[derive(Debug, Clone)]
pub struct MapsConfig {
  pub api_key: String,
  pub base_url: String,
  pub timeout_secs: u64,
}

impl MapsConfig {
  pub fn new(api_key: &str) -> Self {
    Self { api_key: api_key.to_string(), base_url: DEFAULT_MAPS_URL.to_string(), timeout_secs: 15 }
  }
}

pub struct DistanceMatrixClient {
  client: Client,
  config: MapsConfig,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
  status: String,
  #[serde(default)]
  error_message: Option<String>,
  #[serde(default)]
  rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
  #[serde(default)]
  elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
  status: String,
  distance: Option<TextValue>,
  duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
  text: String,
}

impl DistanceMatrixClient {
  pub fn new(config: MapsConfig) -> Result<Self, MapsError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| MapsError::Request { message: e.to_string() })?;
    Ok(Self { client, config })
  }

  fn first_element(response: MatrixResponse) -> Result<Option<TravelEstimate>, MapsError> {
    if response.status != "OK" {
      return Err(MapsError::Api {
        message: response.error_message.unwrap_or_else(|| "no error message".to_string()),
        status: response.status,
      });
    }

    let element = response.rows.into_iter().next().and_then(|row| row.elements.into_iter().next());
    let estimate = match element {
      Some(MatrixElement { status, distance: Some(distance), duration: Some(duration) })
        if status == "OK" =>
      {
        Some(TravelEstimate { distance: distance.text, duration: duration.text })
      }
      _ => None,
    };
    Ok(estimate)
  }
}

#[async_trait]
impl DistanceService for DistanceMatrixClient {
  async fn distance(
    &self,
    origin: &str,
    destination: &str,
  ) -> Result<Option<TravelEstimate>, MapsError> {
    tracing::debug!(origin, destination, "requesting distance matrix");

    let response = self
      .client
      .get(&self.config.base_url)
      .query(&[("origins", origin), ("destinations", destination), ("key", self.config.api_key.as_str())])
      .send()
      .await
      .map_err(|e| MapsError::Request { message: e.to_string() })?;

    if !response.status().is_success() {
      let status = response.status();
      let text = response.text().await.unwrap_or_default();
      return Err(MapsError::Api { status: status.to_string(), message: text });
    }

    let body: MatrixResponse =
      response.json().await.map_err(|e| MapsError::Parse { message: e.to_string() })?;
    Self::first_element(body)
  }
}
