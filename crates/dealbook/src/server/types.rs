//! REST API request and response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AiSummary, Deal, Listing, Review};
use crate::services::TravelEstimate;
use crate::store::DocumentKey;

// Base Response Structure
// ======================

/// Envelope for every API response
#[derive(Debug, Serialize, Deserialize)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Error information, omitted on success
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Endpoint-specific payload
  #[serde(flatten)]
  pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionInfo {
  pub latest: String,
  pub requested: String,
  pub resolved: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  /// Additional error context
  #[serde(default)]
  pub context: serde_json::Value,
}

// Status/Version Endpoints
// =======================

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
  pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  /// Number of stored deals
  pub deals: u64,
  /// Listings with a cached AI summary
  pub summarized_listings: u64,
}

// Deal Endpoints
// ==============

/// Response for POST /deals and GET /deals/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct DealResponse {
  pub deal: Deal,
}

/// Query for GET /deals
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListDealsQuery {
  pub location: Option<String>,
  pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListDealsResponse {
  pub deals: Vec<Deal>,
  pub count: usize,
}

/// Request for POST /summary
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryRequest {
  #[serde(default)]
  pub deal_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
  pub deal_id: String,
  pub summary: String,
}

/// Request for POST /deals/{id}/distance
#[derive(Debug, Serialize, Deserialize)]
pub struct DistanceRequest {
  #[serde(default)]
  pub origin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DistanceResponse {
  pub deal_id: String,
  pub origin: String,
  /// Absent when no route was found
  pub estimate: Option<TravelEstimate>,
}

// Listing Endpoints
// =================

/// Listing fields exposed over the API; embeddings and other dataset
/// columns stay in the store
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingData {
  pub id: DocumentKey,
  pub name: String,
  pub summary: Option<String>,
  pub property_type: Option<String>,
  pub location: Option<String>,
  pub review_count: usize,
  pub ai_summary: Option<AiSummary>,
}

impl From<&Listing> for ListingData {
  fn from(listing: &Listing) -> Self {
    Self {
      id: listing.id.clone(),
      name: listing.display_name(),
      summary: listing.summary.clone(),
      property_type: listing.property_type.clone(),
      location: listing.location_label(),
      review_count: listing.reviews.len(),
      ai_summary: listing.ai_summary.clone(),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
  pub listing: ListingData,
}

/// Query for GET /listings/{id}/reviews
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReviewsQuery {
  pub page: Option<usize>,
  pub page_size: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
  pub review: Review,
}

/// Request for POST /listings/{id}/summary
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListingSummaryRequest {
  /// Regenerate even when a summary is cached
  #[serde(default)]
  pub force: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListingSummaryResponse {
  pub listing_id: String,
  pub ai_summary: AiSummary,
}

// Helper Functions
// ================

fn current_version() -> VersionInfo {
  let version = env!("CARGO_PKG_VERSION");
  VersionInfo { latest: version.to_string(), requested: version.to_string(), resolved: version.to_string() }
}

impl<T> BaseResponse<T> {
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: current_version(), transaction_id, errors: Vec::new(), data }
  }

  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: current_version(), transaction_id, errors, data: () }
  }
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), context: serde_json::Value::Null }
  }

  pub fn with_context(mut self, context: serde_json::Value) -> Self {
    self.context = context;
    self
  }
}
