//! Dataset listings
//!
//! A listing's shape is dictated by the source dataset. Only the fields the
//! application reads are typed; everything else is carried through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::review::Review;
use crate::store::DocumentKey;

/// AI-generated review digest cached on a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSummary {
  pub summary: String,

  #[serde(default)]
  pub tags: Vec<String>,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub model: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
  #[serde(rename = "_id")]
  pub id: DocumentKey,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub name: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub summary: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub property_type: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub address: Option<Value>,

  #[serde(default)]
  pub reviews: Vec<Review>,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub ai_summary: Option<AiSummary>,

  /// Remaining dataset fields (amenities, prices, embeddings, ...)
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Listing {
  pub fn display_name(&self) -> String {
    self.name.clone().unwrap_or_else(|| format!("Listing {}", self.id))
  }

  /// Human-readable place: the street line, falling back to the market
  pub fn location_label(&self) -> Option<String> {
    let address = self.address.as_ref()?;
    if let Some(s) = address.as_str() {
      return Some(s.to_string());
    }
    ["street", "market", "country"]
      .iter()
      .find_map(|field| address.get(field).and_then(Value::as_str))
      .map(str::to_string)
  }

  /// Most recent reviews last, as stored
  pub fn latest_reviews(&self, limit: usize) -> &[Review] {
    let start = self.reviews.len().saturating_sub(limit);
    &self.reviews[start..]
  }
}
