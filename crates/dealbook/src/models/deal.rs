//! Deal records
//!
//! Field names are capitalised on the wire and in the store.

use serde::{Deserialize, Serialize};

use crate::store::DocumentKey;

/// A stored deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
  pub id: Option<DocumentKey>,

  #[serde(rename = "Location")]
  pub location: String,

  #[serde(rename = "Deal")]
  pub deal: String,

  #[serde(rename = "Price")]
  pub price: String,

  #[serde(rename = "Category")]
  pub category: String,

  /// Origin the cached distance and duration were computed from
  #[serde(rename = "Origin", skip_serializing_if = "Option::is_none", default)]
  pub origin: Option<String>,

  #[serde(rename = "Distance", skip_serializing_if = "Option::is_none", default)]
  pub distance: Option<String>,

  #[serde(rename = "Duration", skip_serializing_if = "Option::is_none", default)]
  pub duration: Option<String>,

  #[serde(rename = "Summary", skip_serializing_if = "Option::is_none", default)]
  pub summary: Option<String>,
}

/// Form input for a new deal. Absent fields read as empty so that
/// `validate` can name them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDeal {
  #[serde(rename = "Location")]
  pub location: String,

  #[serde(rename = "Deal")]
  pub deal: String,

  #[serde(rename = "Price")]
  pub price: String,

  #[serde(rename = "Category")]
  pub category: String,
}

impl NewDeal {
  pub fn new(location: &str, deal: &str, price: &str, category: &str) -> Self {
    Self {
      location: location.to_string(),
      deal: deal.to_string(),
      price: price.to_string(),
      category: category.to_string(),
    }
  }

  /// Names of the fields that are empty or whitespace-only
  pub fn missing_fields(&self) -> Vec<&'static str> {
    [
      ("Location", &self.location),
      ("Deal", &self.deal),
      ("Price", &self.price),
      ("Category", &self.category),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
  }

  /// All four fields must be present
  pub fn validate(&self) -> Result<(), String> {
    let missing = self.missing_fields();
    if missing.is_empty() {
      Ok(())
    } else {
      Err(format!("Missing required fields: {}", missing.join(", ")))
    }
  }

  /// The record that gets inserted, values trimmed
  pub fn into_deal(self) -> Deal {
    Deal {
      id: None,
      location: self.location.trim().to_string(),
      deal: self.deal.trim().to_string(),
      price: self.price.trim().to_string(),
      category: self.category.trim().to_string(),
      origin: None,
      distance: None,
      duration: None,
      summary: None,
    }
  }
}
