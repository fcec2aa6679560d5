//! Listing reviews

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Reviews per page when the caller does not say
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Upper bound on a requested page size
pub const MAX_PAGE_SIZE: usize = 50;

/// Review timestamp. The dataset stores plain strings, the Mongo backend hands
/// dates back as extended JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewDate {
  Extended {
    #[serde(rename = "$date")]
    date: Value,
  },
  Text(String),
}

impl ReviewDate {
  /// Stored as `{"$date": ..}` so Mongo keeps it as a native date
  pub fn from_datetime(at: DateTime<Utc>) -> Self {
    Self::Extended { date: Value::String(at.to_rfc3339()) }
  }

  pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
    let raw = match self {
      Self::Text(s) => s.as_str(),
      Self::Extended { date: Value::String(s) } => s.as_str(),
      Self::Extended { date: Value::Object(map) } => {
        // Canonical form: {"$date": {"$numberLong": "<millis>"}}
        let millis = map.get("$numberLong")?.as_str()?.parse::<i64>().ok()?;
        return DateTime::from_timestamp_millis(millis);
      }
      Self::Extended { date: Value::Number(n) } => return DateTime::from_timestamp_millis(n.as_i64()?),
      Self::Extended { .. } => return None,
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
      return Some(at.with_timezone(&Utc));
    }
    // Rows API dates carry no offset; they are UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|at| at.and_utc())
  }
}

impl fmt::Display for ReviewDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (self.as_datetime(), self) {
      (Some(at), _) => write!(f, "{}", at.format("%Y-%m-%d")),
      (None, Self::Text(s)) => write!(f, "{s}"),
      (None, Self::Extended { date }) => write!(f, "{date}"),
    }
  }
}

/// Ids in the dataset are numeric strings; accept numbers too
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  Ok(match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(s)) => Some(s),
    Some(Value::Number(n)) => Some(n.to_string()),
    Some(Value::Null) | None => None,
    Some(other) => Some(other.to_string()),
  })
}

/// Text field that may be null in the dataset
fn nullable_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// A single review nested in a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
  #[serde(rename = "_id", deserialize_with = "lenient_string", default)]
  pub id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub date: Option<ReviewDate>,

  #[serde(deserialize_with = "lenient_string", default, skip_serializing_if = "Option::is_none")]
  pub listing_id: Option<String>,

  #[serde(deserialize_with = "lenient_string", default, skip_serializing_if = "Option::is_none")]
  pub reviewer_id: Option<String>,

  #[serde(deserialize_with = "nullable_text", default)]
  pub reviewer_name: String,

  #[serde(deserialize_with = "nullable_text", default)]
  pub comments: String,
}

/// Form input for a new review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewReview {
  pub reviewer_name: String,
  pub comments: String,
}

impl NewReview {
  pub fn validate(&self) -> Result<(), String> {
    if self.reviewer_name.trim().is_empty() {
      return Err("Reviewer name is required".to_string());
    }
    if self.comments.trim().is_empty() {
      return Err("Review comment is required".to_string());
    }
    Ok(())
  }

  /// Build the stored review with a fresh id and the given timestamp
  pub fn into_review(self, listing_id: String, at: DateTime<Utc>) -> Review {
    Review {
      id: Some(uuid::Uuid::new_v4().to_string()),
      date: Some(ReviewDate::from_datetime(at)),
      listing_id: Some(listing_id),
      reviewer_id: None,
      reviewer_name: self.reviewer_name.trim().to_string(),
      comments: self.comments.trim().to_string(),
    }
  }
}

/// One page of a listing's reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPage {
  pub reviews: Vec<Review>,
  /// 1-based page number
  pub page: usize,
  pub page_size: usize,
  pub total: usize,
  pub total_pages: usize,
}

impl ReviewPage {
  /// Cut page `page` out of `reviews`. Page 0 is treated as page 1 and the
  /// page size is clamped to `1..=MAX_PAGE_SIZE`.
  pub fn paginate(reviews: &[Review], page: usize, page_size: usize) -> Self {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total = reviews.len();
    let total_pages = total.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let slice: &[Review] = if start < total { &reviews[start..(start + page_size).min(total)] } else { &[] };

    Self { reviews: slice.to_vec(), page, page_size, total, total_pages }
  }

  pub fn has_next(&self) -> bool {
    self.page < self.total_pages
  }
}
