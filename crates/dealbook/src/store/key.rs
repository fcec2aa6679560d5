//! Document keys
//!
//! Deals get generated object keys, dataset listings carry integer keys, and
//! anything else is kept as plain text. Object keys are stored in their
//! extended-JSON form (`{"$oid": "<hex>"}`) so the Mongo backend can turn them
//! into native ObjectIds.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

const OBJECT_ID_LEN: usize = 24;

/// Identifier of a stored document (`_id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKey {
  /// 24 hex characters, stored as `{"$oid": hex}`
  Object(String),
  /// Integer key, as used by the listings dataset
  Int(i64),
  /// Any other string key
  Text(String),
}

impl DocumentKey {
  /// Generate a fresh object key
  pub fn generate() -> Self {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    Self::Object(hex[..OBJECT_ID_LEN].to_string())
  }

  /// The JSON representation stored under `_id`
  pub fn to_value(&self) -> Value {
    match self {
      Self::Object(hex) => json!({ "$oid": hex }),
      Self::Int(n) => json!(n),
      Self::Text(s) => json!(s),
    }
  }

  /// Read a key back from its stored JSON representation
  pub fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(|hex| Self::Object(hex.to_string())),
      Value::Number(n) => n.as_i64().map(Self::Int),
      Value::String(s) => Some(Self::Text(s.clone())),
      _ => None,
    }
  }
}

fn is_object_hex(s: &str) -> bool {
  s.len() == OBJECT_ID_LEN && s.chars().all(|c| c.is_ascii_hexdigit())
}

impl FromStr for DocumentKey {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
      if let Ok(n) = s.parse::<i64>() {
        return Ok(Self::Int(n));
      }
    }
    if is_object_hex(s) {
      return Ok(Self::Object(s.to_ascii_lowercase()));
    }
    Ok(Self::Text(s.to_string()))
  }
}

impl fmt::Display for DocumentKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Object(hex) => write!(f, "{hex}"),
      Self::Int(n) => write!(f, "{n}"),
      Self::Text(s) => write!(f, "{s}"),
    }
  }
}

impl Serialize for DocumentKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for DocumentKey {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Self::from_value(&value)
      .ok_or_else(|| serde::de::Error::custom(format!("unsupported document key: {value}")))
  }
}
