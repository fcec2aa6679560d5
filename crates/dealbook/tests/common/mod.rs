#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use dealbook::config::Stores;
use dealbook::server::{create_router, AppState};
use dealbook::services::{DistanceService, LlmError, MapsError, StructuredSummary, Summarizer, TravelEstimate};
use dealbook::store::{DocumentStore, MemoryStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Distance service that answers every lookup the same way and counts calls
pub struct FakeMaps {
  pub calls: AtomicUsize,
  pub fail: bool,
}

impl FakeMaps {
  pub fn working() -> Arc<Self> {
    Arc::new(Self { calls: AtomicUsize::new(0), fail: false })
  }

  pub fn failing() -> Arc<Self> {
    Arc::new(Self { calls: AtomicUsize::new(0), fail: true })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl DistanceService for FakeMaps {
  async fn distance(&self, origin: &str, _destination: &str) -> Result<Option<TravelEstimate>, MapsError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail {
      return Err(MapsError::Api { status: "REQUEST_DENIED".to_string(), message: "API key invalid".to_string() });
    }
    if origin == "Atlantis" {
      return Ok(None);
    }
    Ok(Some(TravelEstimate { distance: "313 km".to_string(), duration: "3 hours 5 mins".to_string() }))
  }
}

/// Summarizer with canned replies that counts calls
#[derive(Default)]
pub struct FakeSummarizer {
  pub calls: AtomicUsize,
}

impl FakeSummarizer {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
  async fn summarize(&self, _prompt: &str) -> Result<String, LlmError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok("A solid deal close to the old town.".to_string())
  }

  async fn summarize_structured(&self, _prompt: &str) -> Result<StructuredSummary, LlmError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(StructuredSummary {
      summary: "Guests love the location and the host.".to_string(),
      tags: vec!["central".to_string(), "friendly host".to_string()],
    })
  }

  fn model(&self) -> String {
    "fake-model".to_string()
  }
}

pub struct TestApp {
  pub router: Router,
  pub stores: Stores,
  pub maps: Arc<FakeMaps>,
  pub summarizer: Arc<FakeSummarizer>,
}

impl TestApp {
  pub fn new() -> Self {
    Self::with_maps(FakeMaps::working())
  }

  pub fn with_maps(maps: Arc<FakeMaps>) -> Self {
    let stores = Stores { deals: Arc::new(MemoryStore::new()), listings: Arc::new(MemoryStore::new()) };
    let summarizer = FakeSummarizer::new();
    let state = AppState::new(stores.clone(), maps.clone(), summarizer.clone());
    Self { router: create_router(state), stores, maps, summarizer }
  }

  pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
      Some(value) => Body::from(value.to_string()),
      None => Body::empty(),
    };
    let request = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .body(body)
      .unwrap();

    let response = self.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
    self.call(Method::GET, uri, None).await
  }

  pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
    self.call(Method::POST, uri, Some(body)).await
  }

  /// Save a deal and return its id as used in paths
  pub async fn add_deal(&self, location: &str, deal: &str, price: &str, category: &str) -> String {
    let (status, body) = self
      .post("/deals", json!({ "Location": location, "Deal": deal, "Price": price, "Category": category }))
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["deal"]["_id"]["$oid"].as_str().unwrap().to_string()
  }

  pub async fn add_listing(&self, listing: Value) {
    let Value::Object(doc) = listing else { panic!("listing must be an object") };
    self.stores.listings.insert_one(doc).await.unwrap();
  }
}

/// A dataset-shaped listing with `review_count` reviews
pub fn listing(id: i64, review_count: usize) -> Value {
  let reviews: Vec<Value> = (0..review_count)
    .map(|i| {
      json!({
        "_id": format!("{}", 58_663_741 + i),
        "date": "2016-01-03T05:00:00.000Z",
        "listing_id": id.to_string(),
        "reviewer_id": "51483096",
        "reviewer_name": format!("Guest {i}"),
        "comments": format!("Review number {i}. Great stay."),
      })
    })
    .collect();

  json!({
    "_id": id,
    "listing_url": "https://www.airbnb.com/rooms/10006546",
    "name": "Ribeira Charming Duplex",
    "summary": "Fantastic duplex apartment with three bedrooms.",
    "property_type": "House",
    "address": { "street": "Porto, Porto, Portugal", "market": "Porto", "country": "Portugal" },
    "reviews": reviews,
  })
}
