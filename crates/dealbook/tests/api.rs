mod common;

use axum::http::StatusCode;
use common::{listing, FakeMaps, TestApp};
use dealbook::store::DocumentStore;
use serde_json::{json, Value};

#[tokio::test]
async fn test_save_deal_creates_one_record() {
  let app = TestApp::new();

  let (status, body) = app
    .post("/deals", json!({ "Location": "Austin", "Deal": "2 for 1 tacos", "Price": "$5", "Category": "Food" }))
    .await;

  assert_eq!(status, StatusCode::CREATED);
  assert!(body["transaction_id"].is_string());
  assert_eq!(body["versioning"]["latest"], env!("CARGO_PKG_VERSION"));
  assert_eq!(body["deal"]["Location"], "Austin");
  assert_eq!(body["deal"]["Deal"], "2 for 1 tacos");

  let (status, body) = app.get("/deals").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 1);
  assert_eq!(body["deals"][0]["Price"], "$5");
  assert_eq!(body["deals"][0]["Category"], "Food");
}

#[tokio::test]
async fn test_save_deal_with_missing_fields_is_rejected() {
  let app = TestApp::new();

  let (status, body) = app.post("/deals", json!({ "Location": "Austin", "Deal": "  ", "Category": "Food" })).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "validation_failed");
  assert_eq!(body["errors"][0]["message"], "Missing required fields: Deal, Price");

  let (_, body) = app.get("/deals").await;
  assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_list_deals_filters() {
  let app = TestApp::new();
  app.add_deal("Austin", "2 for 1 tacos", "$5", "Food").await;
  app.add_deal("Austin", "Kayak rental", "$20", "Outdoors").await;
  app.add_deal("Dallas", "Museum pass", "$12", "Culture").await;

  let (_, body) = app.get("/deals?location=Austin").await;
  assert_eq!(body["count"], 2);

  let (_, body) = app.get("/deals?location=Austin&category=Outdoors").await;
  assert_eq!(body["count"], 1);
  assert_eq!(body["deals"][0]["Deal"], "Kayak rental");

  let (_, body) = app.get("/deals?location=Austin&category=").await;
  assert_eq!(body["count"], 2);

  let (status, body) = app.get("/deals?location=Nowhere").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 0);
  assert_eq!(body["deals"], json!([]));
}

#[tokio::test]
async fn test_get_deal_and_not_found() {
  let app = TestApp::new();
  let id = app.add_deal("Austin", "2 for 1 tacos", "$5", "Food").await;

  let (status, body) = app.get(&format!("/deals/{id}")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["deal"]["Location"], "Austin");

  let (status, body) = app.get("/deals/65f1c0a2b3c4d5e6f7a8b9c0").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["errors"][0]["key"], "not_found");
}

#[tokio::test]
async fn test_distance_is_cached_per_origin() {
  let app = TestApp::new();
  let id = app.add_deal("Porto", "Port tasting", "20", "Food").await;
  let uri = format!("/deals/{id}/distance");

  let (status, body) = app.post(&uri, json!({ "origin": "Lisbon" })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["estimate"]["distance"], "313 km");
  assert_eq!(body["estimate"]["duration"], "3 hours 5 mins");
  assert_eq!(app.maps.calls(), 1);

  let (_, body) = app.post(&uri, json!({ "origin": "Lisbon" })).await;
  assert_eq!(body["estimate"]["distance"], "313 km");
  assert_eq!(app.maps.calls(), 1);

  let (_, deal) = app.get(&format!("/deals/{id}")).await;
  assert_eq!(deal["deal"]["Origin"], "Lisbon");
  assert_eq!(deal["deal"]["Distance"], "313 km");

  app.post(&uri, json!({ "origin": "Braga" })).await;
  assert_eq!(app.maps.calls(), 2);
}

#[tokio::test]
async fn test_distance_without_route_is_not_cached() {
  let app = TestApp::new();
  let id = app.add_deal("Porto", "Port tasting", "20", "Food").await;
  let uri = format!("/deals/{id}/distance");

  let (status, body) = app.post(&uri, json!({ "origin": "Atlantis" })).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["estimate"].is_null());

  app.post(&uri, json!({ "origin": "Atlantis" })).await;
  assert_eq!(app.maps.calls(), 2);
}

#[tokio::test]
async fn test_distance_maps_failure_is_bad_gateway() {
  let app = TestApp::with_maps(FakeMaps::failing());
  let id = app.add_deal("Porto", "Port tasting", "20", "Food").await;

  let (status, body) = app.post(&format!("/deals/{id}/distance"), json!({ "origin": "Lisbon" })).await;

  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert_eq!(body["errors"][0]["key"], "maps_unavailable");
  assert_eq!(body["errors"][0]["context"]["status"], 502);
}

#[tokio::test]
async fn test_distance_requires_origin() {
  let app = TestApp::new();
  let id = app.add_deal("Porto", "Port tasting", "20", "Food").await;

  let (status, _) = app.post(&format!("/deals/{id}/distance"), json!({ "origin": " " })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(app.maps.calls(), 0);
}

#[tokio::test]
async fn test_distance_without_origin_field_is_enveloped() {
  let app = TestApp::new();
  let id = app.add_deal("Porto", "Port tasting", "20", "Food").await;

  let (status, body) = app.post(&format!("/deals/{id}/distance"), json!({})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "validation_failed");
  assert_eq!(app.maps.calls(), 0);
}

#[tokio::test]
async fn test_second_summary_does_not_call_llm() {
  let app = TestApp::new();
  let id = app.add_deal("Porto", "Port tasting", "20", "Food").await;

  let (status, body) = app.post("/summary", json!({ "deal_id": id })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["summary"], "A solid deal close to the old town.");
  assert_eq!(body["deal_id"], id);

  let (status, body) = app.post("/summary", json!({ "deal_id": id })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["summary"], "A solid deal close to the old town.");
  assert_eq!(app.summarizer.calls(), 1);
}

#[tokio::test]
async fn test_summary_requires_deal_id() {
  let app = TestApp::new();

  let (status, body) = app.post("/summary", json!({ "deal_id": "" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "validation_failed");

  let (status, body) = app.post("/summary", json!({})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "validation_failed");
  assert_eq!(app.summarizer.calls(), 0);
}

#[tokio::test]
async fn test_get_listing() {
  let app = TestApp::new();
  app.add_listing(listing(10006546, 3)).await;

  let (status, body) = app.get("/listings/10006546").await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["listing"]["id"], 10006546);
  assert_eq!(body["listing"]["name"], "Ribeira Charming Duplex");
  assert_eq!(body["listing"]["location"], "Porto, Porto, Portugal");
  assert_eq!(body["listing"]["review_count"], 3);

  let (status, _) = app.get("/listings/1").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_with_null_review_fields_reads() {
  let app = TestApp::new();
  let mut seeded = listing(7, 3);
  seeded["reviews"][0]["comments"] = Value::Null;
  seeded["reviews"][1]["reviewer_name"] = Value::Null;
  app.add_listing(seeded).await;

  let (status, body) = app.get("/listings/7").await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["listing"]["review_count"], 3);

  let (status, body) = app.get("/listings/7/reviews").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["reviews"][0]["comments"], "");

  let (status, _) = app.post("/listings/7/summary", json!({})).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_review_pages_partition_reviews() {
  let app = TestApp::new();
  app.add_listing(listing(10006546, 7)).await;

  let (status, first) = app.get("/listings/10006546/reviews").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first["page"], 1);
  assert_eq!(first["page_size"], 5);
  assert_eq!(first["total"], 7);
  assert_eq!(first["total_pages"], 2);
  assert_eq!(first["reviews"].as_array().unwrap().len(), 5);

  let (_, second) = app.get("/listings/10006546/reviews?page=2").await;
  let second_reviews = second["reviews"].as_array().unwrap();
  assert_eq!(second_reviews.len(), 2);
  assert_eq!(second_reviews[0]["reviewer_name"], "Guest 5");

  let (status, beyond) = app.get("/listings/10006546/reviews?page=9").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(beyond["reviews"], json!([]));
  assert_eq!(beyond["total"], 7);

  let (_, clamped) = app.get("/listings/10006546/reviews?page=0&page_size=1000").await;
  assert_eq!(clamped["page"], 1);
  assert_eq!(clamped["page_size"], 50);
  assert_eq!(clamped["reviews"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_add_review_appends() {
  let app = TestApp::new();
  app.add_listing(listing(10006546, 2)).await;

  let (status, body) = app
    .post("/listings/10006546/reviews", json!({ "reviewer_name": "Ana", "comments": "Lovely view of the river." }))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["review"]["reviewer_name"], "Ana");
  assert_eq!(body["review"]["listing_id"], "10006546");
  assert!(body["review"]["_id"].is_string());
  assert!(body["review"]["date"]["$date"].is_string());

  let (_, page) = app.get("/listings/10006546/reviews?page=1&page_size=10").await;
  assert_eq!(page["total"], 3);
  assert_eq!(page["reviews"][2]["comments"], "Lovely view of the river.");
}

#[tokio::test]
async fn test_add_review_validation_and_missing_listing() {
  let app = TestApp::new();
  app.add_listing(listing(10006546, 0)).await;

  let (status, body) =
    app.post("/listings/10006546/reviews", json!({ "reviewer_name": "Ana", "comments": "" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["message"], "Review comment is required");

  let (status, _) =
    app.post("/listings/42/reviews", json!({ "reviewer_name": "Ana", "comments": "Nice" })).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_summary_is_cached_until_forced() {
  let app = TestApp::new();
  app.add_listing(listing(10006546, 4)).await;

  let (status, body) = app.call(axum::http::Method::POST, "/listings/10006546/summary", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["listing_id"], "10006546");
  assert_eq!(body["ai_summary"]["summary"], "Guests love the location and the host.");
  assert_eq!(body["ai_summary"]["tags"], json!(["central", "friendly host"]));
  assert_eq!(body["ai_summary"]["model"], "fake-model");
  assert_eq!(app.summarizer.calls(), 1);

  app.post("/listings/10006546/summary", json!({})).await;
  assert_eq!(app.summarizer.calls(), 1);

  let (_, listing) = app.get("/listings/10006546").await;
  assert_eq!(listing["listing"]["ai_summary"]["tags"][0], "central");

  let (status, _) = app.post("/listings/10006546/summary", json!({ "force": true })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(app.summarizer.calls(), 2);
}

#[tokio::test]
async fn test_listing_summary_without_reviews() {
  let app = TestApp::new();
  app.add_listing(listing(10006546, 0)).await;

  let (status, body) = app.post("/listings/10006546/summary", json!({})).await;

  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["errors"][0]["key"], "no_reviews");
  assert_eq!(app.summarizer.calls(), 0);
}

#[tokio::test]
async fn test_status_and_version() {
  let app = TestApp::new();
  app.add_deal("Austin", "2 for 1 tacos", "$5", "Food").await;
  app.add_listing(listing(10006546, 2)).await;
  app.post("/listings/10006546/summary", json!({})).await;

  let (status, body) = app.get("/status").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["deals"], 1);
  assert_eq!(body["summarized_listings"], 1);

  let (status, body) = app.get("/version").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_survives_malformed_deal() {
  let app = TestApp::new();
  app.add_deal("Austin", "2 for 1 tacos", "$5", "Food").await;
  let Value::Object(broken) = json!({ "Location": "Austin", "Deal": "Half-price brisket", "Category": "Food" }) else {
    unreachable!()
  };
  app.stores.deals.insert_one(broken).await.unwrap();

  let (status, body) = app.get("/status").await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["deals"], 2);
  assert_eq!(body["summarized_listings"], 0);
}
