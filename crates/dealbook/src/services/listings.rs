//! Listing operations: review pages, new reviews and cached AI summaries

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use super::{ServiceError, ServiceResult, Summarizer};
use crate::models::{AiSummary, Listing, NewReview, Review, ReviewPage};
use crate::services::prompts;
use crate::store::{self, DocumentKey, Filter, SharedStore, Update};

#[derive(Clone)]
pub struct ListingService {
  store: SharedStore,
  summarizer: Arc<dyn Summarizer>,
}

impl ListingService {
  pub fn new(store: SharedStore, summarizer: Arc<dyn Summarizer>) -> Self {
    Self { store, summarizer }
  }

  pub async fn get_listing(&self, key: &DocumentKey) -> ServiceResult<Listing> {
    match self.store.find_one(&Filter::by_key(key)).await? {
      Some(doc) => Ok(store::decode(doc)?),
      None => Err(ServiceError::NotFound { kind: "Listing", key: key.clone() }),
    }
  }

  pub async fn review_page(
    &self,
    key: &DocumentKey,
    page: usize,
    page_size: usize,
  ) -> ServiceResult<ReviewPage> {
    let listing = self.get_listing(key).await?;
    Ok(ReviewPage::paginate(&listing.reviews, page, page_size))
  }

  /// Append a review. The push is a single store update, so concurrent
  /// appends both land.
  pub async fn add_review(&self, key: &DocumentKey, new_review: NewReview) -> ServiceResult<Review> {
    new_review.validate().map_err(ServiceError::Validation)?;

    let review = new_review.into_review(key.to_string(), Utc::now());
    let value = serde_json::to_value(&review)
      .map_err(|e| store::StoreError::Conversion { message: e.to_string() })?;

    let matched = self.store.update_one(&Filter::by_key(key), Update::push("reviews", value)).await?;
    if !matched {
      return Err(ServiceError::NotFound { kind: "Listing", key: key.clone() });
    }

    tracing::info!(%key, reviewer = %review.reviewer_name, "added review");
    Ok(review)
  }

  /// AI digest of the listing's reviews. Cached on the listing after the
  /// first computation; `force` regenerates it.
  pub async fn listing_summary(&self, key: &DocumentKey, force: bool) -> ServiceResult<AiSummary> {
    let listing = self.get_listing(key).await?;
    if let (Some(cached), false) = (&listing.ai_summary, force) {
      return Ok(cached.clone());
    }

    if listing.reviews.is_empty() {
      return Err(ServiceError::NoReviews { key: key.clone() });
    }

    let prompt = prompts::reviews_prompt(&listing);
    let structured = self.summarizer.summarize_structured(&prompt).await?;

    let summary = AiSummary {
      summary: structured.summary,
      tags: structured.tags,
      model: Some(self.summarizer.model()),
      generated_at: Some(Utc::now()),
    };

    let value = serde_json::to_value(&summary)
      .map_err(|e| store::StoreError::Conversion { message: e.to_string() })?;
    self.store.update_one(&Filter::by_key(key), Update::set([("ai_summary".to_string(), value)])).await?;

    tracing::info!(%key, tags = summary.tags.len(), regenerated = force, "cached listing summary");
    Ok(summary)
  }

  /// Number of stored listings carrying a cached summary
  pub async fn summarized_count(&self) -> ServiceResult<u64> {
    Ok(self.store.count(&Filter::new().present("ai_summary")).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::services::llm::{LlmError, MockSummarizer, StructuredSummary};
  use crate::store::{DocumentStore, MemoryStore};
  use serde_json::Value;

  async fn seeded_store(reviews: usize) -> SharedStore {
    let store = Arc::new(MemoryStore::new());
    let reviews: Vec<Value> = (0..reviews)
      .map(|i| json!({ "_id": i.to_string(), "reviewer_name": format!("guest{i}"), "comments": "Lovely stay" }))
      .collect();
    let listing = json!({
      "_id": 10006546,
      "name": "Ribeira Charming Duplex",
      "address": { "street": "Porto, Porto, Portugal" },
      "reviews": reviews
    });
    store.insert_one(listing.as_object().cloned().unwrap()).await.unwrap();
    store
  }

  fn key() -> DocumentKey {
    DocumentKey::Int(10006546)
  }

  #[tokio::test]
  async fn test_review_page_slices_reviews() {
    let listings = ListingService::new(seeded_store(7).await, Arc::new(MockSummarizer::new()));

    let page = listings.review_page(&key(), 2, 5).await.unwrap();
    assert_eq!(page.reviews.len(), 2);
    assert_eq!(page.total, 7);
    assert_eq!(page.reviews[0].reviewer_name, "guest5");
  }

  #[tokio::test]
  async fn test_unknown_listing_is_not_found() {
    let listings = ListingService::new(seeded_store(0).await, Arc::new(MockSummarizer::new()));
    let result = listings.review_page(&DocumentKey::Int(1), 1, 5).await;
    assert!(matches!(result, Err(ServiceError::NotFound { kind: "Listing", .. })));
  }

  #[tokio::test]
  async fn test_add_review_appends() {
    let listings = ListingService::new(seeded_store(2).await, Arc::new(MockSummarizer::new()));
    let review = listings
      .add_review(&key(), NewReview { reviewer_name: "Marta".into(), comments: "Great view".into() })
      .await
      .unwrap();

    let listing = listings.get_listing(&key()).await.unwrap();
    assert_eq!(listing.reviews.len(), 3);
    assert_eq!(listing.reviews[2], review);
    assert_eq!(review.listing_id.as_deref(), Some("10006546"));
    assert!(review.date.is_some());
  }

  #[tokio::test]
  async fn test_concurrent_reviews_both_land() {
    let listings = ListingService::new(seeded_store(2).await, Arc::new(MockSummarizer::new()));

    let (key_a, key_b) = (key(), key());
    let (first, second) = tokio::join!(
      listings.add_review(&key_a, NewReview { reviewer_name: "Marta".into(), comments: "Great view".into() }),
      listings.add_review(&key_b, NewReview { reviewer_name: "Rui".into(), comments: "Quiet street".into() }),
    );
    assert_ne!(first.unwrap().id, second.unwrap().id);

    let listing = listings.get_listing(&key()).await.unwrap();
    assert_eq!(listing.reviews.len(), 4);
    let names: Vec<&str> = listing.reviews[2..].iter().map(|r| r.reviewer_name.as_str()).collect();
    assert!(names.contains(&"Marta") && names.contains(&"Rui"));
  }

  #[tokio::test]
  async fn test_review_with_null_fields_reads() {
    let store = Arc::new(MemoryStore::new());
    let listing = json!({
      "_id": 7,
      "name": "Loft",
      "reviews": [
        { "_id": "1", "reviewer_name": "Ana", "comments": null },
        { "_id": "2", "reviewer_name": null, "comments": "Nice" }
      ]
    });
    store.insert_one(listing.as_object().cloned().unwrap()).await.unwrap();
    let listings = ListingService::new(store, Arc::new(MockSummarizer::new()));

    let page = listings.review_page(&DocumentKey::Int(7), 1, 5).await.unwrap();
    assert_eq!(page.reviews[0].comments, "");
    assert_eq!(page.reviews[1].reviewer_name, "");
  }

  #[tokio::test]
  async fn test_add_review_to_missing_listing_fails() {
    let listings = ListingService::new(seeded_store(0).await, Arc::new(MockSummarizer::new()));
    let result = listings
      .add_review(&DocumentKey::Int(5), NewReview { reviewer_name: "Marta".into(), comments: "Hi".into() })
      .await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));
  }

  #[tokio::test]
  async fn test_summary_is_cached_until_forced() {
    let mut summarizer = MockSummarizer::new();
    summarizer.expect_summarize_structured().times(2).returning(|_| {
      Ok(StructuredSummary { summary: "Guests love it.".to_string(), tags: vec!["cosy".to_string()] })
    });
    summarizer.expect_model().returning(|| "test-model".to_string());

    let listings = ListingService::new(seeded_store(3).await, Arc::new(summarizer));

    let first = listings.listing_summary(&key(), false).await.unwrap();
    let cached = listings.listing_summary(&key(), false).await.unwrap();
    assert_eq!(first, cached);
    assert_eq!(first.model.as_deref(), Some("test-model"));
    assert_eq!(listings.summarized_count().await.unwrap(), 1);

    listings.listing_summary(&key(), true).await.unwrap();
  }

  #[tokio::test]
  async fn test_summary_without_reviews_fails() {
    let listings = ListingService::new(seeded_store(0).await, Arc::new(MockSummarizer::new()));
    let result = listings.listing_summary(&key(), false).await;
    assert!(matches!(result, Err(ServiceError::NoReviews { .. })));
  }

  #[tokio::test]
  async fn test_malformed_summary_is_not_cached() {
    let mut summarizer = MockSummarizer::new();
    summarizer
      .expect_summarize_structured()
      .returning(|_| Err(LlmError::MalformedSummary { message: "expected value".to_string() }));

    let listings = ListingService::new(seeded_store(1).await, Arc::new(summarizer));
    let result = listings.listing_summary(&key(), false).await;

    assert!(matches!(result, Err(ServiceError::Llm(LlmError::MalformedSummary { .. }))));
    assert!(listings.get_listing(&key()).await.unwrap().ai_summary.is_none());
  }
}
