//! Deal operations
//!
//! Computed values (travel estimate, summary) are cached on the deal document
//! the first time they are produced and reused afterwards.

use serde_json::json;
use std::sync::Arc;

use super::{DistanceService, ServiceError, ServiceResult, Summarizer, TravelEstimate};
use crate::models::{Deal, NewDeal};
use crate::services::prompts;
use crate::store::{self, DocumentKey, Filter, SharedStore, Update};

#[derive(Clone)]
pub struct DealService {
  store: SharedStore,
  maps: Arc<dyn DistanceService>,
  summarizer: Arc<dyn Summarizer>,
}

impl DealService {
  pub fn new(store: SharedStore, maps: Arc<dyn DistanceService>, summarizer: Arc<dyn Summarizer>) -> Self {
    Self { store, maps, summarizer }
  }

  /// Insert exactly one new deal
  pub async fn save_deal(&self, new_deal: NewDeal) -> ServiceResult<Deal> {
    new_deal.validate().map_err(ServiceError::Validation)?;

    let mut deal = new_deal.into_deal();
    let key = self.store.insert_one(store::encode(&deal)?).await?;
    tracing::info!(%key, location = %deal.location, category = %deal.category, "saved deal");

    deal.id = Some(key);
    Ok(deal)
  }

  pub async fn all_deals(&self) -> ServiceResult<Vec<Deal>> {
    self.filtered_deals(None, None).await
  }

  /// Number of stored deals, counted without decoding them
  pub async fn deal_count(&self) -> ServiceResult<u64> {
    Ok(self.store.count(&Filter::new()).await?)
  }

  /// Deals matching the given location and category. Blank filters are ignored.
  pub async fn filtered_deals(
    &self,
    location: Option<&str>,
    category: Option<&str>,
  ) -> ServiceResult<Vec<Deal>> {
    let filter = Filter::new().eq_opt("Location", location).eq_opt("Category", category);
    let docs = self.store.find(&filter).await?;
    docs.into_iter().map(|doc| store::decode(doc).map_err(ServiceError::from)).collect()
  }

  pub async fn get_deal(&self, key: &DocumentKey) -> ServiceResult<Deal> {
    match self.store.find_one(&Filter::by_key(key)).await? {
      Some(doc) => Ok(store::decode(doc)?),
      None => Err(ServiceError::NotFound { kind: "Deal", key: key.clone() }),
    }
  }

  /// Travel estimate from `origin` to the deal's location. A previously cached
  /// estimate is reused when it was computed for the same origin.
  pub async fn deal_distance(
    &self,
    key: &DocumentKey,
    origin: &str,
  ) -> ServiceResult<Option<TravelEstimate>> {
    let origin = origin.trim();
    if origin.is_empty() {
      return Err(ServiceError::Validation("Origin is required".to_string()));
    }

    let deal = self.get_deal(key).await?;
    if let (Some(cached_origin), Some(distance), Some(duration)) =
      (&deal.origin, &deal.distance, &deal.duration)
    {
      if cached_origin == origin {
        tracing::debug!(%key, origin, "using cached travel estimate");
        return Ok(Some(TravelEstimate { distance: distance.clone(), duration: duration.clone() }));
      }
    }

    let estimate = self.maps.distance(origin, &deal.location).await?;
    if let Some(found) = &estimate {
      let update = Update::set([
        ("Origin".to_string(), json!(origin)),
        ("Distance".to_string(), json!(found.distance)),
        ("Duration".to_string(), json!(found.duration)),
      ]);
      self.store.update_one(&Filter::by_key(key), update).await?;
      tracing::info!(%key, origin, distance = %found.distance, "cached travel estimate");
    } else {
      tracing::warn!(%key, origin, destination = %deal.location, "no route found");
    }
    Ok(estimate)
  }

  /// Summary of the deal, generated once and then read back from the document
  pub async fn deal_summary(&self, key: &DocumentKey) -> ServiceResult<String> {
    let deal = self.get_deal(key).await?;
    if let Some(summary) = deal.summary.as_deref().filter(|s| !s.trim().is_empty()) {
      return Ok(summary.to_string());
    }

    let summary = self.summarizer.summarize(&prompts::deal_prompt(&deal)).await?;
    self
      .store
      .update_one(&Filter::by_key(key), Update::set([("Summary".to_string(), json!(summary))]))
      .await?;
    tracing::info!(%key, model = %self.summarizer.model(), "cached deal summary");
    Ok(summary)
  }
}
