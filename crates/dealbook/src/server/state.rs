//! Shared application state handed to every handler

use std::sync::Arc;

use crate::config::Stores;
use crate::services::{DealService, DistanceService, ListingService, Summarizer};

#[derive(Clone)]
pub struct AppState {
  pub deals: DealService,
  pub listings: ListingService,
}

impl AppState {
  /// Wire the services over the long-lived store handles
  pub fn new(stores: Stores, maps: Arc<dyn DistanceService>, summarizer: Arc<dyn Summarizer>) -> Self {
    Self {
      deals: DealService::new(stores.deals, maps, summarizer.clone()),
      listings: ListingService::new(stores.listings, summarizer),
    }
  }
}
