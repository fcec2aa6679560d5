//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use crate::server::handlers::{deals, listings, status};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    // Deal endpoints
    .route("/deals", post(deals::save_deal).get(deals::list_deals))
    .route("/deals/{id}", get(deals::get_deal))
    .route("/deals/{id}/distance", post(deals::deal_distance))
    .route("/summary", post(deals::deal_summary))
    // Listing endpoints
    .route("/listings/{id}", get(listings::get_listing))
    .route("/listings/{id}/reviews", get(listings::list_reviews).post(listings::add_review))
    .route("/listings/{id}/summary", post(listings::listing_summary))
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
